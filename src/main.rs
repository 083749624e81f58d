use clap::Parser;
use picsqueeze::batch::{self, BatchConfig};
use picsqueeze::encoder::{CompressOptions, Quality};
use picsqueeze::output;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

#[derive(Parser)]
#[command(name = "picsqueeze")]
#[command(about = "Compress every image in a folder to fit under a target size")]
#[command(long_about = "\
Compress every image in a folder to fit under a target size

Each .jpg, .jpeg, or .png file directly inside SOURCE is re-encoded as JPEG
at decreasing quality until it fits under TARGET_KB kilobytes, then written
to DEST under the same filename. If even the lowest quality step misses the
target, the smallest attempt is kept and its real size is logged.

Files are processed one at a time; a file that fails to read or decode is
logged and skipped, and the batch continues. DEST is created if missing.
Note that output filenames keep their source extension: a .png input
produces a .png file containing JPEG data.")]
#[command(version)]
struct Cli {
    /// Directory containing the images to compress
    source: PathBuf,

    /// Directory the compressed images are written to (created if missing)
    dest: PathBuf,

    /// Target size per image, in kilobytes
    target_kb: String,

    /// JPEG quality of the first encode pass (1-100)
    #[arg(long, default_value_t = 90)]
    quality: u32,

    /// Quality decrement between encode passes
    #[arg(long, default_value_t = 5)]
    step: u32,
}

fn main() {
    let cli = Cli::parse();

    // All failures surface as log lines; the process itself never crashes.
    let target_kb = match batch::parse_target_kb(&cli.target_kb) {
        Ok(kb) => kb,
        Err(err) => {
            println!("{}", output::format_batch_error(&err));
            return;
        }
    };

    // Pre-step outside the core: the batch runner only validates that the
    // destination exists.
    if !cli.dest.exists() {
        if let Err(err) = std::fs::create_dir_all(&cli.dest) {
            println!("Error: cannot create {}: {}", cli.dest.display(), err);
            return;
        }
    }

    let config = BatchConfig {
        source_dir: cli.source,
        dest_dir: cli.dest,
        target_kb,
        options: CompressOptions {
            initial_quality: Quality::new(cli.quality),
            step: cli.step,
        },
    };

    // One worker thread runs the batch; this thread drains progress events.
    // The channel closes when the worker drops its sender, ending the loop.
    let (tx, rx) = mpsc::channel();
    let worker = thread::spawn(move || batch::run(&config, Some(&tx)));
    for event in rx {
        output::print_batch_event(&event);
    }

    match worker.join() {
        Ok(Ok(_summary)) => {}
        Ok(Err(err)) => println!("{}", output::format_batch_error(&err)),
        Err(_) => println!("Error: batch worker panicked"),
    }
}
