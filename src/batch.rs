//! Batch orchestration: compress every image in a directory.
//!
//! [`run`] enumerates the immediate entries of a source directory, filters
//! them to supported image filenames, and feeds each one through the
//! [`encoder`](crate::encoder). Per-file failures are isolated — a corrupt
//! image is reported through the sink and the batch moves on — while the
//! preconditions (valid target size, both directories present, at least one
//! matching image) are batch-fatal and abort before any file is touched.
//!
//! ## Progress sink
//!
//! Progress is reported as typed [`BatchEvent`]s over an optional
//! `mpsc::Sender`. The runner has no opinion on presentation; the
//! [`output`](crate::output) module turns events into log lines and the CLI
//! drains the channel on a printer loop. Passing `None` runs silently.
//!
//! ## Filesystem contract
//!
//! Outputs land at `dest_dir/<same filename>`, silently overwriting whatever
//! is there. The filename keeps its original extension even though the bytes
//! are always JPEG — a `.png` source produces a `.png` file with JPEG
//! content. Outputs pair with their sources by exact name, so the name is
//! never rewritten.

use crate::encoder::{self, CompressOptions};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Target size must be a positive integer (KB)")]
    InvalidTargetSize,
    #[error("Source directory does not exist: {0}")]
    SourceNotFound(PathBuf),
    #[error("Destination directory does not exist: {0}")]
    DestNotFound(PathBuf),
    #[error("No supported image files found in {0}")]
    NoImagesFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Filename suffixes accepted by the batch, matched case-insensitively.
///
/// Exact suffix match including the dot: `photo.JPG` and `scan.jpeg` pass,
/// `foo.xjpg` does not.
const IMAGE_SUFFIXES: &[&str] = &[".jpg", ".jpeg", ".png"];

/// Whether a filename is picked up by the batch.
pub fn is_supported_image(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    IMAGE_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
}

/// Parse a user-supplied target size string into kilobytes.
///
/// The CLI accepts the target as free text; anything that is not a positive
/// integer is rejected up front so the batch never starts with a bad target.
pub fn parse_target_kb(raw: &str) -> Result<u32, BatchError> {
    match raw.trim().parse::<u32>() {
        Ok(kb) if kb > 0 => Ok(kb),
        _ => Err(BatchError::InvalidTargetSize),
    }
}

/// One full batch: where to read, where to write, how hard to squeeze.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
    /// Per-image target size in kilobytes. Must be positive.
    pub target_kb: u32,
    pub options: CompressOptions,
}

/// Progress events emitted while a batch runs. Indices are 1-based.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    Started {
        total: usize,
    },
    Compressed {
        index: usize,
        total: usize,
        filename: String,
        size_kb: f64,
    },
    Failed {
        index: usize,
        total: usize,
        filename: String,
        message: String,
    },
    Completed,
}

/// Aggregate counts after a batch has run to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Run one batch to completion.
///
/// Blocking and strictly sequential — one file at a time, no retries, no
/// cancellation. Callers that need a responsive foreground (the CLI does)
/// put the whole call on a worker thread and drain the sink from another.
///
/// Returns the summary on completion; batch-fatal precondition failures are
/// returned as `Err` before any file is processed.
pub fn run(
    config: &BatchConfig,
    sink: Option<&Sender<BatchEvent>>,
) -> Result<BatchSummary, BatchError> {
    if config.target_kb == 0 {
        return Err(BatchError::InvalidTargetSize);
    }
    if !config.source_dir.exists() {
        return Err(BatchError::SourceNotFound(config.source_dir.clone()));
    }
    if !config.dest_dir.exists() {
        return Err(BatchError::DestNotFound(config.dest_dir.clone()));
    }

    let images = list_images(&config.source_dir)?;
    if images.is_empty() {
        return Err(BatchError::NoImagesFound(config.source_dir.clone()));
    }

    let total = images.len();
    emit(sink, BatchEvent::Started { total });

    let mut succeeded = 0;
    for (i, filename) in images.iter().enumerate() {
        let index = i + 1;
        match compress_one(config, filename) {
            Ok(size_kb) => {
                succeeded += 1;
                emit(
                    sink,
                    BatchEvent::Compressed {
                        index,
                        total,
                        filename: filename.clone(),
                        size_kb,
                    },
                );
            }
            Err(message) => emit(
                sink,
                BatchEvent::Failed {
                    index,
                    total,
                    filename: filename.clone(),
                    message,
                },
            ),
        }
    }

    emit(sink, BatchEvent::Completed);
    Ok(BatchSummary {
        total,
        succeeded,
        failed: total - succeeded,
    })
}

/// Immediate regular files of `dir` whose names match the image suffixes,
/// in the order the filesystem yields them (platform-dependent, not sorted).
fn list_images(dir: &Path) -> Result<Vec<String>, BatchError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        // Non-UTF-8 names can't match an ASCII suffix; skip them.
        if let Some(name) = entry.file_name().to_str() {
            if is_supported_image(name) {
                names.push(name.to_string());
            }
        }
    }
    Ok(names)
}

/// Read, compress, and write a single file.
///
/// Every failure mode (read, decode, encode, write) collapses to a message
/// string here — the file boundary is where errors stop unwinding.
fn compress_one(config: &BatchConfig, filename: &str) -> Result<f64, String> {
    let source = config.source_dir.join(filename);
    let bytes = fs::read(&source).map_err(|e| format!("read {}: {e}", source.display()))?;

    let outcome = encoder::compress_to_target(&bytes, config.target_kb, &config.options)
        .map_err(|e| e.to_string())?;

    let dest = config.dest_dir.join(filename);
    fs::write(&dest, &outcome.bytes).map_err(|e| format!("write {}: {e}", dest.display()))?;

    Ok(outcome.size_kb)
}

fn emit(sink: Option<&Sender<BatchEvent>>, event: BatchEvent) {
    if let Some(tx) = sink {
        // A dropped receiver just means nobody is listening anymore.
        let _ = tx.send(event);
    }
}
