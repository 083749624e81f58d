//! CLI output formatting for batch progress.
//!
//! Each [`BatchEvent`] maps to exactly one log line:
//!
//! ```text
//! Compressing 4 images
//! [1/4] dawn.jpg → 48.21 KB
//! [2/4] mountains.png → 49.87 KB
//! [3/4] broken.jpg failed: Failed to decode image: ...
//! [4/4] dusk.jpeg → 51.02 KB
//! All images compressed
//! ```
//!
//! Sizes are printed with two decimals; a size above the target is not
//! annotated — exhausted quality is visible only through the number itself.
//!
//! Format functions are pure (no I/O, no side effects) so line shapes are
//! unit-testable; [`print_batch_event`] is the stdout wrapper.

use crate::batch::{BatchError, BatchEvent};

/// Format one progress event as a single log line.
pub fn format_batch_event(event: &BatchEvent) -> String {
    match event {
        BatchEvent::Started { total } => format!("Compressing {} images", total),
        BatchEvent::Compressed {
            index,
            total,
            filename,
            size_kb,
        } => format!("[{}/{}] {} → {:.2} KB", index, total, filename, size_kb),
        BatchEvent::Failed {
            index,
            total,
            filename,
            message,
        } => format!("[{}/{}] {} failed: {}", index, total, filename, message),
        BatchEvent::Completed => "All images compressed".to_string(),
    }
}

/// Format a batch-fatal error as a single log line.
pub fn format_batch_error(error: &BatchError) -> String {
    format!("Error: {}", error)
}

/// Print a progress event to stdout.
pub fn print_batch_event(event: &BatchEvent) {
    println!("{}", format_batch_event(event));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn started_line() {
        let line = format_batch_event(&BatchEvent::Started { total: 4 });
        assert_eq!(line, "Compressing 4 images");
    }

    #[test]
    fn compressed_line_has_index_name_and_two_decimals() {
        let line = format_batch_event(&BatchEvent::Compressed {
            index: 2,
            total: 4,
            filename: "dawn.jpg".to_string(),
            size_kb: 48.2111,
        });
        assert_eq!(line, "[2/4] dawn.jpg → 48.21 KB");
    }

    #[test]
    fn failed_line_carries_the_message() {
        let line = format_batch_event(&BatchEvent::Failed {
            index: 3,
            total: 4,
            filename: "broken.jpg".to_string(),
            message: "Failed to decode image: bad header".to_string(),
        });
        assert_eq!(
            line,
            "[3/4] broken.jpg failed: Failed to decode image: bad header"
        );
    }

    #[test]
    fn completed_line() {
        assert_eq!(
            format_batch_event(&BatchEvent::Completed),
            "All images compressed"
        );
    }

    #[test]
    fn error_lines_are_prefixed() {
        let line = format_batch_error(&BatchError::InvalidTargetSize);
        assert_eq!(line, "Error: Target size must be a positive integer (KB)");

        let line = format_batch_error(&BatchError::SourceNotFound(PathBuf::from("/tmp/x")));
        assert_eq!(line, "Error: Source directory does not exist: /tmp/x");
    }
}
