//! CLI output formatting.
//!
//! Every entity leads with its 1-based position in the batch and its file
//! name; details follow on indented context lines:
//!
//! ```text
//! 001 front.jpg
//!     12.0 MB → 245.3 KB (533x400, quality 0.80, 1 attempt)
//! 002 broken.jpg
//!     skipped: broken.jpg: could not decode image: ...
//! 003 porch.jpg
//!     900.0 KB: unchanged
//!
//! Ready 2 files (13.0 MB → 1.1 MB), skipped 1
//! ```
//!
//! Each `format_*` function returns lines and does no I/O, so the display
//! contract is unit tested; `main.rs` does the printing.

use crate::compress::CompressEvent;
use crate::imaging::Outcome;
use crate::scan::Unreadable;
use crate::types::BYTES_PER_MB;
use crate::upload::UploadBatch;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Human-readable byte size.
pub fn format_size(bytes: u64) -> String {
    if bytes >= BYTES_PER_MB {
        format!("{:.1} MB", bytes as f64 / BYTES_PER_MB as f64)
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Format a single compression progress event as display lines.
pub fn format_compress_event(event: &CompressEvent) -> Vec<String> {
    match event {
        CompressEvent::Compressed {
            index,
            name,
            original_bytes,
            output_bytes,
            outcome,
        } => {
            let mut lines = vec![format!("{} {}", format_index(*index), name)];
            match outcome {
                Outcome::Unchanged => {
                    lines.push(format!("    {}: unchanged", format_size(*original_bytes)));
                }
                Outcome::Reencoded {
                    width,
                    height,
                    quality,
                    attempts,
                    within_budget,
                } => {
                    lines.push(format!(
                        "    {} \u{2192} {} ({}x{}, quality {:.2}, {})",
                        format_size(*original_bytes),
                        format_size(*output_bytes),
                        width,
                        height,
                        quality.value(),
                        plural(*attempts as usize, "attempt"),
                    ));
                    if !within_budget {
                        lines.push("    still over budget after all attempts".to_string());
                    }
                }
            }
            lines
        }
        CompressEvent::Failed { index, name, error } => vec![
            format!("{} {}", format_index(*index), name),
            format!("    skipped: {}", error),
        ],
    }
}

/// Format one line of the `check` command.
pub fn format_check_line(index: usize, name: &str, size: u64, max_bytes: u64) -> String {
    let verdict = if size <= max_bytes {
        "ok"
    } else {
        "needs compression"
    };
    format!(
        "{} {} ({}): {}",
        format_index(index),
        name,
        format_size(size),
        verdict
    )
}

/// Closing summary for an upload batch.
///
/// `unreadable` are inputs that never reached compression; they count as
/// skipped.
pub fn format_upload_summary(
    batch: &UploadBatch,
    original_bytes: u64,
    unreadable: &[Unreadable],
) -> Vec<String> {
    let mut lines = vec![format!(
        "Ready {} ({} \u{2192} {}), skipped {}",
        plural(batch.ready.len(), "file"),
        format_size(original_bytes),
        format_size(batch.total_bytes()),
        batch.skipped.len() + unreadable.len()
    )];
    for entry in unreadable {
        lines.push(format!("    skipped {}: {}", entry.path.display(), entry.error));
    }
    for skipped in &batch.skipped {
        lines.push(format!("    skipped {}: {}", skipped.name, skipped.error));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{CompressError, Quality};
    use crate::scan::ScanError;
    use crate::types::ImageFile;
    use std::path::PathBuf;
    use crate::upload::SkippedFile;

    #[test]
    fn format_size_units() {
        assert_eq!(format_size(900), "900 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(12 * BYTES_PER_MB), "12.0 MB");
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1234), "1234");
    }

    #[test]
    fn format_unchanged_event() {
        let event = CompressEvent::Compressed {
            index: 3,
            name: "porch.jpg".to_string(),
            original_bytes: 900 * 1024,
            output_bytes: 900 * 1024,
            outcome: Outcome::Unchanged,
        };
        assert_eq!(
            format_compress_event(&event),
            vec!["003 porch.jpg", "    900.0 KB: unchanged"]
        );
    }

    #[test]
    fn format_reencoded_event() {
        let event = CompressEvent::Compressed {
            index: 1,
            name: "front.jpg".to_string(),
            original_bytes: 12 * BYTES_PER_MB,
            output_bytes: 2048,
            outcome: Outcome::Reencoded {
                width: 533,
                height: 400,
                quality: Quality::new(0.8),
                attempts: 1,
                within_budget: true,
            },
        };
        assert_eq!(
            format_compress_event(&event),
            vec![
                "001 front.jpg",
                "    12.0 MB \u{2192} 2.0 KB (533x400, quality 0.80, 1 attempt)"
            ]
        );
    }

    #[test]
    fn format_over_budget_event() {
        let event = CompressEvent::Compressed {
            index: 2,
            name: "pano.png".to_string(),
            original_bytes: 20 * BYTES_PER_MB,
            output_bytes: 2 * BYTES_PER_MB,
            outcome: Outcome::Reencoded {
                width: 1200,
                height: 300,
                quality: Quality::new(0.1),
                attempts: 5,
                within_budget: false,
            },
        };
        let lines = format_compress_event(&event);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with("5 attempts)"));
        assert_eq!(lines[2], "    still over budget after all attempts");
    }

    #[test]
    fn format_failed_event() {
        let event = CompressEvent::Failed {
            index: 2,
            name: "broken.jpg".to_string(),
            error: "broken.jpg: could not decode image: bad header".to_string(),
        };
        assert_eq!(
            format_compress_event(&event),
            vec![
                "002 broken.jpg",
                "    skipped: broken.jpg: could not decode image: bad header"
            ]
        );
    }

    #[test]
    fn format_check_lines() {
        assert_eq!(
            format_check_line(1, "a.jpg", 2 * BYTES_PER_MB, BYTES_PER_MB),
            "001 a.jpg (2.0 MB): needs compression"
        );
        assert_eq!(
            format_check_line(2, "b.jpg", 1000, BYTES_PER_MB),
            "002 b.jpg (1000 B): ok"
        );
    }

    #[test]
    fn format_summary_lists_skipped() {
        let batch = UploadBatch {
            ready: vec![ImageFile::new("a.jpg", vec![0; 2048])],
            skipped: vec![SkippedFile {
                name: "b.jpg".to_string(),
                error: CompressError::Decode {
                    name: "b.jpg".to_string(),
                    reason: "bad".to_string(),
                },
            }],
            report: Vec::new(),
        };
        let lines = format_upload_summary(&batch, 4 * BYTES_PER_MB, &[]);
        assert_eq!(
            lines,
            vec![
                "Ready 1 file (4.0 MB \u{2192} 2.0 KB), skipped 1",
                "    skipped b.jpg: b.jpg: could not decode image: bad"
            ]
        );
    }

    #[test]
    fn format_summary_counts_unreadable_inputs() {
        let batch = UploadBatch {
            ready: vec![ImageFile::new("a.jpg", vec![0; 1024])],
            ..UploadBatch::default()
        };
        let unreadable = vec![Unreadable {
            path: PathBuf::from("rooms/dangling.jpg"),
            error: ScanError::NotFound(PathBuf::from("rooms/dangling.jpg")),
        }];

        let lines = format_upload_summary(&batch, 2048, &unreadable);

        assert_eq!(
            lines,
            vec![
                "Ready 1 file (2.0 KB \u{2192} 1.0 KB), skipped 1",
                "    skipped rooms/dangling.jpg: Input not found: rooms/dangling.jpg"
            ]
        );
    }
}
