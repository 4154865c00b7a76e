//! Batch compression.
//!
//! Applies [`compress_image`] to every file of a batch independently. Files
//! are spread over the rayon pool; results come back in input order, one
//! per input, and a failure on one file never stops the others.
//!
//! ## Progress
//!
//! Callers that want live output pass an `mpsc::Sender<CompressEvent>`. One
//! event is sent per file as soon as it finishes, so events arrive in
//! completion order, not input order; each carries the file's 1-based
//! position in the batch.

use crate::imaging::{
    CompressError, CompressOptions, Compressed, ImageBackend, Outcome, compress_image,
};
use crate::types::{FileSummary, ImageFile};
use rayon::prelude::*;
use std::sync::mpsc::Sender;

/// Progress event for one file of a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum CompressEvent {
    Compressed {
        index: usize,
        name: String,
        original_bytes: u64,
        output_bytes: u64,
        outcome: Outcome,
    },
    Failed {
        index: usize,
        name: String,
        error: String,
    },
}

/// Compress every file in `files`, preserving order.
///
/// The output has exactly one entry per input, at the same position.
pub fn compress_all(
    backend: &impl ImageBackend,
    files: Vec<ImageFile>,
    options: &CompressOptions,
    progress: Option<Sender<CompressEvent>>,
) -> Vec<Result<Compressed, CompressError>> {
    files
        .into_par_iter()
        .enumerate()
        .map(|(i, file)| {
            let name = file.name.clone();
            let original_bytes = file.size();
            let result = compress_image(backend, file, options);

            if let Some(tx) = &progress {
                let event = match &result {
                    Ok(compressed) => CompressEvent::Compressed {
                        index: i + 1,
                        name,
                        original_bytes,
                        output_bytes: compressed.file.size(),
                        outcome: compressed.outcome,
                    },
                    Err(e) => CompressEvent::Failed {
                        index: i + 1,
                        name,
                        error: e.to_string(),
                    },
                };
                // The receiver may have hung up; progress is best-effort.
                tx.send(event).ok();
            }

            result
        })
        .collect()
}

/// Report entry for one file, given its size before compression.
pub fn summarize(
    name: &str,
    original_bytes: u64,
    result: &Result<Compressed, CompressError>,
    options: &CompressOptions,
) -> FileSummary {
    let mut summary = FileSummary::new(name, original_bytes);

    match result {
        Ok(compressed) => {
            summary.output_bytes = Some(compressed.file.size());
            match compressed.outcome {
                Outcome::Unchanged => {
                    summary.within_budget = compressed.file.size() <= options.max_bytes();
                }
                Outcome::Reencoded {
                    width,
                    height,
                    quality,
                    attempts,
                    within_budget,
                } => {
                    summary.width = Some(width);
                    summary.height = Some(height);
                    summary.quality = Some(quality.value());
                    summary.attempts = Some(attempts);
                    summary.within_budget = within_budget;
                }
            }
        }
        Err(e) => summary.error = Some(e.to_string()),
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, mock_image};
    use crate::types::BYTES_PER_MB;
    use std::sync::mpsc;

    const MB: usize = BYTES_PER_MB as usize;

    /// Every encode lands well under budget.
    fn backend() -> MockBackend {
        MockBackend::with_size_model(|_, _| 1000)
    }

    fn batch() -> Vec<ImageFile> {
        vec![
            mock_image("001-front.jpg", 4000, 3000, 2 * MB),
            ImageFile::new("002-broken.jpg", vec![0; 2 * MB]),
            mock_image("003-small.jpg", 800, 600, 1000),
            mock_image("004-garden.png", 3000, 4000, 4 * MB),
        ]
    }

    #[test]
    fn preserves_order_and_length() {
        let backend = backend();
        let options = CompressOptions::new(1200, 800, 0.8, 1.0);

        let results = compress_all(&backend, batch(), &options, None);

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].as_ref().unwrap().file.name, "001-front.jpg");
        assert_eq!(results[1].as_ref().unwrap_err().file_name(), "002-broken.jpg");
        assert_eq!(results[2].as_ref().unwrap().outcome, Outcome::Unchanged);
        assert_eq!(results[3].as_ref().unwrap().file.name, "004-garden.png");
    }

    #[test]
    fn failure_does_not_stop_batch() {
        let backend = backend();
        let options = CompressOptions::new(1200, 800, 0.8, 1.0);

        let results = compress_all(&backend, batch(), &options, None);

        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
        // Two oversized decodable files, each encoded once
        assert_eq!(backend.encode_count(), 2);
    }

    #[test]
    fn empty_batch() {
        let backend = MockBackend::new();
        let results = compress_all(&backend, Vec::new(), &CompressOptions::default(), None);
        assert!(results.is_empty());
    }

    #[test]
    fn sends_one_event_per_file() {
        let backend = backend();
        let options = CompressOptions::new(1200, 800, 0.8, 1.0);
        let (tx, rx) = mpsc::channel();

        compress_all(&backend, batch(), &options, Some(tx));

        let mut events: Vec<CompressEvent> = rx.iter().collect();
        events.sort_by_key(|e| match e {
            CompressEvent::Compressed { index, .. } | CompressEvent::Failed { index, .. } => *index,
        });
        assert_eq!(events.len(), 4);
        assert!(matches!(
            &events[1],
            CompressEvent::Failed { index: 2, name, .. } if name == "002-broken.jpg"
        ));
        assert!(matches!(
            &events[2],
            CompressEvent::Compressed {
                index: 3,
                original_bytes: 1000,
                output_bytes: 1000,
                outcome: Outcome::Unchanged,
                ..
            }
        ));
    }

    #[test]
    fn summarize_reencoded() {
        let backend = backend();
        let options = CompressOptions::new(1200, 800, 0.8, 1.0);
        let file = mock_image("a.jpg", 4000, 3000, 2 * MB);

        let result = compress_image(&backend, file, &options);
        let summary = summarize("a.jpg", 2 * MB as u64, &result, &options);

        assert_eq!(summary.width, Some(1067));
        assert_eq!(summary.height, Some(800));
        assert_eq!(summary.attempts, Some(1));
        assert!(summary.within_budget);
        assert!(summary.error.is_none());
    }

    #[test]
    fn summarize_failure() {
        let options = CompressOptions::default();
        let result = Err(CompressError::Decode {
            name: "x.jpg".to_string(),
            reason: "bad".to_string(),
        });
        let summary = summarize("x.jpg", 10, &result, &options);
        assert_eq!(summary.output_bytes, None);
        assert!(!summary.within_budget);
        assert_eq!(
            summary.error.as_deref(),
            Some("x.jpg: could not decode image: bad")
        );
    }
}
