//! High-level image operations.
//!
//! [`compress_image`] combines the pure calculations with backend execution:
//! it decides whether a file needs work at all, picks target dimensions,
//! then walks the quality schedule until an encode fits the size budget.

use super::backend::{BackendError, ImageBackend, Surface};
use super::calculations::{quality_schedule, target_dimensions};
use super::params::{CompressOptions, Quality};
use crate::types::ImageFile;
use thiserror::Error;
use tracing::debug;

/// Per-file compression failure. Terminal for that file only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompressError {
    #[error("{name}: could not decode image: {reason}")]
    Decode { name: String, reason: String },
    #[error("{name}: could not encode image: {reason}")]
    Encode { name: String, reason: String },
}

impl CompressError {
    fn from_backend(name: &str, err: BackendError) -> Self {
        let name = name.to_string();
        match err {
            BackendError::Decode(reason) => Self::Decode { name, reason },
            BackendError::Encode(reason) => Self::Encode { name, reason },
        }
    }

    /// Name of the file that failed.
    pub fn file_name(&self) -> &str {
        match self {
            Self::Decode { name, .. } | Self::Encode { name, .. } => name,
        }
    }
}

/// What happened to a file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Already within budget; returned byte-identical.
    Unchanged,
    /// Re-encoded as JPEG.
    Reencoded {
        width: u32,
        height: u32,
        /// Quality of the returned encode.
        quality: Quality,
        /// Encode attempts made.
        attempts: u32,
        /// Whether the returned encode fits the budget.
        within_budget: bool,
    },
}

/// A compressed file and how it was produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Compressed {
    pub file: ImageFile,
    pub outcome: Outcome,
}

impl Compressed {
    pub fn into_file(self) -> ImageFile {
        self.file
    }
}

/// Shrink `file` under `options.max_size_mb`.
///
/// Files already within budget are returned untouched. Otherwise the image
/// is decoded, resized to [`target_dimensions`], and encoded as JPEG at each
/// quality of the [`quality_schedule`] in turn. The first encode within
/// budget wins; if none fits, the smallest encode is returned.
pub fn compress_image(
    backend: &impl ImageBackend,
    file: ImageFile,
    options: &CompressOptions,
) -> Result<Compressed, CompressError> {
    let max_bytes = options.max_bytes();
    if file.size() <= max_bytes {
        return Ok(Compressed {
            file,
            outcome: Outcome::Unchanged,
        });
    }

    let decoded = backend
        .decode(&file.data)
        .map_err(|e| CompressError::from_backend(&file.name, e))?;
    let source = decoded.dimensions();
    let (width, height) = target_dimensions(
        (source.width, source.height),
        (options.max_width, options.max_height),
        file.size(),
        &options.downscale,
    );
    let canvas = backend.resize(decoded, width, height);

    let mut best: Option<(Vec<u8>, Quality)> = None;
    let mut attempts = 0;

    for quality in quality_schedule(options.quality, &options.retry) {
        attempts += 1;
        let data = backend
            .encode_jpeg(&canvas, quality)
            .map_err(|e| CompressError::from_backend(&file.name, e))?;
        if data.is_empty() {
            return Err(CompressError::Encode {
                name: file.name,
                reason: "encoder produced no output".to_string(),
            });
        }

        let size = data.len() as u64;
        debug!(
            file = %file.name,
            attempt = attempts,
            quality = quality.value(),
            size,
            max_bytes,
            "encoded {width}x{height}"
        );

        let fits = size <= max_bytes;
        if best.as_ref().is_none_or(|(b, _)| data.len() < b.len()) {
            best = Some((data, quality));
        }
        if fits {
            break;
        }
    }

    let (data, quality) = best.ok_or_else(|| CompressError::Encode {
        name: file.name.clone(),
        reason: "no encode attempts configured".to_string(),
    })?;
    let within_budget = data.len() as u64 <= max_bytes;

    Ok(Compressed {
        file: ImageFile::new(file.name, data),
        outcome: Outcome::Reencoded {
            width,
            height,
            quality,
            attempts,
            within_budget,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp, mock_image};
    use crate::imaging::params::RetryPolicy;
    use crate::types::BYTES_PER_MB;

    const MB: usize = BYTES_PER_MB as usize;

    fn options(max_size_mb: f64) -> CompressOptions {
        CompressOptions::new(1200, 800, 0.8, max_size_mb)
    }

    #[test]
    fn small_file_returned_unchanged() {
        let backend = MockBackend::new();
        let file = mock_image("small.jpg", 4000, 3000, 6 * MB);

        let result = compress_image(&backend, file.clone(), &options(8.0)).unwrap();

        assert_eq!(result.outcome, Outcome::Unchanged);
        assert_eq!(result.file, file);
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn file_exactly_at_budget_is_unchanged() {
        let backend = MockBackend::new();
        let file = mock_image("edge.jpg", 100, 100, MB);

        let result = compress_image(&backend, file, &options(1.0)).unwrap();
        assert_eq!(result.outcome, Outcome::Unchanged);
    }

    #[test]
    fn large_file_scaled_and_encoded_once_when_it_fits() {
        let backend = MockBackend::new();
        let file = mock_image("house.jpg", 4000, 3000, 12 * MB);

        let result = compress_image(&backend, file, &options(8.0)).unwrap();

        let Outcome::Reencoded {
            width,
            height,
            quality,
            attempts,
            within_budget,
        } = result.outcome
        else {
            panic!("expected re-encode, got {:?}", result.outcome);
        };
        assert_eq!((width, height), (533, 400));
        assert_eq!(quality, Quality::new(0.8));
        assert_eq!(attempts, 1);
        assert!(within_budget);
        assert_eq!(result.file.name, "house.jpg");

        assert_eq!(
            backend.get_operations()[1..],
            [
                RecordedOp::Resize {
                    width: 533,
                    height: 400
                },
                RecordedOp::Encode {
                    width: 533,
                    height: 400,
                    quality: 80
                },
            ]
        );
    }

    #[test]
    fn reduces_quality_until_it_fits() {
        // Size proportional to quality: 1 MB per 0.1 quality
        let backend =
            MockBackend::with_size_model(|_, q| (q.value() as f64 * 10.0 * MB as f64) as usize);
        let file = mock_image("kitchen.jpg", 4000, 3000, 12 * MB);

        // 0.8 → 8MB, 0.48 → 4.8MB, 0.288 → 2.88MB fits under 3MB
        let result = compress_image(&backend, file, &options(3.0)).unwrap();

        let Outcome::Reencoded {
            quality, attempts, ..
        } = result.outcome
        else {
            panic!("expected re-encode");
        };
        assert_eq!(attempts, 3);
        assert!((quality.value() - 0.288).abs() < 1e-5);
        assert!(result.file.size() <= 3 * MB as u64);

        let qualities: Vec<u8> = backend
            .get_operations()
            .iter()
            .filter_map(|op| match op {
                RecordedOp::Encode { quality, .. } => Some(*quality),
                _ => None,
            })
            .collect();
        assert_eq!(qualities, vec![80, 48, 29]);
    }

    #[test]
    fn gives_up_after_five_attempts_with_smallest_result() {
        let backend = MockBackend::with_size_model(|_, q| {
            2 * MB + (q.value() as f64 * 1000.0).round() as usize
        });
        let file = mock_image("pool.jpg", 4000, 3000, 12 * MB);

        let result = compress_image(&backend, file, &options(1.0)).unwrap();

        let Outcome::Reencoded {
            quality,
            attempts,
            within_budget,
            ..
        } = result.outcome
        else {
            panic!("expected re-encode");
        };
        assert_eq!(attempts, 5);
        assert!(!within_budget);
        assert!(quality.value() >= 0.1);
        assert!((quality.value() - 0.10368).abs() < 1e-5);
        assert_eq!(backend.encode_count(), 5);
        assert_eq!(result.file.size(), 2 * MB as u64 + 104);
    }

    #[test]
    fn keeps_smallest_when_sizes_are_not_monotonic() {
        // Second attempt happens to be the smallest
        let backend = MockBackend::with_size_model(|_, q| {
            let scale = q.jpeg_scale();
            if scale == 48 { 2 * MB } else { 3 * MB + scale as usize }
        });
        let file = mock_image("odd.jpg", 2000, 1000, 12 * MB);

        let result = compress_image(&backend, file, &options(1.0)).unwrap();
        assert_eq!(result.file.size(), 2 * MB as u64);
        let Outcome::Reencoded { quality, attempts, .. } = result.outcome else {
            panic!("expected re-encode");
        };
        assert_eq!(quality.jpeg_scale(), 48);
        assert_eq!(attempts, 5);
    }

    #[test]
    fn corrupt_bytes_are_decode_error() {
        let backend = MockBackend::new();
        let file = ImageFile::new("broken.jpg", vec![0xAB; 2 * MB]);

        let err = compress_image(&backend, file, &options(1.0)).unwrap_err();

        assert!(matches!(err, CompressError::Decode { .. }));
        assert_eq!(err.file_name(), "broken.jpg");
        assert_eq!(backend.encode_count(), 0);
    }

    #[test]
    fn empty_encode_is_encode_error() {
        let backend = MockBackend::with_size_model(|_, _| 0);
        let file = mock_image("blank.jpg", 100, 100, 2 * MB);

        let err = compress_image(&backend, file, &options(1.0)).unwrap_err();
        assert_eq!(
            err,
            CompressError::Encode {
                name: "blank.jpg".to_string(),
                reason: "encoder produced no output".to_string(),
            }
        );
    }

    #[test]
    fn zero_attempts_is_encode_error() {
        let backend = MockBackend::new();
        let file = mock_image("a.jpg", 100, 100, 2 * MB);
        let mut opts = options(1.0);
        opts.retry = RetryPolicy {
            max_attempts: 0,
            ..RetryPolicy::default()
        };

        let err = compress_image(&backend, file, &opts).unwrap_err();
        assert!(matches!(err, CompressError::Encode { .. }));
    }

    #[test]
    fn output_never_exceeds_caps() {
        let backend = MockBackend::with_size_model(|_, _| 1);
        for (w, h) in [(4000, 3000), (3000, 4000), (1201, 10), (10, 801), (5000, 5000)] {
            let file = mock_image("x.jpg", w, h, 2 * MB);
            let result = compress_image(&backend, file, &options(1.0)).unwrap();
            let Outcome::Reencoded { width, height, .. } = result.outcome else {
                panic!("expected re-encode");
            };
            assert!(width <= 1200 && height <= 800, "{w}x{h} -> {width}x{height}");
        }
    }
}
