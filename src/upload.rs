//! Upload preparation for a listing's photo set.
//!
//! Mirrors the listing form's upload step: every photo is compressed, a
//! photo that cannot be compressed is reported by name and left out, and
//! the rest go ahead. The HTTP upload itself happens elsewhere; this module
//! only guarantees that what it hands over is JPEG-or-untouched and, where
//! achievable, under the size ceiling.

use crate::compress::{CompressEvent, compress_all, summarize};
use crate::imaging::{CompressError, CompressOptions, ImageBackend};
use crate::types::{FileSummary, ImageFile};
use std::sync::mpsc::Sender;
use tracing::warn;

/// A photo left out of the upload.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFile {
    pub name: String,
    pub error: CompressError,
}

/// Files ready to upload, in input order, plus those skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadBatch {
    pub ready: Vec<ImageFile>,
    pub skipped: Vec<SkippedFile>,
    /// One entry per input file, in input order.
    pub report: Vec<FileSummary>,
}

impl UploadBatch {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Total bytes that will be sent.
    pub fn total_bytes(&self) -> u64 {
        self.ready.iter().map(ImageFile::size).sum()
    }
}

/// Compress `files` for upload, skipping any that fail.
pub fn prepare_upload(
    backend: &impl ImageBackend,
    files: Vec<ImageFile>,
    options: &CompressOptions,
    progress: Option<Sender<CompressEvent>>,
) -> UploadBatch {
    let mut batch = UploadBatch::default();
    let inputs: Vec<(String, u64)> = files.iter().map(|f| (f.name.clone(), f.size())).collect();

    let results = compress_all(backend, files, options, progress);
    for ((name, original_bytes), result) in inputs.into_iter().zip(results) {
        batch.report.push(summarize(&name, original_bytes, &result, options));
        match result {
            Ok(compressed) => batch.ready.push(compressed.into_file()),
            Err(error) => {
                warn!("skipping {}: {}", error.file_name(), error);
                batch.skipped.push(SkippedFile {
                    name: error.file_name().to_string(),
                    error,
                });
            }
        }
    }

    batch
}
