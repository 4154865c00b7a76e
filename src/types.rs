//! Shared types passed between scanning, compression, and upload preparation.

use serde::Serialize;

/// Bytes per megabyte for all size budgets.
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// An in-memory image file: its declared name and raw bytes.
///
/// The name is carried through compression unchanged, so an uploaded file
/// keeps the name the user picked even though its bytes are now JPEG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub data: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Serializable summary of one file, used by the `--report` output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSummary {
    pub name: String,
    pub original_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
    pub within_budget: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileSummary {
    /// Entry with only the input known; callers fill in the outcome.
    pub fn new(name: impl Into<String>, original_bytes: u64) -> Self {
        Self {
            name: name.into(),
            original_bytes,
            output_bytes: None,
            width: None,
            height: None,
            quality: None,
            attempts: None,
            within_budget: false,
            error: None,
        }
    }
}
