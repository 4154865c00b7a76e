//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three steps the compression loop
//! needs: decode, resize, and JPEG encode. Decoded pixels live in a backend
//! owned [`Surface`] that the caller holds by value, so the bitmap is freed
//! when the compression call returns, whichever path it returns by.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate.

use super::params::Quality;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("encode failed: {0}")]
    Encode(String),
}

/// Pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// A decoded, drawable image held by the caller.
pub trait Surface {
    fn dimensions(&self) -> Dimensions;
}

/// Trait for image processing backends.
pub trait ImageBackend: Sync {
    type Surface: Surface;

    /// Decode raw file bytes into pixels.
    fn decode(&self, data: &[u8]) -> Result<Self::Surface, BackendError>;

    /// Draw `source` onto a new surface of exactly `width` × `height`.
    ///
    /// Consumes the source so the full-size bitmap is released before the
    /// encode attempts start.
    fn resize(&self, source: Self::Surface, width: u32, height: u32) -> Self::Surface;

    /// Encode a surface as JPEG at the given quality.
    fn encode_jpeg(&self, surface: &Self::Surface, quality: Quality)
    -> Result<Vec<u8>, BackendError>;
}
