//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::load_from_memory` (format sniffed from bytes) |
//! | Flatten | `DynamicImage::into_rgb8` (JPEG has no alpha) |
//! | Resize | `imageops::resize` with `Lanczos3` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder::new_with_quality` |

use super::backend::{BackendError, Dimensions, ImageBackend, Surface};
use super::params::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, RgbImage};
use std::borrow::Cow;
use std::sync::LazyLock;

/// Extensions whose decoders are compiled in.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

impl Surface for DynamicImage {
    fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width(),
            height: self.height(),
        }
    }
}

/// Backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBackend for RustBackend {
    type Surface = DynamicImage;

    fn decode(&self, data: &[u8]) -> Result<DynamicImage, BackendError> {
        image::load_from_memory(data).map_err(|e| BackendError::Decode(e.to_string()))
    }

    /// Flattens to RGB8 before resampling, so every encode attempt reuses
    /// the same buffer.
    fn resize(&self, source: DynamicImage, width: u32, height: u32) -> DynamicImage {
        let rgb = source.into_rgb8();
        if rgb.width() == width && rgb.height() == height {
            return DynamicImage::ImageRgb8(rgb);
        }
        DynamicImage::ImageRgb8(imageops::resize(&rgb, width, height, FilterType::Lanczos3))
    }

    fn encode_jpeg(
        &self,
        surface: &DynamicImage,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError> {
        let rgb: Cow<'_, RgbImage> = match surface {
            DynamicImage::ImageRgb8(rgb) => Cow::Borrowed(rgb),
            // JPEG has no alpha channel
            other => Cow::Owned(other.to_rgb8()),
        };
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, quality.jpeg_scale())
            .write_image(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| BackendError::Encode(e.to_string()))?;

        if out.is_empty() {
            return Err(BackendError::Encode("encoder produced no output".into()));
        }
        Ok(out)
    }
}
