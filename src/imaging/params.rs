//! Parameter types for the compression loop.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the [`operations`](super::operations) module (which
//! decides dimensions and qualities) and the [`backend`](super::backend)
//! (which does the pixel work).
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality as a 0–1 fraction. Clamped on construction.
//! - [`DownscalePolicy`]: Extra uniform downscale for very large source files.
//! - [`RetryPolicy`]: How quality is reduced between encode attempts.
//! - [`CompressOptions`]: Everything one compression call needs.

/// Quality setting for lossy encoding, as a fraction in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Quality(f32);

impl Quality {
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Map onto the JPEG encoder's 1–100 scale.
    pub fn jpeg_scale(self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }

    /// Multiply by `factor`, never going below `floor`.
    pub fn reduced(self, factor: f32, floor: Quality) -> Self {
        Self::new((self.0 * factor).max(floor.0))
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(0.8)
    }
}

/// Uniform downscale applied on top of the width/height cap when the
/// source file is large.
///
/// Thresholds are in megabytes of the *original* file. A file strictly
/// larger than `large_mb` is scaled by `large_scale`; otherwise one strictly
/// larger than `medium_mb` is scaled by `medium_scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DownscalePolicy {
    pub large_mb: f64,
    pub large_scale: f64,
    pub medium_mb: f64,
    pub medium_scale: f64,
    /// When false, the factor only applies if the cap left the image at its
    /// original size.
    pub stack_with_cap: bool,
}

impl Default for DownscalePolicy {
    fn default() -> Self {
        Self {
            large_mb: 5.0,
            large_scale: 0.5,
            medium_mb: 3.0,
            medium_scale: 0.7,
            stack_with_cap: true,
        }
    }
}

/// Quality reduction schedule between encode attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub quality_factor: f32,
    pub min_quality: Quality,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            quality_factor: 0.6,
            min_quality: Quality(0.1),
            max_attempts: 5,
        }
    }
}

/// Options for a single compression call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressOptions {
    pub max_width: u32,
    pub max_height: u32,
    pub quality: Quality,
    pub max_size_mb: f64,
    pub downscale: DownscalePolicy,
    pub retry: RetryPolicy,
}

impl CompressOptions {
    /// Options with the default downscale and retry policies.
    pub fn new(max_width: u32, max_height: u32, quality: f32, max_size_mb: f64) -> Self {
        Self {
            max_width,
            max_height,
            quality: Quality::new(quality),
            max_size_mb,
            downscale: DownscalePolicy::default(),
            retry: RetryPolicy::default(),
        }
    }

    /// Size budget in bytes.
    pub fn max_bytes(&self) -> u64 {
        (self.max_size_mb * crate::types::BYTES_PER_MB as f64).floor() as u64
    }
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self::new(1200, 800, 0.8, 8.0)
    }
}
