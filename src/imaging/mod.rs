//! Image processing in pure Rust, via the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::load_from_memory` |
//! | **Resize** | `into_rgb8`, then Lanczos3 `imageops::resize` |
//! | **Encode → JPEG** | `JpegEncoder::new_with_quality` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension and quality math (unit testable)
//! - **Parameters**: Data structures describing a compression call
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: [`compress_image`], combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, Surface};
pub use calculations::{
    downscale_factor, fit_within, quality_schedule, scale_dimensions, target_dimensions,
};
pub use operations::{CompressError, Compressed, Outcome, compress_image};
pub use params::{CompressOptions, DownscalePolicy, Quality, RetryPolicy};
pub use rust_backend::{RustBackend, supported_input_extensions};
