//! # Photo Squeeze
//!
//! Shrinks listing photos so they fit under an upload size ceiling. Files
//! already small enough pass through untouched; everything else is decoded,
//! resized to fit a width/height cap, and re-encoded as JPEG with a bounded
//! number of quality reductions.
//!
//! # Pipeline
//!
//! ```text
//! inputs   →  scan      →  Vec<ImageFile>      (files and directories → bytes)
//!          →  compress  →  Vec<Result<..>>     (parallel, order-preserving)
//!          →  upload    →  UploadBatch         (ready files + skipped names)
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Dimension and quality math, the backend trait, the `image`-crate backend, single-file compression |
//! | [`compress`] | Batch compression with progress events |
//! | [`upload`] | Upload preparation: skip failures by name, keep going |
//! | [`scan`] | Resolve CLI inputs to an ordered list of image files |
//! | [`config`] | `squeeze.toml` loading, merging, and validation |
//! | [`types`] | `ImageFile` and the report entry shared by every stage |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Skip Before Decode
//!
//! The size check runs on the raw bytes before anything is decoded. A photo
//! that already fits is returned byte-for-byte, so it keeps its format,
//! metadata and quality, and costs nothing to process.
//!
//! ## One Resize, Many Encodes
//!
//! Dimensions are computed once from the source size and the caps. Only the
//! JPEG quality changes between attempts, so the resized surface is reused
//! and each retry is a single encode.
//!
//! ## Best Effort, Never Silent
//!
//! When five attempts cannot reach the budget, the smallest result is
//! returned and flagged `within_budget: false` rather than treated as an
//! error. Decode and encode failures are errors, and they name the file.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, Lanczos3 resampling and JPEG encoding all come from the `image`
//! crate, so the binary has no system library dependencies.

pub mod compress;
pub mod config;
pub mod imaging;
pub mod output;
pub mod scan;
pub mod types;
pub mod upload;
