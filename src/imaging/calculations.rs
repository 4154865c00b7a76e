//! Pure calculation functions for dimensions and quality schedules.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::{DownscalePolicy, Quality, RetryPolicy};
use crate::types::BYTES_PER_MB;

/// Fit `source` inside `max` while preserving aspect ratio.
///
/// Never upscales. Each side is rounded to the nearest pixel and kept at
/// least 1px, so the result is within ±1px of the exact ratio.
///
/// # Examples
/// ```
/// # use photo_squeeze::imaging::fit_within;
/// // 4000x3000 into 1200x800: height is the binding edge
/// assert_eq!(fit_within((4000, 3000), (1200, 800)), (1067, 800));
///
/// // Already small enough: unchanged
/// assert_eq!(fit_within((640, 480), (1200, 800)), (640, 480));
/// ```
pub fn fit_within(source: (u32, u32), max: (u32, u32)) -> (u32, u32) {
    scale_dimensions(source, cap_ratio(source, max))
}

/// Ratio that brings `source` inside `max`; `1.0` when it already fits.
fn cap_ratio(source: (u32, u32), max: (u32, u32)) -> f64 {
    let (src_w, src_h) = source;
    let (max_w, max_h) = max;

    if src_w <= max_w && src_h <= max_h {
        return 1.0;
    }
    (max_w as f64 / src_w as f64).min(max_h as f64 / src_h as f64)
}

/// Multiply both sides by `factor`, rounding and keeping at least 1px.
pub fn scale_dimensions(dims: (u32, u32), factor: f64) -> (u32, u32) {
    let (w, h) = dims;
    let scaled_w = ((w as f64 * factor).round() as u32).clamp(1, w.max(1));
    let scaled_h = ((h as f64 * factor).round() as u32).clamp(1, h.max(1));
    (scaled_w, scaled_h)
}

/// Extra downscale factor for a source file of `size_bytes`.
pub fn downscale_factor(size_bytes: u64, policy: &DownscalePolicy) -> f64 {
    let size_mb = size_bytes as f64 / BYTES_PER_MB as f64;
    if size_mb > policy.large_mb {
        policy.large_scale
    } else if size_mb > policy.medium_mb {
        policy.medium_scale
    } else {
        1.0
    }
}

/// Final encode dimensions: cap to `max`, then apply the size-based factor.
pub fn target_dimensions(
    source: (u32, u32),
    max: (u32, u32),
    size_bytes: u64,
    policy: &DownscalePolicy,
) -> (u32, u32) {
    let ratio = cap_ratio(source, max);
    let factor = downscale_factor(size_bytes, policy);

    // Scale from the source in one step so rounding happens once.
    if !policy.stack_with_cap && ratio < 1.0 {
        return fit_within(source, max);
    }
    scale_dimensions(source, ratio * factor)
}

/// Qualities to try, in order.
///
/// Starts at `initial` (raised to the floor if below it) and multiplies by
/// the retry factor each step. Stops early once the floor is reached, since
/// re-encoding at the same quality yields the same bytes.
pub fn quality_schedule(initial: Quality, retry: &RetryPolicy) -> Vec<Quality> {
    let mut schedule = Vec::with_capacity(retry.max_attempts as usize);
    let mut quality = if initial < retry.min_quality {
        retry.min_quality
    } else {
        initial
    };

    for _ in 0..retry.max_attempts {
        if schedule.last() == Some(&quality) {
            break;
        }
        schedule.push(quality);
        quality = quality.reduced(retry.quality_factor, retry.min_quality);
    }

    schedule
}
