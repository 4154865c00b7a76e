//! Compression configuration.
//!
//! Handles loading, validating, and merging `squeeze.toml`. Stock defaults
//! are the base layer; a user file overrides only the keys it names, and
//! command-line flags override both.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [compression]
//! max_width = 1200      # Output width cap in pixels
//! max_height = 800      # Output height cap in pixels
//! quality = 0.8         # Initial JPEG quality (0-1)
//! max_size_mb = 8.0     # Size ceiling per file (1 MB = 1024 * 1024 bytes)
//!
//! [downscale]
//! large_mb = 5.0        # Sources larger than this...
//! large_scale = 0.5     # ...are scaled by this
//! medium_mb = 3.0       # Sources larger than this...
//! medium_scale = 0.7    # ...are scaled by this
//! stack_with_cap = true # Apply on top of the width/height cap
//!
//! [retry]
//! quality_factor = 0.6  # Multiply quality by this between attempts
//! min_quality = 0.1     # Never encode below this quality
//! max_attempts = 5      # Encode attempts per file
//!
//! [processing]
//! max_processes = 4     # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{CompressOptions, DownscalePolicy, Quality, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File looked up in the working directory when no `--config` is given.
pub const CONFIG_FILENAME: &str = "squeeze.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `squeeze.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SqueezeConfig {
    /// Size budget and initial encode settings.
    pub compression: CompressionConfig,
    /// Extra downscale for large source files.
    pub downscale: DownscaleConfig,
    /// Quality reduction between attempts.
    pub retry: RetryConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl SqueezeConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.compression;
        if c.max_width == 0 || c.max_height == 0 {
            return Err(ConfigError::Validation(
                "compression.max_width and max_height must be non-zero".into(),
            ));
        }
        if !(c.quality > 0.0 && c.quality <= 1.0) {
            return Err(ConfigError::Validation(
                "compression.quality must be in (0, 1]".into(),
            ));
        }
        if c.max_size_mb.is_nan() || c.max_size_mb <= 0.0 {
            return Err(ConfigError::Validation(
                "compression.max_size_mb must be positive".into(),
            ));
        }

        let d = &self.downscale;
        let scales = [("large_scale", d.large_scale), ("medium_scale", d.medium_scale)];
        for (key, scale) in scales {
            if !(scale > 0.0 && scale <= 1.0) {
                return Err(ConfigError::Validation(format!(
                    "downscale.{key} must be in (0, 1]"
                )));
            }
        }
        if d.medium_mb > d.large_mb {
            return Err(ConfigError::Validation(
                "downscale.medium_mb must not exceed downscale.large_mb".into(),
            ));
        }

        let r = &self.retry;
        if !(r.quality_factor > 0.0 && r.quality_factor < 1.0) {
            return Err(ConfigError::Validation(
                "retry.quality_factor must be in (0, 1)".into(),
            ));
        }
        if !(r.min_quality > 0.0 && r.min_quality <= 1.0) {
            return Err(ConfigError::Validation(
                "retry.min_quality must be in (0, 1]".into(),
            ));
        }
        if r.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Build the options for one compression call.
    pub fn to_options(&self) -> CompressOptions {
        CompressOptions {
            max_width: self.compression.max_width,
            max_height: self.compression.max_height,
            quality: Quality::new(self.compression.quality),
            max_size_mb: self.compression.max_size_mb,
            downscale: DownscalePolicy {
                large_mb: self.downscale.large_mb,
                large_scale: self.downscale.large_scale,
                medium_mb: self.downscale.medium_mb,
                medium_scale: self.downscale.medium_scale,
                stack_with_cap: self.downscale.stack_with_cap,
            },
            retry: RetryPolicy {
                quality_factor: self.retry.quality_factor,
                min_quality: Quality::new(self.retry.min_quality),
                max_attempts: self.retry.max_attempts,
            },
        }
    }
}

/// Size budget and initial encode settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressionConfig {
    /// Output width cap in pixels.
    pub max_width: u32,
    /// Output height cap in pixels.
    pub max_height: u32,
    /// Initial JPEG quality as a 0–1 fraction.
    pub quality: f32,
    /// Size ceiling per file in megabytes.
    pub max_size_mb: f64,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        let options = CompressOptions::default();
        Self {
            max_width: options.max_width,
            max_height: options.max_height,
            quality: options.quality.value(),
            max_size_mb: options.max_size_mb,
        }
    }
}

/// Extra downscale for large source files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DownscaleConfig {
    pub large_mb: f64,
    pub large_scale: f64,
    pub medium_mb: f64,
    pub medium_scale: f64,
    /// When false, the factor only applies to images the cap left alone.
    pub stack_with_cap: bool,
}

impl Default for DownscaleConfig {
    fn default() -> Self {
        let policy = DownscalePolicy::default();
        Self {
            large_mb: policy.large_mb,
            large_scale: policy.large_scale,
            medium_mb: policy.medium_mb,
            medium_scale: policy.medium_scale,
            stack_with_cap: policy.stack_with_cap,
        }
    }
}

/// Quality reduction between attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    pub quality_factor: f32,
    pub min_quality: f32,
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            quality_factor: policy.quality_factor,
            min_quality: policy.min_quality.value(),
            max_attempts: policy.max_attempts,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel compression workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SqueezeConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<SqueezeConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SqueezeConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load configuration.
///
/// With an explicit `path`, the file must exist. Without one, `squeeze.toml`
/// in the working directory is used if present, stock defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<SqueezeConfig, ConfigError> {
    let overlay = match path {
        Some(p) => Some(read_toml(p)?),
        None => {
            let default_path = Path::new(CONFIG_FILENAME);
            if default_path.exists() {
                Some(read_toml(default_path)?)
            } else {
                None
            }
        }
    };
    resolve_config(overlay)
}

fn read_toml(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Returns a fully-commented stock `squeeze.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# photo-squeeze configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Size budget
# ---------------------------------------------------------------------------
[compression]
# Output is scaled to fit inside max_width x max_height, keeping aspect ratio.
max_width = 1200
max_height = 800

# JPEG quality of the first attempt, as a fraction (0 = worst, 1 = best).
quality = 0.8

# Files at or under this size are left untouched (1 MB = 1024 * 1024 bytes).
max_size_mb = 8.0

# ---------------------------------------------------------------------------
# Extra downscale for very large sources
# ---------------------------------------------------------------------------
[downscale]
# Sources over large_mb are scaled by large_scale; otherwise sources over
# medium_mb are scaled by medium_scale.
large_mb = 5.0
large_scale = 0.5
medium_mb = 3.0
medium_scale = 0.7

# true: apply the factor on top of the width/height cap.
# false: only apply it when the cap did not already shrink the image.
stack_with_cap = true

# ---------------------------------------------------------------------------
# Quality reduction
# ---------------------------------------------------------------------------
[retry]
# Quality is multiplied by quality_factor after each attempt over budget.
quality_factor = 0.6

# Quality never drops below this.
min_quality = 0.1

# Encode attempts per file. If none fits, the smallest result is kept.
max_attempts = 5

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel compression workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
