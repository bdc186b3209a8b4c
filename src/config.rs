//! Configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! serialized to a TOML table and the user's file is merged on top, so a
//! config only needs the keys it wants to change.
//!
//! ## Config File Location
//!
//! ```text
//! artwork/
//! ├── config.toml              # Picked up automatically when --source is this directory
//! ├── Instagram.png
//! └── ...
//! ```
//!
//! Or pass `--config path/to/file.toml` explicitly.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [icons]
//! size = 512               # Output edge in pixels (180, 512 and 1024 are the usual sizes)
//! sharpen = 0.3            # Sharpening amount; 0 disables the pass, max 1.0
//! radius_ratio = 0.2237    # Corner radius as a fraction of the edge
//! curvature = 1.28         # Bezier control-point stretch for continuous corners
//! mask_samples = 4         # Sub-samples per axis when rendering the corner mask
//! resample = "lanczos3"    # nearest | triangle | catmull_rom | gaussian | lanczos3
//!
//! [processing]
//! max_processes = 1        # Parallel workers; 0 = one per CPU core
//!
//! [package]
//! theme = "custom"         # Label for manifest.json and the archive name
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{IconParams, IconSize, MaskGeometry, Resample, Sharpening};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IconForgeConfig {
    /// Icon pipeline settings.
    pub icons: IconsConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
    /// Archive packaging settings.
    pub package: PackageConfig,
}

impl IconForgeConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let icons = &self.icons;
        if icons.size == 0 {
            return Err(ConfigError::Validation(
                "icons.size must be a positive number of pixels".into(),
            ));
        }
        if !(0.0..=1.0).contains(&icons.sharpen) {
            return Err(ConfigError::Validation(
                "icons.sharpen must be within 0.0-1.0".into(),
            ));
        }
        if !(icons.radius_ratio > 0.0 && icons.radius_ratio <= 0.5) {
            return Err(ConfigError::Validation(
                "icons.radius_ratio must be within (0, 0.5]".into(),
            ));
        }
        if !(icons.curvature > 0.0 && icons.curvature <= 2.0) {
            return Err(ConfigError::Validation(
                "icons.curvature must be within (0, 2]".into(),
            ));
        }
        if !(1..=16).contains(&icons.mask_samples) {
            return Err(ConfigError::Validation(
                "icons.mask_samples must be 1-16".into(),
            ));
        }
        if self.package.theme.trim().is_empty() {
            return Err(ConfigError::Validation(
                "package.theme must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Icon pipeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IconsConfig {
    pub size: u32,
    /// `0.0` turns sharpening off.
    pub sharpen: f32,
    pub radius_ratio: f64,
    pub curvature: f64,
    pub mask_samples: u32,
    pub resample: Resample,
}

impl Default for IconsConfig {
    fn default() -> Self {
        Self {
            size: IconSize::MEDIUM.pixels(),
            sharpen: Sharpening::icon().amount,
            radius_ratio: MaskGeometry::IOS_RADIUS_RATIO,
            curvature: MaskGeometry::IOS_CURVATURE,
            mask_samples: 4,
            resample: Resample::default(),
        }
    }
}

impl IconsConfig {
    /// Build pipeline parameters from these settings.
    pub fn params(&self) -> Result<IconParams, ConfigError> {
        let size = IconSize::new(self.size).map_err(|e| ConfigError::Validation(e.to_string()))?;
        let sharpening = if self.sharpen == 0.0 {
            None
        } else {
            Some(
                Sharpening::new(self.sharpen)
                    .map_err(|e| ConfigError::Validation(e.to_string()))?,
            )
        };
        Ok(IconParams {
            size,
            sharpening,
            geometry: MaskGeometry {
                radius_ratio: self.radius_ratio,
                curvature: self.curvature,
            },
            mask_samples: self.mask_samples,
            resample: self.resample,
        })
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel icon workers.
    /// `0` means one per CPU core. Values above the core count are clamped down.
    pub max_processes: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self { max_processes: 1 }
    }
}

/// Resolve the effective thread count from config.
///
/// - `0` → use all available cores
/// - `n` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    match config.max_processes {
        0 => cores,
        n => n.min(cores),
    }
}

/// Archive packaging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackageConfig {
    pub theme: String,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            theme: "custom".to_string(),
        }
    }
}

/// Stock defaults as a TOML table, the base every user config is merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(IconForgeConfig::default())?)
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

/// Read a TOML file as a raw value. `Ok(None)` when the file does not exist.
pub fn load_raw_config(file: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !file.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(file)?;
    Ok(Some(toml::from_str(&content)?))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<IconForgeConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: IconForgeConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `config.toml` from the given directory, or stock defaults if absent.
pub fn load_config(dir: &Path) -> Result<IconForgeConfig, ConfigError> {
    load_config_file(&dir.join("config.toml"))
}

/// Load an explicit config file. A missing file yields stock defaults.
pub fn load_config_file(file: &Path) -> Result<IconForgeConfig, ConfigError> {
    resolve_config(stock_defaults_value()?, load_raw_config(file)?)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# iconforge configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file as config.toml next to your source images, or pass it
# with --config. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Icon pipeline
# ---------------------------------------------------------------------------
[icons]
# Output edge length in pixels. 180 (home screen), 512 and 1024 (store
# artwork) are the usual choices; any positive size works.
size = 512

# Local-contrast sharpening applied after masking. 0 disables it.
# Range: 0.0-1.0.
sharpen = 0.3

# Corner radius as a fraction of the icon edge. Range: (0, 0.5].
radius_ratio = 0.2237

# Stretch applied to the bezier control points of each corner. Values above
# 1 ease the corner into the straight edges (continuous curvature) instead
# of meeting them as a circular arc. Range: (0, 2].
curvature = 1.28

# Sub-samples per axis used to anti-alias the corner mask. 1 gives a hard
# edge. Range: 1-16.
mask_samples = 4

# Filter used to scale the square crop to the icon size.
# One of: nearest, triangle, catmull_rom, gaussian, lanczos3.
resample = "lanczos3"

# ---------------------------------------------------------------------------
# Parallel processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel icon workers. 0 uses one per CPU core; larger values are
# clamped to the core count.
max_processes = 1

# ---------------------------------------------------------------------------
# Packaging
# ---------------------------------------------------------------------------
[package]
# Theme label written to manifest.json and used in the archive file name.
theme = "custom"
"##
}
