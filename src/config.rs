//! Configuration module.
//!
//! Handles loading, validating, and merging `image-batcher.toml`. Stock
//! defaults are the base layer; a user file merges on top of them, and
//! command-line flags override both.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [output]
//! format = "jpeg"     # png | jpeg | webp
//! quality = 0.8       # 0.0 - 1.0, ignored for png
//! # width = 1920      # Fit inside this box, preserving aspect ratio
//! # height = 1080
//!
//! [archive]
//! name = "optimized_images.zip"
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse; override just the values you want:
//!
//! ```toml
//! [output]
//! format = "webp"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{OutputFormat, TranscodeSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the config directory.
pub const CONFIG_FILE: &str = "image-batcher.toml";

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

/// Application configuration loaded from `image-batcher.toml`.
///
/// All fields have defaults; a user file only specifies what it overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Output encoding settings.
    pub output: OutputConfig,
    /// Download packaging settings.
    pub archive: ArchiveConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be between 0 and 1".into(),
            ));
        }
        if self.output.width == Some(0) || self.output.height == Some(0) {
            return Err(ConfigError::Validation(
                "output.width and output.height must be positive".into(),
            ));
        }
        let name = self.archive.name.trim();
        if name.is_empty() || !name.to_ascii_lowercase().ends_with(".zip") || name == ".zip" {
            return Err(ConfigError::Validation(
                "archive.name must be a file name ending in .zip".into(),
            ));
        }
        Ok(())
    }

    /// The transcoder settings this config describes.
    pub fn settings(&self) -> TranscodeSettings {
        TranscodeSettings::new(self.output.format)
            .with_quality(self.output.quality as f32)
            .with_box(self.output.width, self.output.height)
    }

    /// Apply command-line overrides, then re-validate.
    pub fn with_overrides(mut self, overrides: &SettingsOverrides) -> Result<Self, ConfigError> {
        if let Some(format) = overrides.format {
            self.output.format = format;
        }
        if let Some(quality) = overrides.quality {
            self.output.quality = quality;
        }
        if overrides.width.is_some() {
            self.output.width = overrides.width;
        }
        if overrides.height.is_some() {
            self.output.height = overrides.height;
        }
        self.validate()?;
        Ok(self)
    }
}

/// Output encoding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Lossy quality in `[0, 1]`.
    pub quality: f64,
    /// Target box width in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Target box height in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Jpeg,
            quality: 0.8,
            width: None,
            height: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveConfig {
    /// File name of the zip offered when a run produces several outputs.
    pub name: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            name: "optimized_images.zip".to_string(),
        }
    }
}

/// Settings given on the command line. `None` keeps the configured value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsOverrides {
    pub format: Option<OutputFormat>,
    pub quality: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// `AppConfig::default()` as a TOML table, the bottom layer of every load.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(AppConfig::default())?)
}

/// Layer `overlay` onto `base`.
///
/// Sections combine key by key, so a file naming one `[output]` key keeps
/// the stock values for the rest. Any other value in `overlay` wins outright.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    let (mut merged, overlay) = match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => (base, overlay),
        (_, overlay) => return overlay,
    };
    for (key, value) in overlay {
        let value = match merged.remove(&key) {
            Some(existing) => merge_toml(existing, value),
            None => value,
        };
        merged.insert(key, value);
    }
    toml::Value::Table(merged)
}

/// Parse the config file in `dir` without interpreting it.
///
/// A missing file is `Ok(None)`; any other read failure is an error.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let content = match fs::read_to_string(dir.join(CONFIG_FILE)) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(toml::from_str(&content)?))
}

/// Turn a base layer plus an optional file layer into a checked `AppConfig`.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AppConfig, ConfigError> {
    let layered = overlay.into_iter().fold(base, merge_toml);
    let config: AppConfig = layered.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Stock defaults, then `image-batcher.toml` from `dir` if there is one.
pub fn load_config(dir: &Path) -> Result<AppConfig, ConfigError> {
    resolve_config(stock_defaults_value()?, load_raw_config(dir)?)
}

/// Returns a fully-commented stock `image-batcher.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# image-batcher configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Command-line flags (--format, --quality, --width, --height) override
# the values in this file. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output encoding
# ---------------------------------------------------------------------------
[output]
# Target format: "png", "jpeg" or "webp".
# PNG is lossless and ignores quality. WebP files are written with a .png
# extension for viewers that detect formats by extension.
format = "jpeg"

# Lossy encoding quality, 0.0 (smallest) to 1.0 (best).
quality = 0.8

# Fit every image inside this box, preserving aspect ratio.
# Give one side to scale proportionally from it; omit both to keep sizes.
# width = 1920
# height = 1080

# ---------------------------------------------------------------------------
# Download packaging
# ---------------------------------------------------------------------------
[archive]
# Zip file name used when a run produces more than one file.
name = "optimized_images.zip"
"##
}
