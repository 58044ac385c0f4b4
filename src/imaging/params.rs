//! Parameter types for transcoding.
//!
//! These structs describe *what* to produce, not *how*. They sit between the
//! high-level [`operations`](super::operations) module (which decides output
//! dimensions and names) and the [`backend`](super::backend) (which does the
//! pixel work), so a mock backend can stand in during tests.
//!
//! ## Types
//!
//! - [`OutputFormat`]: Target encoding: PNG, JPEG or WebP.
//! - [`Quality`]: Lossy encoding quality in `[0, 1]`. Clamped on construction.
//! - [`TranscodeSettings`]: User-facing settings: format, quality, optional target box.
//! - [`EncodeParams`]: Resolved backend request: exact output dimensions, format, quality.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target encoding for transcoded images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Jpeg,
    Webp,
}

impl OutputFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Webp => "image/webp",
        }
    }

    /// Filename extension for outputs in this format.
    ///
    /// WebP output is deliberately named `.png` ("pseudo-PNG"): the bytes are
    /// WebP, the name is not. Downstream consumers rely on this mismatch.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Webp => "png",
        }
    }

    /// Lossless formats ignore [`Quality`].
    pub fn is_lossless(self) -> bool {
        matches!(self, OutputFormat::Png)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Webp => "webp",
        };
        f.write_str(token)
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "webp" => Ok(OutputFormat::Webp),
            other => Err(format!(
                "unknown format '{other}' (expected png, jpeg or webp)"
            )),
        }
    }
}

/// Lossy encoding quality in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
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

    /// Quality on the 1–100 scale most encoders take.
    pub fn percent(self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(0.8)
    }
}

/// Settings applied to every item of a batch.
///
/// `width`/`height` describe a target box; see
/// [`fit_dimensions`](super::calculations::fit_dimensions) for how a source is
/// fitted into it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TranscodeSettings {
    pub format: OutputFormat,
    pub quality: Quality,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl TranscodeSettings {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            quality: Quality::default(),
            width: None,
            height: None,
        }
    }

    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = Quality::new(quality);
        self
    }

    /// Set the target box. Zero sides are dropped: targets are positive.
    pub fn with_box(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.width = width.filter(|&w| w > 0);
        self.height = height.filter(|&h| h > 0);
        self
    }
}

impl Default for TranscodeSettings {
    fn default() -> Self {
        Self::new(OutputFormat::Jpeg)
    }
}

/// Fully resolved request handed to a backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeParams {
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    pub quality: Quality,
}
