//! High-level transcoding.
//!
//! Combines the pure calculations with backend execution: work out the
//! output box and filename, then hand the pixels to the backend.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{fit_dimensions, output_filename};
use super::params::{EncodeParams, TranscodeSettings};
use serde::Serialize;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// A source image as the transcoder sees it.
#[derive(Debug, Clone, Copy)]
pub struct SourceImage<'a> {
    pub name: &'a str,
    pub bytes: &'a [u8],
    pub dimensions: Dimensions,
}

/// A transcoded file, ready to be written or archived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedOutput {
    pub name: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl ProcessedOutput {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Plan the backend request without executing it.
pub fn plan_encode(dimensions: Dimensions, settings: &TranscodeSettings) -> EncodeParams {
    let (width, height) = fit_dimensions(dimensions.as_tuple(), settings.width, settings.height);
    EncodeParams {
        width,
        height,
        format: settings.format,
        quality: settings.quality,
    }
}

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, bytes: &[u8]) -> Result<Dimensions> {
    backend.identify(bytes)
}

/// Resize and re-encode one source according to `settings`.
pub fn transcode(
    backend: &impl ImageBackend,
    source: SourceImage<'_>,
    settings: &TranscodeSettings,
) -> Result<ProcessedOutput> {
    let params = plan_encode(source.dimensions, settings);
    let bytes = backend.transcode(source.bytes, &params)?;
    Ok(ProcessedOutput {
        name: output_filename(source.name, settings.format),
        bytes,
    })
}
