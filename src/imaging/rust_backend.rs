//! Image backend on top of the `image` crate, with `webp` for lossy WebP.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `ImageReader::with_guessed_format` + `into_dimensions` (header only) |
//! | Decode (JPEG, PNG, WebP, GIF, BMP, TIFF) | `image` crate decoders |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → PNG | `PngEncoder` (quality ignored) |
//! | Encode → JPEG | `JpegEncoder::new_with_quality`, alpha dropped |
//! | Encode → WebP | `webp::Encoder::from_rgba` + `encode_simple`, lossy at quality × 100 |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{EncodeParams, OutputFormat, Quality};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;

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

fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, BackendError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| BackendError::Decode(e.to_string()))
}

/// Decode an in-memory image.
fn decode(bytes: &[u8]) -> Result<DynamicImage, BackendError> {
    reader(bytes)?
        .decode()
        .map_err(|e| BackendError::Decode(e.to_string()))
}

/// Encode into an in-memory buffer.
fn encode(img: &DynamicImage, format: OutputFormat, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let mut buf = Vec::new();

    let result = match format {
        OutputFormat::Png => img.write_with_encoder(PngEncoder::new(&mut buf)),
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality.percent()))
        }
        OutputFormat::Webp => return encode_webp(img, quality),
    };
    result.map_err(|e| BackendError::Encode(format!("{} encode failed: {}", format, e)))?;

    if buf.is_empty() {
        return Err(BackendError::Encode(format!(
            "{} encoder produced no output",
            format
        )));
    }
    Ok(buf)
}

/// Lossy WebP through libwebp.
fn encode_webp(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let rgba = img.to_rgba8();
    let encoded = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
        .encode_simple(false, quality.value() * 100.0)
        .map_err(|e| BackendError::Encode(format!("webp encode failed: {:?}", e)))?;
    if encoded.is_empty() {
        return Err(BackendError::Encode(
            "webp encoder produced no output".to_string(),
        ));
    }
    Ok(encoded.to_vec())
}

impl ImageBackend for RustBackend {
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError> {
        let (width, height) = reader(bytes)?
            .into_dimensions()
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(Dimensions { width, height })
    }

    fn transcode(&self, bytes: &[u8], params: &EncodeParams) -> Result<Vec<u8>, BackendError> {
        let img = decode(bytes)?;
        let resized = if (img.width(), img.height()) == (params.width, params.height) {
            img
        } else {
            img.resize_exact(params.width, params.height, FilterType::Lanczos3)
        };
        encode(&resized, params.format, params.quality)
    }
}
