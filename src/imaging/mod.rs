//! Image transcoding.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **Resize** | Lanczos3, fitted into the target box |
//! | **Encode** | PNG / JPEG encoders from the `image` crate, lossy WebP from `webp` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for box fitting and output naming (unit testable)
//! - **Parameters**: Output format, quality, and the resolved backend request
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: [`transcode`], combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{fit_dimensions, output_filename};
pub use operations::{ProcessedOutput, SourceImage, get_dimensions, plan_encode, transcode};
pub use params::{EncodeParams, OutputFormat, Quality, TranscodeSettings};
pub use rust_backend::RustBackend;
