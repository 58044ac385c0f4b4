//! Image backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the boundary to the host's decode and encode
//! primitives. It has two operations: identify (read dimensions) and
//! transcode (decode, resize to exact dimensions, re-encode).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the recording [`MockBackend`](tests::MockBackend).

use super::params::EncodeParams;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("could not decode image: {0}")]
    Decode(String),
    #[error("could not encode image: {0}")]
    Encode(String),
}

/// Pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Trait for image backends.
///
/// Both operations take the raw source bytes; a backend must never assume a
/// file on disk.
pub trait ImageBackend {
    /// Read image dimensions. Fails with [`BackendError::Decode`] on bytes
    /// that are not an image.
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError>;

    /// Decode `bytes`, resize to exactly `params.width` x `params.height`,
    /// and encode in `params.format`.
    fn transcode(&self, bytes: &[u8], params: &EncodeParams) -> Result<Vec<u8>, BackendError>;
}
