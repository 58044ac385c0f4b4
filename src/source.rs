//! Input files and their natural key.
//!
//! A [`SourceFile`] is what the presentation layer hands to the queue: a name,
//! the raw bytes, a modification timestamp and (when known) a media type.
//! The queue identifies items by [`ItemId`], derived from
//! `(name, size, last_modified)` so that re-submitting the same file is a no-op.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Stable identifier of a queued item.
///
/// SHA-256 over the name, byte size and modification time. Two submissions
/// of the same file produce the same id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn derive(name: &str, size: u64, last_modified_ms: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(name.as_bytes());
        hasher.update(b"\0");
        hasher.update(size.to_le_bytes());
        hasher.update(b"\0");
        hasher.update(last_modified_ms.to_le_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 8 hex digits, for log lines.
    pub fn short(&self) -> &str {
        &self.0[..8]
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file submitted for processing.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Arc<[u8]>,
    /// Milliseconds since the Unix epoch.
    pub last_modified_ms: u64,
    /// MIME type as reported by the host, e.g. `image/png`.
    pub media_type: Option<String>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>, last_modified_ms: u64) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            last_modified_ms,
            media_type: None,
        }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Read a file from disk. The media type is inferred from the extension.
    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        let read_err = |source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        };
        let bytes = std::fs::read(path).map_err(read_err)?;
        let metadata = std::fs::metadata(path).map_err(read_err)?;
        // Filesystems without mtime support fall back to 0
        let last_modified_ms = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            media_type: image::ImageFormat::from_path(path)
                .ok()
                .map(|f| f.to_mime_type().to_string()),
            name,
            bytes: bytes.into(),
            last_modified_ms,
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn id(&self) -> ItemId {
        ItemId::derive(&self.name, self.size(), self.last_modified_ms)
    }

    /// Whether this source is image-typed.
    ///
    /// A reported media type decides on its own. Without one, the leading
    /// bytes are sniffed for a known image signature.
    pub fn is_image(&self) -> bool {
        match &self.media_type {
            Some(media_type) => media_type.starts_with("image/"),
            None => image::guess_format(&self.bytes).is_ok(),
        }
    }
}
