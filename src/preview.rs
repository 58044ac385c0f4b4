//! Short-lived preview resources.
//!
//! Each queued item owns exactly one [`PreviewHandle`]. Handles are not
//! `Clone`, and [`PreviewRegistry::revoke`] takes the handle by value, so a
//! preview can be released at most once. The presentation layer refers to a
//! preview through its `Copy` [`PreviewKey`], which stops resolving the moment
//! the handle is revoked.

use crate::source::SourceFile;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Lookup key for a live preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PreviewKey(u64);

impl PreviewKey {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Owning reference to a preview resource.
#[derive(Debug, PartialEq, Eq)]
pub struct PreviewHandle {
    key: PreviewKey,
}

impl PreviewHandle {
    pub fn key(&self) -> PreviewKey {
        self.key
    }
}

/// Registry of live preview resources.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    next: u64,
    live: HashMap<PreviewKey, Arc<[u8]>>,
    revoked: usize,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a preview for `source`. The preview shares the source bytes.
    pub fn create(&mut self, source: &SourceFile) -> PreviewHandle {
        self.next += 1;
        let key = PreviewKey(self.next);
        self.live.insert(key, Arc::clone(&source.bytes));
        PreviewHandle { key }
    }

    /// Release a preview.
    pub fn revoke(&mut self, handle: PreviewHandle) {
        if self.live.remove(&handle.key).is_some() {
            self.revoked += 1;
        } else {
            tracing::warn!(key = handle.key.0, "revoking a preview that is not live");
        }
    }

    /// Bytes behind a live preview, `None` once revoked.
    pub fn resolve(&self, key: PreviewKey) -> Option<&[u8]> {
        self.live.get(&key).map(|bytes| bytes.as_ref())
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Total previews released over the registry's lifetime.
    pub fn revoked_count(&self) -> usize {
        self.revoked
    }
}
