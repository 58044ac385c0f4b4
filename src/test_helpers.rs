//! Shared test utilities for the image-batcher test suite.
//!
//! Provides source builders, queue fixtures, lookup helpers that panic with a
//! useful message on miss, and a one-call "run everything" helper.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let backend = MockBackend::new();
//! let mut queue = queue_of(&[("A.png", 1000), ("B.png", 2000)], &backend);
//!
//! run_all(&mut queue, &backend);
//! assert_eq!(find_item(&queue, "A.png").status(), ItemStatus::Done);
//! ```

use crate::imaging::TranscodeSettings;
use crate::imaging::backend::tests::{CORRUPT_MARKER, MockBackend, UNENCODABLE_MARKER};
use crate::process::{self, RunSummary};
use crate::queue::{FileQueue, ItemStatus, QueuedItem};
use crate::source::{ItemId, SourceFile};

// =========================================================================
// Source builders
// =========================================================================

/// An image-typed source of `size` filler bytes.
pub fn image_source(name: &str, size: usize, last_modified_ms: u64) -> SourceFile {
    SourceFile::new(name, vec![b'x'; size], last_modified_ms).with_media_type("image/png")
}

/// An image-typed source the mock backend refuses to decode.
pub fn corrupt_source(name: &str) -> SourceFile {
    SourceFile::new(name, CORRUPT_MARKER.to_vec(), 0).with_media_type("image/png")
}

/// An image-typed source that identifies but fails to transcode.
pub fn corrupt_after_identify(name: &str) -> SourceFile {
    SourceFile::new(name, UNENCODABLE_MARKER.to_vec(), 0).with_media_type("image/png")
}

// =========================================================================
// Queue fixtures
// =========================================================================

/// A queue holding one pending image per `(name, size)`.
pub fn queue_of(files: &[(&str, usize)], backend: &MockBackend) -> FileQueue {
    let mut queue = FileQueue::new();
    let sources = files
        .iter()
        .map(|(name, size)| image_source(name, *size, 0));
    queue.add_files(sources, backend).unwrap();
    queue
}

/// Process everything eligible with default settings.
pub fn run_all(queue: &mut FileQueue, backend: &MockBackend) -> RunSummary {
    process::process(queue, backend, &TranscodeSettings::default(), None).unwrap()
}

// =========================================================================
// Lookups: panic with a clear message on miss
// =========================================================================

/// Find a queued item by name. Panics if not found.
pub fn find_item<'a>(queue: &'a FileQueue, name: &str) -> &'a QueuedItem {
    queue
        .items()
        .iter()
        .find(|item| item.name() == name)
        .unwrap_or_else(|| panic!("item '{name}' not found. Available: {:?}", names(queue)))
}

/// Id of a queued item by name. Panics if not found.
pub fn id_of(queue: &FileQueue, name: &str) -> ItemId {
    find_item(queue, name).id().clone()
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// All item names in queue order.
pub fn names(queue: &FileQueue) -> Vec<&str> {
    queue.items().iter().map(QueuedItem::name).collect()
}

/// `(name, status)` for every item in queue order.
pub fn statuses(queue: &FileQueue) -> Vec<(&str, ItemStatus)> {
    queue
        .items()
        .iter()
        .map(|item| (item.name(), item.status()))
        .collect()
}
