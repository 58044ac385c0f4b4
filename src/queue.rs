//! The pending-file queue.
//!
//! [`FileQueue`] is the single owned state object behind a batch: the ordered
//! items, the selected ids, the aggregate [`AppStatus`], the last run's
//! outputs and progress, and the preview registry. There are no globals;
//! presentation code holds a `FileQueue`, calls the mutation operations, and
//! projects it with [`render::project`](crate::render::project) whenever it
//! chooses to.
//!
//! ## Invariants
//!
//! - Item ids are unique. Re-adding the same `(name, size, modified)` is a no-op.
//! - `selection ⊆ ids in queue` after every operation.
//! - Every preview created by [`FileQueue::add_files`] is revoked exactly once,
//!   when its item leaves the queue (or when the queue is dropped).
//! - While a run is active ([`AppStatus::Processing`]) every mutation is
//!   rejected with [`QueueError::Busy`] and leaves the queue untouched.
//!
//! ## Item status
//!
//! ```text
//! pending ──► processing ──► done
//!                  │   ▲
//!                  ▼   └──── done / error (re-selected for a new run)
//!                error
//! ```

use crate::imaging::{Dimensions, ImageBackend, ProcessedOutput, SourceImage, get_dimensions};
use crate::preview::{PreviewHandle, PreviewKey, PreviewRegistry};
use crate::source::{ItemId, SourceFile};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("the queue cannot be changed while a processing run is in progress")]
    Busy,
}

/// Per-item processing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Pending,
    Processing,
    Done,
    Error,
}

impl ItemStatus {
    /// Whether `self → next` is a legal transition.
    pub fn can_transition_to(self, next: ItemStatus) -> bool {
        use ItemStatus::*;
        matches!(
            (self, next),
            (Pending | Done | Error, Processing) | (Processing, Done | Error)
        )
    }

    /// `done` and `error` end a run; only re-selection or removal moves on.
    pub fn is_terminal(self) -> bool {
        matches!(self, ItemStatus::Done | ItemStatus::Error)
    }
}

/// Aggregate status of the whole queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppStatus {
    #[default]
    Idle,
    Processing,
    Done,
    Error,
}

/// One image in the queue.
///
/// Everything except `status` is fixed at creation.
#[derive(Debug)]
pub struct QueuedItem {
    id: ItemId,
    name: String,
    size: u64,
    dimensions: Dimensions,
    source: Arc<[u8]>,
    preview: PreviewHandle,
    status: ItemStatus,
}

impl QueuedItem {
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn bytes(&self) -> &[u8] {
        &self.source
    }

    pub fn preview(&self) -> PreviewKey {
        self.preview.key()
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    /// View of this item as transcoder input.
    pub fn as_source(&self) -> SourceImage<'_> {
        SourceImage {
            name: &self.name,
            bytes: &self.source,
            dimensions: self.dimensions,
        }
    }

    /// Apply a status transition. Illegal transitions are refused.
    pub(crate) fn set_status(&mut self, next: ItemStatus) -> bool {
        if !self.status.can_transition_to(next) {
            debug_assert!(
                false,
                "illegal status transition {:?} -> {:?} for {}",
                self.status, next, self.name
            );
            warn!(
                item = %self.name,
                from = ?self.status,
                to = ?next,
                "ignoring illegal status transition"
            );
            return false;
        }
        self.status = next;
        true
    }
}

/// What an [`FileQueue::add_files`] call did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddReport {
    pub added: Vec<ItemId>,
    /// Inputs whose id was already queued.
    pub duplicates: usize,
    /// Inputs that are not image-typed.
    pub not_images: usize,
    /// Names of images whose dimensions could not be read.
    pub unreadable: Vec<String>,
}

/// Owned queue state. See the [module docs](self).
#[derive(Debug, Default)]
pub struct FileQueue {
    items: Vec<QueuedItem>,
    selection: BTreeSet<ItemId>,
    status: AppStatus,
    message: Option<String>,
    outputs: Vec<ProcessedOutput>,
    progress: f64,
    previews: PreviewRegistry,
}

impl FileQueue {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Read access
    // =========================================================================

    pub fn items(&self) -> &[QueuedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &ItemId) -> Option<&QueuedItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.get(id).is_some()
    }

    pub fn selection(&self) -> &BTreeSet<ItemId> {
        &self.selection
    }

    pub fn is_selected(&self, id: &ItemId) -> bool {
        self.selection.contains(id)
    }

    pub fn status(&self) -> AppStatus {
        self.status
    }

    /// Error text of the last run, if it had failures.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Outputs of the last completed run.
    pub fn outputs(&self) -> &[ProcessedOutput] {
        &self.outputs
    }

    /// Progress of the current or last run, `0.0..=100.0`.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    pub fn is_processing(&self) -> bool {
        self.status == AppStatus::Processing
    }

    pub fn pending_count(&self) -> usize {
        self.count_status(ItemStatus::Pending)
    }

    pub fn count_status(&self, status: ItemStatus) -> usize {
        self.items.iter().filter(|item| item.status == status).count()
    }

    /// Whether any item ended a run (`done` or `error`).
    pub fn has_finished_items(&self) -> bool {
        self.items.iter().any(|item| item.status.is_terminal())
    }

    /// Selected items in queue order.
    pub fn selected_items(&self) -> impl Iterator<Item = &QueuedItem> {
        self.items
            .iter()
            .filter(|item| self.selection.contains(&item.id))
    }

    /// Items a size estimate is based on: the selection when there is one
    /// (any status), otherwise every pending item.
    pub fn estimate_candidates(&self) -> Vec<&QueuedItem> {
        if self.selection.is_empty() {
            self.items
                .iter()
                .filter(|item| item.status == ItemStatus::Pending)
                .collect()
        } else {
            self.selected_items().collect()
        }
    }

    /// Items a processing run would act on: selected items not already
    /// processing, otherwise every pending item. Queue order.
    pub fn eligible_ids(&self) -> Vec<ItemId> {
        if self.selection.is_empty() {
            self.items
                .iter()
                .filter(|item| item.status == ItemStatus::Pending)
                .map(|item| item.id.clone())
                .collect()
        } else {
            self.selected_items()
                .filter(|item| item.status != ItemStatus::Processing)
                .map(|item| item.id.clone())
                .collect()
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Queue new sources.
    ///
    /// Non-image inputs, already-queued ids and images whose dimensions can't
    /// be read are skipped; none of them fails the batch. Any call resets the
    /// aggregate status to idle and discards the previous run's outputs.
    pub fn add_files<I>(
        &mut self,
        sources: I,
        backend: &impl ImageBackend,
    ) -> Result<AddReport, QueueError>
    where
        I: IntoIterator<Item = SourceFile>,
    {
        self.ensure_mutable()?;
        self.reset_results();

        let mut report = AddReport::default();
        for source in sources {
            if !source.is_image() {
                debug!(name = %source.name, "skipping non-image input");
                report.not_images += 1;
                continue;
            }

            let id = source.id();
            if self.contains(&id) {
                debug!(name = %source.name, id = id.short(), "skipping duplicate input");
                report.duplicates += 1;
                continue;
            }

            let dimensions = match get_dimensions(backend, &source.bytes) {
                Ok(dimensions) => dimensions,
                Err(e) => {
                    warn!(name = %source.name, error = %e, "dropping unreadable image");
                    report.unreadable.push(source.name);
                    continue;
                }
            };

            let preview = self.previews.create(&source);
            let size = source.size();
            self.items.push(QueuedItem {
                id: id.clone(),
                name: source.name,
                size,
                dimensions,
                source: source.bytes,
                preview,
                status: ItemStatus::Pending,
            });
            report.added.push(id);
        }

        Ok(report)
    }

    /// Remove one item. Unknown ids are a no-op (`Ok(false)`).
    pub fn remove(&mut self, id: &ItemId) -> Result<bool, QueueError> {
        self.ensure_mutable()?;

        let Some(pos) = self.items.iter().position(|item| &item.id == id) else {
            return Ok(false);
        };
        let item = self.items.remove(pos);
        self.selection.remove(&item.id);
        self.previews.revoke(item.preview);

        if self.items.is_empty() {
            self.reset_results();
        }
        Ok(true)
    }

    /// Remove every item. Returns how many were removed.
    pub fn clear(&mut self) -> Result<usize, QueueError> {
        self.ensure_mutable()?;

        let removed = self.items.len();
        for item in self.items.drain(..) {
            self.previews.revoke(item.preview);
        }
        self.selection.clear();
        self.reset_results();
        Ok(removed)
    }

    /// Remove `done` and `error` items, keeping the rest.
    ///
    /// Always returns the queue to idle, which also drops the error message
    /// and the previous outputs even when items survive.
    pub fn clear_completed(&mut self) -> Result<usize, QueueError> {
        self.ensure_mutable()?;

        let (finished, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|item| item.status.is_terminal());
        self.items = kept;

        let removed = finished.len();
        for item in finished {
            self.selection.remove(&item.id);
            self.previews.revoke(item.preview);
        }
        self.reset_results();
        Ok(removed)
    }

    /// Flip selection of one item. Returns whether it is now selected;
    /// unknown ids stay unselected.
    pub fn toggle_selection(&mut self, id: &ItemId) -> Result<bool, QueueError> {
        self.ensure_mutable()?;

        if !self.contains(id) {
            return Ok(false);
        }
        if self.selection.remove(id) {
            Ok(false)
        } else {
            self.selection.insert(id.clone());
            Ok(true)
        }
    }

    /// Select every item, whatever its status.
    pub fn select_all(&mut self) -> Result<(), QueueError> {
        self.ensure_mutable()?;
        self.selection = self.items.iter().map(|item| item.id.clone()).collect();
        Ok(())
    }

    pub fn clear_selection(&mut self) -> Result<(), QueueError> {
        self.ensure_mutable()?;
        self.selection.clear();
        Ok(())
    }

    fn ensure_mutable(&self) -> Result<(), QueueError> {
        if self.is_processing() {
            return Err(QueueError::Busy);
        }
        Ok(())
    }

    fn reset_results(&mut self) {
        self.status = AppStatus::Idle;
        self.message = None;
        self.outputs.clear();
        self.progress = 0.0;
    }

    // =========================================================================
    // Run bookkeeping (driven by `process`)
    // =========================================================================

    pub(crate) fn begin_run(&mut self, eligible: &[ItemId]) {
        self.outputs.clear();
        self.message = None;
        self.progress = 0.0;
        self.status = AppStatus::Processing;
        for id in eligible {
            self.set_item_status(id, ItemStatus::Processing);
        }
    }

    pub(crate) fn set_item_status(&mut self, id: &ItemId, status: ItemStatus) -> bool {
        match self.items.iter_mut().find(|item| &item.id == id) {
            Some(item) => item.set_status(status),
            None => false,
        }
    }

    pub(crate) fn set_progress(&mut self, progress: f64) {
        self.progress = progress;
    }

    pub(crate) fn finish_run(&mut self, outputs: Vec<ProcessedOutput>, failures: &[String]) {
        self.outputs = outputs;
        self.selection.clear();
        if failures.is_empty() {
            self.status = AppStatus::Done;
            self.message = None;
        } else {
            self.status = AppStatus::Error;
            self.message = Some(format!("Failed to process: {}", failures.join(", ")));
        }
    }
}
