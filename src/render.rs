//! View-model projection.
//!
//! Pure functions from [`FileQueue`] state to what a presentation layer
//! shows: list rows, the primary action button and the post-process panel.
//! Nothing here mutates the queue; callers project whenever they choose to.
//!
//! The view-model serializes with serde so a front end can consume it as JSON.

use crate::preview::PreviewKey;
use crate::queue::{AppStatus, FileQueue, ItemStatus, QueuedItem};
use crate::size::format_size;
use crate::source::ItemId;
use serde::Serialize;

/// Everything a presentation layer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub rows: Vec<RowView>,
    pub primary: PrimaryAction,
    pub panel: PostProcessPanel,
    pub status: AppStatus,
    pub progress: f64,
    pub selected_count: usize,
    pub pending_count: usize,
}

/// One list row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowView {
    pub id: ItemId,
    pub preview: PreviewKey,
    pub name: String,
    /// Formatted size and dimensions, e.g. `1.5 KB • 640×480`.
    pub detail: String,
    pub selected: bool,
    pub status: ItemStatus,
    pub affordance: Affordance,
}

/// Status-specific control shown at the end of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Affordance {
    /// Remove button (pending and error rows).
    Remove,
    /// Busy indicator (processing rows).
    Spinner,
    /// Completed marker (done rows). Not actionable.
    Checkmark,
}

impl Affordance {
    pub fn for_status(status: ItemStatus) -> Self {
        match status {
            ItemStatus::Pending | ItemStatus::Error => Affordance::Remove,
            ItemStatus::Processing => Affordance::Spinner,
            ItemStatus::Done => Affordance::Checkmark,
        }
    }

    pub fn is_actionable(self) -> bool {
        self == Affordance::Remove
    }
}

/// The main "optimize" button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrimaryAction {
    pub label: String,
    pub enabled: bool,
}

/// Panel shown under the list after a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostProcessPanel {
    /// Failure message of the last run.
    pub error: Option<String>,
    /// Whether "clear completed" is offered.
    pub clear_completed: bool,
    pub download: Option<DownloadOffer>,
}

/// What the download affordance would deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadOffer {
    /// Archive name for several outputs, the output's own name for one.
    pub file_name: String,
    pub file_count: usize,
    pub is_archive: bool,
}

/// Label used when there is nothing to optimize.
pub const IDLE_LABEL: &str = "Optimize Images";

/// Project the whole queue.
pub fn project(queue: &FileQueue, archive_name: &str) -> ViewModel {
    ViewModel {
        rows: queue
            .items()
            .iter()
            .map(|item| project_row(queue, item))
            .collect(),
        primary: primary_action(queue),
        panel: post_process_panel(queue, archive_name),
        status: queue.status(),
        progress: queue.progress(),
        selected_count: queue.selection().len(),
        pending_count: queue.pending_count(),
    }
}

pub fn project_row(queue: &FileQueue, item: &QueuedItem) -> RowView {
    let dimensions = item.dimensions();
    RowView {
        id: item.id().clone(),
        preview: item.preview(),
        name: item.name().to_string(),
        detail: format!(
            "{} \u{2022} {}\u{00d7}{}",
            format_size(item.size()),
            dimensions.width,
            dimensions.height
        ),
        selected: queue.is_selected(item.id()),
        status: item.status(),
        affordance: Affordance::for_status(item.status()),
    }
}

pub fn primary_action(queue: &FileQueue) -> PrimaryAction {
    let selected = queue.selection().len();
    let pending = queue.pending_count();
    let processing = queue.is_processing();

    let label = if processing {
        "Processing\u{2026}".to_string()
    } else if selected > 0 {
        format!("Optimize {selected} Selected")
    } else if pending > 0 {
        format!("Optimize {pending} Pending")
    } else {
        IDLE_LABEL.to_string()
    };

    PrimaryAction {
        label,
        enabled: (pending > 0 || selected > 0) && !processing,
    }
}

pub fn post_process_panel(queue: &FileQueue, archive_name: &str) -> PostProcessPanel {
    let processing = queue.is_processing();
    let error = match queue.status() {
        AppStatus::Error => queue.message().map(str::to_string),
        _ => None,
    };

    let outputs = queue.outputs();
    let download = match (queue.status(), outputs) {
        (AppStatus::Done, [single]) => Some(DownloadOffer {
            file_name: single.name.clone(),
            file_count: 1,
            is_archive: false,
        }),
        (AppStatus::Done, many) if many.len() > 1 => Some(DownloadOffer {
            file_name: archive_name.to_string(),
            file_count: many.len(),
            is_archive: true,
        }),
        _ => None,
    };

    PostProcessPanel {
        error,
        clear_completed: queue.has_finished_items() && !processing,
        download,
    }
}
