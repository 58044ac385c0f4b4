//! Processing runs.
//!
//! A run transcodes the queue's eligible items strictly one at a time:
//!
//! ```text
//! start ──► step ──► step ──► … ──► finish
//!   │                                  │
//!   ├ eligible items → processing      ├ outputs stored on the queue
//!   └ AppStatus → processing           ├ selection cleared
//!                                      └ AppStatus → done | error
//! ```
//!
//! The eligible set is the selection (minus anything already processing)
//! when there is one, otherwise every pending item. A failing item is marked
//! `error` and the run moves on; failures never abort the batch.
//!
//! While a [`Run`] is active the queue reports [`AppStatus::Processing`] and
//! rejects every mutation with [`QueueError::Busy`](crate::queue::QueueError::Busy).
//! A run that is dropped unfinished marks its remaining items `error` and
//! leaves the queue in the same settled state as a failed run.
//!
//! ## Progress
//!
//! After each item, progress is `completed / total * 100`. It never decreases
//! and is exactly `100.0` once the last item is done. Progress is also
//! reported as [`ProcessEvent`]s over an optional channel so a caller can
//! print it from another thread.

use crate::imaging::{ImageBackend, ProcessedOutput, TranscodeSettings, transcode};
use crate::queue::{AppStatus, FileQueue, ItemStatus};
use crate::size::savings_percent;
use crate::source::ItemId;
use serde::Serialize;
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    #[error("No files to process")]
    NothingToProcess,
    #[error("a processing run is already in progress")]
    AlreadyRunning,
}

/// How one item ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum ItemOutcome {
    Done {
        output_name: String,
        original_bytes: u64,
        output_bytes: u64,
    },
    Failed {
        error: String,
    },
}

/// Progress events sent during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ProcessEvent {
    RunStarted {
        total: usize,
    },
    /// One item finished. `index` is 1-based.
    ItemProcessed {
        index: usize,
        total: usize,
        name: String,
        outcome: ItemOutcome,
        progress: f64,
    },
}

/// Aggregate result of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    /// Names of failed items, in processing order.
    pub failed: Vec<String>,
    /// Original size of the items that succeeded.
    pub original_bytes: u64,
    pub output_bytes: u64,
    pub status: AppStatus,
}

impl RunSummary {
    pub fn savings_percent(&self) -> f64 {
        savings_percent(self.original_bytes, self.output_bytes)
    }
}

/// An active processing run.
///
/// The run holds the queue's only mutable borrow until it is finished or
/// dropped, so nothing else can touch the queue mid-run. Read it through
/// [`queue`](Self::queue).
///
/// Dropping a run before [`finish`](Self::finish) abandons it: items not yet
/// transcoded are marked `error` and the queue settles as it would after a
/// failed run.
#[derive(Debug)]
#[must_use = "dropping a run before `finish` abandons its remaining items"]
pub struct Run<'q> {
    queue: &'q mut FileQueue,
    eligible: Vec<ItemId>,
    completed: usize,
    settings: TranscodeSettings,
    outputs: Vec<ProcessedOutput>,
    failures: Vec<String>,
    original_bytes: u64,
    output_bytes: u64,
    events: Option<Sender<ProcessEvent>>,
    settled: bool,
}

/// Start a run over the queue's eligible items.
///
/// Fails without touching the queue when nothing is eligible or another run
/// is active.
pub fn start<'q>(
    queue: &'q mut FileQueue,
    settings: &TranscodeSettings,
    events: Option<Sender<ProcessEvent>>,
) -> Result<Run<'q>, ProcessError> {
    if queue.is_processing() {
        return Err(ProcessError::AlreadyRunning);
    }
    let eligible = queue.eligible_ids();
    if eligible.is_empty() {
        return Err(ProcessError::NothingToProcess);
    }

    info!(
        items = eligible.len(),
        format = %settings.format,
        quality = settings.quality.percent(),
        "starting run"
    );
    queue.begin_run(&eligible);

    let run = Run {
        queue,
        eligible,
        completed: 0,
        settings: *settings,
        outputs: Vec::new(),
        failures: Vec::new(),
        original_bytes: 0,
        output_bytes: 0,
        events,
        settled: false,
    };
    run.emit(ProcessEvent::RunStarted { total: run.total() });
    Ok(run)
}

/// Run every eligible item to completion.
pub fn process(
    queue: &mut FileQueue,
    backend: &impl ImageBackend,
    settings: &TranscodeSettings,
    events: Option<Sender<ProcessEvent>>,
) -> Result<RunSummary, ProcessError> {
    let run = start(queue, settings, events)?;
    Ok(run.finish(backend))
}

impl Run<'_> {
    pub fn total(&self) -> usize {
        self.eligible.len()
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn is_complete(&self) -> bool {
        self.completed == self.eligible.len()
    }

    /// The queue as it stands mid-run.
    pub fn queue(&self) -> &FileQueue {
        self.queue
    }

    /// Transcode the next item. Returns `None` once every item is done.
    pub fn step(&mut self, backend: &impl ImageBackend) -> Option<ItemOutcome> {
        let id = self.eligible.get(self.completed)?.clone();
        self.completed += 1;

        let (name, outcome) = match self.queue.get(&id) {
            Some(item) => {
                let name = item.name().to_string();
                let outcome = match transcode(backend, item.as_source(), &self.settings) {
                    Ok(output) => {
                        let outcome = ItemOutcome::Done {
                            output_name: output.name.clone(),
                            original_bytes: item.size(),
                            output_bytes: output.size(),
                        };
                        self.original_bytes += item.size();
                        self.output_bytes += output.size();
                        self.outputs.push(output);
                        outcome
                    }
                    Err(e) => {
                        warn!(item = %name, error = %e, "failed to process image");
                        ItemOutcome::Failed {
                            error: e.to_string(),
                        }
                    }
                };
                (name, outcome)
            }
            None => {
                warn!(id = id.short(), "eligible item left the queue mid-run");
                (
                    id.short().to_string(),
                    ItemOutcome::Failed {
                        error: "item is no longer queued".to_string(),
                    },
                )
            }
        };

        let status = match outcome {
            ItemOutcome::Done { .. } => ItemStatus::Done,
            ItemOutcome::Failed { .. } => {
                self.failures.push(name.clone());
                ItemStatus::Error
            }
        };
        self.queue.set_item_status(&id, status);

        let progress = (self.completed as f64 / self.total() as f64) * 100.0;
        self.queue.set_progress(progress);

        self.emit(ProcessEvent::ItemProcessed {
            index: self.completed,
            total: self.total(),
            name,
            outcome: outcome.clone(),
            progress,
        });
        Some(outcome)
    }

    /// Process whatever is left, then settle the queue's aggregate state.
    pub fn finish(mut self, backend: &impl ImageBackend) -> RunSummary {
        while self.step(backend).is_some() {}

        self.queue.set_progress(100.0);
        self.settle();

        let summary = RunSummary {
            total: self.eligible.len(),
            succeeded: self.eligible.len() - self.failures.len(),
            failed: std::mem::take(&mut self.failures),
            original_bytes: self.original_bytes,
            output_bytes: self.output_bytes,
            status: self.queue.status(),
        };
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed.len(),
            output_bytes = summary.output_bytes,
            "run finished"
        );
        summary
    }

    /// Hand outputs and failures to the queue. Runs once per run.
    fn settle(&mut self) {
        if self.settled {
            return;
        }
        self.settled = true;
        self.queue
            .finish_run(std::mem::take(&mut self.outputs), &self.failures);
    }

    fn emit(&self, event: ProcessEvent) {
        if let Some(tx) = &self.events {
            // A dropped receiver only means nobody is watching
            tx.send(event).ok();
        }
    }
}

impl Drop for Run<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let remaining = self.eligible.split_off(self.completed);
        warn!(
            remaining = remaining.len(),
            "run dropped before finishing, abandoning remaining items"
        );
        for id in &remaining {
            let name = match self.queue.get(id) {
                Some(item) => item.name().to_string(),
                None => continue,
            };
            self.queue.set_item_status(id, ItemStatus::Error);
            self.failures.push(name);
        }
        self.settle();
    }
}
