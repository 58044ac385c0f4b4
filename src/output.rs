//! CLI output formatting.
//!
//! # Item-First Display
//!
//! Every item line leads with its positional index and name; size, status
//! and output details follow as secondary context. The same index appears in
//! the queue listing and in progress lines, so a failure can be traced back
//! to its row at a glance.
//!
//! # Output Format
//!
//! ## Queue
//!
//! ```text
//! Queue (2 files, 1 selected)
//! 001 * A.png
//!     1.5 KB • 640×480 | pending ✕
//! 002   B.png
//!     2 KB • 640×480 | pending ✕
//! Action: Optimize 1 Selected
//! ```
//!
//! ## Process
//!
//! ```text
//! Processing 2 files
//!     001 A.png → A.jpg (1.5 KB → 512 Bytes) [50%]
//!     002 B.png failed: could not decode image: … [100%]
//! ```
//!
//! ## Summary
//!
//! ```text
//! Optimized 2 of 2 files: 3 KB → 1.1 KB (63.3% smaller)
//! Ready: optimized_images.zip (2 files)
//! Completed files can be cleared
//! Saved optimized_images.zip (2 files) → out/optimized_images.zip (1.1 KB)
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::archive::Artifact;
use crate::estimate::Estimate;
use crate::process::{ItemOutcome, ProcessEvent, RunSummary};
use crate::queue::{AddReport, ItemStatus};
use crate::render::{Affordance, PostProcessPanel, ViewModel};
use crate::size::format_size;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn status_label(status: ItemStatus) -> &'static str {
    match status {
        ItemStatus::Pending => "pending",
        ItemStatus::Processing => "processing",
        ItemStatus::Done => "done",
        ItemStatus::Error => "error",
    }
}

fn affordance_glyph(affordance: Affordance) -> &'static str {
    match affordance {
        Affordance::Remove => "\u{2715}",
        Affordance::Spinner => "\u{2026}",
        Affordance::Checkmark => "\u{2713}",
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// One decimal place, dropped when it is zero.
fn format_percent(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}%")
    } else {
        format!("{rounded:.1}%")
    }
}

// ============================================================================
// Queue
// ============================================================================

/// Format the queue listing with the primary action.
pub fn format_view(view: &ViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    let mut header = format!("Queue ({}", plural(view.rows.len(), "file"));
    if view.selected_count > 0 {
        header.push_str(&format!(", {} selected", view.selected_count));
    }
    header.push(')');
    lines.push(header);

    for (i, row) in view.rows.iter().enumerate() {
        let marker = if row.selected { "*" } else { " " };
        lines.push(format!("{} {} {}", format_index(i + 1), marker, row.name));
        lines.push(format!(
            "{}{} | {} {}",
            indent(1),
            row.detail,
            status_label(row.status),
            affordance_glyph(row.affordance)
        ));
    }

    let action = if view.primary.enabled {
        format!("Action: {}", view.primary.label)
    } else {
        format!("Action: {} (disabled)", view.primary.label)
    };
    lines.push(action);
    lines
}

pub fn print_view(view: &ViewModel) {
    for line in format_view(view) {
        println!("{}", line);
    }
}

/// Format what an add did, skipping the counters that are zero.
pub fn format_add_report(report: &AddReport) -> Vec<String> {
    let mut lines = vec![format!("Added {}", plural(report.added.len(), "file"))];
    if report.duplicates > 0 {
        lines.push(format!(
            "{}Skipped {} already queued",
            indent(1),
            plural(report.duplicates, "file")
        ));
    }
    if report.not_images > 0 {
        lines.push(format!(
            "{}Skipped {}",
            indent(1),
            plural(report.not_images, "non-image file")
        ));
    }
    for name in &report.unreadable {
        lines.push(format!("{}Skipped unreadable image: {}", indent(1), name));
    }
    lines
}

pub fn print_add_report(report: &AddReport) {
    for line in format_add_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Process
// ============================================================================

/// Format a single progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::RunStarted { total } => {
            vec![format!("Processing {}", plural(*total, "file"))]
        }
        ProcessEvent::ItemProcessed {
            index,
            name,
            outcome,
            progress,
            ..
        } => {
            let detail = match outcome {
                ItemOutcome::Done {
                    output_name,
                    original_bytes,
                    output_bytes,
                } => format!(
                    "\u{2192} {} ({} \u{2192} {})",
                    output_name,
                    format_size(*original_bytes),
                    format_size(*output_bytes)
                ),
                ItemOutcome::Failed { error } => format!("failed: {}", error),
            };
            vec![format!(
                "{}{} {} {} [{}]",
                indent(1),
                format_index(*index),
                name,
                detail,
                format_percent(*progress)
            )]
        }
    }
}

/// Format a finished run's totals.
pub fn format_summary(summary: &RunSummary) -> Vec<String> {
    let mut line = format!(
        "Optimized {} of {}",
        summary.succeeded,
        plural(summary.total, "file")
    );
    if summary.succeeded > 0 {
        let savings = summary.savings_percent();
        let direction = if savings >= 0.0 { "smaller" } else { "larger" };
        line.push_str(&format!(
            ": {} \u{2192} {} ({} {})",
            format_size(summary.original_bytes),
            format_size(summary.output_bytes),
            format_percent(savings.abs()),
            direction
        ));
    }
    vec![line]
}

pub fn print_summary(summary: &RunSummary) {
    for line in format_summary(summary) {
        println!("{}", line);
    }
}

/// Format the post-process panel.
pub fn format_panel(panel: &PostProcessPanel) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(error) = &panel.error {
        lines.push(error.clone());
    }
    if let Some(download) = &panel.download {
        lines.push(format!(
            "Ready: {} ({})",
            download.file_name,
            plural(download.file_count, "file")
        ));
    }
    if panel.clear_completed {
        lines.push("Completed files can be cleared".to_string());
    }
    lines
}

pub fn print_panel(panel: &PostProcessPanel) {
    for line in format_panel(panel) {
        println!("{}", line);
    }
}

// ============================================================================
// Estimate and artifacts
// ============================================================================

pub fn format_estimate(estimate: &Estimate, candidates: usize) -> Vec<String> {
    vec![format!(
        "Estimated output for {}: {}",
        plural(candidates, "file"),
        estimate
    )]
}

pub fn print_estimate(estimate: &Estimate, candidates: usize) {
    for line in format_estimate(estimate, candidates) {
        println!("{}", line);
    }
}

pub fn format_artifact(artifact: &Artifact, path: &Path) -> Vec<String> {
    let what = match artifact {
        Artifact::Single { name, .. } => name.clone(),
        Artifact::Archive { name, entries, .. } => {
            format!("{} ({})", name, plural(entries.len(), "file"))
        }
    };
    vec![format!(
        "Saved {} \u{2192} {} ({})",
        what,
        path.display(),
        format_size(artifact.bytes().len() as u64)
    )]
}

pub fn print_artifact(artifact: &Artifact, path: &Path) {
    for line in format_artifact(artifact, path) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::MockBackend;
    use crate::queue::AppStatus;
    use crate::render::{DownloadOffer, project};
    use crate::source::ItemId;
    use crate::test_helpers::*;

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "file"), "1 file");
        assert_eq!(plural(0, "file"), "0 files");
        assert_eq!(plural(3, "file"), "3 files");
    }

    #[test]
    fn percent_trims_whole_numbers() {
        assert_eq!(format_percent(50.0), "50%");
        assert_eq!(format_percent(100.0), "100%");
        assert_eq!(format_percent(33.333), "33.3%");
    }

    // =========================================================================
    // Queue view
    // =========================================================================

    #[test]
    fn view_lists_rows_and_action() {
        let backend = MockBackend::with_dimensions(640, 480);
        let mut queue = queue_of(&[("A.png", 1536), ("B.png", 2048)], &backend);
        let a = id_of(&queue, "A.png");
        queue.toggle_selection(&a).unwrap();

        let lines = format_view(&project(&queue, "x.zip"));

        assert_eq!(
            lines,
            vec![
                "Queue (2 files, 1 selected)",
                "001 * A.png",
                "    1.5 KB \u{2022} 640\u{00d7}480 | pending \u{2715}",
                "002   B.png",
                "    2 KB \u{2022} 640\u{00d7}480 | pending \u{2715}",
                "Action: Optimize 1 Selected",
            ]
        );
    }

    #[test]
    fn empty_view_shows_disabled_action() {
        let queue = crate::queue::FileQueue::new();
        let lines = format_view(&project(&queue, "x.zip"));
        assert_eq!(
            lines,
            vec!["Queue (0 files)", "Action: Optimize Images (disabled)"]
        );
    }

    #[test]
    fn add_report_lists_skips() {
        let report = AddReport {
            added: vec![ItemId::derive("a", 1, 1)],
            duplicates: 2,
            not_images: 1,
            unreadable: vec!["bad.png".to_string()],
        };
        assert_eq!(
            format_add_report(&report),
            vec![
                "Added 1 file",
                "    Skipped 2 files already queued",
                "    Skipped 1 non-image file",
                "    Skipped unreadable image: bad.png",
            ]
        );
    }

    // =========================================================================
    // Process events
    // =========================================================================

    #[test]
    fn run_started_line() {
        let lines = format_process_event(&ProcessEvent::RunStarted { total: 2 });
        assert_eq!(lines, vec!["Processing 2 files"]);
    }

    #[test]
    fn processed_item_line() {
        let event = ProcessEvent::ItemProcessed {
            index: 1,
            total: 2,
            name: "A.png".to_string(),
            outcome: ItemOutcome::Done {
                output_name: "A.jpg".to_string(),
                original_bytes: 1536,
                output_bytes: 512,
            },
            progress: 50.0,
        };
        assert_eq!(
            format_process_event(&event),
            vec!["    001 A.png \u{2192} A.jpg (1.5 KB \u{2192} 512 Bytes) [50%]"]
        );
    }

    #[test]
    fn failed_item_line() {
        let event = ProcessEvent::ItemProcessed {
            index: 2,
            total: 2,
            name: "B.png".to_string(),
            outcome: ItemOutcome::Failed {
                error: "could not decode image: bad".to_string(),
            },
            progress: 100.0,
        };
        assert_eq!(
            format_process_event(&event),
            vec!["    002 B.png failed: could not decode image: bad [100%]"]
        );
    }

    // =========================================================================
    // Summary and panel
    // =========================================================================

    #[test]
    fn summary_reports_savings() {
        let summary = RunSummary {
            total: 2,
            succeeded: 1,
            failed: vec!["B.png".to_string()],
            original_bytes: 1536,
            output_bytes: 512,
            status: AppStatus::Error,
        };
        assert_eq!(
            format_summary(&summary),
            vec!["Optimized 1 of 2 files: 1.5 KB \u{2192} 512 Bytes (66.7% smaller)"]
        );
    }

    #[test]
    fn summary_without_successes_has_no_sizes() {
        let summary = RunSummary {
            total: 1,
            succeeded: 0,
            failed: vec!["A.png".to_string()],
            original_bytes: 0,
            output_bytes: 0,
            status: AppStatus::Error,
        };
        assert_eq!(format_summary(&summary), vec!["Optimized 0 of 1 file"]);
    }

    #[test]
    fn summary_reports_growth() {
        let summary = RunSummary {
            total: 1,
            succeeded: 1,
            failed: vec![],
            original_bytes: 100,
            output_bytes: 150,
            status: AppStatus::Done,
        };
        assert_eq!(
            format_summary(&summary),
            vec!["Optimized 1 of 1 file: 100 Bytes \u{2192} 150 Bytes (50% larger)"]
        );
    }

    #[test]
    fn panel_lines() {
        let panel = PostProcessPanel {
            error: None,
            clear_completed: true,
            download: Some(DownloadOffer {
                file_name: "optimized_images.zip".to_string(),
                file_count: 3,
                is_archive: true,
            }),
        };
        assert_eq!(
            format_panel(&panel),
            vec![
                "Ready: optimized_images.zip (3 files)",
                "Completed files can be cleared",
            ]
        );
    }

    #[test]
    fn estimate_line() {
        assert_eq!(
            format_estimate(&Estimate::Bytes(1536), 2),
            vec!["Estimated output for 2 files: 1.5 KB"]
        );
        assert_eq!(
            format_estimate(&Estimate::Lossless, 1),
            vec!["Estimated output for 1 file: Lossless"]
        );
    }

    #[test]
    fn artifact_line() {
        let artifact = Artifact::Archive {
            name: "out.zip".to_string(),
            bytes: vec![0; 2048],
            entries: vec!["a.jpg".to_string(), "b.jpg".to_string()],
        };
        assert_eq!(
            format_artifact(&artifact, Path::new("dist/out.zip")),
            vec!["Saved out.zip (2 files) \u{2192} dist/out.zip (2 KB)"]
        );
    }
}
