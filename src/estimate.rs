//! Projected output size for the current candidates and settings.
//!
//! Instead of transcoding the whole batch, [`estimate`] transcodes the first
//! candidate and extrapolates its compression ratio across every candidate's
//! original size. The estimator is pure with respect to the queue; callers
//! that trigger it from rapid setting changes coalesce those triggers with a
//! [`Debouncer`] first.

use crate::imaging::{ImageBackend, TranscodeSettings, transcode};
use crate::queue::FileQueue;
use crate::size::format_size;
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Result of an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "bytes")]
pub enum Estimate {
    /// Lossless output; size is not projected.
    Lossless,
    /// Projected total output size.
    Bytes(u64),
    /// The sample could not be transcoded.
    Error,
}

impl fmt::Display for Estimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Estimate::Lossless => f.write_str("Lossless"),
            Estimate::Bytes(bytes) => f.write_str(&format_size(*bytes)),
            Estimate::Error => f.write_str("Error"),
        }
    }
}

/// Project the output size of the current candidates under `settings`.
///
/// Candidates are the selected items when there is a selection, otherwise
/// the pending items. At most one transcode is performed.
pub fn estimate(
    queue: &FileQueue,
    settings: &TranscodeSettings,
    backend: &impl ImageBackend,
) -> Estimate {
    if settings.format.is_lossless() {
        debug!(format = %settings.format, "lossless format, skipping estimate");
        return Estimate::Lossless;
    }

    let candidates = queue.estimate_candidates();
    let Some(sample) = candidates.first() else {
        return Estimate::Bytes(0);
    };
    if sample.size() == 0 {
        return Estimate::Bytes(0);
    }

    let output = match transcode(backend, sample.as_source(), settings) {
        Ok(output) => output,
        Err(e) => {
            warn!(sample = sample.name(), error = %e, "estimate sample failed");
            return Estimate::Error;
        }
    };

    let ratio = output.size() as f64 / sample.size() as f64;
    let total: u64 = candidates.iter().map(|item| item.size()).sum();
    let projected = (ratio * total as f64).round() as u64;
    debug!(
        sample = sample.name(),
        ratio,
        candidates = candidates.len(),
        projected,
        "estimated output size"
    );
    Estimate::Bytes(projected)
}

/// Trailing-edge debouncer.
///
/// Each [`push`](Self::push) replaces the pending value and restarts the
/// delay. [`poll`](Self::poll) releases the latest value only once `delay`
/// has passed without another push.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time left until the pending value is released, if any.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|(_, at)| (*at + self.delay).saturating_duration_since(now))
    }

    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, at)) if now.saturating_duration_since(*at) >= self.delay => {
                self.pending.take().map(|(value, _)| value)
            }
            _ => None,
        }
    }

    /// Release the pending value without waiting.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::OutputFormat;
    use crate::imaging::backend::tests::MockBackend;
    use crate::test_helpers::*;

    fn jpeg() -> TranscodeSettings {
        TranscodeSettings::new(OutputFormat::Jpeg).with_quality(0.8)
    }

    // =========================================================================
    // estimate
    // =========================================================================

    #[test]
    fn png_is_lossless_without_transcoding() {
        let backend = MockBackend::new();
        let queue = queue_of(&[("A.png", 1000)], &backend);

        let result = estimate(&queue, &TranscodeSettings::new(OutputFormat::Png), &backend);

        assert_eq!(result, Estimate::Lossless);
        assert_eq!(backend.transcode_count(), 0);
    }

    #[test]
    fn empty_candidates_report_zero() {
        let backend = MockBackend::new();
        let queue = FileQueue::new();

        let result = estimate(&queue, &jpeg(), &backend);

        assert_eq!(result, Estimate::Bytes(0));
        assert_eq!(result.to_string(), "0 Bytes");
        assert_eq!(backend.transcode_count(), 0);
    }

    #[test]
    fn extrapolates_sample_ratio_across_pending() {
        let backend = MockBackend::with_ratio(0.25);
        let queue = queue_of(&[("A.png", 1000), ("B.png", 3000)], &backend);

        let result = estimate(&queue, &jpeg(), &backend);

        assert_eq!(result, Estimate::Bytes(1000));
        assert_eq!(backend.transcode_count(), 1);
    }

    #[test]
    fn selection_overrides_pending() {
        let backend = MockBackend::with_ratio(0.5);
        let mut queue = queue_of(&[("A.png", 1000), ("B.png", 4000)], &backend);
        let b = id_of(&queue, "B.png");
        queue.toggle_selection(&b).unwrap();

        assert_eq!(estimate(&queue, &jpeg(), &backend), Estimate::Bytes(2000));
    }

    #[test]
    fn selection_includes_done_items() {
        let backend = MockBackend::with_ratio(0.5);
        let mut queue = queue_of(&[("A.png", 1000)], &backend);
        run_all(&mut queue, &backend);
        assert_eq!(estimate(&queue, &jpeg(), &backend), Estimate::Bytes(0));

        queue.select_all().unwrap();
        assert_eq!(estimate(&queue, &jpeg(), &backend), Estimate::Bytes(500));
    }

    #[test]
    fn zero_byte_sample_short_circuits() {
        let backend = MockBackend::new();
        let queue = queue_of(&[("empty.png", 0), ("B.png", 1000)], &backend);

        assert_eq!(estimate(&queue, &jpeg(), &backend), Estimate::Bytes(0));
        assert_eq!(backend.transcode_count(), 0);
    }

    #[test]
    fn failing_sample_reports_error() {
        let backend = MockBackend::new();
        let mut queue = FileQueue::new();
        queue
            .add_files([corrupt_after_identify("broken.png")], &backend)
            .unwrap();

        let result = estimate(&queue, &jpeg(), &backend);
        assert_eq!(result, Estimate::Error);
        assert_eq!(result.to_string(), "Error");
    }

    #[test]
    fn webp_is_estimated() {
        let backend = MockBackend::with_ratio(0.5);
        let queue = queue_of(&[("A.png", 2048)], &backend);

        let result = estimate(&queue, &TranscodeSettings::new(OutputFormat::Webp), &backend);
        assert_eq!(result.to_string(), "1 KB");
    }

    // =========================================================================
    // Debouncer
    // =========================================================================

    #[test]
    fn debouncer_holds_value_until_delay_elapses() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        debouncer.push(1, t0);

        assert_eq!(debouncer.poll(t0 + Duration::from_millis(299)), None);
        assert_eq!(debouncer.poll(t0 + Duration::from_millis(300)), Some(1));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn debouncer_keeps_only_latest_and_restarts_delay() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        debouncer.push(1, t0);
        debouncer.push(2, t0 + Duration::from_millis(200));

        assert_eq!(debouncer.poll(t0 + Duration::from_millis(400)), None);
        assert_eq!(
            debouncer.remaining(t0 + Duration::from_millis(400)),
            Some(Duration::from_millis(100))
        );
        assert_eq!(debouncer.poll(t0 + Duration::from_millis(500)), Some(2));
        assert_eq!(debouncer.poll(t0 + Duration::from_millis(900)), None);
    }

    #[test]
    fn debouncer_flush_releases_immediately() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_secs(10));
        debouncer.push("latest", t0);

        assert_eq!(debouncer.flush(), Some("latest"));
        assert_eq!(debouncer.flush(), None);
    }
}
