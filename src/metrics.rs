//! Backend-agnostic metrics collection via a pluggable sink.
//!
//! The engine reports every parse pass and every reconciliation run to the
//! installed [`MetricsSink`]. Without one, the reports are dropped.
//!
//! ## Usage
//!
//! ```ignore
//! use classmap_core::metrics::{MetricsSink, ParseStats, ReconcileStats};
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use std::sync::Arc;
//!
//! struct CommandCounter {
//!     commands: AtomicU64,
//! }
//!
//! impl MetricsSink for CommandCounter {
//!     fn on_parse(&self, stats: &ParseStats) {
//!         eprintln!("parsed {} class-maps, skipped {} lines", stats.class_maps, stats.skipped);
//!     }
//!
//!     fn on_reconcile(&self, stats: &ReconcileStats) {
//!         self.commands.fetch_add(stats.commands as u64, Ordering::Relaxed);
//!     }
//! }
//!
//! classmap_core::metrics::set_sink(Arc::new(CommandCounter { commands: AtomicU64::new(0) }));
//! ```

use serde::Serialize;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::warn;

use crate::types::State;

/// What one pass of the parser saw.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    /// Lines offered to the grammar
    pub lines: usize,
    /// Lines no rule accepted, or whose values were invalid
    pub skipped: usize,
    /// Distinct class-maps found
    pub class_maps: usize,
    pub duration: Duration,
}

/// Snapshot of one run, passed to [`MetricsSink::on_reconcile`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileStats {
    pub state: State,
    /// Class-maps that produced at least one command
    pub changed: usize,
    /// Commands emitted (or rendered)
    pub commands: usize,
    /// Total wall-clock time for the run, parsing included
    pub duration: Duration,
}

/// Per-phase timings of a run, in milliseconds.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcilePhases {
    pub load_ms: f64,
    pub parse_ms: f64,
    pub compare_ms: f64,
    pub total_ms: f64,
}

impl ReconcilePhases {
    /// Time not accounted for in the measured phases.
    pub fn overhead_ms(&self) -> f64 {
        self.total_ms - (self.load_ms + self.parse_ms + self.compare_ms)
    }
}

/// Consumer of parse and run metrics.
///
/// Implementations must be thread-safe, runs may execute concurrently.
/// Calls happen inline at the end of each run and should return quickly.
pub trait MetricsSink: Send + Sync {
    fn on_parse(&self, stats: &ParseStats);

    fn on_reconcile(&self, stats: &ReconcileStats);

    /// Phase-level timings. The default implementation does nothing.
    fn on_reconcile_phases(&self, _stats: &ReconcileStats, _phases: &ReconcilePhases) {}
}

static SINK: OnceLock<Arc<dyn MetricsSink>> = OnceLock::new();

/// Set the global metrics sink.
///
/// The sink can be set once. Later calls are ignored with a warning. Runs
/// before the first call are not reported.
pub fn set_sink(sink: Arc<dyn MetricsSink>) {
    if SINK.set(sink).is_err() {
        warn!(
            event = "Metrics",
            phase = "Init",
            "Metrics sink was already initialized. Ignoring subsequent set_sink call."
        );
    }
}

pub(crate) fn record_parse(stats: &ParseStats) {
    if let Some(sink) = SINK.get() {
        sink.on_parse(stats);
    }
}

pub(crate) fn record_reconcile(stats: ReconcileStats, phases: ReconcilePhases) {
    if let Some(sink) = SINK.get() {
        sink.on_reconcile(&stats);
        sink.on_reconcile_phases(&stats, &phases);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stats_serialization() {
        let stats = ParseStats {
            lines: 12,
            skipped: 3,
            class_maps: 2,
            duration: Duration::from_millis(42),
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["lines"], 12);
        assert_eq!(json["skipped"], 3);
        assert_eq!(json["class_maps"], 2);
    }

    #[test]
    fn test_reconcile_stats_serialization() {
        let stats = ReconcileStats {
            state: State::Overridden,
            changed: 1,
            commands: 4,
            duration: Duration::from_micros(250),
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["state"], "overridden");
        assert_eq!(json["commands"], 4);
    }

    #[test]
    fn test_phase_overhead() {
        let phases = ReconcilePhases {
            load_ms: 1.0,
            parse_ms: 2.0,
            compare_ms: 3.0,
            total_ms: 6.5,
        };
        assert!((phases.overhead_ms() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_record_without_sink_is_silent() {
        record_parse(&ParseStats::default());
    }
}
