//! Per-session mutable state.

use crate::inference::Prediction;
use crate::pipeline::HistoryLedger;
use chrono::Local;

/// History ledger plus completed-scan counter, owned by one orchestrator.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    history: HistoryLedger,
    completed_scans: u64,
}

impl SessionState {
    /// Fresh state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed, non-empty classification.
    pub fn record_scan(&mut self, best: &Prediction) {
        self.history.record(best, &Local::now());
        self.completed_scans += 1;
    }

    /// History ledger.
    pub const fn history(&self) -> &HistoryLedger {
        &self.history
    }

    /// Number of completed, non-empty classifications.
    pub const fn completed_scans(&self) -> u64 {
        self.completed_scans
    }
}
