//! Bounded most-recent-first log of best results.

use crate::constants::{HISTORY_CAPACITY, HISTORY_SEPARATOR, HISTORY_TIME_FORMAT};
use crate::inference::Prediction;
use crate::pipeline::format_label;
use chrono::{DateTime, TimeZone};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

/// Best label of one completed classification and when it was captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// Title-cased label.
    pub label: String,
    /// Capture time as `HH:MM`.
    pub timestamp: String,
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{HISTORY_SEPARATOR}{}", self.label, self.timestamp)
    }
}

/// Most-recent-first history holding at most [`HISTORY_CAPACITY`] entries.
#[derive(Debug, Clone, Default)]
pub struct HistoryLedger {
    entries: VecDeque<HistoryEntry>,
}

impl HistoryLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend the best prediction and evict from the tail.
    pub fn record<Tz: TimeZone>(&mut self, best: &Prediction, captured_at: &DateTime<Tz>)
    where
        Tz::Offset: fmt::Display,
    {
        self.entries.push_front(HistoryEntry {
            label: format_label(&best.label),
            timestamp: captured_at.format(HISTORY_TIME_FORMAT).to_string(),
        });
        self.entries.truncate(HISTORY_CAPACITY);
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Snapshot of the entries, newest first.
    pub fn to_vec(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
