//! Human-readable and JSON rendering of outcomes.

use crate::cli::species::{SpeciesCard, find_card};
use crate::pipeline::{HistoryEntry, HistoryLedger, Outcome};
use serde::Serialize;
use std::fmt::Write;

/// JSON payload for one submitted image.
#[derive(Debug, Serialize)]
pub struct ImageResultPayload<'a> {
    /// Name of the submission.
    pub source: &'a str,
    /// What it produced.
    pub outcome: &'a Outcome,
    /// Reference card matching the best label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<&'static SpeciesCard>,
}

impl<'a> ImageResultPayload<'a> {
    /// Payload for `outcome`.
    pub fn new(source: &'a str, outcome: &'a Outcome) -> Self {
        Self {
            source,
            outcome,
            species: matching_card(outcome),
        }
    }
}

/// JSON payload summarizing a run.
#[derive(Debug, Serialize)]
pub struct SessionSummaryPayload {
    /// History, newest first.
    pub history: Vec<HistoryEntry>,
    /// Completed, non-empty classifications.
    pub completed_scans: u64,
}

/// Reference card for the best prediction of `outcome`.
pub fn matching_card(outcome: &Outcome) -> Option<&'static SpeciesCard> {
    outcome
        .predictions()
        .and_then(<[_]>::first)
        .and_then(|best| find_card(&best.label))
}

/// Render one outcome as text.
pub fn render_outcome(source: &str, outcome: &Outcome) -> String {
    let mut out = format!("{source}\n");
    match outcome {
        Outcome::Ranked { predictions } => {
            let width = predictions
                .iter()
                .map(|p| p.label.chars().count())
                .max()
                .unwrap_or(0);
            for (i, p) in predictions.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "  {}. {:<width$}  {:>6}",
                    i + 1,
                    p.label,
                    p.percentage
                );
            }
            if let Some(card) = matching_card(outcome) {
                let _ = writeln!(out, "  {} ({}): {}", card.name, card.badge, card.fact);
            }
        }
        Outcome::Unrecognized { message } | Outcome::Failed { message, .. } => {
            let _ = writeln!(out, "  {message}");
        }
    }
    out
}

/// Render the history ledger and scan counter as text.
pub fn render_summary(history: &HistoryLedger, completed_scans: u64) -> String {
    let mut out = String::from("History:\n");
    if history.is_empty() {
        out.push_str("  (none)\n");
    }
    for entry in history.entries() {
        let _ = writeln!(out, "  {entry}");
    }
    let _ = writeln!(out, "Scans completed: {completed_scans}");
    out
}

/// Render the species catalogue as text.
pub fn render_species(cards: &[SpeciesCard]) -> String {
    let mut out = String::new();
    for card in cards {
        let _ = writeln!(out, "{} [{}]", card.name, card.badge);
        let _ = writeln!(out, "  {}", card.fact);
    }
    out
}
