//! Classification pipeline: orchestration, ranking and history.

mod history;
mod orchestrator;
mod ranking;
mod state;

pub use history::{HistoryEntry, HistoryLedger};
pub use orchestrator::{Orchestrator, OrchestratorOptions, Outcome, Phase};
pub use ranking::{RankedPrediction, format_label, format_percentage, rank};
pub use state::SessionState;
