//! Rendering results for the terminal.

pub mod envelope;
mod progress;
mod render;

pub use envelope::{ErrorPayload, EventType, JsonEnvelope, emit};
pub use progress::BusySpinner;
pub use render::{
    ImageResultPayload, SessionSummaryPayload, matching_card, render_outcome, render_species,
    render_summary,
};
