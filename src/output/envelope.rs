//! JSON envelope types for `--json` output.
//!
//! Every line printed in JSON mode is one envelope, so a front end can read
//! stdout as newline-delimited JSON.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Current spec version for the JSON envelope.
pub const SPEC_VERSION: &str = "1.0";

/// JSON envelope wrapping every CLI output event.
#[derive(Debug, Serialize)]
pub struct JsonEnvelope<T> {
    /// API specification version.
    pub spec_version: String,
    /// Event timestamp.
    pub timestamp: DateTime<Utc>,
    /// Event type.
    pub event: EventType,
    /// Event-specific payload.
    pub payload: T,
}

impl<T: Serialize> JsonEnvelope<T> {
    /// Create a new envelope with the current timestamp.
    pub fn new(event: EventType, payload: T) -> Self {
        Self {
            spec_version: SPEC_VERSION.to_string(),
            timestamp: Utc::now(),
            event,
            payload,
        }
    }

    /// Serialize to a single line.
    pub fn to_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::Internal {
            message: format!("failed to serialize {:?} event: {e}", self.event),
        })
    }
}

/// Event types for JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Outcome of one submitted image.
    ImageResult,
    /// History ledger and scan counter after a run.
    SessionSummary,
    /// Species reference cards.
    SpeciesList,
    /// Configuration display.
    Config,
    /// Startup or configuration error.
    Error,
}

/// Payload of an [`EventType::Error`] event.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    /// Stable machine code, e.g. `CONFIG_ERROR`.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl From<&Error> for ErrorPayload {
    fn from(err: &Error) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Print one envelope to stdout.
pub fn emit<T: Serialize>(event: EventType, payload: T) -> Result<()> {
    println!("{}", JsonEnvelope::new(event, payload).to_line()?);
    Ok(())
}
