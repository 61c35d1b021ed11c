//! Single-flight classification state machine.
//!
//! Every request moves through `Idle -> Loading -> [Decoding ->] Inferring ->
//! Publishing -> Idle`, or ends in `Errored` and returns to `Idle`. Only one
//! request may be in flight; a second one is rejected with [`Error::Busy`].
//! Busy, phase and the latest outcome are observable through `watch` channels.

use crate::camera::{CaptureOptions, LiveCamera};
use crate::config::Config;
use crate::constants::messages;
use crate::error::{Error, Result};
use crate::inference::{ClassifierSession, ModelSession, Prediction};
use crate::photo::{ImageBuffer, ImageFile};
use crate::pipeline::{
    HistoryLedger, RankedPrediction, SessionState, format_label, format_percentage, rank,
};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Orchestrator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Ready for a request.
    Idle,
    /// Acquiring the classifier.
    Loading,
    /// Decoding a submitted file.
    Decoding,
    /// Waiting on the classifier.
    Inferring,
    /// Ranking and recording results.
    Publishing,
    /// The attempt failed.
    Errored,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Idle => "idle",
            Self::Loading => "loading model",
            Self::Decoding => "decoding image",
            Self::Inferring => "identifying",
            Self::Publishing => "publishing",
            Self::Errored => "errored",
        };
        f.write_str(text)
    }
}

/// What a request produced, as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// Ranked predictions, best first.
    Ranked {
        /// Display-ready predictions.
        predictions: Vec<RankedPrediction>,
    },
    /// The classifier returned nothing.
    Unrecognized {
        /// Notice shown in place of results.
        message: String,
    },
    /// The request failed or was rejected.
    Failed {
        /// Stable error code.
        code: String,
        /// Message shown in place of results.
        message: String,
    },
}

impl Outcome {
    /// Failure outcome for `err`.
    pub fn from_error(err: &Error) -> Self {
        Self::Failed {
            code: err.code().to_string(),
            message: err.user_message(),
        }
    }

    /// Ranked predictions, if any.
    pub fn predictions(&self) -> Option<&[RankedPrediction]> {
        match self {
            Self::Ranked { predictions } => Some(predictions),
            _ => None,
        }
    }

    /// Whether predictions were produced.
    pub const fn is_ranked(&self) -> bool {
        matches!(self, Self::Ranked { .. })
    }

    /// Error code of a failed outcome.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Failed { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Tunables for the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorOptions {
    /// Upper bound on one inference call. `None` waits forever.
    pub inference_timeout: Option<Duration>,
    /// Camera snapshot parameters.
    pub capture: CaptureOptions,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for OrchestratorOptions {
    fn from(config: &Config) -> Self {
        Self {
            inference_timeout: config.session.inference_timeout(),
            capture: CaptureOptions::from(&config.camera),
        }
    }
}

/// Classification orchestrator.
pub struct Orchestrator {
    model: ModelSession,
    options: OrchestratorOptions,
    state: Mutex<SessionState>,
    in_flight: AtomicBool,
    phase: watch::Sender<Phase>,
    busy: watch::Sender<bool>,
    results: watch::Sender<Option<Outcome>>,
}

impl Orchestrator {
    /// Orchestrator with empty session state.
    pub fn new(model: ModelSession, options: OrchestratorOptions) -> Self {
        Self::with_state(model, options, SessionState::new())
    }

    /// Orchestrator resuming `state`.
    pub fn with_state(
        model: ModelSession,
        options: OrchestratorOptions,
        state: SessionState,
    ) -> Self {
        Self {
            model,
            options,
            state: Mutex::new(state),
            in_flight: AtomicBool::new(false),
            phase: watch::channel(Phase::Idle).0,
            busy: watch::channel(false).0,
            results: watch::channel(None).0,
        }
    }

    /// Validate, decode and classify a submitted file.
    ///
    /// Validation failures are published without touching busy, history or
    /// the scan counter.
    pub async fn submit_file(&self, file: ImageFile) -> Outcome {
        if let Err(e) = file.validate() {
            return self.report(&e);
        }

        let Some(flight) = self.begin() else {
            return Self::reject_busy();
        };
        info!("Identifying {}", file.name());

        let result = async {
            let session = self.acquire(&flight).await?;
            flight.enter(Phase::Decoding);
            let image = file.load().await?;
            self.infer(&flight, session.as_ref(), &image).await
        }
        .await;

        self.finish(flight, result)
    }

    /// Snapshot `camera`, release it, and classify the frame.
    pub async fn submit_camera_frame(&self, camera: LiveCamera) -> Outcome {
        if self.is_busy() {
            camera.close();
            return Self::reject_busy();
        }

        match camera.snapshot(self.options.capture).await {
            Ok(image) => self.classify(image).await,
            Err(e) => self.report(&e),
        }
    }

    /// Classify an already decoded image.
    pub async fn classify(&self, image: ImageBuffer) -> Outcome {
        let Some(flight) = self.begin() else {
            return Self::reject_busy();
        };
        info!("Identifying {}", image.origin().name());

        let result = async {
            let session = self.acquire(&flight).await?;
            self.infer(&flight, session.as_ref(), &image).await
        }
        .await;

        self.finish(flight, result)
    }

    /// Publish a failure that happened outside a classification, such as a
    /// rejected file or a camera error.
    pub fn report(&self, err: &Error) -> Outcome {
        if err.is_validation() {
            info!("Rejected: {err}");
        } else {
            warn!("{err}");
        }
        let outcome = Outcome::from_error(err);
        self.results.send_replace(Some(outcome.clone()));
        outcome
    }

    /// Observe phase changes.
    pub fn subscribe_phase(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    /// Observe the busy flag.
    pub fn subscribe_busy(&self) -> watch::Receiver<bool> {
        self.busy.subscribe()
    }

    /// Observe the latest published outcome.
    pub fn subscribe_results(&self) -> watch::Receiver<Option<Outcome>> {
        self.results.subscribe()
    }

    /// Whether a classification is in flight.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Snapshot of the history ledger.
    pub fn history(&self) -> HistoryLedger {
        self.session_state().history().clone()
    }

    /// Number of completed, non-empty classifications.
    pub fn completed_scans(&self) -> u64 {
        self.session_state().completed_scans()
    }

    /// The lazily loaded model.
    pub const fn model(&self) -> &ModelSession {
        &self.model
    }

    /// Lock the session state, recovering it if a holder panicked.
    fn session_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("Session state lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn begin(&self) -> Option<Flight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        self.busy.send_replace(true);
        Some(Flight { owner: self })
    }

    fn reject_busy() -> Outcome {
        debug!("Request rejected: classification in flight");
        Outcome::from_error(&Error::Busy)
    }

    async fn acquire(&self, flight: &Flight<'_>) -> Result<Arc<dyn ClassifierSession>> {
        flight.enter(Phase::Loading);
        self.model.acquire().await
    }

    async fn infer(
        &self,
        flight: &Flight<'_>,
        session: &dyn ClassifierSession,
        image: &ImageBuffer,
    ) -> Result<Vec<Prediction>> {
        flight.enter(Phase::Inferring);
        let call = session.classify(image);
        let result = match self.options.inference_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| Error::InferenceTimeout {
                    secs: limit.as_secs(),
                })?,
            None => call.await,
        };

        result.map_err(|e| match e {
            Error::Inference { .. } | Error::InferenceTimeout { .. } => e,
            other => Error::Inference {
                reason: other.to_string(),
            },
        })
    }

    fn finish(&self, flight: Flight<'_>, result: Result<Vec<Prediction>>) -> Outcome {
        let outcome = match result {
            Ok(predictions) => {
                flight.enter(Phase::Publishing);
                let ranked = rank(&predictions);
                match predictions.first() {
                    Some(best) => {
                        self.session_state().record_scan(best);
                        info!(
                            "Identified {} ({})",
                            format_label(&best.label),
                            format_percentage(best.probability)
                        );
                        Outcome::Ranked {
                            predictions: ranked,
                        }
                    }
                    None => {
                        info!("No predictions");
                        Outcome::Unrecognized {
                            message: messages::UNRECOGNIZED.to_string(),
                        }
                    }
                }
            }
            Err(e) => {
                flight.enter(Phase::Errored);
                warn!("Classification failed: {e}");
                Outcome::from_error(&e)
            }
        };

        self.results.send_replace(Some(outcome.clone()));
        drop(flight);
        outcome
    }
}

/// Claim on the single flight slot. Dropping it returns to idle.
struct Flight<'a> {
    owner: &'a Orchestrator,
}

impl Flight<'_> {
    fn enter(&self, phase: Phase) {
        debug!("Phase: {phase}");
        self.owner.phase.send_replace(phase);
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        self.owner.phase.send_replace(Phase::Idle);
        self.owner.busy.send_replace(false);
        self.owner.in_flight.store(false, Ordering::SeqCst);
    }
}
