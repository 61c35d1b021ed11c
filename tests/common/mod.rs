//! Shared fakes for integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use wingspot::camera::{StreamConstraints, TrackSettings, VideoDevice, VideoStream};
use wingspot::config::LoadFailurePolicy;
use wingspot::inference::{
    ClassifierBackend, ClassifierSession, ModelSelector, ModelSession, Prediction,
};
use wingspot::photo::{ImageBuffer, ImageOrigin};
use wingspot::pipeline::{Orchestrator, OrchestratorOptions};
use wingspot::{Error, Result};

/// Encoded PNG of a solid colour.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let pixels = RgbImage::from_pixel(width, height, Rgb([230, 140, 20]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(pixels)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

/// Decoded test image.
pub fn test_image() -> ImageBuffer {
    ImageBuffer::decode_blocking(&png_bytes(8, 8), ImageOrigin::Camera).unwrap()
}

/// Typical classifier output.
pub fn butterfly_predictions() -> Vec<Prediction> {
    vec![
        Prediction::new("monarch, monarch butterfly, milkweed butterfly", 0.82),
        Prediction::new("viceroy", 0.11),
        Prediction::new("admiral", 0.04),
    ]
}

/// What a scripted session answers.
#[derive(Debug, Clone)]
pub enum Script {
    /// Return these predictions.
    Answer(Vec<Prediction>),
    /// Fail with this reason.
    Fail(String),
    /// Sleep before answering.
    Stall(Duration),
    /// Answer a distinct `species <n>` label on the n-th call.
    Numbered,
}

/// Session answering from a script, optionally held behind a gate.
pub struct ScriptedSession {
    script: Script,
    gate: Option<Arc<Notify>>,
    entered: Arc<Notify>,
    calls: AtomicUsize,
    last_size: Mutex<Option<(u32, u32)>>,
}

impl ScriptedSession {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            gate: None,
            entered: Arc::new(Notify::new()),
            calls: AtomicUsize::new(0),
            last_size: Mutex::new(None),
        })
    }

    /// Session that waits for `gate` before answering.
    pub fn gated(script: Script, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            script,
            gate: Some(gate),
            entered: Arc::new(Notify::new()),
            calls: AtomicUsize::new(0),
            last_size: Mutex::new(None),
        })
    }

    /// Notified each time a classification starts.
    pub fn entered(&self) -> Arc<Notify> {
        Arc::clone(&self.entered)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_size(&self) -> Option<(u32, u32)> {
        *self.last_size.lock().unwrap()
    }
}

#[async_trait]
impl ClassifierSession for ScriptedSession {
    async fn classify(&self, image: &ImageBuffer) -> Result<Vec<Prediction>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_size.lock().unwrap() = Some((image.width(), image.height()));
        self.entered.notify_one();

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        match &self.script {
            Script::Answer(predictions) => Ok(predictions.clone()),
            Script::Fail(reason) => Err(Error::Inference {
                reason: reason.clone(),
            }),
            Script::Stall(duration) => {
                tokio::time::sleep(*duration).await;
                Ok(Vec::new())
            }
            Script::Numbered => Ok(vec![Prediction::new(format!("species {call}"), 0.9)]),
        }
    }
}

/// Backend counting loads, optionally slow or failing the first N loads.
pub struct FakeBackend {
    session: Arc<ScriptedSession>,
    loads: AtomicUsize,
    failures_left: AtomicUsize,
    delay: Duration,
}

impl FakeBackend {
    pub fn new(session: Arc<ScriptedSession>) -> Arc<Self> {
        Self::build(session, 0, Duration::ZERO)
    }

    pub fn slow(session: Arc<ScriptedSession>, delay: Duration) -> Arc<Self> {
        Self::build(session, 0, delay)
    }

    pub fn failing(session: Arc<ScriptedSession>, failures: usize) -> Arc<Self> {
        Self::build(session, failures, Duration::ZERO)
    }

    fn build(session: Arc<ScriptedSession>, failures: usize, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            session,
            loads: AtomicUsize::new(0),
            failures_left: AtomicUsize::new(failures),
            delay,
        })
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClassifierBackend for FakeBackend {
    fn name(&self) -> &str {
        "fake"
    }

    async fn load(&self, _: &ModelSelector) -> Result<Arc<dyn ClassifierSession>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let left = self.failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.failures_left.store(left - 1, Ordering::SeqCst);
            return Err(Error::ModelLoad {
                reason: "weights unreachable".to_string(),
            });
        }
        Ok(Arc::clone(&self.session) as Arc<dyn ClassifierSession>)
    }
}

/// Model session over `backend`.
pub fn model_session(backend: &Arc<FakeBackend>, policy: LoadFailurePolicy) -> ModelSession {
    ModelSession::new(
        Some(Arc::clone(backend) as Arc<dyn ClassifierBackend>),
        ModelSelector::default(),
        policy,
    )
}

/// Orchestrator over `backend` with default options.
pub fn orchestrator(backend: &Arc<FakeBackend>) -> Orchestrator {
    Orchestrator::new(
        model_session(backend, LoadFailurePolicy::Retry),
        OrchestratorOptions::default(),
    )
}

/// Camera device serving a solid frame, or refusing access.
pub struct FakeCamera {
    pub supported: bool,
    pub deny: Option<String>,
    pub settings: TrackSettings,
    pub stream: Arc<FakeStream>,
}

impl FakeCamera {
    pub fn new(settings: TrackSettings) -> Self {
        Self {
            supported: true,
            deny: None,
            settings,
            stream: Arc::new(FakeStream {
                settings,
                live: AtomicBool::new(true),
            }),
        }
    }
}

#[async_trait]
impl VideoDevice for FakeCamera {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn get_stream(&self, _: &StreamConstraints) -> Result<Arc<dyn VideoStream>> {
        if let Some(reason) = &self.deny {
            return Err(Error::CameraAccess {
                reason: reason.clone(),
            });
        }
        Ok(Arc::clone(&self.stream) as Arc<dyn VideoStream>)
    }
}

/// Stream whose liveness the test can inspect.
pub struct FakeStream {
    settings: TrackSettings,
    live: AtomicBool,
}

#[async_trait]
impl VideoStream for FakeStream {
    fn settings(&self) -> TrackSettings {
        self.settings
    }

    async fn current_frame(&self) -> Result<RgbImage> {
        Ok(RgbImage::from_pixel(320, 200, Rgb([20, 60, 220])))
    }

    fn stop(&self) {
        self.live.store(false, Ordering::SeqCst);
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}
