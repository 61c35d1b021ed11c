//! Classifier contract.

use crate::config::{LoadFailurePolicy, ModelConfig};
use crate::error::Result;
use crate::photo::ImageBuffer;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// One raw classifier output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Class label as emitted by the model.
    pub label: String,
    /// Probability in `[0, 1]`.
    pub probability: f32,
}

impl Prediction {
    /// Create a prediction.
    pub fn new(label: impl Into<String>, probability: f32) -> Self {
        Self {
            label: label.into(),
            probability,
        }
    }
}

/// Load configuration handed to a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSelector {
    /// Architecture version.
    pub version: u8,
    /// Width multiplier.
    pub alpha: f32,
    /// Square input edge in pixels.
    pub input_size: u32,
    /// Predictions returned per image.
    pub top_k: usize,
    /// Model file for file-backed backends.
    pub model_path: Option<PathBuf>,
    /// Labels file for file-backed backends.
    pub labels_path: Option<PathBuf>,
    /// Failure memoization policy.
    pub load_failure: LoadFailurePolicy,
}

impl From<&ModelConfig> for ModelSelector {
    fn from(config: &ModelConfig) -> Self {
        Self {
            version: config.version,
            alpha: config.alpha,
            input_size: config.input_size,
            top_k: config.top_k,
            model_path: config.path.clone(),
            labels_path: config.labels.clone(),
            load_failure: config.load_failure,
        }
    }
}

impl Default for ModelSelector {
    fn default() -> Self {
        Self::from(&ModelConfig::default())
    }
}

impl fmt::Display for ModelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MobileNet v{} (alpha {}, {}px, top {})",
            self.version, self.alpha, self.input_size, self.top_k
        )
    }
}

/// Something that can construct a classifier.
#[async_trait]
pub trait ClassifierBackend: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Whether the backend is callable in this build and environment.
    fn is_available(&self) -> bool {
        true
    }

    /// Construct a classifier. Called at most once per successful session.
    async fn load(&self, selector: &ModelSelector) -> Result<Arc<dyn ClassifierSession>>;
}

/// A loaded, reusable classifier.
#[async_trait]
pub trait ClassifierSession: Send + Sync {
    /// Classify one image. Output order is the display order.
    async fn classify(&self, image: &ImageBuffer) -> Result<Vec<Prediction>>;
}
