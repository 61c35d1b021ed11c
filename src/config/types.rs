//! Configuration type definitions.

use crate::constants::{DEFAULT_INFERENCE_TIMEOUT_SECS, camera, model};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Classifier selection.
    #[serde(default)]
    pub model: ModelConfig,

    /// Orchestrator settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Live capture settings.
    #[serde(default)]
    pub camera: CameraConfig,
}

/// Classifier model selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the ONNX model file.
    pub path: Option<PathBuf>,

    /// Path to the labels file (one label per line).
    pub labels: Option<PathBuf>,

    /// Architecture version.
    pub version: u8,

    /// Width multiplier.
    pub alpha: f32,

    /// Square input edge in pixels.
    pub input_size: u32,

    /// Number of predictions returned per image.
    pub top_k: usize,

    /// What to do after a failed model load.
    pub load_failure: LoadFailurePolicy,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: None,
            labels: None,
            version: model::VERSION,
            alpha: model::ALPHA,
            input_size: model::INPUT_SIZE,
            top_k: model::TOP_K,
            load_failure: LoadFailurePolicy::default(),
        }
    }
}

/// Policy applied when constructing the classifier fails.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoadFailurePolicy {
    /// Forget the failure; the next acquire constructs again.
    #[default]
    Retry,
    /// Keep the first failure and return it to every later caller.
    Cache,
}

impl std::fmt::Display for LoadFailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Retry => write!(f, "retry"),
            Self::Cache => write!(f, "cache"),
        }
    }
}

/// Orchestrator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Inference timeout in seconds (0 disables the timeout).
    pub inference_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            inference_timeout_secs: DEFAULT_INFERENCE_TIMEOUT_SECS,
        }
    }
}

impl SessionConfig {
    /// Inference timeout, or `None` when disabled.
    pub fn inference_timeout(&self) -> Option<Duration> {
        (self.inference_timeout_secs > 0).then(|| Duration::from_secs(self.inference_timeout_secs))
    }
}

/// Live capture settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Fallback raster width.
    pub width: u32,

    /// Fallback raster height.
    pub height: u32,

    /// JPEG quality of the snapshot (1-100).
    pub jpeg_quality: u8,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: camera::DEFAULT_WIDTH,
            height: camera::DEFAULT_HEIGHT,
            jpeg_quality: camera::JPEG_QUALITY,
        }
    }
}
