//! Classifier contract, backends and the lazily loaded model session.

mod contract;
#[cfg(feature = "onnx")]
mod onnx;
pub mod postprocess;
mod session;

pub use contract::{ClassifierBackend, ClassifierSession, ModelSelector, Prediction};
#[cfg(feature = "onnx")]
pub use onnx::OnnxBackend;
pub use session::{LoadFailure, ModelSession};

use std::sync::Arc;

/// Backend compiled into this build, if any.
#[cfg(feature = "onnx")]
pub fn default_backend() -> Option<Arc<dyn ClassifierBackend>> {
    Some(Arc::new(OnnxBackend))
}

/// Backend compiled into this build, if any.
#[cfg(not(feature = "onnx"))]
pub fn default_backend() -> Option<Arc<dyn ClassifierBackend>> {
    tracing::debug!("Built without the `onnx` feature; no classifier backend");
    None
}
