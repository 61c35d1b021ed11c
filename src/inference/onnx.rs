//! ONNX Runtime backend for MobileNet-style classifiers.
//!
//! The model is expected to take a `[1, size, size, 3]` float tensor scaled to
//! `[-1, 1]` and return one score per class.

use crate::error::{Error, Result};
use crate::inference::postprocess::{read_labels, softmax, top_k_predictions};
use crate::inference::{ClassifierBackend, ClassifierSession, ModelSelector, Prediction};
use crate::photo::ImageBuffer;
use async_trait::async_trait;
use image::imageops::FilterType;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::Tensor;
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

fn load_error(e: impl Display) -> Error {
    Error::ModelLoad {
        reason: e.to_string(),
    }
}

fn inference_error(e: impl Display) -> Error {
    Error::Inference {
        reason: e.to_string(),
    }
}

/// Backend that loads an ONNX model file and a labels file.
#[derive(Debug, Default)]
pub struct OnnxBackend;

#[async_trait]
impl ClassifierBackend for OnnxBackend {
    fn name(&self) -> &str {
        "onnx"
    }

    async fn load(&self, selector: &ModelSelector) -> Result<Arc<dyn ClassifierSession>> {
        let model_path = selector.model_path.clone().ok_or_else(|| Error::ModelUnavailable {
            reason: "no model path configured (set --model-path or [model].path)".to_string(),
        })?;
        let labels_path = selector.labels_path.clone().ok_or_else(|| Error::ModelUnavailable {
            reason: "no labels path configured (set --labels-path or [model].labels)".to_string(),
        })?;
        let input_size = selector.input_size;
        let top_k = selector.top_k;

        let classifier = tokio::task::spawn_blocking(move || {
            OnnxClassifier::open(model_path, &labels_path, input_size, top_k)
        })
        .await
        .map_err(load_error)??;

        Ok(Arc::new(classifier))
    }
}

struct OnnxClassifier {
    session: Arc<Mutex<Session>>,
    labels: Arc<Vec<String>>,
    input_size: u32,
    top_k: usize,
}

impl OnnxClassifier {
    fn open(
        model_path: PathBuf,
        labels_path: &std::path::Path,
        input_size: u32,
        top_k: usize,
    ) -> Result<Self> {
        if !model_path.exists() {
            return Err(Error::ModelLoad {
                reason: format!("model not found: {}", model_path.display()),
            });
        }
        let labels = read_labels(labels_path)?;

        info!("Loading ONNX model from {}", model_path.display());
        let session = Session::builder()
            .map_err(load_error)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(load_error)?
            .commit_from_file(&model_path)
            .map_err(load_error)?;
        debug!("Model loaded with {} labels", labels.len());

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            labels: Arc::new(labels),
            input_size,
            top_k,
        })
    }
}

/// NHWC tensor data scaled to `[-1, 1]`.
fn input_tensor(image: &ImageBuffer, size: u32) -> Vec<f32> {
    let resized = image
        .image()
        .resize_exact(size, size, FilterType::Triangle)
        .to_rgb8();
    resized
        .into_raw()
        .into_iter()
        .map(|v| f32::from(v) / 127.5 - 1.0)
        .collect()
}

#[async_trait]
impl ClassifierSession for OnnxClassifier {
    async fn classify(&self, image: &ImageBuffer) -> Result<Vec<Prediction>> {
        let data = input_tensor(image, self.input_size);
        let size = self.input_size as usize;
        let session = Arc::clone(&self.session);
        let labels = Arc::clone(&self.labels);
        let top_k = self.top_k;

        tokio::task::spawn_blocking(move || {
            let input = Tensor::from_array(([1usize, size, size, 3], data)).map_err(inference_error)?;
            let mut session = session.lock().map_err(|_| Error::Internal {
                message: "onnx session lock poisoned".to_string(),
            })?;
            let outputs = session.run(ort::inputs![input]).map_err(inference_error)?;
            let (_, scores) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(inference_error)?;

            let sum: f32 = scores.iter().sum();
            let probabilities = if scores.iter().all(|s| (0.0..=1.0).contains(s))
                && (sum - 1.0).abs() < 1e-3
            {
                scores.to_vec()
            } else {
                softmax(scores)
            };
            Ok(top_k_predictions(&probabilities, &labels, top_k))
        })
        .await
        .map_err(inference_error)?
    }
}
