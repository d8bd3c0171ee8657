//! ONNX Inference Engine
//!
//! Model contracts consumed by the pipeline and their tract-onnx backends:
//! - Landmark heatmap model (eye pair → 18 heatmaps per eye)
//! - Emotion classifier (48x48 face crop → 5 class probabilities)

mod emotion;
mod engine;

pub use emotion::{EmotionClass, EmotionModel, EmotionPrediction};
pub use engine::{preprocess_face, HeatmapModel, OnnxEmotionModel, OnnxHeatmapModel};

use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
    #[error("Invalid model output: {0}")]
    InvalidOutput(String),
}
