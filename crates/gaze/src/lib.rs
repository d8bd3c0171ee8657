//! Gaze Estimation
//!
//! Per-frame eye state estimation from facial landmarks:
//! - Eye normalization into canonical 64x48 crops
//! - Heatmap landmark extraction (iris and eyeball centres)
//! - Pitch/yaw recovery in frame space
//! - Recency-weighted gaze smoothing per tracked eye

pub mod config;
pub mod estimator;
pub mod heatmap;
pub mod history;
pub mod normalizer;

pub use config::GazeConfig;
pub use estimator::{gaze_angles, EyeGaze, FaceGaze, GazeEstimator};
pub use history::{EyeKey, GazeHistory, GazeSample, GazeState};
pub use normalizer::{EyeCrop, EyeNormalizer, EyeSide};

use inference_engine::InferenceError;
use thiserror::Error;

/// Gaze error types
#[derive(Error, Debug)]
pub enum GazeError {
    #[error("Expected exactly 2 eye crops, got {0}")]
    EyeCount(usize),

    #[error("Heatmap inference failed: {0}")]
    Inference(#[from] InferenceError),

    #[error("Eye crops differ in size: expected {expected:?}, got {actual:?}")]
    CropShape {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Unexpected heatmap shape: {0}")]
    HeatmapShape(String),
}
