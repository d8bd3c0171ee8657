//! Detection Contracts
//!
//! Face/pose detection is performed by external collaborators. This crate
//! defines what they hand to the pipeline:
//! - Face bounding boxes and 68-point facial landmarks
//! - Pose landmarks (nose and shoulders)
//! - A per-frame detection source, with a JSON-lines replay implementation
//! - A face tracker that keeps face identity stable across frames

pub mod landmarks;
pub mod source;
pub mod tracker;

pub use landmarks::{FaceBox, FaceLandmarks, PoseLandmarks};
pub use source::{DetectionSource, FrameDetections, JsonlDetections};
pub use tracker::{FaceId, FaceTracker, TrackedFace};

use thiserror::Error;

/// Detection error types
#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("Expected {expected} landmarks, got {actual}")]
    LandmarkCount { expected: usize, actual: usize },

    #[error("Failed to open detections: {0}")]
    Open(String),

    #[error("Malformed detection record on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Detection read failed: {0}")]
    Io(#[from] std::io::Error),
}
