//! Camera Capture Library
//!
//! Frame types and the frame-source contract consumed by the pipeline.
//! Device management stays outside this crate; sources here either replay
//! recorded frames or wrap an already-open device.

pub mod frame;
pub mod source;

pub use frame::VideoFrame;
pub use source::{FrameSource, ImageDirSource, VecSource};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Camera error types
#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Failed to open source: {0}")]
    Open(String),

    #[error("Failed to decode frame {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("Invalid frame buffer: expected {expected} bytes, got {actual}")]
    Buffer { expected: usize, actual: usize },

    #[error("Capture timeout")]
    Timeout,
}

/// Capture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Preferred capture width
    pub width: u32,
    /// Preferred capture height
    pub height: u32,
    /// Target FPS
    pub fps: u32,
    /// Frames between forced face re-detections
    pub face_refresh_frames: u64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: 720,
            height: 480,
            fps: 15,
            face_refresh_frames: 60,
        }
    }
}

impl CameraConfig {
    /// Interval between frames at the target rate
    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(1000 / u64::from(self.fps.max(1)))
    }
}
