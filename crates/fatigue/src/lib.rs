//! Fatigue and Blink Estimation
//!
//! Turns noisy per-frame emotion labels into a stable overall state:
//! - 30-frame label vote with a 3-frame smoothing window
//! - Look-down override from gaze pitch
//! - Eye aspect ratio blink gating
//! - 10 second dominant-state and blink-rate windows

pub mod aggregate;
pub mod classifier;
pub mod config;
pub mod ear;

pub use aggregate::{BlinkRate, BlinkRateWindow, BlinkSummary, DominantStateWindow};
pub use classifier::{FatigueClassifier, FatigueVerdict, OverallState};
pub use config::{BlinkConfig, FatigueConfig};
pub use ear::{eye_aspect_ratio, face_ear, BlinkGate};
