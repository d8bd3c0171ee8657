//! Posture Deviation Tracking
//!
//! Compares live pose landmarks (nose and shoulders) to a baseline captured
//! on request and applies a consecutive-violation buffer before declaring
//! a sustained deviation.

pub mod baseline;
pub mod config;
pub mod deviation;
pub mod tracker;

pub use baseline::BasePosture;
pub use config::PostureConfig;
pub use deviation::{deviation_percent, DeviationBuffer};
pub use tracker::{PostureGrade, PostureReport, PostureState, PostureTracker};
