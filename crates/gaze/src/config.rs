//! Gaze configuration

use serde::{Deserialize, Serialize};

/// Gaze estimation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GazeConfig {
    /// Eyeball radius in frame pixels used to turn offsets into angles
    pub eyeball_radius: f64,

    /// Samples kept per eye for smoothing
    pub history_capacity: usize,

    /// Normalized eye crop width
    pub crop_width: u32,

    /// Normalized eye crop height
    pub crop_height: u32,

    /// Pitch (radians) below which the user is reported as looking down
    pub look_down_pitch: f64,
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            eyeball_radius: 22.5,
            history_capacity: 10,
            crop_width: 64,
            crop_height: 48,
            look_down_pitch: -std::f64::consts::FRAC_PI_8,
        }
    }
}
