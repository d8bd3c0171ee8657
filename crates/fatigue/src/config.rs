//! Fatigue and blink configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Fatigue classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FatigueConfig {
    /// Labels kept for the vote
    pub label_window: usize,

    /// Raw states kept for plurality smoothing
    pub smoothing_window: usize,

    /// Pitch (radians) below which the state is forced to normal
    pub look_down_pitch: f64,

    /// Seconds over which the dominant state is reported
    pub report_window_secs: u64,
}

impl Default for FatigueConfig {
    fn default() -> Self {
        Self {
            label_window: 30,
            smoothing_window: 3,
            look_down_pitch: -std::f64::consts::PI / 9.0,
            report_window_secs: 10,
        }
    }
}

impl FatigueConfig {
    /// Negative labels needed to call fatigue: strictly more than this
    pub fn vote_threshold(&self) -> usize {
        self.label_window / 2
    }

    pub fn report_window(&self) -> Duration {
        Duration::from_secs(self.report_window_secs)
    }
}

/// Blink gating and rate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    /// EAR below which the eyes count as closed
    pub ear_threshold: f64,

    /// Seconds per blink-rate window
    pub window_secs: u64,

    /// Fewer blinks than this per window is too few
    pub min_blinks: u32,

    /// More blinks than this per window is too many
    pub max_blinks: u32,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            ear_threshold: 0.25,
            window_secs: 10,
            min_blinks: 12,
            max_blinks: 15,
        }
    }
}

impl BlinkConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}
