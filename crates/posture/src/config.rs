//! Posture configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Posture tracker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostureConfig {
    /// Seconds between posture checks
    pub interval_secs: u64,

    /// Percentage points subtracted from every sub-100 deviation
    pub adjustment: i32,

    /// Deviation above which a check counts as a violation
    pub threshold: i32,

    /// Consecutive violations before the posture counts as deviated
    pub max_buffer: u32,
}

impl Default for PostureConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            adjustment: 5,
            threshold: 25,
            max_buffer: 3,
        }
    }
}

impl PostureConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}
