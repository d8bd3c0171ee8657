//! Deviation percentage and violation buffer

use detection::PoseLandmarks;
use serde::{Deserialize, Serialize};

use crate::BasePosture;

/// Reported when no pose is visible or the baseline has no usable scale
const FULL_DEVIATION: i32 = 100;

/// Percentage deviation of a live pose from the baseline.
///
/// Sums the L1 distances of nose and shoulders, scales by the baseline's
/// x-sum and rounds. Values of 100 or more saturate at 100; anything lower
/// has `adjustment` subtracted and is clamped at 0.
pub fn deviation_percent(base: &BasePosture, live: Option<&PoseLandmarks>, adjustment: i32) -> i32 {
    let Some(live) = live else {
        return FULL_DEVIATION;
    };

    let scale = base.x_sum();
    if scale.abs() < f64::EPSILON {
        return FULL_DEVIATION;
    }

    let distance = base.nose.l1_distance(&live.nose())
        + base.left_shoulder.l1_distance(&live.left_shoulder())
        + base.right_shoulder.l1_distance(&live.right_shoulder());
    let raw = (distance / scale * 100.0).round();

    if !raw.is_finite() || raw >= FULL_DEVIATION as f64 {
        return FULL_DEVIATION;
    }
    (raw as i32 - adjustment).max(0)
}

/// Consecutive-violation counter giving hysteresis to posture alerts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviationBuffer {
    current_deviation: Option<i32>,
    current_buffer: u32,
    threshold: i32,
    max_buffer: u32,
}

impl DeviationBuffer {
    pub fn new(threshold: i32, max_buffer: u32) -> Self {
        Self {
            current_deviation: None,
            current_buffer: 0,
            threshold,
            max_buffer,
        }
    }

    /// Record one check: above threshold increments, otherwise resets
    pub fn observe(&mut self, deviation: i32) {
        self.current_deviation = Some(deviation);
        if deviation > self.threshold {
            self.current_buffer = (self.current_buffer + 1).min(self.max_buffer);
        } else {
            self.current_buffer = 0;
        }
    }

    pub fn has_deviated(&self) -> bool {
        self.current_buffer >= self.max_buffer
    }

    pub fn current_deviation(&self) -> Option<i32> {
        self.current_deviation
    }

    pub fn current_buffer(&self) -> u32 {
        self.current_buffer
    }

    pub fn reset(&mut self) {
        self.current_deviation = None;
        self.current_buffer = 0;
    }
}
