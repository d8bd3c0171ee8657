//! Posture tracker state machine

use std::sync::Arc;

use detection::PoseLandmarks;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{deviation_percent, BasePosture, DeviationBuffer, PostureConfig};

/// Tracker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostureState {
    NoBaseline,
    WithinTolerance,
    Deviated,
}

/// Posture quality bucket written to the progress log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostureGrade {
    Good,
    Neutral,
    Poor,
}

impl PostureGrade {
    pub fn from_deviation(deviation: i32) -> Self {
        if deviation < 25 {
            PostureGrade::Good
        } else if deviation < 35 {
            PostureGrade::Neutral
        } else {
            PostureGrade::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PostureGrade::Good => "Good-Posture",
            PostureGrade::Neutral => "Neutral-Posture",
            PostureGrade::Poor => "Poor-Posture",
        }
    }
}

/// Outcome of one posture check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostureReport {
    pub deviation: i32,
    pub buffer: u32,
    pub deviated: bool,
    pub grade: PostureGrade,
}

/// Baseline holder plus deviation buffer
#[derive(Debug)]
pub struct PostureTracker {
    baseline: Option<Arc<BasePosture>>,
    buffer: DeviationBuffer,
    adjustment: i32,
}

impl PostureTracker {
    pub fn new(config: &PostureConfig) -> Self {
        Self {
            baseline: None,
            buffer: DeviationBuffer::new(config.threshold, config.max_buffer),
            adjustment: config.adjustment,
        }
    }

    /// Capture the baseline from a pose sample.
    ///
    /// Without a pose the current baseline is kept and `None` is returned.
    pub fn set_baseline(&mut self, pose: Option<&PoseLandmarks>) -> Option<Arc<BasePosture>> {
        let Some(pose) = pose else {
            debug!("No pose visible; baseline not captured");
            return None;
        };

        let base = Arc::new(BasePosture::from_pose(pose));
        info!(
            "Baseline posture captured (nose {:.3},{:.3})",
            base.nose.x, base.nose.y
        );
        self.buffer.reset();
        self.baseline = Some(Arc::clone(&base));
        Some(base)
    }

    pub fn clear_baseline(&mut self) {
        self.baseline = None;
        self.buffer.reset();
    }

    pub fn baseline(&self) -> Option<&Arc<BasePosture>> {
        self.baseline.as_ref()
    }

    pub fn state(&self) -> PostureState {
        match &self.baseline {
            None => PostureState::NoBaseline,
            Some(_) if self.buffer.has_deviated() => PostureState::Deviated,
            Some(_) => PostureState::WithinTolerance,
        }
    }

    /// Run one check against the baseline; a no-op without one
    pub fn check(&mut self, live: Option<&PoseLandmarks>) -> Option<PostureReport> {
        let base = self.baseline.as_ref()?;

        let deviation = deviation_percent(base, live, self.adjustment);
        self.buffer.observe(deviation);

        let report = PostureReport {
            deviation,
            buffer: self.buffer.current_buffer(),
            deviated: self.buffer.has_deviated(),
            grade: PostureGrade::from_deviation(deviation),
        };
        debug!(
            "Posture deviation {}% (buffer {}, deviated {})",
            report.deviation, report.buffer, report.deviated
        );
        Some(report)
    }
}
