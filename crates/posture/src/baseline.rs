//! Baseline posture

use detection::PoseLandmarks;
use geometry::Point3;
use serde::{Deserialize, Serialize};

/// Reference pose the live posture is measured against
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BasePosture {
    pub nose: Point3,
    pub left_shoulder: Point3,
    pub right_shoulder: Point3,
}

impl BasePosture {
    pub fn from_pose(pose: &PoseLandmarks) -> Self {
        Self {
            nose: pose.nose(),
            left_shoulder: pose.left_shoulder(),
            right_shoulder: pose.right_shoulder(),
        }
    }

    /// Sum of the tracked landmarks' x coordinates, used as the scale
    pub fn x_sum(&self) -> f64 {
        self.nose.x + self.left_shoulder.x + self.right_shoulder.x
    }
}
