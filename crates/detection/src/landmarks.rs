//! Face and pose landmark types

use geometry::{Point2, Point3};
use serde::{Deserialize, Serialize};

use crate::DetectionError;

/// Face bounding box in frame pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl FaceBox {
    pub fn center(&self) -> Point2 {
        Point2::new(self.x + 0.5 * self.width, self.y + 0.5 * self.height)
    }
}

/// Standard 68-point facial landmarks (iBUG 300-W ordering)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(f64, f64)>", into = "Vec<(f64, f64)>")]
pub struct FaceLandmarks {
    points: Vec<Point2>,
}

impl FaceLandmarks {
    pub const COUNT: usize = 68;

    pub fn new(points: Vec<Point2>) -> Result<Self, DetectionError> {
        if points.len() != Self::COUNT {
            return Err(DetectionError::LandmarkCount {
                expected: Self::COUNT,
                actual: points.len(),
            });
        }
        Ok(Self { points })
    }

    /// Landmark at `index` (0..68)
    pub fn point(&self, index: usize) -> Point2 {
        self.points[index]
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }
}

impl TryFrom<Vec<(f64, f64)>> for FaceLandmarks {
    type Error = DetectionError;

    fn try_from(raw: Vec<(f64, f64)>) -> Result<Self, Self::Error> {
        Self::new(raw.into_iter().map(Point2::from).collect())
    }
}

impl From<FaceLandmarks> for Vec<(f64, f64)> {
    fn from(lm: FaceLandmarks) -> Self {
        lm.points.iter().map(|p| (p.x, p.y)).collect()
    }
}

/// Body pose landmarks (MediaPipe ordering) in normalized coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(f64, f64, f64)>", into = "Vec<(f64, f64, f64)>")]
pub struct PoseLandmarks {
    points: Vec<Point3>,
}

impl PoseLandmarks {
    pub const NOSE: usize = 0;
    pub const LEFT_SHOULDER: usize = 11;
    pub const RIGHT_SHOULDER: usize = 12;

    /// Fewest landmarks that still cover nose and both shoulders
    pub const MIN_COUNT: usize = Self::RIGHT_SHOULDER + 1;

    pub fn new(points: Vec<Point3>) -> Result<Self, DetectionError> {
        if points.len() < Self::MIN_COUNT {
            return Err(DetectionError::LandmarkCount {
                expected: Self::MIN_COUNT,
                actual: points.len(),
            });
        }
        Ok(Self { points })
    }

    pub fn nose(&self) -> Point3 {
        self.points[Self::NOSE]
    }

    pub fn left_shoulder(&self) -> Point3 {
        self.points[Self::LEFT_SHOULDER]
    }

    pub fn right_shoulder(&self) -> Point3 {
        self.points[Self::RIGHT_SHOULDER]
    }
}

impl TryFrom<Vec<(f64, f64, f64)>> for PoseLandmarks {
    type Error = DetectionError;

    fn try_from(raw: Vec<(f64, f64, f64)>) -> Result<Self, Self::Error> {
        Self::new(raw.into_iter().map(Point3::from).collect())
    }
}

impl From<PoseLandmarks> for Vec<(f64, f64, f64)> {
    fn from(lm: PoseLandmarks) -> Self {
        lm.points.iter().map(|p| (p.x, p.y, p.z)).collect()
    }
}
