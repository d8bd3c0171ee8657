//! Eye aspect ratio blink gate

use detection::FaceLandmarks;
use geometry::Point2;

/// EAR of one eye from its six contour landmarks `p1..p6`.
///
/// Returns `None` when the horizontal span `|p1 - p4|` is zero.
pub fn eye_aspect_ratio(eye: &[Point2; 6]) -> Option<f64> {
    let horizontal = eye[0].distance(&eye[3]);
    if horizontal == 0.0 {
        return None;
    }
    let vertical = eye[1].distance(&eye[5]) + eye[2].distance(&eye[4]);
    Some(vertical / (2.0 * horizontal))
}

fn eye_points(landmarks: &FaceLandmarks, start: usize) -> [Point2; 6] {
    std::array::from_fn(|i| landmarks.point(start + i))
}

/// Mean EAR over both eyes (landmarks 36-41 and 42-47)
pub fn face_ear(landmarks: &FaceLandmarks) -> Option<f64> {
    let left = eye_aspect_ratio(&eye_points(landmarks, 36))?;
    let right = eye_aspect_ratio(&eye_points(landmarks, 42))?;
    Some(0.5 * (left + right))
}

/// Counts a blink only when the eyes are closed and the classifier allows it
#[derive(Debug, Clone, Copy)]
pub struct BlinkGate {
    threshold: f64,
}

impl Default for BlinkGate {
    fn default() -> Self {
        Self { threshold: 0.25 }
    }
}

impl BlinkGate {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn is_blink(&self, ear: Option<f64>, blink_allowed: bool) -> bool {
        blink_allowed && ear.is_some_and(|e| e < self.threshold)
    }
}
