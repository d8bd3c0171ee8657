//! Gaze estimation from normalized eye crops

use detection::FaceId;
use geometry::Point2;
use inference_engine::HeatmapModel;
use ndarray::{s, Array4};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::heatmap::{extract_landmarks, EYEBALL_CENTRE, IRIS_CENTRE};
use crate::{EyeCrop, EyeKey, EyeSide, GazeConfig, GazeError, GazeSample, GazeState};

/// Clamp an `asin` argument into [-1, 1], mapping NaN to 0
fn asin_domain(ratio: f64) -> f64 {
    if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(-1.0, 1.0)
    }
}

/// Pitch and yaw from frame-space iris and eyeball centres
pub fn gaze_angles(iris: Point2, eyeball: Point2, eyeball_radius: f64) -> GazeSample {
    let pitch = -asin_domain((iris.y - eyeball.y) / eyeball_radius).asin();
    let yaw = asin_domain((iris.x - eyeball.x) / (eyeball_radius * -pitch.cos())).asin();
    GazeSample::new(pitch, yaw)
}

/// Gaze result for one eye
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EyeGaze {
    pub side: EyeSide,
    pub eye_index: usize,
    /// Frame-space iris centre
    pub iris: Point2,
    /// Frame-space eyeball centre
    pub eyeball: Point2,
    /// Angles from this frame alone
    pub current: GazeSample,
    /// History-weighted angles
    pub smoothed: GazeSample,
}

/// Gaze result for one tracked face
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceGaze {
    pub face: FaceId,
    pub eyes: Vec<EyeGaze>,
}

impl FaceGaze {
    /// Mean of the eyes' current (unsmoothed) pitch
    pub fn pitch(&self) -> f64 {
        if self.eyes.is_empty() {
            return 0.0;
        }
        self.eyes.iter().map(|e| e.current.pitch).sum::<f64>() / self.eyes.len() as f64
    }

    pub fn is_looking_down(&self, threshold: f64) -> bool {
        self.pitch() < threshold
    }
}

/// Runs the heatmap model on an eye pair and tracks smoothed gaze
pub struct GazeEstimator<M> {
    model: M,
    config: GazeConfig,
}

impl<M: HeatmapModel> GazeEstimator<M> {
    pub fn new(model: M, config: GazeConfig) -> Self {
        Self { model, config }
    }

    pub fn config(&self) -> &GazeConfig {
        &self.config
    }

    /// Estimate gaze for both eyes of one face.
    ///
    /// `crops` must hold exactly the face's two eye crops. Each eye's sample
    /// is appended to its history in `state`.
    pub fn estimate(
        &self,
        face: FaceId,
        crops: &[EyeCrop],
        state: &mut GazeState,
    ) -> Result<FaceGaze, GazeError> {
        if crops.len() != 2 {
            return Err(GazeError::EyeCount(crops.len()));
        }

        let (h, w) = crops[0].image.dim();
        let mut batch = Array4::<f32>::zeros((crops.len(), 1, h, w));
        for (i, crop) in crops.iter().enumerate() {
            if crop.image.dim() != (h, w) {
                return Err(GazeError::CropShape {
                    expected: (h, w),
                    actual: crop.image.dim(),
                });
            }
            batch.slice_mut(s![i, 0, .., ..]).assign(&crop.image);
        }

        let heatmaps = self.model.predict(&batch)?;
        let landmarks = extract_landmarks(heatmaps.view(), w as u32, h as u32)?;
        if landmarks.len() != crops.len() {
            return Err(GazeError::HeatmapShape(format!("{:?}", heatmaps.shape())));
        }

        let mut eyes = Vec::with_capacity(crops.len());
        for (crop, points) in crops.iter().zip(&landmarks) {
            let unmirror = |p: Point2| match crop.side {
                EyeSide::Left => Point2::new(crop.width() as f64 - p.x, p.y),
                EyeSide::Right => p,
            };
            let iris = crop.inverse_transform.apply(unmirror(points[IRIS_CENTRE]));
            let eyeball = crop.inverse_transform.apply(unmirror(points[EYEBALL_CENTRE]));

            let current = gaze_angles(iris, eyeball, self.config.eyeball_radius);
            let smoothed = state.record(EyeKey { face, side: crop.side }, current);
            trace!(
                "Eye {} ({}): pitch {:.3} yaw {:.3}",
                crop.eye_index,
                crop.side.as_str(),
                current.pitch,
                current.yaw
            );

            eyes.push(EyeGaze {
                side: crop.side,
                eye_index: crop.eye_index,
                iris,
                eyeball,
                current,
                smoothed,
            });
        }

        let gaze = FaceGaze { face, eyes };
        if gaze.is_looking_down(self.config.look_down_pitch) {
            debug!("Face {} is looking down (pitch {:.3})", face.0, gaze.pitch());
        }
        Ok(gaze)
    }
}
