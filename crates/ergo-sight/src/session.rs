//! Per-frame eye pipeline
//!
//! Each stage hands an owned, typed result to the next:
//! tracked faces → eye crops → face gaze → fatigue verdict.

use camera_capture::VideoFrame;
use detection::{FaceBox, FaceId, FaceTracker, FrameDetections, TrackedFace};
use fatigue::{face_ear, BlinkGate, FatigueClassifier, FatigueVerdict, OverallState};
use gaze::{EyeNormalizer, FaceGaze, GazeEstimator, GazeState};
use image::GrayImage;
use inference_engine::{EmotionClass, EmotionModel, EmotionPrediction, HeatmapModel};
use tracing::{debug, warn};

use crate::AppConfig;

pub type DynHeatmapModel = Box<dyn HeatmapModel + Send>;
pub type DynEmotionModel = Box<dyn EmotionModel + Send>;

/// Result of running one frame through the eye pipeline
#[derive(Debug, Clone)]
pub struct FrameOutcome {
    pub frame_index: u64,
    /// Tracked faces, left to right
    pub faces: Vec<TrackedFace>,
    pub gaze: Vec<FaceGaze>,
    /// Emotion label of the primary face, when one could be derived
    pub label: Option<EmotionClass>,
    /// `None` when no face was visible
    pub verdict: Option<FatigueVerdict>,
    pub ear: Option<f64>,
    /// Whether this frame counts as a blink instance
    pub blink: bool,
}

impl FrameOutcome {
    fn no_face(frame_index: u64) -> Self {
        Self {
            frame_index,
            faces: Vec::new(),
            gaze: Vec::new(),
            label: None,
            verdict: None,
            ear: None,
            blink: false,
        }
    }

    /// Overall eye state decided this frame
    pub fn state(&self) -> Option<OverallState> {
        self.verdict.and_then(|v| v.state)
    }
}

/// Session state for the eye pipeline
pub struct EyeSession {
    tracker: FaceTracker,
    normalizer: EyeNormalizer,
    estimator: Option<GazeEstimator<DynHeatmapModel>>,
    emotion: Option<DynEmotionModel>,
    gaze_state: GazeState,
    classifier: FatigueClassifier,
    gate: BlinkGate,
}

impl EyeSession {
    /// Without a heatmap model gaze is not estimated and pitch reads as 0.
    /// Without an emotion model, labels come from the detection record.
    pub fn new(
        config: &AppConfig,
        heatmap: Option<DynHeatmapModel>,
        emotion: Option<DynEmotionModel>,
    ) -> Self {
        Self {
            tracker: FaceTracker::new(config.capture.face_refresh_frames, 0.5),
            normalizer: EyeNormalizer::new(&config.gaze),
            estimator: heatmap.map(|model| GazeEstimator::new(model, config.gaze.clone())),
            emotion,
            gaze_state: GazeState::new(config.gaze.history_capacity),
            classifier: FatigueClassifier::new(&config.fatigue),
            gate: BlinkGate::new(config.blink.ear_threshold),
        }
    }

    /// Whether the detection source should re-run face detection
    pub fn needs_face_refresh(&self, frame_index: u64) -> bool {
        self.tracker.needs_refresh(frame_index)
    }

    pub fn gaze_state(&self) -> &GazeState {
        &self.gaze_state
    }

    pub fn process(&mut self, frame: &VideoFrame, detections: &FrameDetections) -> FrameOutcome {
        let frame_index = u64::from(frame.sequence);
        let faces = self.tracker.update(frame_index, detections.faces.clone()).to_vec();

        let live: Vec<FaceId> = faces.iter().map(|f| f.id).collect();
        self.gaze_state.retain_faces(&live);

        let Some(primary) = faces.last().copied() else {
            debug!("No face detected in frame {}", frame_index);
            return FrameOutcome::no_face(frame_index);
        };

        if detections.landmarks.len() != faces.len() {
            debug!(
                "Frame {}: {} landmark sets for {} faces",
                frame_index,
                detections.landmarks.len(),
                faces.len()
            );
        }

        let gray = frame.to_gray_image();
        let mut gaze = Vec::with_capacity(faces.len());
        let mut eye_index = 0;
        for (face, landmarks) in faces.iter().zip(&detections.landmarks) {
            let crops = self.normalizer.normalize(&gray, landmarks, eye_index);
            eye_index += crops.len();

            let Some(estimator) = &self.estimator else {
                continue;
            };
            if crops.len() != 2 {
                debug!("Face {} has {} usable eyes; skipping gaze", face.id.0, crops.len());
                continue;
            }
            match estimator.estimate(face.id, &crops, &mut self.gaze_state) {
                Ok(face_gaze) => gaze.push(face_gaze),
                Err(e) => warn!("Gaze estimation failed for face {}: {}", face.id.0, e),
            }
        }

        let pitch = gaze
            .iter()
            .find(|g| g.face == primary.id)
            .map(FaceGaze::pitch)
            .unwrap_or(0.0);

        let label = self.emotion_label(&gray, &primary.bbox, detections);
        let verdict = match label {
            Some(label) => self.classifier.update(label, pitch),
            None => self.classifier.no_decision(),
        };

        let ear = detections.landmarks.get(faces.len() - 1).and_then(face_ear);
        let blink = verdict.state.is_some() && self.gate.is_blink(ear, verdict.blink);

        FrameOutcome {
            frame_index,
            faces,
            gaze,
            label,
            verdict: Some(verdict),
            ear,
            blink,
        }
    }

    fn emotion_label(
        &self,
        gray: &GrayImage,
        bbox: &FaceBox,
        detections: &FrameDetections,
    ) -> Option<EmotionClass> {
        if let Some(model) = &self.emotion {
            let face = crop_face(gray, bbox)?;
            return match model.classify(&face) {
                Ok(prediction) => Some(prediction.class),
                Err(e) => {
                    warn!("Emotion model failed: {}", e);
                    None
                }
            };
        }

        let probabilities = detections.emotion.as_ref()?;
        match EmotionPrediction::from_probabilities(probabilities) {
            Ok(prediction) => Some(prediction.class),
            Err(e) => {
                warn!("Discarding emotion probabilities: {}", e);
                None
            }
        }
    }
}

/// Face region clamped to the image; `None` if nothing remains
fn crop_face(gray: &GrayImage, bbox: &FaceBox) -> Option<GrayImage> {
    let (w, h) = gray.dimensions();
    let x0 = bbox.x.max(0.0).floor().min(w as f64) as u32;
    let y0 = bbox.y.max(0.0).floor().min(h as f64) as u32;
    let x1 = (bbox.x + bbox.width).max(0.0).ceil().min(w as f64) as u32;
    let y1 = (bbox.y + bbox.height).max(0.0).ceil().min(h as f64) as u32;

    if x1 <= x0 || y1 <= y0 {
        debug!("Face box {:?} lies outside the frame", bbox);
        return None;
    }
    Some(image::imageops::crop_imm(gray, x0, y0, x1 - x0, y1 - y0).to_image())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use detection::FaceLandmarks;
    use geometry::Point2;
    use image::{Rgb, RgbImage};
    use inference_engine::InferenceError;
    use ndarray::Array4;

    pub(crate) fn frame(sequence: u32) -> VideoFrame {
        let img = RgbImage::from_fn(200, 150, |x, y| {
            let v = ((x * 7 + y * 3) % 256) as u8;
            Rgb([v, v, v])
        });
        VideoFrame::from_rgb(img, 0, sequence)
    }

    /// One face with open eyes (`lid_gap` controls EAR)
    pub(crate) fn landmarks(lid_gap: f64) -> FaceLandmarks {
        let mut pts = vec![Point2::new(100.0, 100.0); 68];
        for (start, x0) in [(36, 60.0), (42, 110.0)] {
            let h = lid_gap / 2.0;
            pts[start] = Point2::new(x0, 70.0);
            pts[start + 1] = Point2::new(x0 + 6.0, 70.0 - h);
            pts[start + 2] = Point2::new(x0 + 14.0, 70.0 - h);
            pts[start + 3] = Point2::new(x0 + 20.0, 70.0);
            pts[start + 4] = Point2::new(x0 + 14.0, 70.0 + h);
            pts[start + 5] = Point2::new(x0 + 6.0, 70.0 + h);
        }
        FaceLandmarks::new(pts).unwrap()
    }

    pub(crate) fn detections(probabilities: Option<Vec<f32>>, lid_gap: f64) -> FrameDetections {
        FrameDetections {
            faces: Some(vec![FaceBox {
                x: 40.0,
                y: 30.0,
                width: 120.0,
                height: 120.0,
            }]),
            landmarks: vec![landmarks(lid_gap)],
            pose: None,
            emotion: probabilities,
        }
    }

    pub(crate) const NORMAL: [f32; 5] = [0.0, 0.1, 0.0, 0.9, 0.0];

    struct CentredModel;

    impl HeatmapModel for CentredModel {
        fn predict(&self, eyes: &Array4<f32>) -> Result<Array4<f32>, InferenceError> {
            let (n, _, h, w) = eyes.dim();
            let mut out = Array4::zeros((n, 18, h, w));
            for i in 0..n {
                out[[i, 16, 24, 32]] = 1.0;
                out[[i, 17, 24, 32]] = 1.0;
            }
            Ok(out)
        }
    }

    struct BrokenEmotion;

    impl EmotionModel for BrokenEmotion {
        fn probabilities(&self, _face: &GrayImage) -> Result<Vec<f32>, InferenceError> {
            Err(InferenceError::InferenceFailed("model offline".into()))
        }
    }

    struct FatigueEmotion;

    impl EmotionModel for FatigueEmotion {
        fn probabilities(&self, face: &GrayImage) -> Result<Vec<f32>, InferenceError> {
            assert_eq!(face.dimensions(), (120, 120));
            Ok(vec![0.0, 1.0, 0.0, 0.0, 0.0])
        }
    }

    fn session(heatmap: Option<DynHeatmapModel>, emotion: Option<DynEmotionModel>) -> EyeSession {
        EyeSession::new(&AppConfig::default(), heatmap, emotion)
    }

    #[test]
    fn test_no_face_is_neutral() {
        let mut s = session(None, None);
        let out = s.process(&frame(0), &FrameDetections::default());
        assert!(out.faces.is_empty());
        assert!(out.verdict.is_none());
        assert!(!out.blink);
    }

    #[test]
    fn test_probabilities_drive_classifier() {
        let mut s = session(None, None);
        let out = s.process(&frame(0), &detections(Some(NORMAL.to_vec()), 8.0));
        assert_eq!(out.label, Some(EmotionClass::Normal));
        assert_eq!(out.state(), Some(OverallState::Normal));
        assert!(out.gaze.is_empty());
        assert!((out.ear.unwrap() - 0.4).abs() < 1e-9);
        assert!(!out.blink);
    }

    #[test]
    fn test_closed_eyes_with_normal_vote_is_blink() {
        let mut s = session(None, None);
        let out = s.process(&frame(0), &detections(Some(NORMAL.to_vec()), 2.0));
        assert!(out.blink);
    }

    #[test]
    fn test_missing_label_is_no_decision() {
        let mut s = session(None, None);
        let out = s.process(&frame(0), &detections(None, 2.0));
        assert_eq!(out.faces.len(), 1);
        assert_eq!(out.state(), None);
        assert!(!out.blink);
    }

    #[test]
    fn test_emotion_model_failure_is_no_decision() {
        let mut s = session(None, Some(Box::new(BrokenEmotion)));
        let out = s.process(&frame(0), &detections(Some(NORMAL.to_vec()), 8.0));
        assert_eq!(out.state(), None);
    }

    #[test]
    fn test_emotion_model_sees_face_crop() {
        let mut s = session(None, Some(Box::new(FatigueEmotion)));
        let out = s.process(&frame(0), &detections(None, 8.0));
        assert_eq!(out.label, Some(EmotionClass::Fatigue));
    }

    #[test]
    fn test_gaze_estimated_per_tracked_face() {
        let mut s = session(Some(Box::new(CentredModel)), None);
        let out = s.process(&frame(0), &detections(Some(NORMAL.to_vec()), 8.0));
        assert_eq!(out.gaze.len(), 1);
        assert_eq!(out.gaze[0].eyes.len(), 2);
        assert_eq!(out.gaze[0].face, out.faces[0].id);
        assert_eq!(s.gaze_state().len(), 2);
    }

    #[test]
    fn test_cached_faces_reused_and_lost_faces_dropped() {
        let mut s = session(Some(Box::new(CentredModel)), None);
        s.process(&frame(0), &detections(Some(NORMAL.to_vec()), 8.0));

        let mut reuse = detections(Some(NORMAL.to_vec()), 8.0);
        reuse.faces = None;
        let out = s.process(&frame(1), &reuse);
        assert_eq!(out.faces.len(), 1);

        let gone = FrameDetections {
            faces: Some(vec![]),
            ..Default::default()
        };
        s.process(&frame(2), &gone);
        assert!(s.gaze_state().is_empty());
    }

    #[test]
    fn test_crop_face_clamps_to_frame() {
        let gray = GrayImage::new(100, 80);
        let bbox = FaceBox {
            x: -10.0,
            y: 60.0,
            width: 50.0,
            height: 50.0,
        };
        assert_eq!(crop_face(&gray, &bbox).unwrap().dimensions(), (40, 20));

        let outside = FaceBox {
            x: 200.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        };
        assert!(crop_face(&gray, &outside).is_none());
    }
}
