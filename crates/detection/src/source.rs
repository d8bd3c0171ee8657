//! Per-frame detection sources

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use camera_capture::VideoFrame;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::{DetectionError, FaceBox, FaceLandmarks, PoseLandmarks};

/// Everything the external detectors produced for one frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameDetections {
    /// Fresh face boxes. `None` means the detector did not run this frame
    /// and the previous detection should be reused; `Some(vec![])` means it
    /// ran and found nobody.
    pub faces: Option<Vec<FaceBox>>,

    /// 68-point landmarks, one entry per tracked face in left-to-right order
    pub landmarks: Vec<FaceLandmarks>,

    /// Pose landmarks, if a body was found
    pub pose: Option<PoseLandmarks>,

    /// Raw emotion-class probabilities for the primary face
    pub emotion: Option<Vec<f32>>,
}

/// Producer of per-frame detections.
///
/// `refresh_faces` is a hint that cached face boxes are stale; sources that
/// run a detector lazily should run it for this frame.
pub trait DetectionSource {
    fn next(
        &mut self,
        frame: &VideoFrame,
        refresh_faces: bool,
    ) -> Result<FrameDetections, DetectionError>;
}

/// Replays detections recorded as one JSON object per line
pub struct JsonlDetections {
    lines: Lines<BufReader<File>>,
    line_no: usize,
}

impl JsonlDetections {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DetectionError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| DetectionError::Open(format!("{}: {}", path.display(), e)))?;
        info!("Replaying detections from {}", path.display());
        Ok(Self {
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }

    /// Parse a single record
    pub fn parse_record(line: &str, line_no: usize) -> Result<FrameDetections, DetectionError> {
        serde_json::from_str(line).map_err(|e| DetectionError::Parse {
            line: line_no,
            reason: e.to_string(),
        })
    }
}

impl DetectionSource for JsonlDetections {
    fn next(
        &mut self,
        frame: &VideoFrame,
        refresh_faces: bool,
    ) -> Result<FrameDetections, DetectionError> {
        loop {
            let Some(line) = self.lines.next() else {
                debug!("Detection log exhausted at frame {}", frame.sequence);
                return Ok(FrameDetections::default());
            };
            self.line_no += 1;
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let record = Self::parse_record(&line, self.line_no)?;
            if refresh_faces && record.faces.is_none() {
                trace!("Refresh requested but record {} carries no faces", self.line_no);
            }
            return Ok(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn landmarks_json() -> String {
        let pts: Vec<String> = (0..68).map(|i| format!("[{}.0, {}.0]", i, i)).collect();
        format!("[{}]", pts.join(","))
    }

    fn frame() -> VideoFrame {
        VideoFrame::new(vec![0; 3], 1, 1, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_full_record() {
        let line = format!(
            r#"{{"faces":[{{"x":1,"y":2,"width":30,"height":40}}],"landmarks":[{}],{}}}"#,
            landmarks_json(),
            r#""emotion":[0.1,0.6,0.1,0.1,0.1]"#
        );
        let record = JsonlDetections::parse_record(&line, 1).unwrap();
        assert_eq!(record.faces.as_ref().map(Vec::len), Some(1));
        assert_eq!(record.landmarks.len(), 1);
        assert_eq!(record.landmarks[0].point(67).x, 67.0);
        assert!(record.pose.is_none());
        assert_eq!(record.emotion.as_ref().map(Vec::len), Some(5));
    }

    #[test]
    fn test_missing_faces_means_reuse() {
        let record = JsonlDetections::parse_record("{}", 1).unwrap();
        assert!(record.faces.is_none());

        let record = JsonlDetections::parse_record(r#"{"faces":[]}"#, 2).unwrap();
        assert_eq!(record.faces, Some(vec![]));
    }

    #[test]
    fn test_short_landmark_array_rejected() {
        let err = JsonlDetections::parse_record(r#"{"landmarks":[[[0,0],[1,1]]]}"#, 7).unwrap_err();
        assert!(matches!(err, DetectionError::Parse { line: 7, .. }));
    }

    #[test]
    fn test_replay_skips_blank_lines_and_ends_empty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"faces":[]}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"pose":null}}"#).unwrap();

        let mut source = JsonlDetections::open(file.path()).unwrap();
        assert_eq!(source.next(&frame(), true).unwrap().faces, Some(vec![]));
        assert!(source.next(&frame(), false).unwrap().faces.is_none());
        let exhausted = source.next(&frame(), false).unwrap();
        assert!(exhausted.faces.is_none() && exhausted.landmarks.is_empty());
    }
}
