//! Face tracking across frames
//!
//! Face boxes come from a detector that may only run every few frames. The
//! tracker caches the last boxes, orders them left to right, and carries a
//! stable `FaceId` across detections by nearest-centroid matching so that
//! per-eye temporal state does not swap between people.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::FaceBox;

/// Stable identity of a tracked face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FaceId(pub u32);

/// A face box with its track identity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackedFace {
    pub id: FaceId,
    pub bbox: FaceBox,
}

/// Nearest-centroid face tracker with cached detections
#[derive(Debug)]
pub struct FaceTracker {
    /// Frames after which cached boxes are considered stale
    refresh_interval: u64,
    /// Max centroid shift, as a fraction of the previous box width
    max_shift_ratio: f64,
    tracks: Vec<TrackedFace>,
    last_refresh: Option<u64>,
    next_id: u32,
}

impl Default for FaceTracker {
    fn default() -> Self {
        Self::new(60, 0.5)
    }
}

impl FaceTracker {
    pub fn new(refresh_interval: u64, max_shift_ratio: f64) -> Self {
        Self {
            refresh_interval,
            max_shift_ratio,
            tracks: Vec::new(),
            last_refresh: None,
            next_id: 0,
        }
    }

    /// Whether the next frame should carry a fresh detection
    pub fn needs_refresh(&self, frame_index: u64) -> bool {
        match self.last_refresh {
            None => true,
            Some(at) => frame_index.saturating_sub(at) >= self.refresh_interval,
        }
    }

    /// Current tracks, ordered left to right
    pub fn tracks(&self) -> &[TrackedFace] {
        &self.tracks
    }

    /// Fold a frame's detection result into the tracker.
    ///
    /// `None` keeps the cached tracks; an empty list clears them.
    pub fn update(&mut self, frame_index: u64, fresh: Option<Vec<FaceBox>>) -> &[TrackedFace] {
        let Some(mut boxes) = fresh else {
            return &self.tracks;
        };

        if boxes.is_empty() {
            if !self.tracks.is_empty() {
                debug!("Lost {} tracked face(s) at frame {}", self.tracks.len(), frame_index);
            }
            self.tracks.clear();
            self.last_refresh = None;
            return &self.tracks;
        }

        boxes.sort_by(|a, b| a.x.total_cmp(&b.x));

        let mut unmatched: Vec<TrackedFace> = std::mem::take(&mut self.tracks);
        let mut tracks = Vec::with_capacity(boxes.len());
        for bbox in boxes {
            let id = match self.take_nearest(&mut unmatched, &bbox) {
                Some(prev) => prev.id,
                None => {
                    let id = FaceId(self.next_id);
                    self.next_id = self.next_id.wrapping_add(1);
                    debug!("New face track {:?} at frame {}", id, frame_index);
                    id
                }
            };
            tracks.push(TrackedFace { id, bbox });
        }

        self.tracks = tracks;
        self.last_refresh = Some(frame_index);
        &self.tracks
    }

    fn take_nearest(
        &self,
        candidates: &mut Vec<TrackedFace>,
        bbox: &FaceBox,
    ) -> Option<TrackedFace> {
        let centre = bbox.center();
        let (idx, dist) = candidates
            .iter()
            .enumerate()
            .map(|(i, t)| (i, t.bbox.center().distance(&centre)))
            .min_by(|a, b| a.1.total_cmp(&b.1))?;

        let limit = candidates[idx].bbox.width * self.max_shift_ratio;
        (dist <= limit).then(|| candidates.remove(idx))
    }

    pub fn reset(&mut self) {
        self.tracks.clear();
        self.last_refresh = None;
    }
}
