//! Per-eye gaze histories

use std::collections::HashMap;

use detection::FaceId;
use ring_buffer::RingBuffer;
use serde::{Deserialize, Serialize};

use crate::EyeSide;

/// Gaze direction in radians
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GazeSample {
    pub pitch: f64,
    pub yaw: f64,
}

impl GazeSample {
    pub fn new(pitch: f64, yaw: f64) -> Self {
        Self { pitch, yaw }
    }
}

/// Recent gaze samples of one eye
#[derive(Debug, Clone)]
pub struct GazeHistory {
    samples: RingBuffer<GazeSample>,
}

impl GazeHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: RingBuffer::new(capacity),
        }
    }

    pub fn push(&mut self, sample: GazeSample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Recency-weighted mean.
    ///
    /// Weights are linearly spaced from 0.1 (oldest) to 1.0 (newest) over the
    /// retained samples. A single sample is returned unchanged.
    pub fn weighted_average(&self) -> Option<GazeSample> {
        let n = self.samples.len();
        match n {
            0 => None,
            1 => self.samples.back().copied(),
            _ => {
                let step = 0.9 / (n - 1) as f64;
                let (mut pitch, mut yaw, mut total) = (0.0, 0.0, 0.0);
                for (i, s) in self.samples.iter().enumerate() {
                    let w = 0.1 + step * i as f64;
                    pitch += w * s.pitch;
                    yaw += w * s.yaw;
                    total += w;
                }
                Some(GazeSample::new(pitch / total, yaw / total))
            }
        }
    }
}

/// Identity of one eye across frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EyeKey {
    pub face: FaceId,
    pub side: EyeSide,
}

/// Gaze histories for every tracked eye
#[derive(Debug, Clone)]
pub struct GazeState {
    capacity: usize,
    histories: HashMap<EyeKey, GazeHistory>,
}

impl GazeState {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            histories: HashMap::new(),
        }
    }

    /// Append a sample and return the eye's smoothed gaze
    pub fn record(&mut self, key: EyeKey, sample: GazeSample) -> GazeSample {
        let history = self
            .histories
            .entry(key)
            .or_insert_with(|| GazeHistory::new(self.capacity));
        history.push(sample);
        history.weighted_average().unwrap_or(sample)
    }

    pub fn history(&self, key: &EyeKey) -> Option<&GazeHistory> {
        self.histories.get(key)
    }

    /// Drop histories of faces that are no longer tracked
    pub fn retain_faces(&mut self, live: &[FaceId]) {
        self.histories.retain(|key, _| live.contains(&key.face));
    }

    pub fn len(&self) -> usize {
        self.histories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }

    pub fn clear(&mut self) {
        self.histories.clear();
    }
}
