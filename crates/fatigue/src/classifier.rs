//! Windowed fatigue classifier

use inference_engine::EmotionClass;
use ring_buffer::RingBuffer;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::FatigueConfig;

/// Stable eye-strain state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverallState {
    Normal,
    Fatigue,
}

impl OverallState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallState::Normal => "Normal",
            OverallState::Fatigue => "Fatigue",
        }
    }
}

/// Classifier output for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FatigueVerdict {
    /// Whether an EAR dip this frame may count as a blink
    pub blink: bool,
    /// `None` when no decision was made this frame
    pub state: Option<OverallState>,
}

/// Label vote with plurality smoothing and a look-down override
#[derive(Debug)]
pub struct FatigueClassifier {
    labels: RingBuffer<EmotionClass>,
    smoothed: RingBuffer<OverallState>,
    threshold: usize,
    look_down_pitch: f64,
    last_blink: bool,
}

impl FatigueClassifier {
    pub fn new(config: &FatigueConfig) -> Self {
        Self {
            labels: RingBuffer::new(config.label_window),
            smoothed: RingBuffer::new(config.smoothing_window),
            threshold: config.vote_threshold(),
            look_down_pitch: config.look_down_pitch,
            last_blink: false,
        }
    }

    fn is_negative(label: &EmotionClass) -> bool {
        matches!(
            label,
            EmotionClass::Fatigue | EmotionClass::Squint | EmotionClass::Glare | EmotionClass::None
        )
    }

    /// Feed one frame's label and face pitch
    pub fn update(&mut self, label: EmotionClass, pitch: f64) -> FatigueVerdict {
        self.labels.push(label);

        let negatives = self.labels.count_where(Self::is_negative);
        let (mut state, blink) = if negatives > self.threshold {
            (OverallState::Fatigue, false)
        } else {
            (OverallState::Normal, true)
        };

        self.smoothed.push(state);
        if self.smoothed.is_full() {
            if let Some(plurality) = self.smoothed.mode() {
                state = *plurality;
            }
        }

        if pitch < self.look_down_pitch {
            state = OverallState::Normal;
        }

        trace!("Label {} → {} ({} negative)", label.as_str(), state.as_str(), negatives);
        self.last_blink = blink;
        FatigueVerdict {
            blink,
            state: Some(state),
        }
    }

    /// Frame without a usable label: windows stay untouched
    pub fn no_decision(&self) -> FatigueVerdict {
        FatigueVerdict {
            blink: self.last_blink,
            state: None,
        }
    }

    /// Labels currently in the vote window
    pub fn window_len(&self) -> usize {
        self.labels.len()
    }

    pub fn reset(&mut self) {
        self.labels.clear();
        self.smoothed.clear();
        self.last_blink = false;
    }
}
