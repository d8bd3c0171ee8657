//! Emotion class vocabulary and predictions

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::InferenceError;

/// Class predicted by the emotion model, in model output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmotionClass {
    None,
    Fatigue,
    Glare,
    Normal,
    Squint,
}

impl EmotionClass {
    /// All classes, indexed like the model's output vector
    pub const ALL: [EmotionClass; 5] = [
        EmotionClass::None,
        EmotionClass::Fatigue,
        EmotionClass::Glare,
        EmotionClass::Normal,
        EmotionClass::Squint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionClass::None => "None",
            EmotionClass::Fatigue => "Fatigue",
            EmotionClass::Glare => "Glare",
            EmotionClass::Normal => "Normal",
            EmotionClass::Squint => "Squint",
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Prediction result from the emotion classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionPrediction {
    /// Arg-max class
    pub class: EmotionClass,
    /// Probability of the arg-max class
    pub confidence: f32,
    /// Probabilities for each class
    pub probabilities: [f32; 5],
}

impl EmotionPrediction {
    /// Pick the most likely class; the first index wins on ties
    pub fn from_probabilities(probabilities: &[f32]) -> Result<Self, InferenceError> {
        let probabilities: [f32; 5] = probabilities.try_into().map_err(|_| {
            InferenceError::InvalidOutput(format!(
                "expected {} class probabilities, got {}",
                EmotionClass::ALL.len(),
                probabilities.len()
            ))
        })?;

        if probabilities.iter().any(|p| !p.is_finite()) {
            return Err(InferenceError::InvalidOutput("non-finite class probability".into()));
        }

        let mut best = 0;
        for (i, p) in probabilities.iter().enumerate().skip(1) {
            if *p > probabilities[best] {
                best = i;
            }
        }

        Ok(Self {
            class: EmotionClass::ALL[best],
            confidence: probabilities[best],
            probabilities,
        })
    }
}

/// Emotion classifier over a grayscale face crop
pub trait EmotionModel {
    /// Raw class probabilities in [`EmotionClass::ALL`] order
    fn probabilities(&self, face: &GrayImage) -> Result<Vec<f32>, InferenceError>;

    fn classify(&self, face: &GrayImage) -> Result<EmotionPrediction, InferenceError> {
        EmotionPrediction::from_probabilities(&self.probabilities(face)?)
    }
}
