//! tract-onnx model backends

use std::path::Path;

use image::imageops::FilterType;
use image::GrayImage;
use ndarray::Array4;
use tracing::{debug, info};
use tract_onnx::prelude::*;

use crate::emotion::EmotionModel;
use crate::InferenceError;

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>;

/// Side length of the square face crop fed to the emotion model
pub const FACE_INPUT_SIZE: u32 = 48;

/// Landmark heatmap model over a stacked eye pair.
///
/// Input is `[eyes, 1, height, width]`; output is `[eyes, channels, h, w]`
/// holding the final refinement stage only.
pub trait HeatmapModel {
    fn predict(&self, eyes: &Array4<f32>) -> Result<Array4<f32>, InferenceError>;
}

impl<M: HeatmapModel + ?Sized> HeatmapModel for Box<M> {
    fn predict(&self, eyes: &Array4<f32>) -> Result<Array4<f32>, InferenceError> {
        (**self).predict(eyes)
    }
}

fn load_plan(path: &Path, input_shape: [usize; 4]) -> Result<OnnxPlan, InferenceError> {
    info!("Loading ONNX model from {} (input {:?})", path.display(), input_shape);
    tract_onnx::onnx()
        .model_for_path(path)
        .and_then(|model| model.with_input_fact(0, f32::fact(input_shape).into()))
        .and_then(|model| model.into_optimized())
        .and_then(|model| model.into_runnable())
        .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))
}

fn run_plan(
    plan: &OnnxPlan,
    shape: &[usize],
    data: &[f32],
) -> Result<TVec<TValue>, InferenceError> {
    let input = Tensor::from_shape(shape, data).map_err(|e| InferenceError::InvalidInputShape {
        expected: format!("{} values", shape.iter().product::<usize>()),
        actual: format!("{} ({})", data.len(), e),
    })?;

    let start = std::time::Instant::now();
    let outputs = plan
        .run(tvec!(input.into()))
        .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;
    debug!("Inference completed in {}ms", start.elapsed().as_millis());
    Ok(outputs)
}

/// Flatten an output tensor to (shape, values)
fn output_values(value: &TValue) -> Result<(Vec<usize>, Vec<f32>), InferenceError> {
    let view = value
        .to_array_view::<f32>()
        .map_err(|e| InferenceError::InvalidOutput(e.to_string()))?;
    Ok((view.shape().to_vec(), view.iter().copied().collect()))
}

/// Select the final refinement stage from raw heatmap outputs.
///
/// Stacked-hourglass exports either emit one output per stage or a single
/// `[stages, eyes, channels, h, w]` tensor; both collapse to the last stage.
fn last_stage(shape: &[usize], values: Vec<f32>) -> Result<Array4<f32>, InferenceError> {
    let (dims, values) = match *shape {
        [n, c, h, w] => ((n, c, h, w), values),
        [stages, n, c, h, w] if stages > 0 => {
            let per_stage = n * c * h * w;
            ((n, c, h, w), values[(stages - 1) * per_stage..].to_vec())
        }
        _ => {
            return Err(InferenceError::InvalidOutput(format!(
                "unexpected heatmap shape {:?}",
                shape
            )))
        }
    };
    Array4::from_shape_vec(dims, values).map_err(|e| InferenceError::InvalidOutput(e.to_string()))
}

/// Heatmap model backed by an ONNX graph
pub struct OnnxHeatmapModel {
    plan: OnnxPlan,
    input_shape: [usize; 4],
}

impl OnnxHeatmapModel {
    /// Load a model expecting `[2, 1, height, width]` eye stacks
    pub fn load(
        path: impl AsRef<Path>,
        height: usize,
        width: usize,
    ) -> Result<Self, InferenceError> {
        let input_shape = [2, 1, height, width];
        Ok(Self {
            plan: load_plan(path.as_ref(), input_shape)?,
            input_shape,
        })
    }
}

impl HeatmapModel for OnnxHeatmapModel {
    fn predict(&self, eyes: &Array4<f32>) -> Result<Array4<f32>, InferenceError> {
        if eyes.shape() != &self.input_shape[..] {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("{:?}", self.input_shape),
                actual: format!("{:?}", eyes.shape()),
            });
        }

        let data: Vec<f32> = eyes.iter().copied().collect();
        let outputs = run_plan(&self.plan, &self.input_shape, &data)?;
        let last = outputs
            .last()
            .ok_or_else(|| InferenceError::InvalidOutput("model produced no outputs".into()))?;
        let (shape, values) = output_values(last)?;
        last_stage(&shape, values)
    }
}

/// Resize a face crop to 48x48 and scale intensities to [0, 1]
pub fn preprocess_face(face: &GrayImage) -> Vec<f32> {
    let resized =
        image::imageops::resize(face, FACE_INPUT_SIZE, FACE_INPUT_SIZE, FilterType::Triangle);
    resized.pixels().map(|p| p.0[0] as f32 / 255.0).collect()
}

/// Emotion classifier backed by an ONNX graph (NHWC input, `[1, 5]` output)
pub struct OnnxEmotionModel {
    plan: OnnxPlan,
}

impl OnnxEmotionModel {
    const INPUT_SHAPE: [usize; 4] = [1, FACE_INPUT_SIZE as usize, FACE_INPUT_SIZE as usize, 1];

    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        Ok(Self {
            plan: load_plan(path.as_ref(), Self::INPUT_SHAPE)?,
        })
    }
}

impl EmotionModel for OnnxEmotionModel {
    fn probabilities(&self, face: &GrayImage) -> Result<Vec<f32>, InferenceError> {
        if face.width() == 0 || face.height() == 0 {
            return Err(InferenceError::InvalidInputShape {
                expected: "non-empty face crop".into(),
                actual: format!("{}x{}", face.width(), face.height()),
            });
        }

        let input = preprocess_face(face);
        let outputs = run_plan(&self.plan, &Self::INPUT_SHAPE, &input)?;
        let first = outputs
            .first()
            .ok_or_else(|| InferenceError::InvalidOutput("model produced no outputs".into()))?;
        let (_, values) = output_values(first)?;
        Ok(values)
    }
}
