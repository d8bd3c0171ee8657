use criterion::{black_box, criterion_group, criterion_main, Criterion};
use detection::{FaceId, FaceLandmarks};
use gaze::{EyeNormalizer, GazeConfig, GazeEstimator, GazeState};
use geometry::Point2;
use image::{GrayImage, Luma};
use inference_engine::{HeatmapModel, InferenceError};
use ndarray::Array4;

/// Constant-output model so the bench measures the pipeline, not a network
struct FlatModel;

impl HeatmapModel for FlatModel {
    fn predict(&self, eyes: &Array4<f32>) -> Result<Array4<f32>, InferenceError> {
        let (n, _, h, w) = eyes.dim();
        Ok(Array4::from_elem((n, 18, h, w), 0.5))
    }
}

fn landmarks() -> FaceLandmarks {
    let mut pts = vec![Point2::new(320.0, 260.0); 68];
    pts[36] = Point2::new(250.0, 200.0);
    pts[39] = Point2::new(290.0, 204.0);
    pts[42] = Point2::new(350.0, 204.0);
    pts[45] = Point2::new(390.0, 199.0);
    FaceLandmarks::new(pts).expect("68 landmarks")
}

fn bench_normalize(c: &mut Criterion) {
    let gray = GrayImage::from_fn(720, 480, |x, y| Luma([((x ^ y) & 0xff) as u8]));
    let lm = landmarks();
    let normalizer = EyeNormalizer::new(&GazeConfig::default());

    c.bench_function("eye_normalize", |b| {
        b.iter(|| normalizer.normalize(black_box(&gray), black_box(&lm), 0))
    });
}

fn bench_estimate(c: &mut Criterion) {
    let gray = GrayImage::from_fn(720, 480, |x, y| Luma([((x ^ y) & 0xff) as u8]));
    let crops = EyeNormalizer::new(&GazeConfig::default()).normalize(&gray, &landmarks(), 0);
    let estimator = GazeEstimator::new(FlatModel, GazeConfig::default());
    let mut state = GazeState::new(10);

    c.bench_function("gaze_estimate", |b| {
        b.iter(|| estimator.estimate(FaceId(0), black_box(&crops), &mut state))
    });
}

criterion_group!(benches, bench_normalize, bench_estimate);
criterion_main!(benches);
