//! Heatmap landmark extraction

use geometry::Point2;
use ndarray::{ArrayView2, ArrayView4, Axis};

use crate::GazeError;

/// Landmark channels produced per eye
pub const LANDMARK_CHANNELS: usize = 18;
/// Channel holding the iris centre
pub const IRIS_CENTRE: usize = 16;
/// Channel holding the eyeball centre
pub const EYEBALL_CENTRE: usize = 17;

/// Location `(x, y)` of the global maximum of one heatmap channel.
///
/// Scans row-major and keeps the first maximum; NaN cells never win.
pub fn peak_location(channel: ArrayView2<'_, f32>) -> (usize, usize) {
    let mut best = (0, 0);
    let mut best_val = f32::NEG_INFINITY;
    for ((y, x), v) in channel.indexed_iter() {
        if *v > best_val {
            best_val = *v;
            best = (x, y);
        }
    }
    best
}

/// Per-eye landmarks in crop coordinates.
///
/// `heatmaps` is `[eyes, channels, h, w]`. Peak positions are rescaled to a
/// `crop_width x crop_height` crop when the heatmap resolution differs.
pub fn extract_landmarks(
    heatmaps: ArrayView4<'_, f32>,
    crop_width: u32,
    crop_height: u32,
) -> Result<Vec<Vec<Point2>>, GazeError> {
    let (_, channels, h, w) = heatmaps.dim();
    if channels < LANDMARK_CHANNELS || h == 0 || w == 0 {
        return Err(GazeError::HeatmapShape(format!("{:?}", heatmaps.shape())));
    }

    let sx = crop_width as f64 / w as f64;
    let sy = crop_height as f64 / h as f64;

    Ok(heatmaps
        .axis_iter(Axis(0))
        .map(|eye| {
            eye.axis_iter(Axis(0))
                .take(LANDMARK_CHANNELS)
                .map(|channel| {
                    let (x, y) = peak_location(channel);
                    Point2::new(x as f64 * sx, y as f64 * sy)
                })
                .collect()
        })
        .collect())
}
