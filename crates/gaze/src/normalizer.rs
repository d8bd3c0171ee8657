//! Eye normalization
//!
//! Each eye is centred on its corner midpoint, rotated upright, scaled so the
//! eye spans half the canvas width, and resampled into a fixed-size crop.
//! The left crop is mirrored so both eyes reach the model in the same
//! orientation; the inverse transform is kept to map model output back.

use detection::FaceLandmarks;
use geometry::{Affine, EyeTransform};
use image::{GrayImage, Luma};
use imageproc::contrast::equalize_histogram;
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::GazeConfig;

/// Which eye a crop was taken from, in image orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EyeSide {
    /// Landmarks 36-41, image-left (the subject's right eye)
    Left,
    /// Landmarks 42-47, image-right
    Right,
}

impl EyeSide {
    /// Outer/inner corner landmark indices
    pub fn corners(&self) -> (usize, usize) {
        match self {
            EyeSide::Left => (36, 39),
            EyeSide::Right => (42, 45),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EyeSide::Left => "left",
            EyeSide::Right => "right",
        }
    }
}

/// Normalized eye image ready for the heatmap model
#[derive(Debug, Clone)]
pub struct EyeCrop {
    /// Equalized intensities in [0, 1], `crop_height x crop_width`
    pub image: Array2<f32>,
    /// Crop space → frame space
    pub inverse_transform: Affine,
    pub side: EyeSide,
    /// Position of this crop within the frame's crops
    pub eye_index: usize,
}

impl EyeCrop {
    pub fn width(&self) -> usize {
        self.image.ncols()
    }
}

/// Produces canonical eye crops from a face's landmarks
#[derive(Debug, Clone)]
pub struct EyeNormalizer {
    width: u32,
    height: u32,
}

impl EyeNormalizer {
    pub fn new(config: &GazeConfig) -> Self {
        Self {
            width: config.crop_width,
            height: config.crop_height,
        }
    }

    /// Crop both eyes of one face.
    ///
    /// Eyes with zero width or a singular transform are skipped. Indices
    /// start at `first_index` and follow encounter order (left, then right).
    pub fn normalize(
        &self,
        gray: &GrayImage,
        landmarks: &FaceLandmarks,
        first_index: usize,
    ) -> Vec<EyeCrop> {
        let mut crops = Vec::with_capacity(2);
        for side in [EyeSide::Left, EyeSide::Right] {
            if let Some(crop) = self.crop_eye(gray, landmarks, side, first_index + crops.len()) {
                crops.push(crop);
            }
        }
        crops
    }

    fn crop_eye(
        &self,
        gray: &GrayImage,
        landmarks: &FaceLandmarks,
        side: EyeSide,
        eye_index: usize,
    ) -> Option<EyeCrop> {
        let (c1, c2) = side.corners();
        let p1 = landmarks.point(c1);
        let p2 = landmarks.point(c2);

        let eye_width = 2.0 * p1.distance(&p2);
        if eye_width == 0.0 {
            debug!("Skipping {} eye: zero width", side.as_str());
            return None;
        }

        let center = p1.midpoint(&p2);
        let roll = if p1.x == p2.x {
            0.0
        } else {
            ((p2.y - p1.y) / (p2.x - p1.x)).atan()
        };

        let transform = EyeTransform::new(center, roll, eye_width, self.width, self.height)?;
        let Some(projection) = Projection::from_matrix(transform.forward.to_f32_row_major()) else {
            debug!("Skipping {} eye: singular transform", side.as_str());
            return None;
        };

        let mut warped = GrayImage::new(self.width, self.height);
        warp_into(gray, &projection, Interpolation::Bilinear, Luma([0u8]), &mut warped);

        let mut equalized = equalize_histogram(&warped);
        if side == EyeSide::Left {
            image::imageops::flip_horizontal_in_place(&mut equalized);
        }

        trace!(
            "Cropped {} eye at ({:.1}, {:.1}) roll {:.3}",
            side.as_str(),
            center.x,
            center.y,
            roll
        );
        Some(EyeCrop {
            image: to_unit_array(&equalized),
            inverse_transform: transform.inverse,
            side,
            eye_index,
        })
    }
}

fn to_unit_array(img: &GrayImage) -> Array2<f32> {
    let (w, h) = img.dimensions();
    Array2::from_shape_fn((h as usize, w as usize), |(y, x)| {
        img.get_pixel(x as u32, y as u32).0[0] as f32 / 255.0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geometry::Point2;

    /// Landmarks with both eyes placed horizontally at the given corners
    fn face_with_eyes(left: (Point2, Point2), right: (Point2, Point2)) -> FaceLandmarks {
        let mut pts = vec![Point2::new(100.0, 100.0); 68];
        pts[36] = left.0;
        pts[39] = left.1;
        pts[42] = right.0;
        pts[45] = right.1;
        FaceLandmarks::new(pts).unwrap()
    }

    fn gradient_image() -> GrayImage {
        GrayImage::from_fn(200, 150, |x, y| Luma([((x + y) % 256) as u8]))
    }

    #[test]
    fn test_two_crops_in_encounter_order() {
        let lm = face_with_eyes(
            (Point2::new(60.0, 70.0), Point2::new(80.0, 70.0)),
            (Point2::new(110.0, 70.0), Point2::new(130.0, 70.0)),
        );
        let crops = EyeNormalizer::new(&GazeConfig::default()).normalize(&gradient_image(), &lm, 0);

        assert_eq!(crops.len(), 2);
        assert_eq!(crops[0].side, EyeSide::Left);
        assert_eq!(crops[0].eye_index, 0);
        assert_eq!(crops[1].side, EyeSide::Right);
        assert_eq!(crops[1].eye_index, 1);
        assert_eq!(crops[0].image.dim(), (48, 64));
        assert!(crops[1].image.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_zero_width_eye_is_skipped() {
        let same = Point2::new(60.0, 70.0);
        let lm = face_with_eyes(
            (same, same),
            (Point2::new(110.0, 70.0), Point2::new(130.0, 70.0)),
        );
        let crops = EyeNormalizer::new(&GazeConfig::default()).normalize(&gradient_image(), &lm, 4);

        assert_eq!(crops.len(), 1);
        assert_eq!(crops[0].side, EyeSide::Right);
        assert_eq!(crops[0].eye_index, 4);
    }

    #[test]
    fn test_vertical_eye_has_zero_roll() {
        let lm = face_with_eyes(
            (Point2::new(60.0, 60.0), Point2::new(60.0, 80.0)),
            (Point2::new(110.0, 70.0), Point2::new(130.0, 70.0)),
        );
        let crops = EyeNormalizer::new(&GazeConfig::default()).normalize(&gradient_image(), &lm, 0);
        assert_eq!(crops.len(), 2);

        // Zero roll: the canvas centre maps back to the corner midpoint with
        // pure scaling, so the crop's x axis stays aligned with the frame's.
        let centre = crops[0].inverse_transform.apply(Point2::new(32.0, 24.0));
        assert!((centre.x - 60.0).abs() < 1e-9 && (centre.y - 70.0).abs() < 1e-9);
        let right = crops[0].inverse_transform.apply(Point2::new(64.0, 24.0));
        assert!((right.y - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_left_crop_is_mirrored() {
        // Bright on the image-left half only
        let img = GrayImage::from_fn(200, 150, |x, _| Luma([if x < 70 { 255 } else { 0 }]));
        let lm = face_with_eyes(
            (Point2::new(60.0, 70.0), Point2::new(80.0, 70.0)),
            (Point2::new(60.0, 70.0), Point2::new(80.0, 70.0)),
        );
        let crops = EyeNormalizer::new(&GazeConfig::default()).normalize(&img, &lm, 0);
        let (left, right) = (&crops[0].image, &crops[1].image);

        // Same region, mirrored: bright side flips between the two crops
        assert!(right[[24, 5]] > right[[24, 58]]);
        assert!(left[[24, 58]] > left[[24, 5]]);
    }
}
