//! Homogeneous 2D affine transforms

use std::ops::Mul;

use serde::{Deserialize, Serialize};

use crate::Point2;

/// 3x3 homogeneous transform matrix (row-major)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Affine {
    pub m: [[f64; 3]; 3],
}

impl Default for Affine {
    fn default() -> Self {
        Self::identity()
    }
}

impl Affine {
    pub const fn identity() -> Self {
        Self {
            m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Translation by (tx, ty)
    pub fn translation(tx: f64, ty: f64) -> Self {
        let mut a = Self::identity();
        a.m[0][2] = tx;
        a.m[1][2] = ty;
        a
    }

    /// Counter-clockwise rotation by `theta` radians
    pub fn rotation(theta: f64) -> Self {
        let (sin, cos) = theta.sin_cos();
        let mut a = Self::identity();
        a.m[0][0] = cos;
        a.m[0][1] = -sin;
        a.m[1][0] = sin;
        a.m[1][1] = cos;
        a
    }

    /// Uniform scale
    pub fn scale(s: f64) -> Self {
        let mut a = Self::identity();
        a.m[0][0] = s;
        a.m[1][1] = s;
        a
    }

    pub fn transpose(&self) -> Self {
        let mut t = Self::identity();
        for (r, row) in self.m.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                t.m[c][r] = *v;
            }
        }
        t
    }

    /// Apply to a single point (homogeneous pad, multiply, drop w)
    pub fn apply(&self, p: Point2) -> Point2 {
        let m = &self.m;
        Point2::new(
            m[0][0] * p.x + m[0][1] * p.y + m[0][2],
            m[1][0] * p.x + m[1][1] * p.y + m[1][2],
        )
    }

    /// Apply to a set of points
    pub fn apply_all(&self, points: &[Point2]) -> Vec<Point2> {
        points.iter().map(|p| self.apply(*p)).collect()
    }

    /// Row-major `f32` form expected by image warping routines
    pub fn to_f32_row_major(&self) -> [f32; 9] {
        let mut out = [0.0f32; 9];
        for (i, v) in self.m.iter().flatten().enumerate() {
            out[i] = *v as f32;
        }
        out
    }
}

impl Mul for Affine {
    type Output = Affine;

    fn mul(self, rhs: Affine) -> Affine {
        let mut out = [[0.0; 3]; 3];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.m[r][k] * rhs.m[k][c]).sum();
            }
        }
        Affine { m: out }
    }
}

/// Transform taking an eye region of the source frame onto a fixed canvas,
/// together with its inverse.
///
/// Forward is `center · scale · rotate · translate`; the inverse is built
/// from the inverted parts in reverse order rather than by matrix inversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeTransform {
    pub forward: Affine,
    pub inverse: Affine,
}

impl EyeTransform {
    /// Build the transform for an eye centred at `center` with the given roll
    /// and width. Returns `None` for a zero or non-finite width.
    pub fn new(
        center: Point2,
        roll: f64,
        eye_width: f64,
        canvas_w: u32,
        canvas_h: u32,
    ) -> Option<Self> {
        if !(eye_width.is_finite() && eye_width > 0.0) {
            return None;
        }

        let translate = Affine::translation(-center.x, -center.y);
        let inv_translate = Affine::translation(center.x, center.y);

        let rotate = Affine::rotation(-roll);
        let inv_rotate = rotate.transpose();

        let scale = canvas_w as f64 / eye_width;
        let scale_mat = Affine::scale(scale);
        let inv_scale_mat = Affine::scale(1.0 / scale);

        let half_w = 0.5 * canvas_w as f64;
        let half_h = 0.5 * canvas_h as f64;
        let centre = Affine::translation(half_w, half_h);
        let inv_centre = Affine::translation(-half_w, -half_h);

        Some(Self {
            forward: centre * scale_mat * rotate * translate,
            inverse: inv_translate * inv_rotate * inv_scale_mat * inv_centre,
        })
    }
}
