//! Geometry Utilities
//!
//! Pure numeric helpers shared by the vision pipeline:
//! - 2D / 3D points and distances
//! - 3x3 homogeneous affine matrices (translate, rotate, scale)
//! - The composite eye transform and its algebraic inverse

mod affine;
mod point;

pub use affine::{Affine, EyeTransform};
pub use point::{Point2, Point3};
