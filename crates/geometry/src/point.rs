//! Point types

use serde::{Deserialize, Serialize};

/// 2D point in pixel or crop space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point2) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Midpoint between two points
    pub fn midpoint(&self, other: &Point2) -> Point2 {
        Point2::new(0.5 * (self.x + other.x), 0.5 * (self.y + other.y))
    }
}

impl From<(f64, f64)> for Point2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// 3D point in normalized pose-landmark space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Manhattan (L1) distance: |dx| + |dy| + |dz|
    pub fn l1_distance(&self, other: &Point3) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs() + (self.z - other.z).abs()
    }
}

impl From<(f64, f64, f64)> for Point3 {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Self { x, y, z }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_midpoint() {
        let m = Point2::new(2.0, 4.0).midpoint(&Point2::new(4.0, 8.0));
        assert_eq!(m, Point2::new(3.0, 6.0));
    }

    #[test]
    fn test_l1_distance() {
        let a = Point3::new(0.5, 0.5, 0.0);
        let b = Point3::new(0.6, 0.3, -0.1);
        assert!((a.l1_distance(&b) - 0.4).abs() < 1e-12);
    }
}
