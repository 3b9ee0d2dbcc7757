//! Geometry primitives for toolpath trees.
//!
//! This module provides the fundamental geometric types the extrusion tree is built on:
//! - [`Point`] - 2D point with integer coordinates (scaled)
//! - [`Vec3`] - 3D vector with floating-point coordinates (unscaled)
//! - [`Line`] and [`Linef3`] - 2D and 3D line segments
//! - [`Polyline`] - Open path (centerline of an extrusion)
//! - [`Polygon`] - Closed contour (coverage of an extrusion)
//! - [`Transform3D`] - Affine transform applied to 3D lines
//!
//! ## Coordinate System
//!
//! Coordinates are scaled by `SCALING_FACTOR` (1,000,000), so 1 unit = 1 nanometer.
//!
//! - Use `scale()` / `scaled()` to convert from mm to internal units
//! - Use `unscale()` / `unscaled()` to convert from internal units to mm

mod line;
mod point;
mod polygon;
mod polyline;
mod transform;

pub use line::{Line, Linef3, Lines};
pub use point::{Point, Points, Vec3};
pub use polygon::{Polygon, Polygons};
pub use polyline::{Polyline, Polylines};
pub use transform::Transform3D;

use crate::{CoordF, EPSILON};
use std::f64::consts::PI;

/// Calculate the cross product of two 2D vectors (returns a scalar).
/// This is useful for determining the orientation of three points.
#[inline]
pub fn cross2(v1: Point, v2: Point) -> i128 {
    v1.cross(&v2)
}

/// Calculate the cross product of two 2D vectors (floating-point version).
#[inline]
pub fn cross2f(v1: (CoordF, CoordF), v2: (CoordF, CoordF)) -> CoordF {
    v1.0 * v2.1 - v1.1 * v2.0
}

/// True if two undirected bearings agree within `max_diff + EPSILON`,
/// treating angles PI apart as parallel.
pub fn directions_parallel(angle1: CoordF, angle2: CoordF, max_diff: CoordF) -> bool {
    let diff = (angle1 - angle2).abs();
    let max_diff = max_diff + EPSILON;
    diff < max_diff || (diff - PI).abs() < max_diff
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross2() {
        let v1 = Point::new(1, 0);
        let v2 = Point::new(0, 1);
        assert_eq!(cross2(v1, v2), 1); // Counter-clockwise

        let v3 = Point::new(0, -1);
        assert_eq!(cross2(v1, v3), -1); // Clockwise
    }

    #[test]
    fn test_cross2f() {
        assert_eq!(cross2f((2.0, 0.0), (0.0, 3.0)), 6.0);
    }

    #[test]
    fn test_directions_parallel() {
        assert!(directions_parallel(0.0, 0.0, 0.0));
        assert!(directions_parallel(0.0, PI, 0.0));
        assert!(directions_parallel(0.1, 0.1 + EPSILON / 2.0, 0.0));
        assert!(!directions_parallel(0.1, 0.2, 0.0));
        assert!(directions_parallel(0.1, 0.2, 0.15));
    }
}
