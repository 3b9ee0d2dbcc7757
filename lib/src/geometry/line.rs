//! Line segment types.
//!
//! [`Line`] is a 2D segment on the scaled integer grid; [`Linef3`] is a 3D
//! segment in unscaled floating point. Both are plain values.

use super::{cross2f, directions_parallel, Point, Transform3D, Vec3};
use crate::{unscale, Coord, CoordF, EPSILON};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// A line segment defined by two endpoints.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Line {
    pub a: Point,
    pub b: Point,
}

impl Line {
    /// Create a new line segment from two points.
    #[inline]
    pub const fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    /// Create a line from coordinates.
    #[inline]
    pub const fn from_coords(ax: Coord, ay: Coord, bx: Coord, by: Coord) -> Self {
        Self {
            a: Point::new(ax, ay),
            b: Point::new(bx, by),
        }
    }

    /// The segment as a vector (b - a).
    #[inline]
    pub fn vector(&self) -> Point {
        self.b - self.a
    }

    #[inline]
    fn vector_f(&self) -> (CoordF, CoordF) {
        (
            (self.b.x - self.a.x) as CoordF,
            (self.b.y - self.a.y) as CoordF,
        )
    }

    /// Get the midpoint of the line segment.
    #[inline]
    pub fn midpoint(&self) -> Point {
        Point::new((self.a.x + self.b.x) / 2, (self.a.y + self.b.y) / 2)
    }

    /// Get the squared length of the line segment.
    #[inline]
    pub fn length_squared(&self) -> i128 {
        self.a.distance_squared(&self.b)
    }

    /// Get the length of the line segment.
    #[inline]
    pub fn length(&self) -> CoordF {
        self.a.distance(&self.b)
    }

    /// Reverse the line segment in place.
    #[inline]
    pub fn reverse(&mut self) {
        std::mem::swap(&mut self.a, &mut self.b);
    }

    /// Return the segment with its endpoints swapped.
    #[inline]
    pub fn reversed(&self) -> Self {
        Self {
            a: self.b,
            b: self.a,
        }
    }

    /// Raw `atan2` of the segment vector, in (-PI, PI].
    #[inline]
    pub fn atan2_(&self) -> CoordF {
        let (vx, vy) = self.vector_f();
        vy.atan2(vx)
    }

    /// Directed bearing of the segment in [0, 2*PI).
    pub fn orientation(&self) -> CoordF {
        let angle = self.atan2_();
        if angle < 0.0 {
            2.0 * PI + angle
        } else {
            angle
        }
    }

    /// Undirected bearing of the segment in [0, PI).
    ///
    /// A bearing within `EPSILON` of PI is reported as 0.
    pub fn direction(&self) -> CoordF {
        let angle = self.atan2_();
        if (angle - PI).abs() < EPSILON {
            0.0
        } else if angle < 0.0 {
            angle + PI
        } else {
            angle
        }
    }

    /// True if the undirected bearing matches `angle` within `EPSILON`.
    #[inline]
    pub fn parallel_to(&self, angle: CoordF) -> bool {
        directions_parallel(self.direction(), angle, 0.0)
    }

    /// True if both segments share a bearing within `EPSILON`.
    #[inline]
    pub fn parallel_to_line(&self, other: &Line) -> bool {
        self.parallel_to(other.direction())
    }

    /// Squared distance from `point` to the segment `a`-`b`.
    ///
    /// The projection is clamped onto the segment, so a point beyond an end
    /// measures to that endpoint. A zero-length segment measures to `a`.
    pub fn distance_to_squared(point: Point, a: Point, b: Point) -> CoordF {
        let v = ((b.x - a.x) as CoordF, (b.y - a.y) as CoordF);
        let va = ((point.x - a.x) as CoordF, (point.y - a.y) as CoordF);
        let l2 = v.0 * v.0 + v.1 * v.1;
        if l2 == 0.0 {
            return va.0 * va.0 + va.1 * va.1;
        }
        let t = (va.0 * v.0 + va.1 * v.1) / l2;
        if t < 0.0 {
            va.0 * va.0 + va.1 * va.1
        } else if t > 1.0 {
            point.distance_squared(&b) as CoordF
        } else {
            let dx = t * v.0 - va.0;
            let dy = t * v.1 - va.1;
            dx * dx + dy * dy
        }
    }

    /// Squared distance from `point` to this segment.
    #[inline]
    pub fn distance_to_point_squared(&self, point: &Point) -> CoordF {
        Self::distance_to_squared(*point, self.a, self.b)
    }

    /// Distance from `point` to this segment.
    #[inline]
    pub fn distance_to(&self, point: &Point) -> CoordF {
        self.distance_to_point_squared(point).sqrt()
    }

    /// Perpendicular distance from `point` to the infinite line through the segment.
    ///
    /// A zero-length segment degenerates to the distance to `a`.
    pub fn perp_distance_to(&self, point: &Point) -> CoordF {
        let v = self.vector_f();
        let va = ((point.x - self.a.x) as CoordF, (point.y - self.a.y) as CoordF);
        if self.a == self.b {
            return (va.0 * va.0 + va.1 * va.1).sqrt();
        }
        cross2f(v, va).abs() / (v.0 * v.0 + v.1 * v.1).sqrt()
    }

    /// Intersection point of two bounded segments.
    ///
    /// Returns `None` for parallel, degenerate or collinear (even overlapping)
    /// segments, and when the crossing lies outside either segment.
    pub fn intersection(&self, other: &Line) -> Option<Point> {
        let v1 = self.vector_f();
        let v2 = other.vector_f();
        let v12 = (
            (self.a.x - other.a.x) as CoordF,
            (self.a.y - other.a.y) as CoordF,
        );
        let denom = cross2f(v1, v2);
        if denom.abs() < EPSILON {
            return None;
        }
        let t1 = cross2f(v2, v12) / denom;
        let t2 = cross2f(v1, v12) / denom;
        if (0.0..=1.0).contains(&t1) && (0.0..=1.0).contains(&t2) {
            Some(Point::from_f64_rounded(
                self.a.x as CoordF + t1 * v1.0,
                self.a.y as CoordF + t1 * v1.1,
            ))
        } else {
            None
        }
    }

    /// Intersection point of the infinite lines through both segments.
    pub fn intersection_infinite(&self, other: &Line) -> Option<Point> {
        let v1 = self.vector_f();
        let v2 = other.vector_f();
        let v12 = (
            (other.a.x - self.a.x) as CoordF,
            (other.a.y - self.a.y) as CoordF,
        );
        let denom = cross2f(v1, v2);
        if denom.abs() < EPSILON {
            return None;
        }
        let t1 = cross2f(v12, v2) / denom;
        Some(Point::from_f64_rounded(
            self.a.x as CoordF + t1 * v1.0,
            self.a.y as CoordF + t1 * v1.1,
        ))
    }

    /// Point at arc-length `distance` from `a` towards `b`.
    ///
    /// An axis along which both endpoints agree keeps its exact coordinate.
    pub fn point_at(&self, distance: CoordF) -> Point {
        let len = self.length();
        let mut point = self.a;
        if self.a.x != self.b.x {
            point.x = (self.a.x as CoordF
                + (self.b.x - self.a.x) as CoordF * distance / len)
                .round() as Coord;
        }
        if self.a.y != self.b.y {
            point.y = (self.a.y as CoordF
                + (self.b.y - self.a.y) as CoordF * distance / len)
                .round() as Coord;
        }
        point
    }

    /// Get the CCW (counter-clockwise) value of a point relative to this line.
    /// Positive if the point is to the left of the line (a -> b direction).
    #[inline]
    pub fn ccw(&self, p: &Point) -> i128 {
        self.a.ccw(&self.b, p)
    }
}

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line({:?} -> {:?})", self.a, self.b)
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[({:.6}, {:.6}) -> ({:.6}, {:.6})]",
            unscale(self.a.x),
            unscale(self.a.y),
            unscale(self.b.x),
            unscale(self.b.y)
        )
    }
}

impl From<(Point, Point)> for Line {
    #[inline]
    fn from((a, b): (Point, Point)) -> Self {
        Self { a, b }
    }
}

/// A 3D line segment with floating-point coordinates (in mm).
#[derive(Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Linef3 {
    pub a: Vec3,
    pub b: Vec3,
}

impl Linef3 {
    #[inline]
    pub const fn new(a: Vec3, b: Vec3) -> Self {
        Self { a, b }
    }

    #[inline]
    pub fn vector(&self) -> Vec3 {
        self.b - self.a
    }

    #[inline]
    pub fn unit_vector(&self) -> Vec3 {
        self.vector().normalize()
    }

    #[inline]
    pub fn length(&self) -> CoordF {
        self.vector().length()
    }

    #[inline]
    pub fn reverse(&mut self) {
        std::mem::swap(&mut self.a, &mut self.b);
    }

    /// Scale both endpoints about the origin.
    pub fn scale(&mut self, factor: CoordF) {
        self.a = self.a * factor;
        self.b = self.b * factor;
    }

    /// Point where the infinite line through the segment crosses the plane `z`.
    ///
    /// Returns `None` for a line lying parallel to the plane.
    pub fn intersect_plane(&self, z: CoordF) -> Option<Vec3> {
        let v = self.vector();
        if v.z == 0.0 {
            return None;
        }
        let t = (z - self.a.z) / v.z;
        Some(Vec3::new(self.a.x + v.x * t, self.a.y + v.y * t, z))
    }

    /// Both endpoints mapped through an affine transform.
    pub fn transform(&self, t: &Transform3D) -> Linef3 {
        Linef3::new(t.apply(self.a), t.apply(self.b))
    }
}

impl fmt::Debug for Linef3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Linef3({:?} -> {:?})", self.a, self.b)
    }
}

/// Type alias for a collection of lines.
pub type Lines = Vec<Line>;
