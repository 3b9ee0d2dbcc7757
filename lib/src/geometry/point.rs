//! Point types for 2D and 3D geometry.
//!
//! [`Point`] lives on the scaled integer grid used for all toolpath geometry;
//! [`Vec3`] is the unscaled floating-point 3D vector used by [`Linef3`](super::Linef3).

use crate::{scale, unscale, Coord, CoordF};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// A 2D point with scaled integer coordinates.
///
/// Points use integer coordinates scaled by `SCALING_FACTOR` to avoid
/// floating-point precision issues. 1 unit = 1 nanometer.
///
/// # Example
/// ```
/// use toolpath::geometry::Point;
/// use toolpath::scale;
///
/// // Create a point at (1mm, 2mm)
/// let p = Point::new(scale(1.0), scale(2.0));
/// assert_eq!(p, Point::new_scale(1.0, 2.0));
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: Coord,
    pub y: Coord,
}

impl Point {
    /// Create a new point with the given coordinates.
    #[inline]
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    /// Create a new point from floating-point coordinates (in mm), scaling them.
    #[inline]
    pub fn new_scale(x: CoordF, y: CoordF) -> Self {
        Self {
            x: scale(x),
            y: scale(y),
        }
    }

    /// Create a point at the origin (0, 0).
    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0, y: 0 }
    }

    /// Round a floating-point position (in scaled units) onto the grid.
    #[inline]
    pub fn from_f64_rounded(x: CoordF, y: CoordF) -> Self {
        Self {
            x: x.round() as Coord,
            y: y.round() as Coord,
        }
    }

    /// Calculate the squared distance to another point.
    /// Returns i128 to avoid overflow with large coordinates.
    #[inline]
    pub fn distance_squared(&self, other: &Point) -> i128 {
        let dx = (other.x - self.x) as i128;
        let dy = (other.y - self.y) as i128;
        dx * dx + dy * dy
    }

    /// Calculate the distance to another point.
    #[inline]
    pub fn distance(&self, other: &Point) -> CoordF {
        (self.distance_squared(other) as CoordF).sqrt()
    }

    /// Squared length of this point treated as a vector.
    #[inline]
    pub fn length_squared(&self) -> i128 {
        self.x as i128 * self.x as i128 + self.y as i128 * self.y as i128
    }

    /// Length of this point treated as a vector.
    #[inline]
    pub fn length(&self) -> CoordF {
        (self.length_squared() as CoordF).sqrt()
    }

    /// 2D cross product (z component).
    #[inline]
    pub fn cross(&self, other: &Point) -> i128 {
        self.x as i128 * other.y as i128 - self.y as i128 * other.x as i128
    }

    /// Dot product.
    #[inline]
    pub fn dot(&self, other: &Point) -> i128 {
        self.x as i128 * other.x as i128 + self.y as i128 * other.y as i128
    }

    /// Positive if `p2` lies to the left of the ray `self -> p1`.
    #[inline]
    pub fn ccw(&self, p1: &Point, p2: &Point) -> i128 {
        let v1 = *p1 - *self;
        let v2 = *p2 - *self;
        v1.cross(&v2)
    }

    /// Find the nearest point in a slice of points, returning its index.
    pub fn nearest_point_index(&self, points: &[Point]) -> Option<usize> {
        if points.is_empty() {
            return None;
        }

        let mut min_dist = i128::MAX;
        let mut min_idx = 0;

        for (i, p) in points.iter().enumerate() {
            let dist = self.distance_squared(p);
            if dist < min_dist {
                min_dist = dist;
                min_idx = i;
            }
        }

        Some(min_idx)
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point({}, {})", self.x, self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", unscale(self.x), unscale(self.y))
    }
}

impl Add for Point {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl AddAssign for Point {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for Point {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl SubAssign for Point {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
    }
}

impl Neg for Point {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl From<(Coord, Coord)> for Point {
    #[inline]
    fn from((x, y): (Coord, Coord)) -> Self {
        Self::new(x, y)
    }
}

/// A 3D vector with unscaled floating-point coordinates (in mm).
#[derive(Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: CoordF,
    pub y: CoordF,
    pub z: CoordF,
}

impl Vec3 {
    #[inline]
    pub const fn new(x: CoordF, y: CoordF, z: CoordF) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn dot(&self, other: &Vec3) -> CoordF {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn cross(&self, other: &Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    #[inline]
    pub fn length_squared(&self) -> CoordF {
        self.dot(self)
    }

    #[inline]
    pub fn length(&self) -> CoordF {
        self.length_squared().sqrt()
    }

    /// Unit vector in the same direction; the zero vector stays zero.
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Vec3::new(self.x / len, self.y / len, self.z / len)
        } else {
            *self
        }
    }

    #[inline]
    pub fn distance(&self, other: &Vec3) -> CoordF {
        (*other - *self).length()
    }

    #[inline]
    pub fn approx_eq(&self, other: &Vec3, epsilon: CoordF) -> bool {
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.z - other.z).abs() < epsilon
    }
}

impl fmt::Debug for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vec3({}, {}, {})", self.x, self.y, self.z)
    }
}

impl Add for Vec3 {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Neg for Vec3 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<CoordF> for Vec3 {
    type Output = Self;

    #[inline]
    fn mul(self, s: CoordF) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }
}

impl From<(CoordF, CoordF, CoordF)> for Vec3 {
    #[inline]
    fn from((x, y, z): (CoordF, CoordF, CoordF)) -> Self {
        Self::new(x, y, z)
    }
}

/// Type alias for a list of points.
pub type Points = Vec<Point>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let a = Point::new(0, 0);
        let b = Point::new(3, 4);
        assert_eq!(a.distance_squared(&b), 25);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_point_distance_no_overflow() {
        // ~9km apart at nanometer resolution still fits in i128
        let a = Point::new(-scale(4500.0), 0);
        let b = Point::new(scale(4500.0), 0);
        assert_eq!(a.distance_squared(&b), (scale(9000.0) as i128).pow(2));
    }

    #[test]
    fn test_point_cross_dot() {
        let x = Point::new(1, 0);
        let y = Point::new(0, 1);
        assert_eq!(x.cross(&y), 1);
        assert_eq!(y.cross(&x), -1);
        assert_eq!(x.dot(&y), 0);
    }

    #[test]
    fn test_nearest_point_index() {
        let points = vec![Point::new(10, 10), Point::new(1, 1), Point::new(-5, 0)];
        assert_eq!(Point::zero().nearest_point_index(&points), Some(1));
        assert_eq!(Point::zero().nearest_point_index(&[]), None);
    }

    #[test]
    fn test_vec3_cross() {
        let x = Vec3::new(1.0, 0.0, 0.0);
        let y = Vec3::new(0.0, 1.0, 0.0);
        assert!(x.cross(&y).approx_eq(&Vec3::new(0.0, 0.0, 1.0), 1e-12));
        assert!((Vec3::new(3.0, 4.0, 0.0).normalize().length() - 1.0).abs() < 1e-12);
    }
}
