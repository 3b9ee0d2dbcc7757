//! Rigid and scaling placement of 3D lines.

use super::Vec3;
use crate::CoordF;
use serde::{Deserialize, Serialize};

/// An affine map `p -> linear * p + offset`.
///
/// `linear` is stored row by row. There is no projective part, so applying a
/// transform never divides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    pub linear: [[CoordF; 3]; 3],
    pub offset: Vec3,
}

impl Transform3D {
    pub fn identity() -> Self {
        Self::scaling(1.0, 1.0, 1.0)
    }

    pub fn translation(tx: CoordF, ty: CoordF, tz: CoordF) -> Self {
        Self {
            offset: Vec3::new(tx, ty, tz),
            ..Self::identity()
        }
    }

    pub fn scaling(sx: CoordF, sy: CoordF, sz: CoordF) -> Self {
        Self {
            linear: [[sx, 0.0, 0.0], [0.0, sy, 0.0], [0.0, 0.0, sz]],
            offset: Vec3::new(0.0, 0.0, 0.0),
        }
    }

    /// Counter-clockwise rotation about the Z axis, looking down from +Z.
    pub fn rotation_z(angle: CoordF) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            linear: [[cos, -sin, 0.0], [sin, cos, 0.0], [0.0, 0.0, 1.0]],
            offset: Vec3::new(0.0, 0.0, 0.0),
        }
    }

    /// `self` followed by `next`.
    pub fn then(&self, next: &Transform3D) -> Self {
        let mut linear = [[0.0; 3]; 3];
        for (r, row) in linear.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| next.linear[r][k] * self.linear[k][c]).sum();
            }
        }
        Self {
            linear,
            offset: next.apply(self.offset),
        }
    }

    pub fn apply(&self, p: Vec3) -> Vec3 {
        let row = |r: usize| {
            let m = self.linear[r];
            m[0] * p.x + m[1] * p.y + m[2] * p.z
        };
        Vec3::new(
            row(0) + self.offset.x,
            row(1) + self.offset.y,
            row(2) + self.offset.z,
        )
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_scale_then_translate() {
        let t = Transform3D::scaling(2.0, 2.0, 2.0).then(&Transform3D::translation(1.0, 0.0, 0.0));
        let p = t.apply(Vec3::new(1.0, 1.0, 1.0));
        assert!(p.approx_eq(&Vec3::new(3.0, 2.0, 2.0), 1e-12));
    }

    #[test]
    fn test_translate_then_rotate() {
        let t = Transform3D::translation(1.0, 0.0, 5.0).then(&Transform3D::rotation_z(FRAC_PI_2));
        let p = t.apply(Vec3::new(1.0, 0.0, 0.0));
        assert!(p.approx_eq(&Vec3::new(0.0, 2.0, 5.0), 1e-12));
    }

    #[test]
    fn test_identity() {
        let p = Vec3::new(1.5, -2.0, 7.0);
        assert!(Transform3D::default().apply(p).approx_eq(&p, 1e-12));
    }
}
