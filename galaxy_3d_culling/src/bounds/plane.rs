/// Plane in Hessian normal form.
///
/// Stored as a Vec4 (A, B, C, D) where (A, B, C) is the unit normal and
/// `A*x + B*y + C*z + D` is the signed distance of a point to the plane.
/// Positive distances are on the side the normal points to.

use glam::{Vec3, Vec4};

/// Tolerance used by `Plane::side` and frustum point containment
pub const PLANE_EPSILON: f32 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Plane(Vec4);

impl Plane {
    /// Zero plane. Every point is at distance 0 from it.
    pub const ZERO: Plane = Plane(Vec4::ZERO);

    /// Build from raw coefficients, normalizing by the normal's length.
    ///
    /// A zero-length (or non-finite) normal yields `Plane::ZERO`.
    pub fn from_coefficients(coefficients: Vec4) -> Self {
        let normal_len = coefficients.truncate().length();
        if normal_len > 0.0 && normal_len.is_finite() {
            let plane = coefficients / normal_len;
            if plane.is_finite() {
                return Plane(plane);
            }
        }
        Plane::ZERO
    }

    /// Plane through `point` facing `normal` (normalized here)
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let n = normal.normalize_or_zero();
        if n == Vec3::ZERO {
            return Plane::ZERO;
        }
        Plane(n.extend(-n.dot(point)))
    }

    /// Unit normal (zero for a degenerate plane)
    pub fn normal(&self) -> Vec3 {
        self.0.truncate()
    }

    /// Constant term D
    pub fn offset(&self) -> f32 {
        self.0.w
    }

    /// Raw (A, B, C, D) coefficients
    pub fn coefficients(&self) -> Vec4 {
        self.0
    }

    /// Signed distance from `point` to the plane
    pub fn distance(&self, point: Vec3) -> f32 {
        self.normal().dot(point) + self.0.w
    }

    /// 1 in front, -1 behind, 0 on the plane (within `PLANE_EPSILON`)
    pub fn side(&self, point: Vec3) -> i32 {
        let d = self.distance(point);
        if d > PLANE_EPSILON {
            1
        } else if d < -PLANE_EPSILON {
            -1
        } else {
            0
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.normal() == Vec3::ZERO
    }
}
