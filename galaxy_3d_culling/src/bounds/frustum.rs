/// Frustum: six inward-facing planes and eight corners.
///
/// A point is inside iff it is on the non-negative side of every plane.
/// Planes follow glam's `[0, 1]` clip-space depth convention
/// (`Mat4::perspective_rh`, `Mat4::orthographic_rh`).

use glam::{Mat4, Vec3, Vec4};
use super::aabb::AABB;
use super::plane::{Plane, PLANE_EPSILON};
use super::sphere::Sphere;

/// Frustum plane indices
pub const PLANE_NEAR: usize = 0;
pub const PLANE_FAR: usize = 1;
pub const PLANE_LEFT: usize = 2;
pub const PLANE_RIGHT: usize = 3;
pub const PLANE_TOP: usize = 4;
pub const PLANE_BOTTOM: usize = 5;

/// View volume of a camera.
///
/// Corners are indexed like `AABB::corner`: bit 0 = right, bit 1 = top,
/// bit 2 = far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    planes: [Plane; 6],
    corners: [Vec3; 8],
    degenerate: bool,
}

impl Frustum {
    /// Extract planes and corners from a view-projection matrix.
    ///
    /// Gribb & Hartmann plane extraction, adapted to `[0, 1]` depth
    /// (near plane is row 2 alone). Corners are the NDC cube corners
    /// un-projected through the inverse matrix.
    ///
    /// A singular matrix, or any zero-length plane normal, yields a
    /// degenerate frustum whose corners are all zero. Check
    /// `is_degenerate()` before culling with it.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let m = vp.to_cols_array_2d();
        let row = |r: usize| Vec4::new(m[0][r], m[1][r], m[2][r], m[3][r]);
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        let planes = [
            Plane::from_coefficients(r2),      // near
            Plane::from_coefficients(r3 - r2), // far
            Plane::from_coefficients(r3 + r0), // left
            Plane::from_coefficients(r3 - r0), // right
            Plane::from_coefficients(r3 - r1), // top
            Plane::from_coefficients(r3 + r1), // bottom
        ];

        let mut degenerate = planes.iter().any(Plane::is_degenerate);
        let mut corners = [Vec3::ZERO; 8];

        let det = vp.determinant();
        if degenerate || det == 0.0 || !det.is_finite() {
            degenerate = true;
        } else {
            let inverse = vp.inverse();
            for (i, corner) in corners.iter_mut().enumerate() {
                let ndc = Vec3::new(
                    if i & 1 != 0 { 1.0 } else { -1.0 },
                    if i & 2 != 0 { 1.0 } else { -1.0 },
                    if i & 4 != 0 { 1.0 } else { 0.0 },
                );
                *corner = inverse.project_point3(ndc);
            }
            if corners.iter().any(|c| !c.is_finite()) {
                degenerate = true;
                corners = [Vec3::ZERO; 8];
            }
        }

        Self { planes, corners, degenerate }
    }

    pub fn planes(&self) -> &[Plane; 6] {
        &self.planes
    }

    /// Plane `index` (see `PLANE_NEAR`..`PLANE_BOTTOM`), zero plane when out of range
    pub fn plane(&self, index: usize) -> Plane {
        self.planes.get(index).copied().unwrap_or(Plane::ZERO)
    }

    pub fn corners(&self) -> &[Vec3; 8] {
        &self.corners
    }

    /// Corner `index`, `Vec3::ZERO` when out of range
    pub fn corner(&self, index: usize) -> Vec3 {
        self.corners.get(index).copied().unwrap_or(Vec3::ZERO)
    }

    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// Centroid of the corners
    pub fn center(&self) -> Vec3 {
        self.corners.iter().copied().sum::<Vec3>() / 8.0
    }

    /// Largest corner distance from `center()`
    pub fn radius(&self) -> f32 {
        let center = self.center();
        self.corners
            .iter()
            .map(|c| c.distance(center))
            .fold(0.0, f32::max)
    }

    pub fn contains(&self, point: Vec3) -> bool {
        self.planes.iter().all(|p| p.distance(point) >= -PLANE_EPSILON)
    }

    /// Plane/extent test.
    ///
    /// The box is rejected as soon as one plane has it entirely on its
    /// negative side. Boxes near the frustum's edges and corners may be
    /// kept even though they are outside; boxes that overlap the frustum
    /// are never rejected.
    pub fn test_aabb(&self, aabb: &AABB) -> bool {
        let center = aabb.center();
        let half = aabb.half_extents();
        for plane in &self.planes {
            let normal = plane.normal();
            let center_dist = normal.dot(center);
            let extent_dist = half.dot(normal.abs());
            if center_dist + extent_dist < -plane.offset() {
                return false;
            }
        }
        true
    }

    /// Rejected iff the sphere is entirely behind one plane
    pub fn test_sphere(&self, sphere: &Sphere) -> bool {
        self.planes
            .iter()
            .all(|p| p.distance(sphere.center) >= -sphere.radius)
    }

    /// Rejected iff all corners of one frustum lie behind a single plane
    /// of the other, checked both ways
    pub fn test_frustum(&self, other: &Frustum) -> bool {
        fn separated(planes: &[Plane; 6], corners: &[Vec3; 8]) -> bool {
            planes
                .iter()
                .any(|p| corners.iter().all(|&c| p.distance(c) < 0.0))
        }
        !separated(&self.planes, &other.corners) && !separated(&other.planes, &self.corners)
    }

    /// Ray `origin + t * direction`, `t >= 0`, clipped against each plane
    pub fn test_ray(&self, origin: Vec3, direction: Vec3) -> bool {
        let mut t_enter = 0.0_f32;
        let mut t_exit = f32::INFINITY;

        for plane in &self.planes {
            let dist = plane.distance(origin);
            let denom = plane.normal().dot(direction);

            if denom.abs() < f32::EPSILON {
                if dist < -PLANE_EPSILON {
                    return false;
                }
                continue;
            }

            let t = -dist / denom;
            if denom > 0.0 {
                t_enter = t_enter.max(t);
            } else {
                t_exit = t_exit.min(t);
            }
            if t_enter > t_exit {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
