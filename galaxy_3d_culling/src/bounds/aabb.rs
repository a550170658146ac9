/// Axis-aligned bounding box

use glam::Vec3;
use super::sphere::Sphere;

/// Axis-aligned bounding box (world space)
///
/// Touching boxes count as intersecting, and containment is inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner (x, y, z)
    pub min: Vec3,
    /// Maximum corner (x, y, z)
    pub max: Vec3,
}

impl AABB {
    /// Box spanning two opposite corners, given in any order
    pub fn from_min_max(a: Vec3, b: Vec3) -> Self {
        Self { min: a.min(b), max: a.max(b) }
    }

    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self { min: center - half, max: center + half }
    }

    /// Cube of half-size `half` around `center`
    pub fn cube(center: Vec3, half: f32) -> Self {
        Self::from_center_half_extents(center, Vec3::splat(half))
    }

    /// Smallest box enclosing a sphere
    pub fn from_sphere(sphere: &Sphere) -> Self {
        Self::cube(sphere.center, sphere.radius)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn depth(&self) -> f32 {
        self.max.z - self.min.z
    }

    /// Half of the diagonal: radius of the sphere through all corners
    pub fn radius(&self) -> f32 {
        self.half_extents().length()
    }

    /// Corner `index` (bit 0 = +x, bit 1 = +y, bit 2 = +z), `Vec3::ZERO`
    /// when out of range
    pub fn corner(&self, index: usize) -> Vec3 {
        if index >= 8 {
            return Vec3::ZERO;
        }
        Vec3::new(
            if index & 1 != 0 { self.max.x } else { self.min.x },
            if index & 2 != 0 { self.max.y } else { self.min.y },
            if index & 4 != 0 { self.max.z } else { self.min.z },
        )
    }

    pub fn corners(&self) -> [Vec3; 8] {
        std::array::from_fn(|i| self.corner(i))
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Test if this AABB fully contains another AABB.
    pub fn contains_aabb(&self, other: &AABB) -> bool {
        self.min.x <= other.min.x && self.max.x >= other.max.x
        && self.min.y <= other.min.y && self.max.y >= other.max.y
        && self.min.z <= other.min.z && self.max.z >= other.max.z
    }

    /// Separating-axis test on x, y and z
    pub fn intersects_aabb(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x
        && self.min.y <= other.max.y && self.max.y >= other.min.y
        && self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Point of the box closest to `point`
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        point.clamp(self.min, self.max)
    }

    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        let offset = self.closest_point(sphere.center) - sphere.center;
        offset.length_squared() <= sphere.radius * sphere.radius
    }

    /// Slab test of the ray `origin + t * direction`, `t >= 0`
    pub fn test_ray(&self, origin: Vec3, direction: Vec3) -> bool {
        let mut t_min = 0.0_f32;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < f32::EPSILON {
                // Parallel to the slab: must already be inside it
                if o < lo || o > hi {
                    return false;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t1 = (lo - o) * inv;
            let mut t2 = (hi - o) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_min > t_max {
                return false;
            }
        }
        true
    }
}
