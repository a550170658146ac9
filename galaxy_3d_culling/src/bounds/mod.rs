//! Bounds module: convex volumes used for culling and range queries.
//!
//! `Bounds` is a closed set of variants (box, sphere, frustum) with
//! pairwise intersection, ray and point-containment tests. Every pair is
//! handled by an exhaustive match, so adding a variant forces each test
//! to be written for it.

mod aabb;
mod frustum;
mod plane;
mod sphere;

pub use aabb::AABB;
pub use frustum::{
    Frustum,
    PLANE_NEAR, PLANE_FAR, PLANE_LEFT, PLANE_RIGHT, PLANE_TOP, PLANE_BOTTOM,
};
pub use plane::{Plane, PLANE_EPSILON};
pub use sphere::Sphere;

use glam::Vec3;

/// A convex bounding volume
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bounds {
    Aabb(AABB),
    Sphere(Sphere),
    Frustum(Frustum),
}

impl Bounds {
    pub fn center(&self) -> Vec3 {
        match self {
            Bounds::Aabb(b) => b.center(),
            Bounds::Sphere(s) => s.center,
            Bounds::Frustum(f) => f.center(),
        }
    }

    /// Radius of an enclosing sphere around `center()`.
    ///
    /// Exact for spheres, conservative for boxes and frusta.
    pub fn radius(&self) -> f32 {
        match self {
            Bounds::Aabb(b) => b.radius(),
            Bounds::Sphere(s) => s.radius,
            Bounds::Frustum(f) => f.radius(),
        }
    }

    /// Number of boundary sample points
    pub fn point_count(&self) -> usize {
        match self {
            Bounds::Aabb(_) | Bounds::Frustum(_) => 8,
            Bounds::Sphere(_) => 1,
        }
    }

    /// Boundary sample point `index`, `Vec3::ZERO` when out of range.
    ///
    /// Box and frustum corners; the sphere's only sample is its center.
    pub fn point(&self, index: usize) -> Vec3 {
        match self {
            Bounds::Aabb(b) => b.corner(index),
            Bounds::Frustum(f) => f.corner(index),
            Bounds::Sphere(s) if index == 0 => s.center,
            Bounds::Sphere(_) => Vec3::ZERO,
        }
    }

    /// Pairwise intersection test
    pub fn test(&self, other: &Bounds) -> bool {
        match (self, other) {
            (Bounds::Aabb(a), Bounds::Aabb(b)) => a.intersects_aabb(b),
            (Bounds::Aabb(a), Bounds::Sphere(s))
            | (Bounds::Sphere(s), Bounds::Aabb(a)) => a.intersects_sphere(s),
            (Bounds::Sphere(a), Bounds::Sphere(b)) => a.intersects_sphere(b),
            (Bounds::Frustum(f), Bounds::Aabb(a))
            | (Bounds::Aabb(a), Bounds::Frustum(f)) => f.test_aabb(a),
            (Bounds::Frustum(f), Bounds::Sphere(s))
            | (Bounds::Sphere(s), Bounds::Frustum(f)) => f.test_sphere(s),
            (Bounds::Frustum(a), Bounds::Frustum(b)) => a.test_frustum(b),
        }
    }

    /// Does the ray `origin + t * direction` (`t >= 0`) touch the volume
    pub fn test_ray(&self, origin: Vec3, direction: Vec3) -> bool {
        match self {
            Bounds::Aabb(b) => b.test_ray(origin, direction),
            Bounds::Sphere(s) => s.test_ray(origin, direction),
            Bounds::Frustum(f) => f.test_ray(origin, direction),
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        match self {
            Bounds::Aabb(b) => b.contains(point),
            Bounds::Sphere(s) => s.contains(point),
            Bounds::Frustum(f) => f.contains(point),
        }
    }
}

impl From<AABB> for Bounds {
    fn from(aabb: AABB) -> Self {
        Bounds::Aabb(aabb)
    }
}

impl From<Sphere> for Bounds {
    fn from(sphere: Sphere) -> Self {
        Bounds::Sphere(sphere)
    }
}

impl From<Frustum> for Bounds {
    fn from(frustum: Frustum) -> Self {
        Bounds::Frustum(frustum)
    }
}

#[cfg(test)]
#[path = "bounds_tests.rs"]
mod tests;
