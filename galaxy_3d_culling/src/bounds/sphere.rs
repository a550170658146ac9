/// Bounding sphere

use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    /// Always `>= 0`
    pub radius: f32,
}

impl Sphere {
    /// Negative radii are clamped to 0
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius: radius.max(0.0) }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        (point - self.center).length_squared() <= self.radius * self.radius
    }

    pub fn intersects_sphere(&self, other: &Sphere) -> bool {
        let reach = self.radius + other.radius;
        (other.center - self.center).length_squared() <= reach * reach
    }

    /// Ray `origin + t * direction`, `t >= 0`
    pub fn test_ray(&self, origin: Vec3, direction: Vec3) -> bool {
        let to_origin = origin - self.center;
        let c = to_origin.length_squared() - self.radius * self.radius;
        if c <= 0.0 {
            return true;
        }

        let a = direction.length_squared();
        if a == 0.0 {
            return false;
        }
        let b = 2.0 * direction.dot(to_origin);
        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return false;
        }
        // Origin is outside, so both roots share a sign; the far one decides
        let far = (-b + discriminant.sqrt()) / (2.0 * a);
        far >= 0.0
    }
}
