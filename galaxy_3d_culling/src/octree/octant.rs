/// Octant addressing and sector geometry.
///
/// A sector is one cube of the regular subdivision of the root region.
/// Every sector is produced from its parent by `Sector::octant`, so two
/// sectors reached along the same path compare equal bit for bit.

use glam::Vec3;
use crate::bounds::AABB;

/// One of the 8 octants of a sector.
///
/// "Upper" is `+Y`, "right" is `+X`, "front" is `-Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildLocation {
    UpperFrontRight,
    UpperFrontLeft,
    UpperBackLeft,
    UpperBackRight,
    LowerFrontRight,
    LowerFrontLeft,
    LowerBackLeft,
    LowerBackRight,
}

impl ChildLocation {
    pub const ALL: [ChildLocation; 8] = [
        ChildLocation::UpperFrontRight,
        ChildLocation::UpperFrontLeft,
        ChildLocation::UpperBackLeft,
        ChildLocation::UpperBackRight,
        ChildLocation::LowerFrontRight,
        ChildLocation::LowerFrontLeft,
        ChildLocation::LowerBackLeft,
        ChildLocation::LowerBackRight,
    ];

    /// Slot index in a node's child array
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Octant of `point` relative to `center`.
    ///
    /// Ties go to the positive side on each axis: `x == center.x` is
    /// right, `y == center.y` is upper, `z == center.z` is back.
    pub fn relative_location(center: Vec3, point: Vec3) -> Self {
        let upper = point.y >= center.y;
        let front = point.z < center.z;
        let right = point.x >= center.x;
        match (upper, front, right) {
            (true, true, true) => ChildLocation::UpperFrontRight,
            (true, true, false) => ChildLocation::UpperFrontLeft,
            (true, false, false) => ChildLocation::UpperBackLeft,
            (true, false, true) => ChildLocation::UpperBackRight,
            (false, true, true) => ChildLocation::LowerFrontRight,
            (false, true, false) => ChildLocation::LowerFrontLeft,
            (false, false, false) => ChildLocation::LowerBackLeft,
            (false, false, true) => ChildLocation::LowerBackRight,
        }
    }

    /// Unit step from a sector center toward this octant's center
    pub fn direction(self) -> Vec3 {
        let (upper, front, right) = match self {
            ChildLocation::UpperFrontRight => (true, true, true),
            ChildLocation::UpperFrontLeft => (true, true, false),
            ChildLocation::UpperBackLeft => (true, false, false),
            ChildLocation::UpperBackRight => (true, false, true),
            ChildLocation::LowerFrontRight => (false, true, true),
            ChildLocation::LowerFrontLeft => (false, true, false),
            ChildLocation::LowerBackLeft => (false, false, false),
            ChildLocation::LowerBackRight => (false, false, true),
        };
        Vec3::new(
            if right { 1.0 } else { -1.0 },
            if upper { 1.0 } else { -1.0 },
            if front { -1.0 } else { 1.0 },
        )
    }
}

/// Axis-aligned cube of the subdivision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sector {
    pub center: Vec3,
    /// Half of the cube's edge length
    pub half_size: f32,
    /// Number of halvings from the root sector
    pub depth: u32,
}

impl Sector {
    /// Root sector covering `[-region_size, region_size]` on every axis
    pub fn root(region_size: f32) -> Self {
        Self { center: Vec3::ZERO, half_size: region_size, depth: 0 }
    }

    /// Sub-sector for one octant (half the size, center offset by a quarter)
    pub fn octant(&self, location: ChildLocation) -> Sector {
        let half_size = self.half_size * 0.5;
        Sector {
            center: self.center + location.direction() * half_size,
            half_size,
            depth: self.depth + 1,
        }
    }

    /// Octant `point` falls into
    pub fn locate(&self, point: Vec3) -> ChildLocation {
        ChildLocation::relative_location(self.center, point)
    }

    /// Inclusive containment test
    pub fn contains(&self, point: Vec3) -> bool {
        (point - self.center).abs().cmple(Vec3::splat(self.half_size)).all()
    }

    pub fn aabb(&self) -> AABB {
        AABB::cube(self.center, self.half_size)
    }
}

/// Descend from `start` while `point` and `other` keep choosing the same
/// octant, stopping once `stop_depth` is reached.
///
/// Returns the first sector in which they part ways, or `None` when they
/// are still together at `stop_depth`.
pub(crate) fn separating_sector(
    start: Sector,
    point: Vec3,
    other: Vec3,
    stop_depth: u32,
) -> Option<Sector> {
    let mut sector = start;
    while sector.depth < stop_depth {
        let a = sector.locate(point);
        if a != sector.locate(other) {
            return Some(sector);
        }
        sector = sector.octant(a);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_location_signs() {
        let c = Vec3::ZERO;
        assert_eq!(ChildLocation::relative_location(c, Vec3::new(1.0, 1.0, -1.0)), ChildLocation::UpperFrontRight);
        assert_eq!(ChildLocation::relative_location(c, Vec3::new(-1.0, 1.0, -1.0)), ChildLocation::UpperFrontLeft);
        assert_eq!(ChildLocation::relative_location(c, Vec3::new(-1.0, -1.0, 1.0)), ChildLocation::LowerBackLeft);
        assert_eq!(ChildLocation::relative_location(c, Vec3::new(1.0, -1.0, 1.0)), ChildLocation::LowerBackRight);
    }

    #[test]
    fn test_ties_go_positive() {
        assert_eq!(ChildLocation::relative_location(Vec3::ZERO, Vec3::ZERO), ChildLocation::UpperBackRight);
        assert_eq!(
            ChildLocation::relative_location(Vec3::ONE, Vec3::new(1.0, 0.0, 0.0)),
            ChildLocation::LowerFrontRight
        );
    }

    #[test]
    fn test_index_round_trip() {
        for (i, loc) in ChildLocation::ALL.iter().enumerate() {
            assert_eq!(loc.index(), i);
            assert_eq!(ChildLocation::from_index(i), Some(*loc));
        }
        assert_eq!(ChildLocation::from_index(8), None);
    }

    #[test]
    fn test_direction_agrees_with_location() {
        for loc in ChildLocation::ALL {
            assert_eq!(ChildLocation::relative_location(Vec3::ZERO, loc.direction()), loc);
        }
    }

    #[test]
    fn test_octant_geometry() {
        let root = Sector::root(100.0);
        let sub = root.octant(ChildLocation::UpperBackRight);
        assert_eq!(sub.center, Vec3::splat(50.0));
        assert_eq!(sub.half_size, 50.0);
        assert_eq!(sub.depth, 1);
        let sub2 = sub.octant(ChildLocation::LowerFrontLeft);
        assert_eq!(sub2.center, Vec3::new(25.0, 25.0, 25.0));
        assert_eq!(sub2.depth, 2);
    }

    #[test]
    fn test_sector_contains_inclusive() {
        let root = Sector::root(10.0);
        assert!(root.contains(Vec3::new(10.0, -10.0, 0.0)));
        assert!(!root.contains(Vec3::new(10.5, 0.0, 0.0)));
        assert!(!root.contains(Vec3::new(f32::NAN, 0.0, 0.0)));
        assert_eq!(root.aabb().min, Vec3::splat(-10.0));
    }

    #[test]
    fn test_separating_sector() {
        let start = Sector::root(100.0).octant(ChildLocation::UpperBackRight);
        let sep = separating_sector(start, Vec3::splat(10.0), Vec3::splat(30.0), 24).unwrap();
        assert_eq!(sep.center, Vec3::splat(25.0));
        assert_eq!(sep.depth, 2);

        assert!(separating_sector(start, Vec3::splat(10.0), Vec3::splat(10.0), 10).is_none());
    }
}
