/// Octree over visible scene elements.
///
/// Elements are routed by the world position cached in the element, so the
/// culler refreshes that position before asking the tree to re-sort.

use glam::Vec3;
use crate::bounds::Bounds;
use crate::octree::{OcTreeBase, OcTreeHooks};
use crate::scene::{ContainMode, VisibleElement};

/// Hooks binding the octree to `VisibleElement`s
#[derive(Debug, Default, Clone, Copy)]
pub struct SpatialHooks;

impl OcTreeHooks for SpatialHooks {
    type Value = VisibleElement;
    type Leaf = VisibleElement;

    fn position_of(&self, value: &VisibleElement) -> Vec3 {
        if value.node.is_some() { value.world_position } else { Vec3::ZERO }
    }

    fn leaf_matches(&self, leaf: &VisibleElement, value: &VisibleElement) -> bool {
        leaf.node.is_some() && leaf.node == value.node
    }

    fn make_leaf(&self, value: VisibleElement) -> VisibleElement {
        value
    }

    fn leaf_position(&self, leaf: &VisibleElement) -> Vec3 {
        self.position_of(leaf)
    }

    /// Reached leaves are kept without a per-element test: their cell
    /// already intersects the query
    fn collect_leaf(&self, leaf: &VisibleElement, _bounds: &Bounds, results: &mut Vec<VisibleElement>) {
        results.push(leaf.clone());
    }

    /// Only drawable leaves populate the tree
    fn should_insert(&self, value: &VisibleElement) -> bool {
        value.node.is_some() && value.contain_mode == ContainMode::Leaf
    }
}

/// Octree of visible elements, one element per leaf
pub type SpatialOcTree = OcTreeBase<SpatialHooks>;
