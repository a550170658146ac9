/// Customization points of the octree engine.
///
/// `OcTreeBase` runs a single insertion/removal/query algorithm; what a
/// leaf stores and how values are positioned, compared, packed and
/// collected is decided by an `OcTreeHooks` implementation.

use std::marker::PhantomData;
use glam::Vec3;
use crate::bounds::Bounds;
use super::node::NodeId;

/// How a leaf is re-homed when a container is created in its place
#[derive(Debug, Clone, PartialEq)]
pub enum Reinsert<V> {
    /// Move the leaf node as-is into the new container
    Whole,
    /// The leaf was drained. Each value is inserted again below the new
    /// container and the old node is discarded.
    Values(Vec<V>),
}

/// Outcome of `OcTreeHooks::on_remove_data`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The value is not stored in this leaf
    NotFound,
    /// The value was removed and the leaf still holds others
    Kept,
    /// The leaf is now empty and its node must go
    Vacated,
}

pub trait OcTreeHooks {
    type Value: Clone;
    type Leaf;

    /// World position used to route `value`
    fn position_of(&self, value: &Self::Value) -> Vec3;

    /// Whether `leaf` stores `value`
    fn leaf_matches(&self, leaf: &Self::Leaf, value: &Self::Value) -> bool;

    fn make_leaf(&self, value: Self::Value) -> Self::Leaf;

    /// Position used to route the leaf as a whole
    fn leaf_position(&self, leaf: &Self::Leaf) -> Vec3;

    /// Append the leaf's values that answer a range query. Called only
    /// for leaves whose sector intersects `bounds`.
    fn collect_leaf(&self, leaf: &Self::Leaf, bounds: &Bounds, results: &mut Vec<Self::Value>);

    /// Veto insertion entirely
    fn should_insert(&self, _value: &Self::Value) -> bool {
        true
    }

    /// `value` landed on an occupied leaf. Return `None` to absorb it into
    /// `leaf`, or hand it back to make the engine subdivide.
    ///
    /// `at_depth_limit` is set when the two cannot be separated any
    /// further. Handing the value back then fails the insertion, and the
    /// leaf must be left untouched.
    fn on_insert(
        &mut self,
        _leaf: &mut Self::Leaf,
        value: Self::Value,
        _at_depth_limit: bool,
    ) -> Option<Self::Value> {
        Some(value)
    }

    /// A container is replacing `leaf`'s slot.
    ///
    /// Hooks returning `Reinsert::Values` must absorb every value offered
    /// with `at_depth_limit` set, otherwise redistributed values can be lost.
    fn on_reinsert_child(&mut self, _leaf: &mut Self::Leaf) -> Reinsert<Self::Value> {
        Reinsert::Whole
    }

    /// Remove `value` from `leaf`
    fn on_remove_data(&mut self, leaf: &mut Self::Leaf, value: &Self::Value) -> Removal {
        if self.leaf_matches(leaf, value) {
            Removal::Vacated
        } else {
            Removal::NotFound
        }
    }

    /// Whether every position stored in `leaf` passes `fits`
    fn leaf_fits(&self, leaf: &Self::Leaf, fits: &dyn Fn(Vec3) -> bool) -> bool {
        fits(self.leaf_position(leaf))
    }

    /// Called before a range query descends into container `node`
    fn on_container_pre_insert(&self, _node: NodeId, _results: &mut Vec<Self::Value>) {}

    /// Called after a range query returns from container `node`
    fn on_container_post_insert(&self, _node: NodeId, _results: &mut Vec<Self::Value>) {}
}

// ===== SINGLE VALUE PER LEAF =====

/// Something with a world position
pub trait Located {
    fn position(&self) -> Vec3;
}

impl Located for Vec3 {
    fn position(&self) -> Vec3 {
        *self
    }
}

/// Hooks storing exactly one value per leaf, compared with `PartialEq`.
///
/// Range queries return exactly the values whose position lies inside
/// the query bounds.
#[derive(Debug)]
pub struct SingleValue<V>(PhantomData<fn() -> V>);

impl<V> SingleValue<V> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<V> Default for SingleValue<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Located + Clone + PartialEq> OcTreeHooks for SingleValue<V> {
    type Value = V;
    type Leaf = V;

    fn position_of(&self, value: &V) -> Vec3 {
        value.position()
    }

    fn leaf_matches(&self, leaf: &V, value: &V) -> bool {
        leaf == value
    }

    fn make_leaf(&self, value: V) -> V {
        value
    }

    fn leaf_position(&self, leaf: &V) -> Vec3 {
        leaf.position()
    }

    fn collect_leaf(&self, leaf: &V, bounds: &Bounds, results: &mut Vec<V>) {
        if bounds.contains(leaf.position()) {
            results.push(leaf.clone());
        }
    }
}
