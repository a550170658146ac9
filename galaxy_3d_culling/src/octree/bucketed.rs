/// Bucketed leaves: up to `BUCKET_SIZE` values share a leaf before it is
/// subdivided, which keeps clustered values from driving the tree deep.

use std::marker::PhantomData;
use glam::Vec3;
use crate::bounds::Bounds;
use super::hooks::{Located, OcTreeHooks, Reinsert, Removal};
use super::octree_base::OcTreeBase;

/// Values a bucket holds before the engine subdivides it
pub const BUCKET_SIZE: usize = 3;

/// Hooks storing a small `Vec` of values per leaf.
///
/// At the depth limit a full bucket keeps growing instead of refusing
/// the value, so bucketed insertion never fails on coincident positions.
#[derive(Debug)]
pub struct Bucketed<V>(PhantomData<fn() -> V>);

impl<V> Bucketed<V> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<V> Default for Bucketed<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Located + Clone + PartialEq> OcTreeHooks for Bucketed<V> {
    type Value = V;
    type Leaf = Vec<V>;

    fn position_of(&self, value: &V) -> Vec3 {
        value.position()
    }

    fn leaf_matches(&self, leaf: &Vec<V>, value: &V) -> bool {
        leaf.contains(value)
    }

    fn make_leaf(&self, value: V) -> Vec<V> {
        let mut bucket = Vec::with_capacity(BUCKET_SIZE);
        bucket.push(value);
        bucket
    }

    fn leaf_position(&self, leaf: &Vec<V>) -> Vec3 {
        leaf.first().map_or(Vec3::ZERO, Located::position)
    }

    fn collect_leaf(&self, leaf: &Vec<V>, bounds: &Bounds, results: &mut Vec<V>) {
        results.extend(leaf.iter().filter(|v| bounds.contains(v.position())).cloned());
    }

    fn on_insert(&mut self, leaf: &mut Vec<V>, value: V, at_depth_limit: bool) -> Option<V> {
        if leaf.len() < BUCKET_SIZE || at_depth_limit {
            leaf.push(value);
            None
        } else {
            Some(value)
        }
    }

    fn on_reinsert_child(&mut self, leaf: &mut Vec<V>) -> Reinsert<V> {
        Reinsert::Values(std::mem::take(leaf))
    }

    fn on_remove_data(&mut self, leaf: &mut Vec<V>, value: &V) -> Removal {
        match leaf.iter().position(|v| v == value) {
            None => Removal::NotFound,
            Some(index) => {
                leaf.remove(index);
                if leaf.is_empty() { Removal::Vacated } else { Removal::Kept }
            }
        }
    }

    fn leaf_fits(&self, leaf: &Vec<V>, fits: &dyn Fn(Vec3) -> bool) -> bool {
        leaf.iter().all(|v| fits(v.position()))
    }
}

/// Octree with bucketed leaves
pub type BucketedOcTree<V> = OcTreeBase<Bucketed<V>>;

#[cfg(test)]
#[path = "bucketed_tests.rs"]
mod tests;
