//! Unit tests for bucketed leaves

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use super::*;
use crate::bounds::AABB;
use crate::error::Error;
use crate::octree::ChildLocation;

fn tree() -> BucketedOcTree<Vec3> {
    BucketedOcTree::with_region_size(Bucketed::new(), 100.0).unwrap()
}

fn bucket_sizes(tree: &BucketedOcTree<Vec3>) -> Vec<usize> {
    tree.iter().filter_map(|(_, n)| n.leaf().map(Vec::len)).collect()
}

#[test]
fn test_bucket_absorbs_until_full() {
    let mut tree = tree();
    let a = tree.insert(Vec3::new(10.0, 10.0, 10.0)).unwrap().unwrap();
    let b = tree.insert(Vec3::new(60.0, 60.0, 60.0)).unwrap().unwrap();
    let c = tree.insert(Vec3::new(30.0, 80.0, 5.0)).unwrap().unwrap();

    // Same root octant, one leaf, no subdivision yet
    assert_eq!(a, b);
    assert_eq!(b, c);
    assert_eq!(tree.node_count(), 2);
    assert_eq!(tree.leaf(a).unwrap().len(), BUCKET_SIZE);
}

#[test]
fn test_full_bucket_is_redistributed() {
    let mut tree = tree();
    let values = [
        Vec3::new(10.0, 10.0, 10.0),
        Vec3::new(60.0, 60.0, 60.0),
        Vec3::new(30.0, 80.0, 5.0),
        Vec3::new(90.0, 5.0, 90.0),
    ];
    for v in values {
        tree.insert(v).unwrap();
    }

    // Four values now spread below a container in the upper-back-right octant
    let root = tree.node(tree.root()).unwrap();
    let container = tree.node(root.child(ChildLocation::UpperBackRight).unwrap()).unwrap();
    assert!(container.leaf().is_none());
    assert!(container.child_count() >= 2);
    assert_eq!(bucket_sizes(&tree).iter().sum::<usize>(), 4);
    for v in values {
        assert!(tree.find(&v).is_some(), "lost {}", v);
    }
}

#[test]
fn test_clustered_values_collapse_single_child_chains() {
    let mut tree = tree();
    // All inside one small corner: redistribution must not leave
    // single-child containers behind
    for i in 0..10 {
        tree.insert(Vec3::new(1.0 + i as f32 * 0.01, 1.0, 1.0)).unwrap();
    }
    for (id, node) in tree.iter() {
        if id != tree.root() && node.leaf().is_none() {
            assert!(node.child_count() >= 2);
        }
    }
    assert_eq!(bucket_sizes(&tree).iter().sum::<usize>(), 10);
}

#[test]
fn test_coincident_values_pack_at_depth_limit() {
    let mut tree = tree();
    for _ in 0..5 {
        tree.insert(Vec3::splat(7.0)).unwrap();
    }
    let id = tree.find(&Vec3::splat(7.0)).unwrap();
    assert_eq!(tree.leaf(id).unwrap().len(), 5);
}

#[test]
fn test_value_on_first_position_splits_shallow_bucket() {
    let mut tree = tree();
    let a = Vec3::new(10.0, 10.0, 10.0);
    let first = tree.insert(a).unwrap().unwrap();
    tree.insert(Vec3::new(60.0, 60.0, 60.0)).unwrap();
    tree.insert(Vec3::new(30.0, 80.0, 5.0)).unwrap();
    assert_eq!(tree.node(first).unwrap().sector().depth, 1);

    // Coincides with the bucket's first value only: the others can still
    // be separated, so the full bucket is split instead of packed
    let id = tree.insert(a).unwrap().unwrap();
    assert_eq!(tree.leaf(id).unwrap(), &vec![a, a]);
    assert_eq!(tree.node(id).unwrap().sector().depth, 2);

    tree.insert(a).unwrap();
    assert_eq!(tree.leaf(id).unwrap().len(), BUCKET_SIZE);
    assert!(bucket_sizes(&tree).iter().all(|len| *len <= BUCKET_SIZE));
    assert_eq!(bucket_sizes(&tree).iter().sum::<usize>(), 5);
}

#[test]
fn test_remove_keeps_bucket_until_empty() {
    let mut tree = tree();
    let a = Vec3::new(10.0, 10.0, 10.0);
    let b = Vec3::new(20.0, 20.0, 20.0);
    let id = tree.insert(a).unwrap().unwrap();
    tree.insert(b).unwrap();

    assert!(tree.remove(&a));
    assert_eq!(tree.leaf(id).unwrap(), &vec![b]);
    assert!(!tree.remove(&a));
    assert!(tree.remove(&b));
    assert!(tree.node(id).is_none());
    assert!(tree.is_empty());
}

#[test]
fn test_query_filters_bucket_values() {
    let mut tree = tree();
    tree.insert(Vec3::new(10.0, 10.0, 10.0)).unwrap();
    tree.insert(Vec3::new(90.0, 90.0, 90.0)).unwrap();

    let query = Bounds::Aabb(AABB::cube(Vec3::splat(10.0), 5.0));
    assert_eq!(tree.find_all_in_bounds(&query), vec![Vec3::new(10.0, 10.0, 10.0)]);
}

#[test]
fn test_random_bucketed_round_trip() {
    let mut rng = StdRng::seed_from_u64(99);
    let points: Vec<Vec3> = (0..200)
        .map(|_| Vec3::new(rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0)))
        .collect();

    let mut tree = tree();
    for p in &points {
        tree.insert(*p).unwrap();
    }
    assert_eq!(bucket_sizes(&tree).iter().sum::<usize>(), points.len());
    assert!(bucket_sizes(&tree).iter().all(|len| *len <= BUCKET_SIZE));

    let everything = Bounds::Aabb(AABB::cube(Vec3::ZERO, 100.0));
    assert_eq!(tree.find_all_in_bounds(&everything).len(), points.len());

    for p in &points {
        assert!(tree.remove(p));
    }
    assert_eq!(tree.node_count(), 1);
}

#[test]
fn test_update_node_redistributes_moved_bucket() {
    let mut tree = tree();
    let a = Vec3::new(10.0, 10.0, 10.0);
    let id = tree.insert(a).unwrap().unwrap();
    tree.insert(Vec3::new(20.0, 20.0, 20.0)).unwrap();

    let moved = Vec3::new(-50.0, -50.0, -50.0);
    tree.leaf_mut(id).unwrap()[0] = moved;
    let new_id = tree.update_node(id).unwrap();

    assert_eq!(tree.find(&moved), Some(new_id));
    assert!(tree.find(&Vec3::new(20.0, 20.0, 20.0)).is_some());
    assert!(tree.find(&a).is_none());
}

#[test]
fn test_update_node_reports_value_moved_out_of_region() {
    let mut tree = tree();
    let a = Vec3::new(10.0, 10.0, 10.0);
    let id = tree.insert(a).unwrap().unwrap();
    tree.insert(Vec3::new(20.0, 20.0, 20.0)).unwrap();

    // Second value of the bucket leaves the region
    let gone = Vec3::new(500.0, 0.0, 0.0);
    tree.leaf_mut(id).unwrap()[1] = gone;
    let result = tree.update_node(id);

    assert!(matches!(result, Err(Error::OutOfRegion { .. })));
    // The value that still fits is kept
    assert!(tree.find(&a).is_some());
    assert!(tree.find(&gone).is_none());
    assert_eq!(bucket_sizes(&tree), vec![1]);
}
