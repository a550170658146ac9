//! Integration tests for octree culling
//!
//! These tests drive the public API end to end: scene graph events into
//! the cullers, frustum queries against the octree, and the conservative
//! box test against an exact separating-axis check.
//!
//! Run with: cargo test --test culling_integration_tests

use std::f32::consts::{FRAC_PI_2, FRAC_PI_3};
use galaxy_3d_culling::galaxy3d::bounds::{Bounds, Frustum, AABB};
use galaxy_3d_culling::galaxy3d::camera::Camera;
use galaxy_3d_culling::galaxy3d::config::{CullerConfig, OcTreeConfig};
use galaxy_3d_culling::galaxy3d::culling::{Culler, DummyCuller, OcTreeCuller};
use galaxy_3d_culling::galaxy3d::octree::{ChildLocation, Sector};
use galaxy_3d_culling::galaxy3d::scene::{
    NodeKind, RecordingDrawer, SceneGraph, SceneRenderer, SpatialKey,
};
use galaxy_3d_culling::glam::{Mat4, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ============================================================================
// HELPERS
// ============================================================================

fn config(region_size: f32) -> CullerConfig {
    CullerConfig {
        octree: OcTreeConfig::with_region_size(region_size),
        ..CullerConfig::default()
    }
}

fn at(position: Vec3) -> Mat4 {
    Mat4::from_translation(position)
}

fn random_point(rng: &mut StdRng, extent: f32) -> Vec3 {
    Vec3::new(
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
    )
}

fn random_direction(rng: &mut StdRng) -> Vec3 {
    loop {
        let dir = random_point(rng, 1.0);
        // Keep clear of the up vector so look_at is never refused
        if dir.length() > 0.1 && dir.normalize().dot(Vec3::Y).abs() < 0.95 {
            return dir.normalize();
        }
    }
}

fn drawn_sorted(drawer: &RecordingDrawer) -> Vec<SpatialKey> {
    let mut nodes = drawer.drawn_nodes();
    nodes.sort();
    nodes
}

// ============================================================================
// MOVING A NODE BETWEEN OCTANTS
// ============================================================================

#[test]
fn test_integration_node_moves_between_octants() {
    let mut graph = SceneGraph::new();
    let camera = Camera::perspective(FRAC_PI_2, 1.0, 0.1, 100.0);
    let mut culler = OcTreeCuller::new(camera, config(100.0)).unwrap();

    let start = Vec3::new(10.0, 10.0, 10.0);
    let target = Vec3::new(-10.0, -10.0, -10.0);
    let octant_a = ChildLocation::relative_location(Vec3::ZERO, start);
    let octant_b = ChildLocation::relative_location(Vec3::ZERO, target);
    assert_ne!(octant_a, octant_b);

    let root_sector = Sector::root(100.0);
    let region_a = root_sector.octant(octant_a).aabb();
    let region_b = root_sector.octant(octant_b).aabb();
    // Octant A's interior, clear of the faces it shares with its neighbours
    let query_a = Bounds::Aabb(AABB::from_min_max(region_a.min + 1.0, region_a.max - 1.0));

    let add = |graph: &mut SceneGraph, culler: &mut OcTreeCuller, name: &str, position: Vec3| {
        let key = graph.add_node(name, NodeKind::Model, None, at(position)).unwrap();
        culler.on_scene_node_added(graph, key);
        key
    };
    let a1 = add(&mut graph, &mut culler, "a1", Vec3::new(50.0, 50.0, 50.0));
    let a2 = add(&mut graph, &mut culler, "a2", Vec3::new(60.0, 40.0, 30.0));
    let b1 = add(&mut graph, &mut culler, "b1", Vec3::new(-50.0, -50.0, -50.0));
    let tracked = add(&mut graph, &mut culler, "tracked", start);

    let nodes_in_a = |culler: &OcTreeCuller| -> Vec<SpatialKey> {
        culler
            .tree()
            .find_all_in_bounds(&query_a)
            .iter()
            .filter_map(|e| e.node)
            .collect()
    };

    let before = culler.tree_node(tracked).unwrap();
    let before_sector = *culler.tree().node(before).unwrap().sector();
    assert!(region_a.contains_aabb(&before_sector.aabb()));
    assert!(nodes_in_a(&culler).contains(&tracked));

    graph.set_local_transform(tracked, at(target)).unwrap();
    culler.on_scene_node_updated(&mut graph, tracked);

    let after = culler.tree_node(tracked).unwrap();
    let tree = culler.tree();
    let leaf = tree.node(after).unwrap();
    assert!(leaf.is_leaf());
    assert!(leaf.sector().contains(target));
    assert!(region_b.contains_aabb(&leaf.sector().aabb()));
    assert_eq!(leaf.leaf().unwrap().world_position, target);

    // Its container was created inside octant B, next to b1
    let container = tree.node(leaf.parent().unwrap()).unwrap();
    assert!(!container.is_root());
    assert!(region_b.contains_aabb(&container.sector().aabb()));
    assert_eq!(container.child_count(), 2);

    let in_a = nodes_in_a(&culler);
    assert!(!in_a.contains(&tracked));
    assert!(in_a.contains(&a1));
    assert!(in_a.contains(&a2));
    assert!(!in_a.contains(&b1));
    assert_eq!(culler.element_count(), 4);
    assert_eq!(culler.tree().leaf_count(), 4);
}

#[test]
fn test_integration_node_leaves_and_reenters_the_region() {
    let mut renderer = SceneRenderer::new(Box::new(
        OcTreeCuller::new(Camera::perspective(FRAC_PI_2, 1.0, 0.1, 500.0), config(100.0)).unwrap(),
    ))
    .unwrap();
    let shader = renderer.create_shader("flat");
    renderer.attach_local_shader(renderer.root(), shader).unwrap();
    let far = renderer
        .insert_node_at("far", NodeKind::Model, None, at(Vec3::new(0.0, 0.0, -300.0)))
        .unwrap();

    // Outside the octree, yet still culled and drawn
    let mut drawer = RecordingDrawer::new();
    renderer.render(&mut drawer);
    assert_eq!(drawer.drawn_nodes(), vec![far]);

    renderer.set_local_transform(far, at(Vec3::new(0.0, 0.0, -30.0))).unwrap();
    renderer.render(&mut drawer);
    assert_eq!(drawer.drawn_nodes(), vec![far]);
}

// ============================================================================
// OCTREE CULLER AGAINST THE DUMMY BASELINE
// ============================================================================

#[test]
fn test_integration_octree_culler_matches_dummy_culler() {
    let mut rng = StdRng::seed_from_u64(0x0C7_7EE);
    let camera = Camera::perspective(FRAC_PI_3, 16.0 / 9.0, 0.5, 120.0);

    let mut octree = SceneRenderer::new(Box::new(OcTreeCuller::new(camera.clone(), config(200.0)).unwrap())).unwrap();
    let mut dummy = SceneRenderer::new(Box::new(DummyCuller::new(camera))).unwrap();

    // Both renderers receive the same operations, so their keys line up
    for renderer in [&mut octree, &mut dummy] {
        let shader = renderer.create_shader("flat");
        let root = renderer.root();
        renderer.attach_local_shader(root, shader).unwrap();
    }
    let mut groups = Vec::new();
    let mut models = Vec::new();
    for g in 0..6 {
        let transform = at(random_point(&mut rng, 100.0));
        let name = format!("group{}", g);
        let key = octree.insert_node_at(&name, NodeKind::Grouping, None, transform).unwrap();
        assert_eq!(dummy.insert_node_at(&name, NodeKind::Grouping, None, transform).unwrap(), key);
        groups.push(key);

        for m in 0..40 {
            let transform = at(random_point(&mut rng, 40.0));
            let name = format!("model{}_{}", g, m);
            let key = octree.insert_node_at(&name, NodeKind::Model, Some(groups[g]), transform).unwrap();
            assert_eq!(dummy.insert_node_at(&name, NodeKind::Model, Some(groups[g]), transform).unwrap(), key);
            models.push(key);
        }
    }

    let mut octree_drawer = RecordingDrawer::new();
    let mut dummy_drawer = RecordingDrawer::new();
    let mut total_drawn = 0;

    for frame in 0..30 {
        let dir = random_direction(&mut rng);
        let eye = random_point(&mut rng, 20.0);
        octree.update_camera(|c| c.look_at(eye, eye + dir, Vec3::Y));
        dummy.update_camera(|c| c.look_at(eye, eye + dir, Vec3::Y));

        // Move a few groups and models around
        for _ in 0..3 {
            let group = groups[rng.gen_range(0..groups.len())];
            let transform = at(random_point(&mut rng, 100.0));
            octree.set_local_transform(group, transform).unwrap();
            dummy.set_local_transform(group, transform).unwrap();
        }
        for _ in 0..10 {
            let model = models[rng.gen_range(0..models.len())];
            let transform = at(random_point(&mut rng, 40.0));
            octree.set_local_transform(model, transform).unwrap();
            dummy.set_local_transform(model, transform).unwrap();
        }
        if frame % 10 == 9 {
            let model = models.swap_remove(rng.gen_range(0..models.len()));
            octree.remove_node(model).unwrap();
            dummy.remove_node(model).unwrap();
        }

        octree.render(&mut octree_drawer);
        dummy.render(&mut dummy_drawer);

        let frustum = octree.camera().world_frustum();
        let everything: Vec<SpatialKey> = dummy.visible_set().elements().iter().filter_map(|e| e.node).collect();
        let culled: Vec<SpatialKey> = octree.visible_set().elements().iter().filter_map(|e| e.node).collect();

        assert_eq!(everything.len(), models.len());
        for key in &culled {
            assert!(everything.contains(key), "frame {}: {:?} unknown to the baseline", frame, key);
        }
        for element in dummy.visible_set().elements() {
            if frustum.contains(element.world_position) {
                let key = element.node.unwrap();
                assert!(culled.contains(&key), "frame {}: visible {:?} was culled", frame, key);
            }
        }

        assert_eq!(drawn_sorted(&octree_drawer), drawn_sorted(&dummy_drawer), "frame {}", frame);
        assert_eq!(octree.models_drawn(), dummy.models_drawn());
        total_drawn += octree.models_drawn();
    }

    // The scene was actually in view some of the time
    assert!(total_drawn > 0);
}

// ============================================================================
// CONSERVATIVE BOX TEST
// ============================================================================

/// Min/max of `points` projected on `axis`
fn project(points: &[Vec3], axis: Vec3) -> (f32, f32) {
    points.iter().fold((f32::MAX, f32::MIN), |(lo, hi), p| {
        let d = p.dot(axis);
        (lo.min(d), hi.max(d))
    })
}

/// Exact convex overlap test by separating axes.
///
/// Only reports an intersection when every axis overlaps by more than
/// `margin`, so boxes that merely graze the frustum are left out.
fn overlaps_by_margin(frustum: &Frustum, aabb: &AABB, margin: f32) -> bool {
    let fc = frustum.corners();
    let bc = aabb.corners();

    let frustum_edges = [
        fc[1] - fc[0],
        fc[2] - fc[0],
        fc[4] - fc[0],
        fc[5] - fc[1],
        fc[6] - fc[2],
        fc[7] - fc[3],
    ];
    let mut axes: Vec<Vec3> = vec![Vec3::X, Vec3::Y, Vec3::Z];
    axes.extend(frustum.planes().iter().map(|p| p.normal()));
    for box_edge in [Vec3::X, Vec3::Y, Vec3::Z] {
        for edge in frustum_edges {
            axes.push(box_edge.cross(edge));
        }
    }

    axes.into_iter()
        .filter(|axis| axis.length_squared() > 1e-8)
        .map(|axis| axis.normalize())
        .all(|axis| {
            let (f_lo, f_hi) = project(fc, axis);
            let (b_lo, b_hi) = project(&bc, axis);
            f_hi.min(b_hi) - f_lo.max(b_lo) > margin
        })
}

#[test]
fn test_integration_frustum_box_test_is_conservative() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut intersecting = 0;
    let mut rejected = 0;

    for _ in 0..40 {
        let mut camera = Camera::perspective(FRAC_PI_3, 1.5, 1.0, 50.0);
        let eye = random_point(&mut rng, 10.0);
        camera.look_at(eye, eye + random_direction(&mut rng), Vec3::Y);
        let frustum = camera.world_frustum();
        assert!(!frustum.is_degenerate());

        for _ in 0..100 {
            let center = eye + random_point(&mut rng, 60.0);
            let half = Vec3::new(
                rng.gen_range(0.5..8.0),
                rng.gen_range(0.5..8.0),
                rng.gen_range(0.5..8.0),
            );
            let aabb = AABB::from_center_half_extents(center, half);

            if overlaps_by_margin(&frustum, &aabb, 1e-3) {
                intersecting += 1;
                assert!(frustum.test_aabb(&aabb), "overlapping box {:?} rejected", aabb);
            }

            let behind_a_plane = frustum
                .planes()
                .iter()
                .any(|plane| aabb.corners().iter().all(|c| plane.distance(*c) < -1e-3));
            if behind_a_plane {
                rejected += 1;
                assert!(!frustum.test_aabb(&aabb), "box {:?} behind a plane was kept", aabb);
            }
        }
    }

    assert!(intersecting > 0);
    assert!(rejected > 0);
}
