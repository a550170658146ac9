/// OcTreeCuller: frustum culling backed by a spatial octree.
///
/// Each drawable leaf is wrapped in a `VisibleElement` and stored in the
/// octree; a lookup table maps scene keys to tree nodes so events never
/// have to search the tree. Elements the tree refuses (outside the region,
/// or coincident with another element) are kept in an overflow list that
/// is frustum-tested one by one.

use rustc_hash::FxHashMap;
use crate::bounds::Bounds;
use crate::camera::Camera;
use crate::config::CullerConfig;
use crate::error::Result;
use crate::octree::NodeId;
use crate::scene::{NodeKind, SceneGraph, ShaderKey, SpatialKey, VisibleElement, VisibleSet};
use super::culler::Culler;
use super::spatial_octree::{SpatialHooks, SpatialOcTree};

const SOURCE: &str = "galaxy3d::OcTreeCuller";

/// Where a tracked element lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Tree(NodeId),
    Overflow,
}

pub struct OcTreeCuller {
    tree: SpatialOcTree,
    /// Scene key → current home of its element
    placements: FxHashMap<SpatialKey, Placement>,
    overflow: Vec<VisibleElement>,
    lights: Vec<SpatialKey>,
    visible: VisibleSet,
    camera: Camera,
}

impl OcTreeCuller {
    pub fn new(camera: Camera, config: CullerConfig) -> Result<Self> {
        config.validate()?;
        let tree = SpatialOcTree::new(SpatialHooks, config.octree)?;
        crate::engine_info!(
            SOURCE,
            "Created octree culler (region size {}, max depth {})",
            config.octree.region_size, config.octree.max_depth
        );
        Ok(Self {
            tree,
            placements: FxHashMap::default(),
            overflow: Vec::new(),
            lights: Vec::new(),
            visible: VisibleSet::with_capacity(config.element_reserve, config.light_reserve),
            camera,
        })
    }

    pub fn with_camera(camera: Camera) -> Result<Self> {
        Self::new(camera, CullerConfig::default())
    }

    // ===== ACCESSORS =====

    pub fn tree(&self) -> &SpatialOcTree {
        &self.tree
    }

    pub fn placement(&self, node: SpatialKey) -> Option<Placement> {
        self.placements.get(&node).copied()
    }

    /// Tree node currently holding the element of `node`
    pub fn tree_node(&self, node: SpatialKey) -> Option<NodeId> {
        match self.placements.get(&node)? {
            Placement::Tree(id) => Some(*id),
            Placement::Overflow => None,
        }
    }

    /// Number of tracked drawable elements (tree and overflow)
    pub fn element_count(&self) -> usize {
        self.placements.len()
    }

    pub fn overflow_count(&self) -> usize {
        self.overflow.len()
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    // ===== PLACEMENT =====

    /// Put an element in the tree, or in the overflow list if refused
    fn place(&mut self, key: SpatialKey, element: VisibleElement) {
        match self.tree.insert(element.clone()) {
            Ok(Some(id)) => {
                self.placements.insert(key, Placement::Tree(id));
            }
            Ok(None) => {
                crate::engine_trace!(SOURCE, "Node {:?} is not drawable, not indexed", key);
            }
            Err(err) => self.place_in_overflow(key, element, &err),
        }
    }

    fn place_in_overflow(&mut self, key: SpatialKey, element: VisibleElement, reason: &dyn std::fmt::Display) {
        crate::engine_warn!(SOURCE, "Node {:?} kept outside the octree: {}", key, reason);
        self.overflow.push(element);
        self.placements.insert(key, Placement::Overflow);
    }

    fn overflow_index(&self, key: SpatialKey) -> Option<usize> {
        self.overflow.iter().position(|e| e.node == Some(key))
    }

    fn is_light(graph: &SceneGraph, node: SpatialKey) -> bool {
        graph.node(node).is_some_and(|n| n.kind().is_light())
    }
}

impl Culler for OcTreeCuller {
    fn insert(&mut self, _graph: &SceneGraph, _node: SpatialKey, _global_shaders: &[ShaderKey]) {
        // The visible set is rebuilt from the tree every frame
    }

    fn on_scene_node_added(&mut self, graph: &mut SceneGraph, node: SpatialKey) {
        let Some(kind) = graph.node(node).map(|n| n.kind()) else {
            return;
        };
        match kind {
            NodeKind::Light(_) => {
                if !self.lights.contains(&node) {
                    self.lights.push(node);
                }
            }
            NodeKind::Model => {
                if self.placements.contains_key(&node) {
                    self.on_scene_node_updated(graph, node);
                    return;
                }
                if graph.recalc_world_transform(node).is_err() {
                    return;
                }
                if let Some(element) = VisibleElement::from_node(graph, node) {
                    self.place(node, element);
                }
            }
            NodeKind::Grouping => {}
        }
    }

    fn on_scene_node_updated(&mut self, graph: &mut SceneGraph, node: SpatialKey) {
        let Some(placement) = self.placements.get(&node).copied() else {
            return;
        };
        if graph.recalc_world_transform(node).is_err() {
            return;
        }

        match placement {
            Placement::Tree(id) => {
                let Some(element) = self.tree.leaf_mut(id) else {
                    return;
                };
                element.refresh_position(graph);
                let element = element.clone();

                match self.tree.update_node(id) {
                    Ok(new_id) => {
                        self.placements.insert(node, Placement::Tree(new_id));
                    }
                    Err(err) => self.place_in_overflow(node, element, &err),
                }
            }
            Placement::Overflow => {
                let Some(index) = self.overflow_index(node) else {
                    return;
                };
                let mut element = self.overflow.swap_remove(index);
                element.refresh_position(graph);
                match self.tree.insert(element.clone()) {
                    Ok(Some(id)) => {
                        crate::engine_debug!(SOURCE, "Node {:?} moved back into the octree", node);
                        self.placements.insert(node, Placement::Tree(id));
                    }
                    _ => self.overflow.push(element),
                }
            }
        }
    }

    fn on_scene_node_moved(&mut self, graph: &SceneGraph, node: SpatialKey) {
        let Some(placement) = self.placements.get(&node).copied() else {
            return;
        };
        let element = match placement {
            Placement::Tree(id) => self.tree.leaf_mut(id),
            Placement::Overflow => match self.overflow_index(node) {
                Some(index) => self.overflow.get_mut(index),
                None => None,
            },
        };
        if let Some(element) = element {
            element.refresh_shaders(graph);
        }
    }

    fn on_scene_node_removed(&mut self, graph: &SceneGraph, node: SpatialKey) {
        if Self::is_light(graph, node) {
            self.lights.retain(|light| *light != node);
            return;
        }
        let Some(placement) = self.placements.remove(&node) else {
            return;
        };
        match placement {
            Placement::Tree(id) => {
                self.tree.remove_at(&VisibleElement::probe(node), id);
            }
            Placement::Overflow => {
                if let Some(index) = self.overflow_index(node) {
                    self.overflow.swap_remove(index);
                }
            }
        }
    }

    fn calc_visible_set(&mut self) {
        let frustum = self.camera.world_frustum();
        self.visible.elements_mut().clear();
        self.visible.copy_lights(&self.lights);
        if frustum.is_degenerate() {
            return;
        }

        let bounds = Bounds::Frustum(frustum);
        self.tree.find_all_in_bounds_into(&bounds, self.visible.elements_mut());
        for element in &self.overflow {
            if frustum.contains(element.world_position) {
                self.visible.push_element(element.clone());
            }
        }
    }

    fn visible_set(&self) -> &VisibleSet {
        &self.visible
    }

    fn camera(&self) -> &Camera {
        &self.camera
    }

    fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }
}
