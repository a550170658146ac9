/// DummyCuller: every tracked element is visible, every frame.
///
/// Baseline for checking `OcTreeCuller` results and timings; no spatial
/// rejection at all.

use crate::camera::Camera;
use crate::config::CullerConfig;
use crate::scene::{NodeKind, SceneGraph, ShaderKey, SpatialKey, VisibleElement, VisibleSet};
use super::culler::Culler;

pub struct DummyCuller {
    elements: Vec<VisibleElement>,
    lights: Vec<SpatialKey>,
    visible: VisibleSet,
    camera: Camera,
}

impl DummyCuller {
    pub fn new(camera: Camera) -> Self {
        Self::with_config(camera, &CullerConfig::default())
    }

    /// Only the visible set reserves are used
    pub fn with_config(camera: Camera, config: &CullerConfig) -> Self {
        crate::engine_info!("galaxy3d::DummyCuller", "Created dummy culler");
        Self {
            elements: Vec::with_capacity(config.element_reserve),
            lights: Vec::new(),
            visible: VisibleSet::with_capacity(config.element_reserve, config.light_reserve),
            camera,
        }
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    fn position(&self, node: SpatialKey) -> Option<usize> {
        self.elements.iter().position(|e| e.node == Some(node))
    }
}

impl Culler for DummyCuller {
    fn insert(&mut self, graph: &SceneGraph, node: SpatialKey, global_shaders: &[ShaderKey]) {
        if let Some(mut element) = VisibleElement::from_node(graph, node) {
            element.global_shaders = global_shaders.to_vec();
            self.visible.push_element(element);
        }
    }

    fn on_scene_node_added(&mut self, graph: &mut SceneGraph, node: SpatialKey) {
        match graph.node(node).map(|n| n.kind()) {
            Some(NodeKind::Light(_)) => {
                if !self.lights.contains(&node) {
                    self.lights.push(node);
                }
            }
            Some(NodeKind::Model) => {
                if self.position(node).is_some() || graph.recalc_world_transform(node).is_err() {
                    return;
                }
                if let Some(element) = VisibleElement::from_node(graph, node) {
                    self.elements.push(element);
                }
            }
            Some(NodeKind::Grouping) | None => {}
        }
    }

    fn on_scene_node_updated(&mut self, graph: &mut SceneGraph, node: SpatialKey) {
        let Some(index) = self.position(node) else {
            return;
        };
        if graph.recalc_world_transform(node).is_ok() {
            self.elements[index].refresh_position(graph);
        }
    }

    fn on_scene_node_moved(&mut self, graph: &SceneGraph, node: SpatialKey) {
        if let Some(index) = self.position(node) {
            self.elements[index].refresh_shaders(graph);
        }
    }

    fn on_scene_node_removed(&mut self, _graph: &SceneGraph, node: SpatialKey) {
        self.lights.retain(|light| *light != node);
        if let Some(index) = self.position(node) {
            self.elements.remove(index);
        }
    }

    fn calc_visible_set(&mut self) {
        self.visible.copy_elements(&self.elements);
        self.visible.copy_lights(&self.lights);
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
