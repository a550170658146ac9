/// VisibleSet: what a Culler hands to the renderer for one frame.

use glam::Vec3;
use super::scene_graph::{ContainMode, SceneGraph, ShaderKey, SpatialKey};

/// A drawable node plus the shaders it inherits from its ancestors.
///
/// Two elements are equal when they reference the same node.
#[derive(Debug, Clone)]
pub struct VisibleElement {
    pub node: Option<SpatialKey>,
    pub contain_mode: ContainMode,
    /// World translation captured when the element was last refreshed
    pub world_position: Vec3,
    pub global_shaders: Vec<ShaderKey>,
}

impl PartialEq for VisibleElement {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl VisibleElement {
    /// Snapshot of a scene node, `None` if the key is unknown
    pub fn from_node(graph: &SceneGraph, key: SpatialKey) -> Option<Self> {
        let node = graph.node(key)?;
        Some(Self {
            node: Some(key),
            contain_mode: node.contain_mode(),
            world_position: graph.world_position(key).unwrap_or(Vec3::ZERO),
            global_shaders: graph.find_global_shaders(key),
        })
    }

    /// Element only usable as a lookup probe (equality is by node)
    pub fn probe(key: SpatialKey) -> Self {
        Self {
            node: Some(key),
            contain_mode: ContainMode::Leaf,
            world_position: Vec3::ZERO,
            global_shaders: Vec::new(),
        }
    }

    pub fn refresh_position(&mut self, graph: &SceneGraph) {
        self.world_position = self
            .node
            .and_then(|key| graph.world_position(key))
            .unwrap_or(Vec3::ZERO);
    }

    pub fn refresh_shaders(&mut self, graph: &SceneGraph) {
        self.global_shaders = match self.node {
            Some(key) => graph.find_global_shaders(key),
            None => Vec::new(),
        };
    }
}

/// Elements and lights visible for the current frame
#[derive(Debug, Clone, Default)]
pub struct VisibleSet {
    elements: Vec<VisibleElement>,
    lights: Vec<SpatialKey>,
}

impl VisibleSet {
    pub fn with_capacity(element_reserve: usize, light_reserve: usize) -> Self {
        Self {
            elements: Vec::with_capacity(element_reserve),
            lights: Vec::with_capacity(light_reserve),
        }
    }

    pub fn elements(&self) -> &[VisibleElement] {
        &self.elements
    }

    /// Direct access for cullers that append query results in place
    pub fn elements_mut(&mut self) -> &mut Vec<VisibleElement> {
        &mut self.elements
    }

    pub fn lights(&self) -> &[SpatialKey] {
        &self.lights
    }

    pub fn push_element(&mut self, element: VisibleElement) {
        self.elements.push(element);
    }

    /// Replace the element list, keeping the allocation
    pub fn copy_elements(&mut self, elements: &[VisibleElement]) {
        self.elements.clear();
        self.elements.extend_from_slice(elements);
    }

    /// Replace the light list, keeping the allocation
    pub fn copy_lights(&mut self, lights: &[SpatialKey]) {
        self.lights.clear();
        self.lights.extend_from_slice(lights);
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        self.lights.clear();
    }

    /// Number of visible elements (lights excluded)
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains_node(&self, key: SpatialKey) -> bool {
        self.elements.iter().any(|e| e.node == Some(key))
    }
}
