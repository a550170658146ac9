/// SceneGraph: minimal node hierarchy feeding the cullers.
///
/// Nodes live in a SlotMap and are addressed by stable `SpatialKey`s.
/// Grouping nodes contain other nodes; models and lights are leaves.
/// World transforms are cached per node and recomputed on demand after a
/// local transform changed somewhere above them.

use slotmap::{new_key_type, SlotMap};
use glam::{Mat4, Vec3};
use crate::error::Result;
use crate::engine_err;

new_key_type! {
    /// Stable key for a node of a SceneGraph.
    ///
    /// Keys remain valid even after other nodes are removed.
    pub struct SpatialKey;

    /// Stable key for a shader registered in a SceneGraph
    pub struct ShaderKey;
}

const SOURCE: &str = "galaxy3d::SceneGraph";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightType {
    Ambient,
    Directional,
    Point,
    Spot,
}

/// What a scene node is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Holds other nodes, never drawn
    Grouping,
    /// Drawable geometry
    Model,
    Light(LightType),
}

impl NodeKind {
    pub fn contain_mode(self) -> ContainMode {
        match self {
            NodeKind::Grouping => ContainMode::Container,
            NodeKind::Model | NodeKind::Light(_) => ContainMode::Leaf,
        }
    }

    pub fn is_light(self) -> bool {
        matches!(self, NodeKind::Light(_))
    }
}

/// Whether a node can have children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainMode {
    Container,
    Leaf,
}

/// One node of the scene hierarchy
#[derive(Debug, Clone)]
pub struct SpatialNode {
    name: String,
    kind: NodeKind,
    parent: Option<SpatialKey>,
    children: Vec<SpatialKey>,
    local_transform: Mat4,
    /// Valid only while `world_dirty` is false
    world_transform: Mat4,
    world_dirty: bool,
    local_shaders: Vec<ShaderKey>,
    /// Radius of the drawable content around the node origin
    bounding_radius: f32,
}

impl SpatialNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn contain_mode(&self) -> ContainMode {
        self.kind.contain_mode()
    }

    pub fn parent(&self) -> Option<SpatialKey> {
        self.parent
    }

    pub fn children(&self) -> &[SpatialKey] {
        &self.children
    }

    pub fn local_transform(&self) -> &Mat4 {
        &self.local_transform
    }

    /// Cached world transform, stale while `is_world_dirty()`
    pub fn cached_world_transform(&self) -> &Mat4 {
        &self.world_transform
    }

    pub fn is_world_dirty(&self) -> bool {
        self.world_dirty
    }

    pub fn local_shaders(&self) -> &[ShaderKey] {
        &self.local_shaders
    }

    pub fn bounding_radius(&self) -> f32 {
        self.bounding_radius
    }
}

/// Scene node hierarchy plus the shaders attached to it
pub struct SceneGraph {
    nodes: SlotMap<SpatialKey, SpatialNode>,
    shaders: SlotMap<ShaderKey, String>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            shaders: SlotMap::with_key(),
        }
    }

    // ===== SHADERS =====

    pub fn create_shader(&mut self, name: &str) -> ShaderKey {
        self.shaders.insert(name.to_string())
    }

    pub fn shader_name(&self, key: ShaderKey) -> Option<&str> {
        self.shaders.get(key).map(String::as_str)
    }

    /// Attach a shader to a node. Attaching twice is a no-op.
    pub fn attach_local_shader(&mut self, key: SpatialKey, shader: ShaderKey) -> Result<()> {
        if !self.shaders.contains_key(shader) {
            return Err(engine_err!(SOURCE, "Unknown shader {:?}", shader));
        }
        let node = self.node_mut(key)?;
        if !node.local_shaders.contains(&shader) {
            node.local_shaders.push(shader);
        }
        Ok(())
    }

    /// Returns false if the shader was not attached to the node
    pub fn detach_local_shader(&mut self, key: SpatialKey, shader: ShaderKey) -> Result<bool> {
        let node = self.node_mut(key)?;
        match node.local_shaders.iter().position(|s| *s == shader) {
            Some(index) => {
                node.local_shaders.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Shaders inherited from the ancestors of `key`, nearest ancestor first
    pub fn find_global_shaders(&self, key: SpatialKey) -> Vec<ShaderKey> {
        let mut result = Vec::new();
        let mut current = self.nodes.get(key).and_then(|n| n.parent);
        while let Some(parent) = current {
            let Some(node) = self.nodes.get(parent) else {
                break;
            };
            result.extend_from_slice(&node.local_shaders);
            current = node.parent;
        }
        result
    }

    // ===== NODES =====

    /// Create a node, optionally under a grouping node
    pub fn add_node(
        &mut self,
        name: &str,
        kind: NodeKind,
        parent: Option<SpatialKey>,
        local_transform: Mat4,
    ) -> Result<SpatialKey> {
        if let Some(parent) = parent {
            self.check_container(parent)?;
        }

        let key = self.nodes.insert(SpatialNode {
            name: name.to_string(),
            kind,
            parent,
            children: Vec::new(),
            local_transform,
            world_transform: Mat4::IDENTITY,
            world_dirty: true,
            local_shaders: Vec::new(),
            bounding_radius: 0.0,
        });
        if let Some(parent) = parent {
            self.nodes[parent].children.push(key);
        }
        Ok(key)
    }

    pub fn node(&self, key: SpatialKey) -> Option<&SpatialNode> {
        self.nodes.get(key)
    }

    pub fn contains(&self, key: SpatialKey) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = SpatialKey> + '_ {
        self.nodes.keys()
    }

    pub fn set_bounding_radius(&mut self, key: SpatialKey, radius: f32) -> Result<()> {
        self.node_mut(key)?.bounding_radius = radius.max(0.0);
        Ok(())
    }

    /// Every node below `key` in depth-first pre-order, `key` excluded
    pub fn descendants(&self, key: SpatialKey) -> Vec<SpatialKey> {
        let mut result = Vec::new();
        let mut stack: Vec<SpatialKey> = match self.nodes.get(key) {
            Some(node) => node.children.iter().rev().copied().collect(),
            None => return result,
        };
        while let Some(current) = stack.pop() {
            result.push(current);
            if let Some(node) = self.nodes.get(current) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        result
    }

    /// Remove a node and its whole subtree.
    ///
    /// Returns the removed keys, `key` first.
    pub fn remove_node(&mut self, key: SpatialKey) -> Result<Vec<SpatialKey>> {
        let parent = self.node(key)
            .ok_or_else(|| engine_err!(SOURCE, "Cannot remove unknown node {:?}", key))?
            .parent;
        if let Some(parent) = parent {
            if let Some(parent_node) = self.nodes.get_mut(parent) {
                parent_node.children.retain(|child| *child != key);
            }
        }

        let mut removed = vec![key];
        removed.extend(self.descendants(key));
        for removed_key in &removed {
            self.nodes.remove(*removed_key);
        }
        Ok(removed)
    }

    /// Re-parent a node, keeping its world transform.
    ///
    /// `None` detaches it as a new root.
    pub fn set_parent(&mut self, key: SpatialKey, new_parent: Option<SpatialKey>) -> Result<()> {
        if !self.contains(key) {
            return Err(engine_err!(SOURCE, "Cannot move unknown node {:?}", key));
        }
        if let Some(parent) = new_parent {
            self.check_container(parent)?;
            if parent == key || self.is_ancestor(key, parent) {
                return Err(engine_err!(
                    SOURCE,
                    "Moving {:?} under {:?} would create a cycle",
                    key, parent
                ));
            }
        }

        let world = self.world_transform_of(key);
        let parent_world = new_parent.map_or(Mat4::IDENTITY, |p| self.world_transform_of(p));

        if let Some(old_parent) = self.nodes[key].parent {
            if let Some(old) = self.nodes.get_mut(old_parent) {
                old.children.retain(|child| *child != key);
            }
        }
        if let Some(parent) = new_parent {
            self.nodes[parent].children.push(key);
        }

        let node = &mut self.nodes[key];
        node.parent = new_parent;
        node.local_transform = parent_world.inverse() * world;
        node.world_transform = world;
        node.world_dirty = false;
        Ok(())
    }

    // ===== TRANSFORMS =====

    /// Replace a node's local transform and invalidate its subtree
    pub fn set_local_transform(&mut self, key: SpatialKey, transform: Mat4) -> Result<()> {
        self.node_mut(key)?.local_transform = transform;
        self.nodes[key].world_dirty = true;
        for descendant in self.descendants(key) {
            self.nodes[descendant].world_dirty = true;
        }
        Ok(())
    }

    /// Recompute and cache the world transform of `key` and of every
    /// dirty ancestor on the way.
    pub fn recalc_world_transform(&mut self, key: SpatialKey) -> Result<Mat4> {
        if !self.contains(key) {
            return Err(engine_err!(SOURCE, "Cannot update unknown node {:?}", key));
        }

        let mut chain = vec![key];
        let mut current = self.nodes[key].parent;
        while let Some(parent) = current {
            let node = &self.nodes[parent];
            if !node.world_dirty {
                break;
            }
            chain.push(parent);
            current = node.parent;
        }

        let mut world = current.map_or(Mat4::IDENTITY, |p| self.nodes[p].world_transform);
        for id in chain.into_iter().rev() {
            let node = &mut self.nodes[id];
            world *= node.local_transform;
            node.world_transform = world;
            node.world_dirty = false;
        }
        Ok(world)
    }

    /// World transform of a node, computed without touching the cache
    pub fn world_transform(&self, key: SpatialKey) -> Option<Mat4> {
        self.contains(key).then(|| self.world_transform_of(key))
    }

    pub fn world_position(&self, key: SpatialKey) -> Option<Vec3> {
        self.world_transform(key).map(|m| m.w_axis.truncate())
    }

    fn world_transform_of(&self, key: SpatialKey) -> Mat4 {
        let mut locals = Vec::new();
        let mut current = Some(key);
        let mut world = Mat4::IDENTITY;
        while let Some(id) = current {
            let node = &self.nodes[id];
            if !node.world_dirty {
                world = node.world_transform;
                break;
            }
            locals.push(node.local_transform);
            current = node.parent;
        }
        for local in locals.into_iter().rev() {
            world *= local;
        }
        world
    }

    // ===== HELPERS =====

    fn node_mut(&mut self, key: SpatialKey) -> Result<&mut SpatialNode> {
        self.nodes
            .get_mut(key)
            .ok_or_else(|| engine_err!(SOURCE, "Unknown node {:?}", key))
    }

    fn check_container(&self, key: SpatialKey) -> Result<()> {
        match self.nodes.get(key) {
            None => Err(engine_err!(SOURCE, "Unknown parent node {:?}", key)),
            Some(node) if node.contain_mode() != ContainMode::Container => Err(engine_err!(
                SOURCE,
                "Node '{}' ({:?}) cannot have children",
                node.name, key
            )),
            Some(_) => Ok(()),
        }
    }

    /// Whether `ancestor` lies on the parent chain of `key`
    fn is_ancestor(&self, ancestor: SpatialKey, key: SpatialKey) -> bool {
        let mut current = self.nodes.get(key).and_then(|n| n.parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id).and_then(|n| n.parent);
        }
        false
    }
}

#[cfg(test)]
#[path = "scene_graph_tests.rs"]
mod tests;
