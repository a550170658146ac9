/// SceneRenderer: owns the scene graph and the active Culler.
///
/// Every structural or transform mutation goes through the renderer so the
/// culler hears about it. Events are forwarded for the mutated node and,
/// when it is a grouping node, for every leaf below it: the culler itself
/// only ever sees leaves.

use glam::Mat4;
use crate::bounds::Sphere;
use crate::camera::Camera;
use crate::culling::Culler;
use crate::error::Result;
use crate::engine_err;
use super::drawer::Drawer;
use super::scene_graph::{ContainMode, NodeKind, SceneGraph, ShaderKey, SpatialKey};
use super::visible_set::VisibleSet;

const SOURCE: &str = "galaxy3d::SceneRenderer";

pub struct SceneRenderer {
    graph: SceneGraph,
    /// Grouping node used when no parent is given
    root: SpatialKey,
    culler: Box<dyn Culler>,
    /// Models that passed the per-model sphere test during the last render
    models_drawn: usize,
}

impl SceneRenderer {
    pub fn new(culler: Box<dyn Culler>) -> Result<Self> {
        let mut graph = SceneGraph::new();
        let root = graph.add_node("root", NodeKind::Grouping, None, Mat4::IDENTITY)?;
        crate::engine_debug!(SOURCE, "Created scene renderer");
        Ok(Self { graph, root, culler, models_drawn: 0 })
    }

    // ===== ACCESSORS =====

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn root(&self) -> SpatialKey {
        self.root
    }

    pub fn culler(&self) -> &dyn Culler {
        self.culler.as_ref()
    }

    /// Swap the culling strategy. The new culler is fed every node of the
    /// current graph and inherits the previous camera.
    pub fn set_culler(&mut self, mut culler: Box<dyn Culler>) {
        culler.set_camera(self.culler.camera().clone());
        self.culler = culler;
        self.notify_added(self.root);
    }

    pub fn camera(&self) -> &Camera {
        self.culler.camera()
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.culler.set_camera(camera);
    }

    /// Edit a copy of the camera and install it
    pub fn update_camera<F: FnOnce(&mut Camera)>(&mut self, update: F) {
        let mut camera = self.culler.camera().clone();
        update(&mut camera);
        self.culler.set_camera(camera);
    }

    pub fn visible_set(&self) -> &VisibleSet {
        self.culler.visible_set()
    }

    pub fn models_drawn(&self) -> usize {
        self.models_drawn
    }

    // ===== SCENE MUTATION =====

    pub fn create_shader(&mut self, name: &str) -> ShaderKey {
        self.graph.create_shader(name)
    }

    /// Add a node under `parent` (the scene root when `None`)
    pub fn insert_node_at(
        &mut self,
        name: &str,
        kind: NodeKind,
        parent: Option<SpatialKey>,
        local_transform: Mat4,
    ) -> Result<SpatialKey> {
        let parent = parent.unwrap_or(self.root);
        let key = self.graph.add_node(name, kind, Some(parent), local_transform)?;
        self.notify_added(key);
        Ok(key)
    }

    /// Re-parent a node (the scene root when `None`), keeping it in place
    pub fn move_node(&mut self, key: SpatialKey, new_parent: Option<SpatialKey>) -> Result<()> {
        if key == self.root {
            return Err(engine_err!(SOURCE, "The scene root cannot be moved"));
        }
        self.graph.set_parent(key, Some(new_parent.unwrap_or(self.root)))?;
        self.notify_moved(key);
        Ok(())
    }

    /// Remove a node and its subtree. The culler is told first, while the
    /// nodes still exist.
    pub fn remove_node(&mut self, key: SpatialKey) -> Result<Vec<SpatialKey>> {
        if key == self.root {
            return Err(engine_err!(SOURCE, "The scene root cannot be removed"));
        }
        if !self.graph.contains(key) {
            return Err(engine_err!(SOURCE, "Cannot remove unknown node {:?}", key));
        }
        self.notify_removed(key);
        self.graph.remove_node(key)
    }

    pub fn set_local_transform(&mut self, key: SpatialKey, transform: Mat4) -> Result<()> {
        self.graph.set_local_transform(key, transform)?;
        self.notify_updated(key);
        Ok(())
    }

    /// Radius of a model's drawable content, used by the per-model
    /// sphere test in `render`
    pub fn set_bounding_radius(&mut self, key: SpatialKey, radius: f32) -> Result<()> {
        self.graph.set_bounding_radius(key, radius)
    }

    /// Tell the culler a node changed in some other way
    pub fn update_node(&mut self, key: SpatialKey) -> Result<()> {
        if !self.graph.contains(key) {
            return Err(engine_err!(SOURCE, "Cannot update unknown node {:?}", key));
        }
        self.notify_updated(key);
        Ok(())
    }

    /// Attaching a shader to a grouping node changes what its leaves inherit
    pub fn attach_local_shader(&mut self, key: SpatialKey, shader: ShaderKey) -> Result<()> {
        self.graph.attach_local_shader(key, shader)?;
        self.notify_moved(key);
        Ok(())
    }

    pub fn detach_local_shader(&mut self, key: SpatialKey, shader: ShaderKey) -> Result<bool> {
        let detached = self.graph.detach_local_shader(key, shader)?;
        if detached {
            self.notify_moved(key);
        }
        Ok(detached)
    }

    // ===== RENDERING =====

    /// Cull, then hand every visible model to `drawer` once per shader.
    ///
    /// Nothing is drawn while the camera frustum is degenerate.
    pub fn render(&mut self, drawer: &mut dyn Drawer) {
        self.culler.calc_visible_set();
        let frustum = self.culler.camera().world_frustum();
        self.models_drawn = 0;
        drawer.begin_frame();
        if frustum.is_degenerate() {
            return;
        }

        for element in self.culler.visible_set().elements() {
            let Some(key) = element.node else {
                continue;
            };
            // Removed or reparented between cull and draw
            let Some(node) = self.graph.node(key) else {
                continue;
            };
            if node.kind() != NodeKind::Model {
                continue;
            }
            let Some(world) = self.graph.world_transform(key) else {
                continue;
            };

            let bounds = Sphere::new(world.w_axis.truncate(), node.bounding_radius());
            if !frustum.test_sphere(&bounds) {
                continue;
            }
            self.models_drawn += 1;

            for shader in element.global_shaders.iter().chain(node.local_shaders()) {
                drawer.draw(key, *shader, &world);
            }
        }
    }

    // ===== CULLER NOTIFICATION =====

    /// `key` and every leaf below it
    fn leaves_from(&self, key: SpatialKey) -> Vec<SpatialKey> {
        std::iter::once(key)
            .chain(self.graph.descendants(key))
            .filter(|k| {
                self.graph
                    .node(*k)
                    .is_some_and(|n| n.contain_mode() == ContainMode::Leaf)
            })
            .collect()
    }

    fn notify_added(&mut self, key: SpatialKey) {
        for leaf in self.leaves_from(key) {
            self.culler.on_scene_node_added(&mut self.graph, leaf);
        }
    }

    fn notify_updated(&mut self, key: SpatialKey) {
        for leaf in self.leaves_from(key) {
            self.culler.on_scene_node_updated(&mut self.graph, leaf);
        }
    }

    fn notify_moved(&mut self, key: SpatialKey) {
        for leaf in self.leaves_from(key) {
            self.culler.on_scene_node_moved(&self.graph, leaf);
        }
    }

    fn notify_removed(&mut self, key: SpatialKey) {
        for leaf in self.leaves_from(key) {
            self.culler.on_scene_node_removed(&self.graph, leaf);
        }
    }
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
