/// Drawing strategies.
///
/// A Drawer receives one call per (visible model, shader) pair from
/// `SceneRenderer::render`. Global shaders come first, nearest ancestor
/// first, then the node's local shaders.

use glam::Mat4;
use super::scene_graph::{ShaderKey, SpatialKey};

/// Sink for the draw calls of a frame
pub trait Drawer {
    /// Called once before the first draw of a frame
    fn begin_frame(&mut self) {}

    fn draw(&mut self, node: SpatialKey, shader: ShaderKey, world: &Mat4);
}

/// One recorded draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub node: SpatialKey,
    pub shader: ShaderKey,
    pub world: Mat4,
}

/// Drawer that keeps the calls of the last frame
#[derive(Debug, Default)]
pub struct RecordingDrawer {
    calls: Vec<DrawCall>,
}

impl RecordingDrawer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Distinct nodes drawn, in first-draw order
    pub fn drawn_nodes(&self) -> Vec<SpatialKey> {
        let mut nodes: Vec<SpatialKey> = Vec::new();
        for call in &self.calls {
            if !nodes.contains(&call.node) {
                nodes.push(call.node);
            }
        }
        nodes
    }
}

impl Drawer for RecordingDrawer {
    fn begin_frame(&mut self) {
        self.calls.clear();
    }

    fn draw(&mut self, node: SpatialKey, shader: ShaderKey, world: &Mat4) {
        self.calls.push(DrawCall { node, shader, world: *world });
    }
}
