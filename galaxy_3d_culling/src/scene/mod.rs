//! Scene module
//!
//! Minimal scene graph, the per-frame visible set, and the renderer that
//! keeps a Culler in sync with the graph.

mod drawer;
mod renderer;
mod scene_graph;
mod visible_set;

pub use drawer::{DrawCall, Drawer, RecordingDrawer};
pub use renderer::SceneRenderer;
pub use scene_graph::{
    ContainMode, LightType, NodeKind, SceneGraph, ShaderKey, SpatialKey, SpatialNode,
};
pub use visible_set::{VisibleElement, VisibleSet};
