/// Camera culling strategies.
///
/// A Culler is kept in sync with the scene graph through lifecycle events
/// (sent by `SceneRenderer` for leaf nodes only) and produces, once per
/// frame, the `VisibleSet` for its camera.

use crate::camera::Camera;
use crate::scene::{SceneGraph, ShaderKey, SpatialKey, VisibleSet};

/// Strategy for determining visible nodes from a camera.
///
/// Unknown keys and non-drawable nodes are ignored by every event.
pub trait Culler {
    /// Pull-style insertion straight into the current visible set.
    /// Event-driven cullers may ignore it.
    fn insert(&mut self, graph: &SceneGraph, node: SpatialKey, global_shaders: &[ShaderKey]);

    /// A node joined the graph. The culler may force its world transform.
    fn on_scene_node_added(&mut self, graph: &mut SceneGraph, node: SpatialKey);

    /// A node's transform changed
    fn on_scene_node_updated(&mut self, graph: &mut SceneGraph, node: SpatialKey);

    /// A node was re-parented in place: its inherited shaders changed,
    /// its world transform did not
    fn on_scene_node_moved(&mut self, graph: &SceneGraph, node: SpatialKey);

    /// A node is about to leave the graph (it is still readable)
    fn on_scene_node_removed(&mut self, graph: &SceneGraph, node: SpatialKey);

    /// Rebuild the visible set from the current camera.
    /// Called once per frame before drawing.
    fn calc_visible_set(&mut self);

    /// Result of the last `calc_visible_set`
    fn visible_set(&self) -> &VisibleSet;

    fn camera(&self) -> &Camera;

    fn set_camera(&mut self, camera: Camera);
}
