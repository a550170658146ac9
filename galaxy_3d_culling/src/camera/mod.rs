//! Camera module: view/projection state and the culling frustum.
//!
//! Cameras are plain values owned by the culler that uses them.

mod camera;

pub use camera::{Camera, Projection};
