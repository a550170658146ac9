//! Culling module
//!
//! The `Culler` strategy and its two implementations: `OcTreeCuller`
//! (spatial index + frustum query) and `DummyCuller` (everything visible).

mod culler;
mod dummy_culler;
mod octree_culler;
mod spatial_octree;

pub use culler::Culler;
pub use dummy_culler::DummyCuller;
pub use octree_culler::{OcTreeCuller, Placement};
pub use spatial_octree::{SpatialHooks, SpatialOcTree};

#[cfg(test)]
#[path = "culler_tests.rs"]
mod tests;
