/*!
# Galaxy 3D Culling

Spatial partitioning and visibility culling core of the Galaxy 3D engine.

A generic point octree (one algorithm, specialized through a hook trait)
indexes the drawable nodes of a scene graph. Each frame a `Culler` queries
it with the camera frustum and produces the `VisibleSet` handed to a
`Drawer`.

## Architecture

- **Bounds**: AABB, sphere and frustum volumes with pairwise tests
- **OcTreeBase**: arena-backed octree, parameterized by `OcTreeHooks`
- **SceneGraph**: minimal node hierarchy supplying world transforms and shaders
- **Culler**: event-driven visibility strategy (`OcTreeCuller`, `DummyCuller`)
- **SceneRenderer**: owns the graph and the culler, forwards every mutation
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod config;
pub mod bounds;
pub mod camera;
pub mod octree;
pub mod scene;
pub mod culling;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine services (logger slot)
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, format_entry};
    }

    pub mod config {
        pub use crate::config::*;
    }

    pub mod bounds {
        pub use crate::bounds::*;
    }

    pub mod camera {
        pub use crate::camera::*;
    }

    pub mod octree {
        pub use crate::octree::*;
    }

    pub mod scene {
        pub use crate::scene::*;
    }

    pub mod culling {
        pub use crate::culling::*;
    }
}

// Re-export math library at crate root
pub use glam;
