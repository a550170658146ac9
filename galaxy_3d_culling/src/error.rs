//! Error types for the Galaxy3D culling core
//!
//! The culling subsystem is a pure in-memory structure, so the taxonomy is
//! narrow: bad configuration, values the octree cannot place, and misuse of
//! the scene graph. Broken internal invariants are not errors, they panic.

use std::fmt;
use glam::Vec3;

/// Result type for Galaxy3D culling operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D culling errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration rejected by `validate()` (region size, depth, ...)
    InvalidConfig(String),

    /// A value was positioned outside the octree's root cell
    OutOfRegion {
        /// Position of the rejected value
        position: Vec3,
        /// Half-extent of the root cell
        region_size: f32,
    },

    /// Two values could not be separated before the subdivision depth limit
    DepthLimitReached {
        /// Position of the value that could not be placed
        position: Vec3,
        /// Configured maximum subdivision depth
        max_depth: u32,
    },

    /// Scene graph misuse (unknown key, parenting under a leaf, cycles)
    InvalidNode(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
            Error::OutOfRegion { position, region_size } => write!(
                f,
                "Position {} is outside the octree region (half-extent {})",
                position, region_size
            ),
            Error::DepthLimitReached { position, max_depth } => write!(
                f,
                "Position {} could not be separated within {} subdivisions",
                position, max_depth
            ),
            Error::InvalidNode(msg) => write!(f, "Invalid node: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Build an `Error::InvalidNode` and log it at ERROR severity in one step.
///
/// # Example
///
/// ```ignore
/// let node = self.nodes.get(key)
///     .ok_or_else(|| engine_err!("galaxy3d::SceneGraph", "Unknown node {:?}", key))?;
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::galaxy3d::Error::InvalidNode(message)
    }};
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
