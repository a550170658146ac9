//! Octree module: generic spatial index over point-positioned values.
//!
//! `OcTreeBase` holds the insertion, removal, promotion and query
//! algorithms once; `OcTreeHooks` implementations decide what a leaf
//! stores. Two hook sets ship with the engine:
//!
//! - `SingleValue<V>`: one value per leaf (`OcTree<V>`)
//! - `Bucketed<V>`: up to `BUCKET_SIZE` values per leaf (`BucketedOcTree<V>`)

mod bucketed;
mod hooks;
mod node;
mod octant;
mod octree_base;

pub use bucketed::{Bucketed, BucketedOcTree, BUCKET_SIZE};
pub use hooks::{Located, OcTreeHooks, Reinsert, Removal, SingleValue};
pub use node::{NodeId, OcTreeNode};
pub use octant::{ChildLocation, Sector};
pub use octree_base::OcTreeBase;

/// Octree storing one value per leaf
pub type OcTree<V> = OcTreeBase<SingleValue<V>>;
