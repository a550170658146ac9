/// Octree node stored in the tree's arena

use slotmap::new_key_type;
use super::octant::{ChildLocation, Sector};

new_key_type! {
    /// Stable handle to a node of an `OcTreeBase` arena
    pub struct NodeId;
}

/// One node of an octree.
///
/// A node holding a payload is a leaf. Every other node is a container
/// with at least two children, except the root which may hold 0 or 1.
/// `level` is the node's distance from the root in the tree, which can
/// be smaller than its sector's subdivision depth.
#[derive(Debug, Clone)]
pub struct OcTreeNode<L> {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: [Option<NodeId>; 8],
    pub(crate) level: u16,
    pub(crate) child_count: u8,
    pub(crate) sector: Sector,
    pub(crate) leaf: Option<L>,
}

impl<L> OcTreeNode<L> {
    pub(crate) fn container(parent: Option<NodeId>, level: u16, sector: Sector) -> Self {
        Self {
            parent,
            children: [None; 8],
            level,
            child_count: 0,
            sector,
            leaf: None,
        }
    }

    pub(crate) fn with_leaf(parent: Option<NodeId>, level: u16, sector: Sector, leaf: L) -> Self {
        Self {
            leaf: Some(leaf),
            ..Self::container(parent, level, sector)
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn child(&self, location: ChildLocation) -> Option<NodeId> {
        self.children[location.index()]
    }

    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.iter().flatten().copied()
    }

    /// Slot of `child` in this node, if it is one of its children
    pub fn location_of(&self, child: NodeId) -> Option<ChildLocation> {
        self.children
            .iter()
            .position(|c| *c == Some(child))
            .and_then(ChildLocation::from_index)
    }

    pub fn level(&self) -> u16 {
        self.level
    }

    pub fn child_count(&self) -> u8 {
        self.child_count
    }

    pub fn sector(&self) -> &Sector {
        &self.sector
    }

    /// Payload (leaves only)
    pub fn leaf(&self) -> Option<&L> {
        self.leaf.as_ref()
    }

    /// No children
    pub fn is_leaf(&self) -> bool {
        self.child_count == 0
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
