/// Generic octree engine.
///
/// Nodes live in a slotmap arena owned by the tree; parent links are plain
/// `NodeId`s. The root sector is centered at the origin and spans
/// `[-region_size, region_size]` on every axis.
///
/// Containers are created at the first sector that separates the values
/// colliding in a slot, so no container other than the root ever keeps a
/// single child. Leaves always occupy their parent's octant sector.

use glam::Vec3;
use slotmap::SlotMap;
use crate::bounds::{AABB, Bounds};
use crate::config::OcTreeConfig;
use crate::error::{Error, Result};
use super::hooks::{OcTreeHooks, Reinsert, Removal};
use super::node::{NodeId, OcTreeNode};
use super::octant::{separating_sector, ChildLocation, Sector};

/// What an insertion descent carries down the tree
enum Payload<V> {
    /// A fresh value, wrapped in a new leaf where it lands
    Value(V),
    /// An existing detached leaf node being re-homed
    Node(NodeId),
}

pub struct OcTreeBase<H: OcTreeHooks> {
    hooks: H,
    nodes: SlotMap<NodeId, OcTreeNode<H::Leaf>>,
    root: NodeId,
    config: OcTreeConfig,
}

impl<H: OcTreeHooks> OcTreeBase<H> {
    pub fn new(hooks: H, config: OcTreeConfig) -> Result<Self> {
        config.validate()?;
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(OcTreeNode::container(None, 0, Sector::root(config.region_size)));
        crate::engine_trace!(
            "galaxy3d::OcTree",
            "Created octree (region size {}, max depth {})",
            config.region_size, config.max_depth
        );
        Ok(Self { hooks, nodes, root, config })
    }

    pub fn with_region_size(hooks: H, region_size: f32) -> Result<Self> {
        Self::new(hooks, OcTreeConfig::with_region_size(region_size))
    }

    // ===== ACCESSORS =====

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn config(&self) -> &OcTreeConfig {
        &self.config
    }

    pub fn region_size(&self) -> f32 {
        self.config.region_size
    }

    pub fn max_depth(&self) -> u32 {
        self.config.max_depth
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&OcTreeNode<H::Leaf>> {
        self.nodes.get(id)
    }

    pub fn leaf(&self, id: NodeId) -> Option<&H::Leaf> {
        self.nodes.get(id).and_then(|n| n.leaf.as_ref())
    }

    /// Mutable payload access. Call `update_node` afterwards if the
    /// change can move the leaf's position.
    pub fn leaf_mut(&mut self, id: NodeId) -> Option<&mut H::Leaf> {
        self.nodes.get_mut(id).and_then(|n| n.leaf.as_mut())
    }

    /// Every node, root included
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &OcTreeNode<H::Leaf>)> {
        self.nodes.iter()
    }

    /// Number of nodes, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes holding a payload (O(n))
    pub fn leaf_count(&self) -> usize {
        self.nodes.values().filter(|n| n.leaf.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[self.root].child_count == 0
    }

    /// Drop every node except the root
    pub fn clear(&mut self) {
        let root = self.root;
        self.nodes.retain(|id, _| id == root);
        let root_node = &mut self.nodes[root];
        root_node.children = [None; 8];
        root_node.child_count = 0;
    }

    pub fn node_center(&self, id: NodeId) -> Option<Vec3> {
        self.nodes.get(id).map(|n| n.sector.center)
    }

    /// Whether `point` lies in the node's sector (inclusive)
    pub fn is_in_node_space(&self, id: NodeId, point: Vec3) -> bool {
        self.nodes.get(id).is_some_and(|n| n.sector.contains(point))
    }

    /// Bounds of one octant of a node's sector
    pub fn sub_sector_aabb(&self, id: NodeId, location: ChildLocation) -> Option<AABB> {
        self.nodes.get(id).map(|n| n.sector.octant(location).aabb())
    }

    // ===== INSERTION =====

    /// Insert a value.
    ///
    /// Returns the leaf now holding it, or `Ok(None)` when
    /// `should_insert` vetoed it. Values outside the root sector and
    /// values that cannot be separated from an existing leaf within
    /// `max_depth` subdivisions are refused without touching the tree.
    pub fn insert(&mut self, value: H::Value) -> Result<Option<NodeId>> {
        if !self.hooks.should_insert(&value) {
            return Ok(None);
        }
        let position = self.hooks.position_of(&value);
        self.check_region(position)?;
        self.insert_from(self.root, Payload::Value(value), position).map(Some)
    }

    fn check_region(&self, position: Vec3) -> Result<()> {
        if self.nodes[self.root].sector.contains(position) {
            Ok(())
        } else {
            Err(Error::OutOfRegion { position, region_size: self.config.region_size })
        }
    }

    fn insert_from(
        &mut self,
        start: NodeId,
        payload: Payload<H::Value>,
        position: Vec3,
    ) -> Result<NodeId> {
        let mut node = start;
        loop {
            let sector = self.nodes[node].sector;
            let location = sector.locate(position);
            let slot = sector.octant(location);

            let Some(child) = self.nodes[node].children[location.index()] else {
                return Ok(self.place(node, location, slot, payload));
            };

            if self.nodes[child].leaf.is_some() {
                return self.insert_at_leaf(node, location, child, payload, position);
            }

            // Container: descend if the position routes into its sector,
            // otherwise wrap both in a container where they part ways
            let child_sector = self.nodes[child].sector;
            match separating_sector(slot, position, child_sector.center, child_sector.depth) {
                None => node = child,
                Some(split) => {
                    let container = self.wrap(node, location, child, split, child_sector.center);
                    let location = split.locate(position);
                    return Ok(self.place(container, location, split.octant(location), payload));
                }
            }
        }
    }

    /// `payload` collided with leaf `leaf_id` sitting in `parent`'s `location` slot
    fn insert_at_leaf(
        &mut self,
        parent: NodeId,
        location: ChildLocation,
        leaf_id: NodeId,
        payload: Payload<H::Value>,
        position: Vec3,
    ) -> Result<NodeId> {
        let payload = match payload {
            Payload::Value(value) => match self.absorb(leaf_id, value, false) {
                None => return Ok(leaf_id),
                Some(value) => Payload::Value(value),
            },
            node => node,
        };

        let leaf_sector = self.nodes[leaf_id].sector;
        let max_depth = self.config.max_depth;
        // Pack only when every stored value coincides with `position` down
        // to the depth limit
        let separable = self.nodes[leaf_id].leaf.as_ref().is_some_and(|leaf| {
            !self
                .hooks
                .leaf_fits(leaf, &|p| separating_sector(leaf_sector, position, p, max_depth).is_none())
        });
        if !separable {
            return self.insert_at_depth_limit(leaf_id, payload, position);
        }

        let leaf_position = self.leaf_position(leaf_id);
        let split = separating_sector(leaf_sector, position, leaf_position, max_depth);

        let reinsert = match &mut self.nodes[leaf_id].leaf {
            Some(leaf) => self.hooks.on_reinsert_child(leaf),
            None => Reinsert::Whole,
        };

        match reinsert {
            Reinsert::Whole => {
                let Some(split) = split else {
                    return self.insert_at_depth_limit(leaf_id, payload, position);
                };
                let container = self.wrap(parent, location, leaf_id, split, leaf_position);
                let location = split.locate(position);
                Ok(self.place(container, location, split.octant(location), payload))
            }
            Reinsert::Values(values) => {
                // The drained leaf's values may be spread over its whole
                // sector, so redistribute below a container covering it
                self.detach(leaf_id);
                self.nodes.remove(leaf_id);
                let container = self.nodes.insert(OcTreeNode::container(None, 0, leaf_sector));
                self.attach(parent, location, container);

                for value in values {
                    let value_position = self.hooks.position_of(&value);
                    if let Err(err) = self.insert_from(container, Payload::Value(value), value_position) {
                        crate::engine_warn!("galaxy3d::OcTree", "Dropped a redistributed value: {}", err);
                    }
                }
                let placed = self.insert_from(container, payload, position);
                self.collapse(container);
                placed
            }
        }
    }

    fn insert_at_depth_limit(
        &mut self,
        leaf_id: NodeId,
        payload: Payload<H::Value>,
        position: Vec3,
    ) -> Result<NodeId> {
        if let Payload::Value(value) = payload {
            if self.absorb(leaf_id, value, true).is_none() {
                crate::engine_debug!(
                    "galaxy3d::OcTree",
                    "Packed value at {} into a leaf at the depth limit",
                    position
                );
                return Ok(leaf_id);
            }
        }
        Err(Error::DepthLimitReached { position, max_depth: self.config.max_depth })
    }

    fn absorb(&mut self, leaf_id: NodeId, value: H::Value, at_depth_limit: bool) -> Option<H::Value> {
        match &mut self.nodes[leaf_id].leaf {
            Some(leaf) => self.hooks.on_insert(leaf, value, at_depth_limit),
            None => Some(value),
        }
    }

    fn leaf_position(&self, id: NodeId) -> Vec3 {
        let node = &self.nodes[id];
        match &node.leaf {
            Some(leaf) => self.hooks.leaf_position(leaf),
            None => node.sector.center,
        }
    }

    /// Put the payload into an empty slot of `parent`
    fn place(
        &mut self,
        parent: NodeId,
        location: ChildLocation,
        sector: Sector,
        payload: Payload<H::Value>,
    ) -> NodeId {
        let id = match payload {
            Payload::Value(value) => {
                let leaf = self.hooks.make_leaf(value);
                self.nodes.insert(OcTreeNode::with_leaf(None, 0, sector, leaf))
            }
            Payload::Node(id) => {
                self.nodes[id].sector = sector;
                id
            }
        };
        self.attach(parent, location, id);
        id
    }

    /// Replace `child` in `parent`'s `location` slot by a new container on
    /// `split`, and hang `child` below it
    fn wrap(
        &mut self,
        parent: NodeId,
        location: ChildLocation,
        child: NodeId,
        split: Sector,
        child_position: Vec3,
    ) -> NodeId {
        self.detach(child);
        let container = self.nodes.insert(OcTreeNode::container(None, 0, split));
        self.attach(parent, location, container);

        let child_location = split.locate(child_position);
        if self.nodes[child].leaf.is_some() {
            self.nodes[child].sector = split.octant(child_location);
        }
        self.attach(container, child_location, child);
        container
    }

    // ===== LINKING =====

    fn attach(&mut self, parent: NodeId, location: ChildLocation, child: NodeId) {
        let parent_node = &mut self.nodes[parent];
        assert!(
            parent_node.children[location.index()].is_none(),
            "octant {:?} of node {:?} is already occupied",
            location, parent
        );
        parent_node.children[location.index()] = Some(child);
        parent_node.child_count += 1;
        let level = parent_node.level + 1;

        self.nodes[child].parent = Some(parent);
        self.set_level(child, level);
    }

    /// Unlink a non-root node from its parent and return the parent.
    /// The node itself stays in the arena.
    fn detach(&mut self, node: NodeId) -> NodeId {
        let (parent, location) = self.slot_of(node);
        let parent_node = &mut self.nodes[parent];
        parent_node.children[location.index()] = None;
        parent_node.child_count -= 1;
        self.nodes[node].parent = None;
        parent
    }

    fn slot_of(&self, node: NodeId) -> (NodeId, ChildLocation) {
        let slot = self.nodes[node]
            .parent
            .and_then(|parent| self.nodes[parent].location_of(node).map(|loc| (parent, loc)));
        match slot {
            Some(slot) => slot,
            None => panic!("octree node {:?} is not linked to a parent", node),
        }
    }

    fn set_level(&mut self, node: NodeId, level: u16) {
        let mut stack = vec![(node, level)];
        while let Some((id, level)) = stack.pop() {
            let n = &mut self.nodes[id];
            n.level = level;
            stack.extend(n.children().map(|child| (child, level + 1)));
        }
    }

    /// Restore the container invariant upward from `container`: empty
    /// containers are removed, single-child containers are replaced by
    /// their child. Never goes past the root.
    fn collapse(&mut self, container: NodeId) {
        let mut current = container;
        while current != self.root {
            match self.nodes[current].child_count {
                0 => {
                    let parent = self.detach(current);
                    self.nodes.remove(current);
                    current = parent;
                }
                1 => {
                    self.promote(current);
                    return;
                }
                _ => return,
            }
        }
    }

    /// Splice the sole child of `container` into the container's own slot
    fn promote(&mut self, container: NodeId) {
        let (grandparent, location) = self.slot_of(container);
        let Some(child) = self.nodes[container].children().next() else {
            return;
        };

        self.nodes[grandparent].children[location.index()] = Some(child);
        let level = self.nodes[grandparent].level + 1;
        let slot = self.nodes[grandparent].sector.octant(location);

        let child_node = &mut self.nodes[child];
        child_node.parent = Some(grandparent);
        if child_node.leaf.is_some() {
            child_node.sector = slot;
        }
        self.set_level(child, level);
        self.nodes.remove(container);
    }

    // ===== REMOVAL =====

    /// Remove a value, locating its leaf by position
    pub fn remove(&mut self, value: &H::Value) -> bool {
        match self.find(value) {
            Some(node) => self.remove_at(value, node),
            None => false,
        }
    }

    /// Remove a value from a leaf the caller already holds.
    ///
    /// The leaf's node is deleted once `on_remove_data` reports it vacated,
    /// then emptied or single-child ancestors are collapsed.
    pub fn remove_at(&mut self, value: &H::Value, node: NodeId) -> bool {
        if node == self.root {
            return false;
        }
        let outcome = match self.nodes.get_mut(node).and_then(|n| n.leaf.as_mut()) {
            Some(leaf) => self.hooks.on_remove_data(leaf, value),
            None => return false,
        };

        match outcome {
            Removal::NotFound => false,
            Removal::Kept => true,
            Removal::Vacated => {
                let parent = self.detach(node);
                self.nodes.remove(node);
                self.collapse(parent);
                true
            }
        }
    }

    // ===== QUERIES =====

    /// Leaf holding `value`, found by walking the value's octants
    pub fn find(&self, value: &H::Value) -> Option<NodeId> {
        let position = self.hooks.position_of(value);
        if !self.nodes[self.root].sector.contains(position) {
            return None;
        }

        let mut node = self.root;
        loop {
            let sector = self.nodes[node].sector;
            let location = sector.locate(position);
            let child = self.nodes[node].children[location.index()]?;
            let child_node = &self.nodes[child];
            match &child_node.leaf {
                Some(leaf) => return self.hooks.leaf_matches(leaf, value).then_some(child),
                None => {
                    let child_sector = child_node.sector;
                    let slot = sector.octant(location);
                    if separating_sector(slot, position, child_sector.center, child_sector.depth).is_some() {
                        return None;
                    }
                    node = child;
                }
            }
        }
    }

    /// Values in leaves whose sector intersects `bounds`, filtered by
    /// `collect_leaf`
    pub fn find_all_in_bounds(&self, bounds: &Bounds) -> Vec<H::Value> {
        let mut results = Vec::new();
        self.find_all_in_bounds_into(bounds, &mut results);
        results
    }

    /// Same as `find_all_in_bounds`, appending to `results`
    pub fn find_all_in_bounds_into(&self, bounds: &Bounds, results: &mut Vec<H::Value>) {
        self.collect_in(self.root, bounds, results);
    }

    fn collect_in(&self, node: NodeId, bounds: &Bounds, results: &mut Vec<H::Value>) {
        for child in self.nodes[node].children() {
            let child_node = &self.nodes[child];
            if !bounds.test(&Bounds::Aabb(child_node.sector.aabb())) {
                continue;
            }
            match &child_node.leaf {
                Some(leaf) => self.hooks.collect_leaf(leaf, bounds, results),
                None => {
                    self.hooks.on_container_pre_insert(child, results);
                    self.collect_in(child, bounds, results);
                    self.hooks.on_container_post_insert(child, results);
                }
            }
        }
    }

    // ===== RE-SORTING =====

    /// Re-sort a leaf after its values moved.
    ///
    /// Returns the same id when the leaf still belongs where it is.
    /// Otherwise it is popped out (collapsing its former ancestors as
    /// `remove` does) and inserted again from the root. On error the leaf
    /// has been evicted from the tree. A drained leaf whose values are
    /// re-inserted one by one keeps the values that still fit; each one
    /// that does not is warn-logged and the first failure is returned.
    pub fn update_node(&mut self, node: NodeId) -> Result<NodeId> {
        let placed_leaf = self
            .nodes
            .get(node)
            .is_some_and(|n| n.leaf.is_some() && n.parent.is_some());
        if !placed_leaf {
            return Err(crate::engine_err!(
                "galaxy3d::OcTree",
                "update_node called on {:?}, which is not a placed leaf",
                node
            ));
        }

        if self.leaf_in_place(node) {
            return Ok(node);
        }

        let parent = self.detach(node);
        self.collapse(parent);

        let reinsert = match &mut self.nodes[node].leaf {
            Some(leaf) => self.hooks.on_reinsert_child(leaf),
            None => Reinsert::Whole,
        };
        match reinsert {
            Reinsert::Whole => {
                let position = self.leaf_position(node);
                let placed = match self.check_region(position) {
                    Ok(()) => self.insert_from(self.root, Payload::Node(node), position),
                    Err(err) => Err(err),
                };
                if placed.is_err() {
                    self.nodes.remove(node);
                }
                placed
            }
            Reinsert::Values(values) => {
                self.nodes.remove(node);
                let mut placed_at = None;
                let mut failure = None;
                for value in values {
                    let position = self.hooks.position_of(&value);
                    let placed = match self.check_region(position) {
                        Ok(()) => self.insert_from(self.root, Payload::Value(value), position),
                        Err(err) => Err(err),
                    };
                    match placed {
                        Ok(id) => {
                            placed_at.get_or_insert(id);
                        }
                        Err(err) => {
                            crate::engine_warn!(
                                "galaxy3d::OcTree",
                                "Dropped a value while re-sorting leaf {:?}: {}",
                                node, err
                            );
                            failure.get_or_insert(err);
                        }
                    }
                }
                match (failure, placed_at) {
                    (Some(err), _) => Err(err),
                    (None, Some(id)) => Ok(id),
                    (None, None) => Err(Error::InvalidNode(format!("leaf {:?} held no values", node))),
                }
            }
        }
    }

    /// Two-tier placement check of a leaf against its current sector
    fn leaf_in_place(&self, node: NodeId) -> bool {
        let n = &self.nodes[node];
        let Some(leaf) = &n.leaf else {
            return false;
        };
        let sector = n.sector;

        // Coarse: still inside the leaf's own sector
        if !self.hooks.leaf_fits(leaf, &|p| sector.contains(p)) {
            return false;
        }

        // Fine: routing from the root (ties included) still ends here
        let root = self.nodes[self.root].sector;
        self.hooks.leaf_fits(leaf, &|p| routes_to(root, p, &sector))
    }
}

/// Whether descending from `from` by octant choice leads `point` to `target`
fn routes_to(from: Sector, point: Vec3, target: &Sector) -> bool {
    if !from.contains(point) {
        return false;
    }
    let mut sector = from;
    while sector.depth < target.depth {
        sector = sector.octant(sector.locate(point));
    }
    sector == *target
}

#[cfg(test)]
#[path = "octree_tests.rs"]
mod tests;
