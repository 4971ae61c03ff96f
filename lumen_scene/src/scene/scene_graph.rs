//! Scene graph synchronizer.
//!
//! The SceneGraph owns both arenas — authoring nodes and geometric
//! objects — and is the only mutator of parent/child links on either
//! side. Every structural edit either completes on both trees or is
//! rejected before any mutation; the two trees are never left
//! half-synchronized.

use bitflags::bitflags;
use rustc_hash::FxHashSet;
use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::geometry::{GeometryStore, Kind, ObjectKey};
use crate::{scene_info, scene_trace, scene_warn};
use super::node::{NodeKey, SceneNode};

const SOURCE: &str = "lumen::SceneGraph";

bitflags! {
    /// What an inspector edit touched.
    ///
    /// Returned by object editors and fed to [`SceneGraph::apply_edit`]
    /// so the graph knows whether to run invalidation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EditEffects: u8 {
        /// A parameter changed without affecting spatial extent
        /// (material, shading flags)
        const PROPERTY = 1 << 0;
        /// The object's spatial extent changed (shape parameters,
        /// local transform)
        const BOUNDS = 1 << 1;
    }
}

/// The authoring tree plus its mirrored geometry tree.
///
/// Single-threaded, edit-driven: each operation runs to completion
/// before control returns, and exactly one edit is processed at a
/// time. Panels iterating children while editing must iterate a
/// [`children_snapshot`](SceneGraph::children_snapshot).
#[derive(Debug)]
pub struct SceneGraph {
    geometry: GeometryStore,
    nodes: SlotMap<NodeKey, SceneNode>,
    root: NodeKey,
    /// Nodes whose object's bounding volume was recomputed since the
    /// last take_recomputed_bounds(). Lets a renderer restart only
    /// when something actually moved.
    recomputed_bounds: FxHashSet<NodeKey>,
}

impl SceneGraph {
    /// Build the authoring mirror of a fully-populated geometry tree.
    ///
    /// `root_object` must already contain its whole subtree (scene
    /// load). One node is created per reachable object, top-down, with
    /// per-level ordering matching the geometry tree exactly. All
    /// bounding volumes in the subtree are then recomputed bottom-up.
    ///
    /// # Errors
    ///
    /// `StaleKey` if `root_object` is not in `geometry`.
    pub fn new(geometry: GeometryStore, root_object: ObjectKey) -> Result<Self> {
        if !geometry.contains(root_object) {
            return Err(Error::StaleKey(
                "root object is not in the store".to_string(),
            ));
        }

        let is_container = geometry
            .kind(root_object)
            .is_some_and(|kind| kind.is_container());

        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SceneNode::new(root_object, is_container));

        let mut graph = Self {
            geometry,
            nodes,
            root,
            recomputed_bounds: FxHashSet::default(),
        };
        graph.mirror_recursive(root);
        graph.recalculate_subtree(root);

        scene_info!(
            SOURCE,
            "Scene graph initialized: {} nodes mirroring {} objects",
            graph.nodes.len(),
            graph.geometry.object_count()
        );
        Ok(graph)
    }

    // ===== ACCESSORS =====

    /// The unique node without a parent
    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// Get a node by key
    pub fn node(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    /// True if the key resolves to a live node
    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Number of live nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Iterate over all nodes (key, node)
    pub fn nodes(&self) -> impl Iterator<Item = (NodeKey, &SceneNode)> {
        self.nodes.iter()
    }

    /// The geometry-object arena
    pub fn geometry(&self) -> &GeometryStore {
        &self.geometry
    }

    /// Mutable geometry access for leaf-level edits.
    ///
    /// Callers may edit shape parameters and transforms here, then
    /// report the edit through [`apply_edit`](SceneGraph::apply_edit).
    /// Child collections of mirrored containers belong to the
    /// synchronizer and must not be spliced directly.
    pub fn geometry_mut(&mut self) -> &mut GeometryStore {
        &mut self.geometry
    }

    /// Set a node's display name
    pub fn set_name(&mut self, key: NodeKey, name: &str) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.name = name.to_string();
        }
    }

    /// Copy of a node's child list.
    ///
    /// Structural operations invoked during iteration (drag-and-drop
    /// reparenting a child while rendering its siblings) mutate the
    /// live list; iterate this snapshot instead.
    pub fn children_snapshot(&self, key: NodeKey) -> Vec<NodeKey> {
        self.nodes
            .get(key)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    /// True if `ancestor` is on `node`'s parent chain (or is `node`)
    pub fn is_ancestor(&self, ancestor: NodeKey, node: NodeKey) -> bool {
        let mut current = Some(node);
        while let Some(key) = current {
            if key == ancestor {
                return true;
            }
            current = self.nodes.get(key).and_then(|n| n.parent);
        }
        false
    }

    // ===== NODE CONSTRUCTION =====

    /// Create an unattached node wrapping `object`.
    ///
    /// The container flag is derived from the object's kind once and
    /// never changes. No side effects on the object. Bind the node
    /// with [`set_parent`](SceneGraph::set_parent) afterwards.
    ///
    /// # Errors
    ///
    /// `StaleKey` if `object` is not in the store.
    pub fn create_node(&mut self, object: ObjectKey) -> Result<NodeKey> {
        let kind = self.geometry.kind(object).ok_or_else(|| {
            Error::StaleKey("object is not in the store".to_string())
        })?;

        let key = self
            .nodes
            .insert(SceneNode::new(object, kind.is_container()));
        scene_trace!(SOURCE, "Created node for {:?} object", kind);
        Ok(key)
    }

    /// Mirror an already-populated geometry subtree under `node`.
    ///
    /// Precondition: `node`'s object contains its full child subtree
    /// and `node` has no children yet (call at most once per subtree).
    /// Leaf nodes are a no-op. Child order matches the geometry tree.
    pub fn mirror_recursive(&mut self, node: NodeKey) {
        let Some(current) = self.nodes.get(node) else {
            return;
        };
        if !current.is_container {
            return;
        }

        let child_objects: Vec<ObjectKey> = self
            .geometry
            .children(current.object)
            .map(<[ObjectKey]>::to_vec)
            .unwrap_or_default();

        for child_object in child_objects {
            let is_container = self
                .geometry
                .kind(child_object)
                .is_some_and(|kind| kind.is_container());

            let mut child_node = SceneNode::new(child_object, is_container);
            child_node.parent = Some(node);
            let child_key = self.nodes.insert(child_node);

            self.nodes[node].children.push(child_key);
            self.mirror_recursive(child_key);
        }
    }

    // ===== SYNCHRONIZER OPERATIONS =====

    /// Attach an unattached node under a container node, appending on
    /// both trees.
    ///
    /// Append-only: no ordering is preserved beyond append order.
    /// Invalidation is not triggered here; [`set_parent`] and
    /// [`remove`](SceneGraph::remove) handle it, and direct callers
    /// invoke [`bounding_box_modified`](SceneGraph::bounding_box_modified)
    /// themselves.
    ///
    /// # Errors
    ///
    /// `StaleKey` for dead keys, `KindMismatch` if `parent` is not a
    /// container, `InvalidReparentTarget` if `node` is already
    /// attached.
    pub fn bind_parent(&mut self, parent: NodeKey, node: NodeKey) -> Result<()> {
        let (parent_object, parent_is_container) = {
            let parent_node = self.nodes.get(parent).ok_or_else(|| {
                Error::StaleKey("parent node is not in the graph".to_string())
            })?;
            (parent_node.object, parent_node.is_container)
        };
        let node_ref = self.nodes.get(node).ok_or_else(|| {
            Error::StaleKey("node is not in the graph".to_string())
        })?;

        if !parent_is_container {
            return Err(Error::KindMismatch(
                "bind target is not a container".to_string(),
            ));
        }
        if node_ref.parent.is_some() {
            return Err(Error::InvalidReparentTarget(
                "node is already attached; unbind it first".to_string(),
            ));
        }

        // Geometry side first: its checks mirror the ones above, so it
        // cannot fail after them and leave the trees diverged.
        self.geometry.add_child(parent_object, node_ref.object)?;

        self.nodes[parent].children.push(node);
        self.nodes[node].parent = Some(parent);
        Ok(())
    }

    /// Detach a node from its parent on both trees.
    ///
    /// Idempotent: detaching an already-detached node is a no-op. A
    /// node missing from its declared parent's child list is tolerated
    /// (logged) — the trees were already consistent with the intent.
    ///
    /// # Errors
    ///
    /// `StaleKey` if `node` is dead.
    pub fn unbind_parent(&mut self, node: NodeKey) -> Result<()> {
        let (parent, object) = {
            let node_ref = self.nodes.get(node).ok_or_else(|| {
                Error::StaleKey("node is not in the graph".to_string())
            })?;
            (node_ref.parent, node_ref.object)
        };
        let Some(parent) = parent else {
            return Ok(());
        };

        let parent_object = self.nodes[parent].object;
        let children = &mut self.nodes[parent].children;
        match children.iter().position(|&key| key == node) {
            Some(index) => {
                children.remove(index);
            }
            None => {
                scene_warn!(SOURCE, "Detached node was missing from its parent's child list");
            }
        }

        if !self.geometry.remove_child(parent_object, object)? {
            scene_warn!(SOURCE, "Detached object was missing from its parent container");
        }

        self.nodes[node].parent = None;
        Ok(())
    }

    /// Move a node under a new parent.
    ///
    /// All checks run before any mutation (all-or-nothing): the target
    /// must be a live container, must not be the node itself or inside
    /// its subtree (cycle prevention), and must differ from the current
    /// parent (a same-parent move would disturb ordering and fire
    /// redundant invalidation for nothing). The root cannot move.
    ///
    /// On success, bounding volumes are recomputed upward from both the
    /// old and the new parent, and every BVH at or above either of them
    /// goes stale. The moved node's own BVH state (if any) is untouched
    /// — its children did not change.
    pub fn set_parent(&mut self, new_parent: NodeKey, node: NodeKey) -> Result<()> {
        let node_ref = self.nodes.get(node).ok_or_else(|| {
            Error::StaleKey("node is not in the graph".to_string())
        })?;
        let parent_ref = self.nodes.get(new_parent).ok_or_else(|| {
            Error::StaleKey("target node is not in the graph".to_string())
        })?;

        if node == self.root {
            return Err(self.log_and_return_error(Error::RootImmutable));
        }
        if new_parent == node {
            return Err(self.log_and_return_error(Error::InvalidReparentTarget(
                "a node cannot become its own parent".to_string(),
            )));
        }
        if !parent_ref.is_container {
            return Err(self.log_and_return_error(Error::InvalidReparentTarget(
                format!("'{}' is not a container", parent_ref.name),
            )));
        }
        if node_ref.parent == Some(new_parent) {
            return Err(Error::NoOpReparent);
        }
        if self.is_ancestor(node, new_parent) {
            return Err(self.log_and_return_error(Error::InvalidReparentTarget(
                "target is inside the moved subtree".to_string(),
            )));
        }

        let old_parent = node_ref.parent;
        self.unbind_parent(node)?;
        self.bind_parent(new_parent, node)?;

        if let Some(old_parent) = old_parent {
            self.recalculate_and_propagate(old_parent);
            self.invalidate_acceleration_from(old_parent);
        }
        self.recalculate_and_propagate(new_parent);
        self.invalidate_acceleration_from(new_parent);

        scene_info!(
            SOURCE,
            "Reparented '{}' under '{}'",
            self.nodes[node].name,
            self.nodes[new_parent].name
        );
        Ok(())
    }

    /// Detach a node and release its subtree.
    ///
    /// If the node was attached, its former parent's bounding volume
    /// is recomputed and propagated, and BVHs at or above the former
    /// parent go stale. A detached node is released without any
    /// propagation. Both arenas drop the whole subtree; keys into it
    /// become stale.
    ///
    /// # Errors
    ///
    /// `StaleKey` if `node` is dead, `RootImmutable` for the root.
    pub fn remove(&mut self, node: NodeKey) -> Result<()> {
        let node_ref = self.nodes.get(node).ok_or_else(|| {
            Error::StaleKey("node is not in the graph".to_string())
        })?;
        if node == self.root {
            return Err(self.log_and_return_error(Error::RootImmutable));
        }

        let name = node_ref.name.clone();
        let object = node_ref.object;
        let old_parent = node_ref.parent;

        self.unbind_parent(node)?;

        if let Some(parent) = old_parent {
            self.recalculate_and_propagate(parent);
            self.invalidate_acceleration_from(parent);
        }

        let released_nodes = self.despawn_node_subtree(node);
        let released_objects = self.geometry.despawn_subtree(object);
        scene_info!(
            SOURCE,
            "Removed '{}' ({} nodes, {} objects released)",
            name,
            released_nodes,
            released_objects
        );
        Ok(())
    }

    // ===== INVALIDATION =====

    /// Propagate a bounding-volume change upward from `node`.
    ///
    /// Recomputes each ancestor's volume from its current children, up
    /// to and including the root. The directly edited node's own volume
    /// must already have been recalculated by the caller. O(depth),
    /// pure, and safe to call redundantly. Stale keys and the root are
    /// a no-op.
    pub fn bounding_box_modified(&mut self, node: NodeKey) {
        let Some(parent) = self.nodes.get(node).and_then(|n| n.parent) else {
            return;
        };

        let parent_object = self.nodes[parent].object;
        self.geometry.recalculate_bounding_box(parent_object);
        self.recomputed_bounds.insert(parent);

        self.bounding_box_modified(parent);
    }

    /// Mark every BVH strictly above `node` as stale.
    ///
    /// The listener-style counterpart of
    /// [`bounding_box_modified`](SceneGraph::bounding_box_modified):
    /// a geometric edit at `node` invalidates every acceleration
    /// structure whose subtree contains it. `node` itself keeps its
    /// state — only edits to its *children* concern its own structure,
    /// and those go through the synchronizer.
    pub fn acceleration_structures_modified(&mut self, node: NodeKey) {
        let Some(parent) = self.nodes.get(node).and_then(|n| n.parent) else {
            return;
        };
        self.invalidate_acceleration_from(parent);
    }

    /// Apply the after-effects of an inspector edit on `node`'s object.
    ///
    /// `BOUNDS` edits recompute the node's own volume, propagate
    /// upward, and stale affected BVHs. `PROPERTY`-only edits change
    /// nothing spatially, so no invalidation runs.
    ///
    /// # Errors
    ///
    /// `StaleKey` if `node` is dead.
    pub fn apply_edit(&mut self, node: NodeKey, effects: EditEffects) -> Result<()> {
        let object = self
            .nodes
            .get(node)
            .ok_or_else(|| Error::StaleKey("node is not in the graph".to_string()))?
            .object;

        if effects.contains(EditEffects::BOUNDS) {
            self.geometry.recalculate_bounding_box(object);
            self.recomputed_bounds.insert(node);
            self.bounding_box_modified(node);
            self.acceleration_structures_modified(node);
        }
        Ok(())
    }

    /// Take and clear the set of nodes whose bounding volume was
    /// recomputed since the last call.
    pub fn take_recomputed_bounds(&mut self) -> FxHashSet<NodeKey> {
        std::mem::take(&mut self.recomputed_bounds)
    }

    // ===== VALIDATION =====

    /// Check the structural invariants of both trees.
    ///
    /// Verifies: exactly one root; every non-root node appears exactly
    /// once in its parent's child list; child back-references match;
    /// the container flag agrees with the object kind; for every
    /// container node the identity-set of its children's objects
    /// equals the identity-set of the mirrored container's children
    /// (order may differ, membership may not); and no node is its own
    /// ancestor.
    pub fn validate(&self) -> Result<()> {
        let mut roots = 0;
        for (key, node) in self.nodes.iter() {
            if node.parent.is_none() {
                roots += 1;
                if key != self.root {
                    return Err(Error::CorruptHierarchy(
                        "parentless node is not the designated root".to_string(),
                    ));
                }
            }

            if let Some(parent) = node.parent {
                let parent_node = self.nodes.get(parent).ok_or_else(|| {
                    Error::CorruptHierarchy("parent key is stale".to_string())
                })?;
                let occurrences = parent_node
                    .children
                    .iter()
                    .filter(|&&child| child == key)
                    .count();
                if occurrences != 1 {
                    return Err(Error::CorruptHierarchy(format!(
                        "node appears {} times in its parent's child list",
                        occurrences
                    )));
                }
            }

            for &child in &node.children {
                let child_node = self.nodes.get(child).ok_or_else(|| {
                    Error::CorruptHierarchy("child key is stale".to_string())
                })?;
                if child_node.parent != Some(key) {
                    return Err(Error::CorruptHierarchy(
                        "child's parent back-reference does not match".to_string(),
                    ));
                }
            }

            let object_is_container = self
                .geometry
                .kind(node.object)
                .is_some_and(Kind::is_container);
            if node.is_container != object_is_container {
                return Err(Error::CorruptHierarchy(
                    "container flag diverged from object kind".to_string(),
                ));
            }

            if node.is_container {
                let node_side: FxHashSet<ObjectKey> = node
                    .children
                    .iter()
                    .filter_map(|&child| self.nodes.get(child))
                    .map(|child| child.object)
                    .collect();
                let object_side: FxHashSet<ObjectKey> = self
                    .geometry
                    .children(node.object)
                    .unwrap_or(&[])
                    .iter()
                    .copied()
                    .collect();
                if node_side != object_side {
                    return Err(Error::CorruptHierarchy(format!(
                        "mirror divergence at '{}': {} node children vs {} object children",
                        node.name,
                        node_side.len(),
                        object_side.len()
                    )));
                }
            }

            // Acyclicity: the parent chain must terminate within
            // node_count() hops.
            let mut hops = 0;
            let mut current = node.parent;
            while let Some(ancestor) = current {
                hops += 1;
                if hops > self.nodes.len() {
                    return Err(Error::CorruptHierarchy(
                        "cycle detected on parent chain".to_string(),
                    ));
                }
                current = self.nodes.get(ancestor).and_then(|n| n.parent);
            }
        }

        if roots != 1 {
            return Err(Error::CorruptHierarchy(format!(
                "expected exactly one root, found {}",
                roots
            )));
        }
        Ok(())
    }

    // ===== INTERNALS =====

    /// Recompute `node`'s own volume, then its ancestors' (bottom-up).
    fn recalculate_and_propagate(&mut self, node: NodeKey) {
        if let Some(node_ref) = self.nodes.get(node) {
            let object = node_ref.object;
            self.geometry.recalculate_bounding_box(object);
            self.recomputed_bounds.insert(node);
            self.bounding_box_modified(node);
        }
    }

    /// Stale every BVH from `node` (inclusive) up to the root.
    fn invalidate_acceleration_from(&mut self, node: NodeKey) {
        let mut current = Some(node);
        while let Some(key) = current {
            let Some(node_ref) = self.nodes.get(key) else {
                break;
            };
            self.geometry.invalidate_build(node_ref.object);
            current = node_ref.parent;
        }
    }

    /// Recompute every volume in a subtree, children before parents.
    fn recalculate_subtree(&mut self, node: NodeKey) {
        for child in self.children_snapshot(node) {
            self.recalculate_subtree(child);
        }
        if let Some(node_ref) = self.nodes.get(node) {
            let object = node_ref.object;
            self.geometry.recalculate_bounding_box(object);
        }
    }

    /// Drop a detached node and all its descendants from the arena.
    fn despawn_node_subtree(&mut self, node: NodeKey) -> usize {
        let mut stack = vec![node];
        let mut doomed = Vec::new();

        while let Some(current) = stack.pop() {
            if let Some(node_ref) = self.nodes.get(current) {
                stack.extend_from_slice(&node_ref.children);
                doomed.push(current);
            }
        }

        for key in &doomed {
            self.nodes.remove(*key);
            self.recomputed_bounds.remove(key);
        }
        doomed.len()
    }

    /// Helper to log rejected edits before returning them
    fn log_and_return_error(&self, error: Error) -> Error {
        scene_warn!(SOURCE, "Rejected edit: {}", error);
        error
    }
}

#[cfg(test)]
#[path = "scene_graph_tests.rs"]
mod tests;
