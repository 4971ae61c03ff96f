//! Authoring-tree nodes.

use slotmap::new_key_type;

use crate::geometry::ObjectKey;

new_key_type! {
    /// Stable key for a SceneNode within a SceneGraph.
    ///
    /// Keys remain valid even after other nodes are removed.
    /// A key becomes invalid only when its own node is removed.
    pub struct NodeKey;
}

/// An authoring-side node wrapping one geometric object.
///
/// Holds the display name and the parent/child links of the authoring
/// tree. Links are populated and maintained exclusively by
/// [`SceneGraph`](super::SceneGraph); callers read them through the
/// accessors and never splice them directly.
#[derive(Debug)]
pub struct SceneNode {
    pub(crate) name: String,
    pub(crate) object: ObjectKey,
    pub(crate) is_container: bool,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: Vec<NodeKey>,
}

impl SceneNode {
    /// Computed once at construction; the underlying object's kind is
    /// immutable, so the flag never diverges from it.
    pub(crate) fn new(object: ObjectKey, is_container: bool) -> Self {
        Self {
            name: "Unnamed".to_string(),
            object,
            is_container,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Display name (mutable, no uniqueness constraint)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key of the wrapped geometric object, fixed at construction
    pub fn object(&self) -> ObjectKey {
        self.object
    }

    /// Parent node, `None` exactly when this node is the root
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    /// Ordered child nodes.
    ///
    /// For bulk operations that may edit the tree while iterating, use
    /// [`SceneGraph::children_snapshot`](super::SceneGraph::children_snapshot)
    /// instead of holding this borrow.
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    /// True if the wrapped object is a container kind
    pub fn is_container(&self) -> bool {
        self.is_container
    }

    /// True if this node has no parent
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
