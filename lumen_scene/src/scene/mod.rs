//! Authoring scene-graph module
//!
//! Provides the editor-facing node tree and the synchronizer that
//! keeps it consistent with the geometry-object tree (structural
//! edits, bounding-volume propagation, BVH dirty tracking).

mod node;
mod scene_graph;

pub use node::{NodeKey, SceneNode};
pub use scene_graph::{EditEffects, SceneGraph};
