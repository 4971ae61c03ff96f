/*!
# Lumen Scene

Authoring scene-graph core for the Lumen CPU ray tracer.

This crate keeps two hierarchies consistent: the authoring tree the
editor panels operate on (selection, naming, drag-and-drop) and the
renderer-facing geometry tree (containers, transform containers,
bounding-volume hierarchies). Every structural edit goes through the
[`scene::SceneGraph`], which mutates both trees together, recomputes
ancestor bounding volumes, and marks affected acceleration structures
dirty.

## Architecture

- **GeometryStore**: arena of geometric objects (leaf shapes and
  container kinds) addressed by stable keys
- **SceneGraph**: arena of authoring nodes mirroring the geometry
  tree; the only permitted mutator of parent/child links on either
  side
- **BuildState**: per-BVH flag machine (Unbuilt / Built / Dirty)
  driven by edits beneath the BVH

Ray intersection, shading, camera models and the BVH build algorithm
itself live in other crates; this one only guarantees structural and
invalidation correctness of the graphs.
*/

// Internal modules
mod error;
pub mod log;
pub mod geometry;
pub mod scene;

// Main lumen namespace module
pub mod lumen {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: scene_* macros are NOT re-exported here - they are exported at the crate root
    }

    // Geometry sub-module
    pub mod geometry {
        pub use crate::geometry::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }
}

// Re-export math library at crate root
pub use glam;
