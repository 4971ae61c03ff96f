//! Geometry-object layer
//!
//! Provides the renderer-facing object model: leaf shapes, container
//! kinds, bounding volumes, and BVH build-state tracking. Objects live
//! in a [`GeometryStore`] arena and reference each other by stable key.

mod aabb;
mod object;
mod store;

pub use aabb::AABB;
pub use object::{
    BuildState, GeometricObject, Kind, ObjectKey, ObjectKind,
};
pub use store::GeometryStore;
