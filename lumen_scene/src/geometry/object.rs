//! Geometric object model.
//!
//! A closed tagged-variant set replaces runtime downcasting: container
//! operations exist only for the kinds that actually own children, and
//! a lightweight [`Kind`] tag answers capability queries without
//! touching variant data.

use glam::{Mat4, Quat, Vec3};
use slotmap::new_key_type;

use super::aabb::AABB;

new_key_type! {
    /// Stable key for a GeometricObject within a GeometryStore.
    ///
    /// Keys remain valid even after other objects are removed.
    /// A key becomes invalid only when its own object is removed.
    pub struct ObjectKey;
}

// ===== KIND TAG =====

/// Kind tag for geometric objects (closed set).
///
/// Only the three container kinds expose child operations; leaf kinds
/// and instances do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Sphere primitive
    Sphere,
    /// Flat disk primitive
    Disk,
    /// Axis-aligned box primitive
    Box,
    /// Plain ordered container of child objects
    Container,
    /// Container with a local TRS transform applied to its children
    TransformContainer,
    /// Container with an associated spatial acceleration structure
    Bvh,
    /// Reference to another object with its own TRS transform
    Instance,
}

impl Kind {
    /// True for the kinds that own an ordered child collection.
    pub fn is_container(self) -> bool {
        matches!(self, Kind::Container | Kind::TransformContainer | Kind::Bvh)
    }
}

// ===== BVH BUILD STATE =====

/// Acceleration-structure build state for a BVH object.
///
/// State machine:
/// - `Unbuilt` → `Built` on rebuild
/// - `Built` → `Dirty` on any structural or bounding-volume change
///   at or beneath the BVH
/// - `Dirty` → `Built` on rebuild
///
/// `Unbuilt` never transitions to `Dirty`: nothing exists to go stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildState {
    /// Initial state, never built
    #[default]
    Unbuilt,
    /// Structure reflects current children
    Built,
    /// Structure is stale relative to current children
    Dirty,
}

impl BuildState {
    /// State after an edit beneath the BVH. `Built` goes stale,
    /// the other states are unaffected.
    pub fn invalidated(self) -> BuildState {
        match self {
            BuildState::Built => BuildState::Dirty,
            other => other,
        }
    }

    /// True iff the structure must be (re)built before tracing.
    pub fn needs_rebuild(self) -> bool {
        !matches!(self, BuildState::Built)
    }
}

// ===== OBJECT VARIANTS =====

/// Geometric object data, one variant per [`Kind`].
#[derive(Debug, Clone)]
pub enum ObjectKind {
    Sphere {
        center: Vec3,
        radius: f32,
    },
    Disk {
        center: Vec3,
        normal: Vec3,
        radius: f32,
    },
    Box {
        min: Vec3,
        max: Vec3,
    },
    Container {
        children: Vec<ObjectKey>,
    },
    TransformContainer {
        children: Vec<ObjectKey>,
        translation: Vec3,
        rotation: Quat,
        scale: Vec3,
    },
    Bvh {
        children: Vec<ObjectKey>,
        state: BuildState,
    },
    Instance {
        /// Referenced object; ownership stays with the container tree.
        /// A missing target yields an empty bounding volume.
        target: Option<ObjectKey>,
        translation: Vec3,
        rotation: Quat,
        scale: Vec3,
    },
}

impl ObjectKind {
    /// Empty plain container.
    pub fn container() -> ObjectKind {
        ObjectKind::Container { children: Vec::new() }
    }

    /// Empty transform container with an identity transform.
    pub fn transform_container() -> ObjectKind {
        ObjectKind::TransformContainer {
            children: Vec::new(),
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// Empty, unbuilt BVH.
    pub fn bvh() -> ObjectKind {
        ObjectKind::Bvh {
            children: Vec::new(),
            state: BuildState::Unbuilt,
        }
    }

    /// Instance of `target` with an identity transform.
    pub fn instance(target: ObjectKey) -> ObjectKind {
        ObjectKind::Instance {
            target: Some(target),
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// Kind tag of this variant.
    pub fn kind(&self) -> Kind {
        match self {
            ObjectKind::Sphere { .. } => Kind::Sphere,
            ObjectKind::Disk { .. } => Kind::Disk,
            ObjectKind::Box { .. } => Kind::Box,
            ObjectKind::Container { .. } => Kind::Container,
            ObjectKind::TransformContainer { .. } => Kind::TransformContainer,
            ObjectKind::Bvh { .. } => Kind::Bvh,
            ObjectKind::Instance { .. } => Kind::Instance,
        }
    }
}

// ===== GEOMETRIC OBJECT =====

/// A geometric object: variant data plus its current bounding volume.
///
/// The bounding volume is recomputed through
/// [`GeometryStore::recalculate_bounding_box`](super::GeometryStore::recalculate_bounding_box)
/// whenever an edit could change it; it is never left stale across an
/// edit because every synchronizer operation recomputes the affected
/// ancestor chain eagerly.
#[derive(Debug, Clone)]
pub struct GeometricObject {
    kind: ObjectKind,
    bounds: AABB,
}

impl GeometricObject {
    pub(crate) fn new(kind: ObjectKind) -> Self {
        let bounds = Self::intrinsic_bounds(&kind).unwrap_or(AABB::EMPTY);
        Self { kind, bounds }
    }

    /// Kind tag.
    pub fn kind(&self) -> Kind {
        self.kind.kind()
    }

    /// Variant data (read-only; mutation goes through the store).
    pub fn data(&self) -> &ObjectKind {
        &self.kind
    }

    pub(crate) fn data_mut(&mut self) -> &mut ObjectKind {
        &mut self.kind
    }

    /// Current bounding volume.
    pub fn bounds(&self) -> AABB {
        self.bounds
    }

    pub(crate) fn set_bounds(&mut self, bounds: AABB) {
        self.bounds = bounds;
    }

    /// True for container kinds.
    pub fn is_container(&self) -> bool {
        self.kind().is_container()
    }

    /// Ordered child keys, or `None` for non-container kinds.
    pub fn children(&self) -> Option<&[ObjectKey]> {
        match &self.kind {
            ObjectKind::Container { children }
            | ObjectKind::TransformContainer { children, .. }
            | ObjectKind::Bvh { children, .. } => Some(children),
            _ => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<ObjectKey>> {
        match &mut self.kind {
            ObjectKind::Container { children }
            | ObjectKind::TransformContainer { children, .. }
            | ObjectKind::Bvh { children, .. } => Some(children),
            _ => None,
        }
    }

    /// BVH build state, or `None` for non-BVH kinds.
    pub fn build_state(&self) -> Option<BuildState> {
        match &self.kind {
            ObjectKind::Bvh { state, .. } => Some(*state),
            _ => None,
        }
    }

    pub(crate) fn set_build_state(&mut self, new_state: BuildState) -> bool {
        match &mut self.kind {
            ObjectKind::Bvh { state, .. } => {
                *state = new_state;
                true
            }
            _ => false,
        }
    }

    /// Local TRS matrix for transform containers and instances,
    /// identity for everything else.
    pub fn local_matrix(&self) -> Mat4 {
        match &self.kind {
            ObjectKind::TransformContainer { translation, rotation, scale, .. }
            | ObjectKind::Instance { translation, rotation, scale, .. } => {
                Mat4::from_scale_rotation_translation(*scale, *rotation, *translation)
            }
            _ => Mat4::IDENTITY,
        }
    }

    /// Bounding volume computable from variant parameters alone.
    ///
    /// `None` for kinds whose volume depends on other objects.
    pub(crate) fn intrinsic_bounds(kind: &ObjectKind) -> Option<AABB> {
        match kind {
            ObjectKind::Sphere { center, radius } => {
                let extent = Vec3::splat(*radius);
                Some(AABB { min: *center - extent, max: *center + extent })
            }
            ObjectKind::Disk { center, normal, radius } => {
                // Tight box of a disk: per-axis extent r * sqrt(1 - n_i^2)
                let n = normal.normalize_or_zero();
                let extent = Vec3::new(
                    (1.0 - n.x * n.x).max(0.0).sqrt(),
                    (1.0 - n.y * n.y).max(0.0).sqrt(),
                    (1.0 - n.z * n.z).max(0.0).sqrt(),
                ) * *radius;
                Some(AABB { min: *center - extent, max: *center + extent })
            }
            ObjectKind::Box { min, max } => Some(AABB::new(*min, *max)),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "object_tests.rs"]
mod tests;
