//! Geometry object arena.
//!
//! Objects are stored in a SlotMap for O(1) insert/remove with stable
//! keys; parent/child ownership is expressed as key lists inside the
//! container variants. Child membership is by key identity, never by
//! value.

use slotmap::SlotMap;

use crate::error::{Error, Result};
use super::aabb::AABB;
use super::object::{BuildState, GeometricObject, Kind, ObjectKey, ObjectKind};

/// Arena of geometric objects.
///
/// The store exposes capability-checked operations: child edits are
/// rejected with `KindMismatch` on non-container kinds, BVH state
/// queries with `KindMismatch` on non-BVH kinds. Parent/child links of
/// objects bound into a scene graph are owned by the synchronizer;
/// direct `add_child`/`remove_child` calls are for assembling a tree
/// before it is mirrored (scene load).
#[derive(Debug, Default)]
pub struct GeometryStore {
    objects: SlotMap<ObjectKey, GeometricObject>,
}

impl GeometryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            objects: SlotMap::with_key(),
        }
    }

    /// Insert a new object, returning its stable key.
    ///
    /// Leaf kinds get their intrinsic bounding volume immediately;
    /// container kinds start with the empty volume.
    pub fn insert(&mut self, kind: ObjectKind) -> ObjectKey {
        self.objects.insert(GeometricObject::new(kind))
    }

    /// Get an object by key
    pub fn get(&self, key: ObjectKey) -> Option<&GeometricObject> {
        self.objects.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: ObjectKey) -> Option<&mut GeometricObject> {
        self.objects.get_mut(key)
    }

    /// True if the key resolves to a live object
    pub fn contains(&self, key: ObjectKey) -> bool {
        self.objects.contains_key(key)
    }

    /// Number of live objects
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Iterate over all objects (key, object)
    pub fn iter(&self) -> impl Iterator<Item = (ObjectKey, &GeometricObject)> {
        self.objects.iter()
    }

    /// Kind tag of an object, or `None` for a stale key
    pub fn kind(&self, key: ObjectKey) -> Option<Kind> {
        self.objects.get(key).map(|object| object.kind())
    }

    /// Current bounding volume; empty for a stale key
    pub fn bounds(&self, key: ObjectKey) -> AABB {
        self.objects
            .get(key)
            .map(|object| object.bounds())
            .unwrap_or(AABB::EMPTY)
    }

    // ===== CONTAINER OPERATIONS =====

    /// Ordered child keys of a container, or `None` for leaf kinds
    /// and stale keys.
    pub fn children(&self, key: ObjectKey) -> Option<&[ObjectKey]> {
        self.objects.get(key).and_then(|object| object.children())
    }

    /// Number of children; 0 for leaf kinds and stale keys
    pub fn child_count(&self, key: ObjectKey) -> usize {
        self.children(key).map_or(0, |children| children.len())
    }

    /// Append `child` to `parent`'s ordered child collection.
    ///
    /// # Errors
    ///
    /// `StaleKey` if either key is dead, `KindMismatch` if `parent`
    /// is not a container kind or `child` is `parent` itself.
    pub fn add_child(&mut self, parent: ObjectKey, child: ObjectKey) -> Result<()> {
        if !self.objects.contains_key(child) {
            return Err(Error::StaleKey("child object is not in the store".to_string()));
        }
        if parent == child {
            return Err(Error::KindMismatch(
                "an object cannot contain itself".to_string(),
            ));
        }
        let object = self
            .objects
            .get_mut(parent)
            .ok_or_else(|| Error::StaleKey("parent object is not in the store".to_string()))?;
        let kind = object.kind();
        let children = object.children_mut().ok_or_else(|| {
            Error::KindMismatch(format!("{:?} objects do not own children", kind))
        })?;

        debug_assert!(!children.contains(&child));
        children.push(child);
        Ok(())
    }

    /// Remove `child` from `parent`'s child collection by key identity.
    ///
    /// Returns `Ok(false)` when the child is not a member — the trees
    /// were already consistent with the removal's intent, so this is
    /// tolerated rather than fatal.
    pub fn remove_child(&mut self, parent: ObjectKey, child: ObjectKey) -> Result<bool> {
        let object = self
            .objects
            .get_mut(parent)
            .ok_or_else(|| Error::StaleKey("parent object is not in the store".to_string()))?;
        let kind = object.kind();
        let children = object.children_mut().ok_or_else(|| {
            Error::KindMismatch(format!("{:?} objects do not own children", kind))
        })?;

        match children.iter().position(|&key| key == child) {
            Some(index) => {
                children.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ===== BOUNDING VOLUMES =====

    /// Recompute an object's bounding volume from its current state.
    ///
    /// Leaves use their intrinsic parameters; containers take the union
    /// of their children's *current* volumes (non-recursive — callers
    /// recompute bottom-up); transform containers and instances apply
    /// their local matrix on top. Pure and idempotent: recomputing
    /// twice yields the same volume.
    ///
    /// Returns the new volume; a stale key yields the empty volume.
    pub fn recalculate_bounding_box(&mut self, key: ObjectKey) -> AABB {
        let new_bounds = {
            let Some(object) = self.objects.get(key) else {
                return AABB::EMPTY;
            };

            match object.data() {
                ObjectKind::Sphere { .. }
                | ObjectKind::Disk { .. }
                | ObjectKind::Box { .. } => {
                    GeometricObject::intrinsic_bounds(object.data()).unwrap_or(AABB::EMPTY)
                }
                ObjectKind::Container { children } | ObjectKind::Bvh { children, .. } => {
                    self.union_of(children)
                }
                ObjectKind::TransformContainer { children, .. } => {
                    self.union_of(children).transformed(&object.local_matrix())
                }
                ObjectKind::Instance { target, .. } => {
                    let target_bounds = target
                        .and_then(|t| self.objects.get(t))
                        .map(|t| t.bounds())
                        .unwrap_or(AABB::EMPTY);
                    target_bounds.transformed(&object.local_matrix())
                }
            }
        };

        if let Some(object) = self.objects.get_mut(key) {
            object.set_bounds(new_bounds);
        }
        new_bounds
    }

    fn union_of(&self, keys: &[ObjectKey]) -> AABB {
        keys.iter()
            .fold(AABB::EMPTY, |acc, &key| acc.union(&self.bounds(key)))
    }

    // ===== LEAF / TRANSFORM EDITS =====

    /// Replace a leaf object's shape parameters.
    ///
    /// The kind tag is immutable for the lifetime of an object, so the
    /// replacement must be the same variant. The object's own volume is
    /// recomputed; ancestor propagation is the caller's concern.
    ///
    /// # Errors
    ///
    /// `StaleKey` for a dead key, `KindMismatch` for a container kind
    /// or a variant change.
    pub fn update_shape(&mut self, key: ObjectKey, shape: ObjectKind) -> Result<()> {
        let object = self
            .objects
            .get_mut(key)
            .ok_or_else(|| Error::StaleKey("object is not in the store".to_string()))?;

        if shape.kind().is_container() || shape.kind() == Kind::Instance {
            return Err(Error::KindMismatch(
                "update_shape only applies to leaf shapes".to_string(),
            ));
        }
        if shape.kind() != object.kind() {
            return Err(Error::KindMismatch(format!(
                "object kind is immutable: {:?} cannot become {:?}",
                object.kind(),
                shape.kind()
            )));
        }

        *object.data_mut() = shape;
        self.recalculate_bounding_box(key);
        Ok(())
    }

    /// Set the local TRS transform of a transform container or
    /// instance and recompute its volume.
    ///
    /// # Errors
    ///
    /// `StaleKey` for a dead key, `KindMismatch` for kinds without a
    /// local transform.
    pub fn set_transform(
        &mut self,
        key: ObjectKey,
        translation: glam::Vec3,
        rotation: glam::Quat,
        scale: glam::Vec3,
    ) -> Result<()> {
        let object = self
            .objects
            .get_mut(key)
            .ok_or_else(|| Error::StaleKey("object is not in the store".to_string()))?;

        match object.data_mut() {
            ObjectKind::TransformContainer {
                translation: t,
                rotation: r,
                scale: s,
                ..
            }
            | ObjectKind::Instance {
                translation: t,
                rotation: r,
                scale: s,
                ..
            } => {
                *t = translation;
                *r = rotation;
                *s = scale;
            }
            _ => {
                return Err(Error::KindMismatch(format!(
                    "{:?} objects have no local transform",
                    object.kind()
                )))
            }
        }

        self.recalculate_bounding_box(key);
        Ok(())
    }

    // ===== BVH STATE =====

    /// BVH build state, or `None` for non-BVH kinds and stale keys
    pub fn build_state(&self, key: ObjectKey) -> Option<BuildState> {
        self.objects.get(key).and_then(|object| object.build_state())
    }

    /// True iff the key is a BVH whose structure reflects its children
    pub fn is_built(&self, key: ObjectKey) -> bool {
        self.build_state(key) == Some(BuildState::Built)
    }

    /// True iff the key is a BVH that must be (re)built before tracing
    pub fn needs_rebuild(&self, key: ObjectKey) -> bool {
        self.build_state(key)
            .is_some_and(|state| state.needs_rebuild())
    }

    /// Mark a BVH's structure as rebuilt against its current children.
    ///
    /// The build algorithm itself runs elsewhere; this records the
    /// `Unbuilt`/`Dirty` → `Built` transition once it has run.
    pub fn rebuild(&mut self, key: ObjectKey) -> Result<()> {
        self.set_built_state(key, true)
    }

    /// Force the build flag of a BVH.
    ///
    /// `true` marks the structure `Built`; `false` marks a `Built`
    /// structure `Dirty` (an `Unbuilt` one has nothing to go stale and
    /// stays `Unbuilt`).
    pub fn set_built_state(&mut self, key: ObjectKey, built: bool) -> Result<()> {
        let object = self
            .objects
            .get_mut(key)
            .ok_or_else(|| Error::StaleKey("object is not in the store".to_string()))?;
        let Some(state) = object.build_state() else {
            return Err(Error::KindMismatch(format!(
                "{:?} objects have no build state",
                object.kind()
            )));
        };

        let new_state = if built { BuildState::Built } else { state.invalidated() };
        object.set_build_state(new_state);
        Ok(())
    }

    /// Record that something changed at or beneath a BVH.
    /// No-op for non-BVH kinds.
    pub(crate) fn invalidate_build(&mut self, key: ObjectKey) {
        if let Some(object) = self.objects.get_mut(key) {
            if let Some(state) = object.build_state() {
                object.set_build_state(state.invalidated());
            }
        }
    }

    // ===== REMOVAL =====

    /// Remove an object and every object it transitively owns.
    ///
    /// Instance targets are references, not ownership, and are left
    /// untouched. Returns the number of objects removed.
    pub(crate) fn despawn_subtree(&mut self, key: ObjectKey) -> usize {
        let mut stack = vec![key];
        let mut doomed = Vec::new();

        while let Some(current) = stack.pop() {
            if let Some(object) = self.objects.get(current) {
                if let Some(children) = object.children() {
                    stack.extend_from_slice(children);
                }
                doomed.push(current);
            }
        }

        for key in &doomed {
            self.objects.remove(*key);
        }
        doomed.len()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
