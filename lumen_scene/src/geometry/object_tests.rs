//! Unit tests for object.rs
//!
//! Tests kind tags, container capability queries, intrinsic bounds,
//! and the BVH build-state machine.

use super::*;
use crate::geometry::AABB;
use glam::Vec3;

// ============================================================================
// KIND TESTS
// ============================================================================

#[test]
fn test_kind_tags() {
    assert_eq!(ObjectKind::container().kind(), Kind::Container);
    assert_eq!(ObjectKind::transform_container().kind(), Kind::TransformContainer);
    assert_eq!(ObjectKind::bvh().kind(), Kind::Bvh);
    assert_eq!(
        ObjectKind::Sphere { center: Vec3::ZERO, radius: 1.0 }.kind(),
        Kind::Sphere
    );
    assert_eq!(
        ObjectKind::Box { min: Vec3::ZERO, max: Vec3::ONE }.kind(),
        Kind::Box
    );
}

#[test]
fn test_container_kinds() {
    assert!(Kind::Container.is_container());
    assert!(Kind::TransformContainer.is_container());
    assert!(Kind::Bvh.is_container());

    assert!(!Kind::Sphere.is_container());
    assert!(!Kind::Disk.is_container());
    assert!(!Kind::Box.is_container());
    assert!(!Kind::Instance.is_container());
}

#[test]
fn test_children_accessor_only_for_containers() {
    let sphere = GeometricObject::new(ObjectKind::Sphere {
        center: Vec3::ZERO,
        radius: 1.0,
    });
    assert!(sphere.children().is_none());

    let container = GeometricObject::new(ObjectKind::container());
    assert_eq!(container.children(), Some(&[][..]));
}

// ============================================================================
// INTRINSIC BOUNDS TESTS
// ============================================================================

#[test]
fn test_sphere_bounds() {
    let sphere = GeometricObject::new(ObjectKind::Sphere {
        center: Vec3::new(1.0, 2.0, 3.0),
        radius: 2.0,
    });
    assert_eq!(sphere.bounds().min, Vec3::new(-1.0, 0.0, 1.0));
    assert_eq!(sphere.bounds().max, Vec3::new(3.0, 4.0, 5.0));
}

#[test]
fn test_box_bounds() {
    let block = GeometricObject::new(ObjectKind::Box {
        min: Vec3::new(-1.0, 0.0, 0.0),
        max: Vec3::new(1.0, 2.0, 3.0),
    });
    assert_eq!(block.bounds().min, Vec3::new(-1.0, 0.0, 0.0));
    assert_eq!(block.bounds().max, Vec3::new(1.0, 2.0, 3.0));
}

#[test]
fn test_disk_bounds_are_flat_along_normal() {
    let disk = GeometricObject::new(ObjectKind::Disk {
        center: Vec3::ZERO,
        normal: Vec3::Y,
        radius: 3.0,
    });
    let bounds = disk.bounds();
    // Flat in Y, radius-wide in X and Z
    assert!(bounds.max.y.abs() < 1e-6);
    assert!(bounds.min.y.abs() < 1e-6);
    assert!((bounds.max.x - 3.0).abs() < 1e-6);
    assert!((bounds.min.z + 3.0).abs() < 1e-6);
}

#[test]
fn test_container_starts_with_empty_bounds() {
    let container = GeometricObject::new(ObjectKind::container());
    assert!(container.bounds().is_empty());

    let bvh = GeometricObject::new(ObjectKind::bvh());
    assert!(bvh.bounds().is_empty());
}

// ============================================================================
// BUILD STATE MACHINE TESTS
// ============================================================================

#[test]
fn test_build_state_initial_is_unbuilt() {
    assert_eq!(BuildState::default(), BuildState::Unbuilt);
    let bvh = GeometricObject::new(ObjectKind::bvh());
    assert_eq!(bvh.build_state(), Some(BuildState::Unbuilt));
}

#[test]
fn test_unbuilt_never_goes_dirty() {
    // Nothing to go stale before the first build
    assert_eq!(BuildState::Unbuilt.invalidated(), BuildState::Unbuilt);
}

#[test]
fn test_built_goes_dirty_on_invalidation() {
    assert_eq!(BuildState::Built.invalidated(), BuildState::Dirty);
}

#[test]
fn test_dirty_stays_dirty_on_invalidation() {
    assert_eq!(BuildState::Dirty.invalidated(), BuildState::Dirty);
}

#[test]
fn test_needs_rebuild() {
    assert!(BuildState::Unbuilt.needs_rebuild());
    assert!(BuildState::Dirty.needs_rebuild());
    assert!(!BuildState::Built.needs_rebuild());
}

#[test]
fn test_build_state_only_on_bvh() {
    let container = GeometricObject::new(ObjectKind::container());
    assert!(container.build_state().is_none());

    let sphere = GeometricObject::new(ObjectKind::Sphere {
        center: Vec3::ZERO,
        radius: 1.0,
    });
    assert!(sphere.build_state().is_none());
}

// ============================================================================
// LOCAL MATRIX TESTS
// ============================================================================

#[test]
fn test_local_matrix_identity_for_plain_kinds() {
    let container = GeometricObject::new(ObjectKind::container());
    assert_eq!(container.local_matrix(), glam::Mat4::IDENTITY);
}

#[test]
fn test_local_matrix_applies_translation() {
    let mut transform = ObjectKind::transform_container();
    if let ObjectKind::TransformContainer { translation, .. } = &mut transform {
        *translation = Vec3::new(5.0, 0.0, 0.0);
    }
    let object = GeometricObject::new(transform);
    let moved = AABB::new(Vec3::ZERO, Vec3::ONE).transformed(&object.local_matrix());
    assert_eq!(moved.min, Vec3::new(5.0, 0.0, 0.0));
}
