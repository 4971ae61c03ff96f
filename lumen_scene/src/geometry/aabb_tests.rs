//! Unit tests for aabb.rs

use super::*;
use glam::{Mat4, Quat, Vec3};

#[test]
fn test_new_orders_corners() {
    let aabb = AABB::new(Vec3::new(1.0, -2.0, 3.0), Vec3::new(-1.0, 2.0, -3.0));
    assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, -3.0));
    assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 3.0));
}

#[test]
fn test_empty_is_empty() {
    assert!(AABB::EMPTY.is_empty());
    assert!(!AABB::new(Vec3::ZERO, Vec3::ONE).is_empty());
}

#[test]
fn test_point_box_is_not_empty() {
    // A zero-extent box still has a location
    let aabb = AABB::new(Vec3::ONE, Vec3::ONE);
    assert!(!aabb.is_empty());
}

#[test]
fn test_center() {
    let aabb = AABB::new(Vec3::new(-2.0, 0.0, 2.0), Vec3::new(2.0, 4.0, 6.0));
    assert_eq!(aabb.center(), Vec3::new(0.0, 2.0, 4.0));
}

#[test]
fn test_union_encloses_both() {
    let a = AABB::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
    let b = AABB::new(Vec3::new(2.0, -3.0, 0.0), Vec3::new(4.0, 0.0, 5.0));
    let u = a.union(&b);
    assert!(u.contains(&a));
    assert!(u.contains(&b));
    assert_eq!(u.min, Vec3::new(-1.0, -3.0, -1.0));
    assert_eq!(u.max, Vec3::new(4.0, 1.0, 5.0));
}

#[test]
fn test_union_with_empty_is_identity() {
    let a = AABB::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
    assert_eq!(a.union(&AABB::EMPTY), a);
    assert_eq!(AABB::EMPTY.union(&a), a);
}

#[test]
fn test_union_of_two_empties_is_empty() {
    assert!(AABB::EMPTY.union(&AABB::EMPTY).is_empty());
}

#[test]
fn test_transformed_translation() {
    let aabb = AABB::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
    let moved = aabb.transformed(&Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)));
    assert_eq!(moved.min, Vec3::new(9.0, -1.0, -1.0));
    assert_eq!(moved.max, Vec3::new(11.0, 1.0, 1.0));
}

#[test]
fn test_transformed_scale() {
    let aabb = AABB::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
    let scaled = aabb.transformed(&Mat4::from_scale(Vec3::splat(2.0)));
    assert_eq!(scaled.min, Vec3::splat(-2.0));
    assert_eq!(scaled.max, Vec3::splat(2.0));
}

#[test]
fn test_transformed_rotation_stays_enclosing() {
    let aabb = AABB::new(Vec3::new(-1.0, -2.0, -3.0), Vec3::new(1.0, 2.0, 3.0));
    let rotation = Mat4::from_quat(Quat::from_rotation_y(std::f32::consts::FRAC_PI_4));
    let rotated = aabb.transformed(&rotation);

    // Every rotated corner must still be inside the new box
    for &x in &[aabb.min.x, aabb.max.x] {
        for &y in &[aabb.min.y, aabb.max.y] {
            for &z in &[aabb.min.z, aabb.max.z] {
                let corner = rotation.transform_point3(Vec3::new(x, y, z));
                assert!(rotated.contains(&AABB::new(corner, corner)));
            }
        }
    }
}

#[test]
fn test_transformed_empty_stays_empty() {
    let moved = AABB::EMPTY.transformed(&Mat4::from_translation(Vec3::ONE));
    assert!(moved.is_empty());
}

#[test]
fn test_contains() {
    let outer = AABB::new(Vec3::splat(-2.0), Vec3::splat(2.0));
    let inner = AABB::new(Vec3::splat(-1.0), Vec3::splat(1.0));
    assert!(outer.contains(&inner));
    assert!(!inner.contains(&outer));
}

#[test]
fn test_intersects() {
    let a = AABB::new(Vec3::splat(-1.0), Vec3::splat(1.0));
    let b = AABB::new(Vec3::splat(0.5), Vec3::splat(2.0));
    let c = AABB::new(Vec3::splat(5.0), Vec3::splat(6.0));
    assert!(a.intersects(&b));
    assert!(b.intersects(&a));
    assert!(!a.intersects(&c));
}
