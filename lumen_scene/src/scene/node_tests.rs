//! Unit tests for node.rs

use super::*;
use crate::geometry::{GeometryStore, ObjectKind};
use glam::Vec3;

fn some_object_key() -> crate::geometry::ObjectKey {
    let mut store = GeometryStore::new();
    store.insert(ObjectKind::Sphere {
        center: Vec3::ZERO,
        radius: 1.0,
    })
}

#[test]
fn test_new_node_defaults() {
    let object = some_object_key();
    let node = SceneNode::new(object, false);

    assert_eq!(node.name(), "Unnamed");
    assert_eq!(node.object(), object);
    assert!(!node.is_container());
    assert!(node.parent().is_none());
    assert!(node.children().is_empty());
}

#[test]
fn test_container_flag_is_what_was_given() {
    let object = some_object_key();
    assert!(SceneNode::new(object, true).is_container());
    assert!(!SceneNode::new(object, false).is_container());
}

#[test]
fn test_is_root_tracks_parent() {
    let object = some_object_key();
    let mut node = SceneNode::new(object, false);
    assert!(node.is_root());

    let mut nodes: slotmap::SlotMap<NodeKey, ()> = slotmap::SlotMap::with_key();
    let parent_key = nodes.insert(());
    node.parent = Some(parent_key);
    assert!(!node.is_root());
}
