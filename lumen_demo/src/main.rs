//! Lumen scene editing demo.
//!
//! Assembles a small scene, mirrors it into a SceneGraph, then runs a
//! short editing session: reparent a sphere out of a BVH, shrink the
//! other one, and rebuild whatever went stale.

use glam::Vec3;
use lumen_scene::lumen::geometry::{GeometryStore, ObjectKind};
use lumen_scene::lumen::scene::{EditEffects, SceneGraph};
use lumen_scene::{scene_error, scene_info};

const SOURCE: &str = "lumen_demo";

fn run() -> lumen_scene::lumen::Result<()> {
    // Assemble the geometry tree: Root ∋ BVH ∋ {two spheres}
    let mut store = GeometryStore::new();
    let root_object = store.insert(ObjectKind::container());
    let bvh_object = store.insert(ObjectKind::bvh());
    let left = store.insert(ObjectKind::Sphere {
        center: Vec3::new(-2.0, 0.0, 0.0),
        radius: 1.0,
    });
    let right = store.insert(ObjectKind::Sphere {
        center: Vec3::new(2.0, 0.0, 0.0),
        radius: 1.0,
    });
    store.add_child(root_object, bvh_object)?;
    store.add_child(bvh_object, left)?;
    store.add_child(bvh_object, right)?;
    store.rebuild(bvh_object)?;

    // Mirror it into the authoring tree
    let mut graph = SceneGraph::new(store, root_object)?;
    let root = graph.root();
    let bvh = graph.children_snapshot(root)[0];
    let spheres = graph.children_snapshot(bvh);
    graph.set_name(root, "World");
    graph.set_name(bvh, "Accelerated Group");
    graph.set_name(spheres[0], "Left Sphere");
    graph.set_name(spheres[1], "Right Sphere");

    // Editing session
    graph.set_parent(root, spheres[0])?;

    graph.geometry_mut().update_shape(
        right,
        ObjectKind::Sphere {
            center: Vec3::new(2.0, 0.0, 0.0),
            radius: 0.5,
        },
    )?;
    graph.apply_edit(spheres[1], EditEffects::BOUNDS)?;

    for key in graph.take_recomputed_bounds() {
        let node = graph.node(key).expect("recomputed node is live");
        let bounds = graph.geometry().bounds(node.object());
        scene_info!(
            SOURCE,
            "'{}' bounds now {:?} .. {:?}",
            node.name(),
            bounds.min,
            bounds.max
        );
    }

    // Rebuild stale acceleration structures
    let stale: Vec<_> = graph
        .nodes()
        .filter(|(_, node)| graph.geometry().needs_rebuild(node.object()))
        .map(|(key, node)| (key, node.name().to_string()))
        .collect();
    for (key, name) in stale {
        let object = graph.node(key).expect("stale node is live").object();
        graph.geometry_mut().rebuild(object)?;
        scene_info!(SOURCE, "Rebuilt acceleration structure for '{}'", name);
    }

    graph.validate()?;
    scene_info!(
        SOURCE,
        "Session done: {} nodes, {} objects",
        graph.node_count(),
        graph.geometry().object_count()
    );
    Ok(())
}

fn main() {
    if let Err(error) = run() {
        scene_error!(SOURCE, "Demo failed: {}", error);
        std::process::exit(1);
    }
}
