//! Integration tests for transforms, hierarchy and component ownership

use glam::Vec2;
use rogue_engine::components::{slot, spawn_component, Camera, Component, ComponentKind, Sprite};
use rogue_engine::core::entity::hierarchy::{add_child, children_of, create_node, destroy_node, parent_of, validate_hierarchy};
use rogue_engine::core::entity::transform::{global_position, local_position, set_global_position, set_local_position};
use rogue_engine::core::entity::{EntityStore, NodeKind};
use rogue_engine::error::SceneError;

fn close(a: Vec2, b: Vec2) -> bool {
    (a - b).length() < 1e-4
}

#[test]
fn test_child_follows_parent() {
    let mut store = EntityStore::new();
    let root = create_node(&mut store, NodeKind::Spatial2D);
    let a = create_node(&mut store, NodeKind::Spatial2D);
    add_child(&mut store, root, a).unwrap();

    set_local_position(&mut store, a, Vec2::new(10.0, 5.0)).unwrap();
    assert_eq!(global_position(&mut store, a).unwrap(), Vec2::new(10.0, 5.0));

    set_local_position(&mut store, root, Vec2::new(100.0, 100.0)).unwrap();
    assert_eq!(global_position(&mut store, a).unwrap(), Vec2::new(110.0, 105.0));
}

#[test]
fn test_global_is_local_plus_parent_global_after_mutations() {
    let mut store = EntityStore::new();
    let root = create_node(&mut store, NodeKind::Spatial2D);
    let mid = create_node(&mut store, NodeKind::Spatial2D);
    let leaf = create_node(&mut store, NodeKind::Spatial2D);
    add_child(&mut store, root, mid).unwrap();
    add_child(&mut store, mid, leaf).unwrap();

    set_local_position(&mut store, root, Vec2::new(3.0, 4.0)).unwrap();
    set_global_position(&mut store, leaf, Vec2::new(-7.0, 12.0)).unwrap();
    set_local_position(&mut store, mid, Vec2::new(1.0, -1.0)).unwrap();
    set_global_position(&mut store, root, Vec2::new(50.0, 50.0)).unwrap();

    for (node, parent) in [(mid, root), (leaf, mid)] {
        let global = global_position(&mut store, node).unwrap();
        let local = local_position(&mut store, node).unwrap();
        let parent_global = global_position(&mut store, parent).unwrap();
        assert!(close(global, local + parent_global), "{global} != {local} + {parent_global}");
    }

    // The leaf was pinned in world space before its ancestors moved.
    assert!(close(local_position(&mut store, leaf).unwrap(), Vec2::new(-10.0, 8.0)));
}

#[test]
fn test_reparent_keeps_global_position() {
    let mut store = EntityStore::new();
    let left = create_node(&mut store, NodeKind::Spatial2D);
    let right = create_node(&mut store, NodeKind::Spatial2D);
    let child = create_node(&mut store, NodeKind::Spatial2D);
    set_local_position(&mut store, left, Vec2::new(10.0, 0.0)).unwrap();
    set_local_position(&mut store, right, Vec2::new(0.0, 40.0)).unwrap();

    add_child(&mut store, left, child).unwrap();
    set_local_position(&mut store, child, Vec2::new(5.0, 5.0)).unwrap();
    assert_eq!(global_position(&mut store, child).unwrap(), Vec2::new(15.0, 5.0));

    add_child(&mut store, right, child).unwrap();
    assert_eq!(parent_of(&store, child), Some(right));
    assert!(children_of(&store, left).is_empty());
    assert_eq!(global_position(&mut store, child).unwrap(), Vec2::new(15.0, 5.0));
    assert_eq!(local_position(&mut store, child).unwrap(), Vec2::new(15.0, -35.0));
    assert_eq!(validate_hierarchy(&store), 0);
}

#[test]
fn test_preset_child_keeps_offset_under_moved_parent() {
    let mut store = EntityStore::new();
    let parent = create_node(&mut store, NodeKind::Spatial2D);
    set_local_position(&mut store, parent, Vec2::new(10.0, 0.0)).unwrap();
    let child = create_node(&mut store, NodeKind::Spatial2D);
    set_local_position(&mut store, child, Vec2::new(1.0, 1.0)).unwrap();
    assert_eq!(global_position(&mut store, child).unwrap(), Vec2::new(1.0, 1.0));

    add_child(&mut store, parent, child).unwrap();
    assert_eq!(local_position(&mut store, child).unwrap(), Vec2::new(1.0, 1.0));
    assert_eq!(global_position(&mut store, child).unwrap(), Vec2::new(11.0, 1.0));
}

#[test]
fn test_generic_parent_is_origin() {
    let mut store = EntityStore::new();
    let group = create_node(&mut store, NodeKind::Generic);
    let child = create_node(&mut store, NodeKind::Spatial2D);
    add_child(&mut store, group, child).unwrap();

    set_local_position(&mut store, child, Vec2::new(2.0, 3.0)).unwrap();
    assert_eq!(global_position(&mut store, child).unwrap(), Vec2::new(2.0, 3.0));
}

#[test]
fn test_structural_errors() {
    let mut store = EntityStore::new();
    let a = create_node(&mut store, NodeKind::Spatial2D);
    let b = create_node(&mut store, NodeKind::Spatial2D);

    assert!(matches!(add_child(&mut store, a, a), Err(SceneError::InvalidArgument(_))));
    add_child(&mut store, a, b).unwrap();
    assert!(matches!(add_child(&mut store, a, b), Err(SceneError::Conflict(_))));
    assert!(matches!(add_child(&mut store, b, a), Err(SceneError::InvalidArgument(_))));

    destroy_node(&mut store, b).unwrap();
    assert!(matches!(add_child(&mut store, a, b), Err(SceneError::StaleReference(_))));
    assert!(matches!(global_position(&mut store, b), Err(SceneError::StaleReference(_))));
}

#[test]
fn test_duplicate_kind_is_conflict() {
    let mut store = EntityStore::new();
    let node = create_node(&mut store, NodeKind::Spatial2D);
    let first = spawn_component(&mut store, Component::Sprite(Sprite::new("a.png")));
    let second = spawn_component(&mut store, Component::Sprite(Sprite::new("b.png")));

    slot::attach(&mut store, node, first).unwrap();
    assert!(matches!(slot::attach(&mut store, node, second), Err(SceneError::Conflict(_))));

    let kept = slot::get(&store, node, ComponentKind::Sprite).unwrap();
    assert_eq!(kept, first);
    assert_eq!(store.get::<Sprite>(kept).unwrap().texture_path, "a.png");
    assert_eq!(slot::owner_of(&store, second), None);
}

#[test]
fn test_component_owned_by_one_node() {
    let mut store = EntityStore::new();
    let a = create_node(&mut store, NodeKind::Spatial2D);
    let b = create_node(&mut store, NodeKind::Spatial2D);
    let camera = spawn_component(&mut store, Component::Camera(Camera::new(false)));

    slot::attach(&mut store, a, camera).unwrap();
    assert!(matches!(slot::attach(&mut store, b, camera), Err(SceneError::Conflict(_))));

    let detached = slot::detach(&mut store, a, ComponentKind::Camera).unwrap();
    assert_eq!(detached, camera);
    slot::attach(&mut store, b, camera).unwrap();
    assert_eq!(slot::owner_of(&store, camera), Some(b));
}

#[test]
fn test_destroy_removes_subtree_and_components() {
    let mut store = EntityStore::new();
    let root = create_node(&mut store, NodeKind::Generic);
    let child = create_node(&mut store, NodeKind::Spatial2D);
    let grandchild = create_node(&mut store, NodeKind::Spatial2D);
    add_child(&mut store, root, child).unwrap();
    add_child(&mut store, child, grandchild).unwrap();
    let sprite = spawn_component(&mut store, Component::Sprite(Sprite::default()));
    slot::attach(&mut store, grandchild, sprite).unwrap();

    destroy_node(&mut store, child).unwrap();

    assert!(store.contains(root));
    assert!(!store.contains(child));
    assert!(!store.contains(grandchild));
    assert!(!store.contains(sprite));
    assert!(children_of(&store, root).is_empty());
    assert_eq!(validate_hierarchy(&store), 0);
}
