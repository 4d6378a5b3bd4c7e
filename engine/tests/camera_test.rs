//! Integration tests for camera selection, smoothing and centering

use glam::Vec2;
use rogue_engine::components::camera::{current_camera, set_current};
use rogue_engine::components::{slot, spawn_component, Camera, Component};
use rogue_engine::core::entity::hierarchy::create_node;
use rogue_engine::core::entity::transform::set_local_position;
use rogue_engine::core::entity::{Entity, EntityStore, NodeKind};
use rogue_engine::error::SceneError;
use rogue_engine::graphics::{CameraRig, CameraView, RigState};

const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

/// A spatial node at `at` carrying a current camera configured by `setup`
fn camera_node(store: &mut EntityStore, at: Vec2, setup: impl FnOnce(&mut Camera)) -> (Entity, Entity) {
    let node = create_node(store, NodeKind::Spatial2D);
    set_local_position(store, node, at).unwrap();
    let mut camera = Camera::new(true);
    setup(&mut camera);
    let component = spawn_component(store, Component::Camera(camera));
    slot::attach(store, node, component).unwrap();
    (node, component)
}

#[test]
fn test_activation_is_exclusive() {
    let mut store = EntityStore::new();
    let (_, first) = camera_node(&mut store, Vec2::ZERO, |_| {});
    let (_, second) = camera_node(&mut store, Vec2::ZERO, |_| {});

    assert_eq!(current_camera(&store), Some(second));
    assert!(!store.get::<Camera>(first).unwrap().is_current());

    set_current(&mut store, first, true).unwrap();
    let current: Vec<_> = store
        .query::<&Camera>()
        .iter()
        .filter(|(_, c)| c.is_current())
        .map(|(e, _)| e)
        .collect();
    assert_eq!(current, vec![first]);
}

#[test]
fn test_zero_smoothing_snaps_to_target() {
    let mut store = EntityStore::new();
    camera_node(&mut store, Vec2::new(50.0, 0.0), |c| c.set_centered(false));

    let mut rig = CameraRig::new();
    let view = rig.update(&mut store, 1.0 / 60.0, VIEWPORT);
    assert_eq!(view.position, Vec2::new(50.0, 0.0));
    assert_eq!(view.zoom, 1.0);
}

#[test]
fn test_smoothing_converges_and_snaps() {
    let mut store = EntityStore::new();
    let target = Vec2::new(100.0, 0.0);
    camera_node(&mut store, target, |c| {
        c.set_centered(false);
        c.set_smoothing(5.0).unwrap();
    });

    let mut rig = CameraRig::new();
    let mut last_distance = f32::MAX;
    let mut snapped = false;
    for _ in 0..200 {
        let view = rig.update(&mut store, 0.05, VIEWPORT);
        let distance = view.position.distance(target);
        assert!(distance <= last_distance, "camera moved away from its target");
        last_distance = distance;
        if view.position == target {
            snapped = true;
            break;
        }
    }
    assert!(snapped, "camera never reached its target exactly");
}

#[test]
fn test_centering_offsets_by_half_viewport_over_zoom() {
    let mut store = EntityStore::new();
    camera_node(&mut store, Vec2::new(10.0, 20.0), |c| c.set_zoom(2.0).unwrap());

    let mut rig = CameraRig::new();
    let view = rig.update(&mut store, 0.016, VIEWPORT);
    assert_eq!(
        view,
        CameraView {
            position: Vec2::new(10.0 - 200.0, 20.0 - 150.0),
            zoom: 2.0,
        }
    );
}

#[test]
fn test_invalid_zoom_keeps_previous_value() {
    let mut camera = Camera::new(true);
    assert!(matches!(camera.set_zoom(0.0), Err(SceneError::InvalidArgument(_))));
    assert!(matches!(camera.set_zoom(-3.0), Err(SceneError::InvalidArgument(_))));
    assert_eq!(camera.zoom(), 1.0);
}

#[test]
fn test_camera_on_generic_node_is_ignored() {
    let mut store = EntityStore::new();
    let node = create_node(&mut store, NodeKind::Generic);
    let camera = spawn_component(&mut store, Component::Camera(Camera::new(true)));
    slot::attach(&mut store, node, camera).unwrap();

    let mut rig = CameraRig::new();
    let view = rig.update(&mut store, 0.016, VIEWPORT);
    assert_eq!(rig.state(), RigState::Idle);
    assert_eq!(view, CameraView::default());
}

#[test]
fn test_rig_tracks_moving_owner() {
    let mut store = EntityStore::new();
    let (node, camera) = camera_node(&mut store, Vec2::ZERO, |c| c.set_centered(false));

    let mut rig = CameraRig::new();
    rig.update(&mut store, 0.016, VIEWPORT);
    assert_eq!(rig.state(), RigState::Tracking { camera });

    set_local_position(&mut store, node, Vec2::new(-30.0, 7.0)).unwrap();
    let view = rig.update(&mut store, 0.016, VIEWPORT);
    assert_eq!(view.position, Vec2::new(-30.0, 7.0));
}

#[test]
fn test_rejected_camera_leaves_current_camera_alone() {
    let mut store = EntityStore::new();
    let (node, camera) = camera_node(&mut store, Vec2::new(5.0, 5.0), |c| c.set_centered(false));

    let rival = spawn_component(&mut store, Component::Camera(Camera::new(true)));
    assert!(matches!(slot::attach(&mut store, node, rival), Err(SceneError::Conflict(_))));
    let _ = store.despawn(rival);

    assert_eq!(current_camera(&store), Some(camera));
    let mut rig = CameraRig::new();
    let view = rig.update(&mut store, 0.016, VIEWPORT);
    assert_eq!(rig.state(), RigState::Tracking { camera });
    assert_eq!(view.position, Vec2::new(5.0, 5.0));
}

#[test]
fn test_unattached_current_camera_waits_for_attach() {
    let mut store = EntityStore::new();
    let (_, active) = camera_node(&mut store, Vec2::ZERO, |_| {});
    let other = create_node(&mut store, NodeKind::Spatial2D);

    let pending = spawn_component(&mut store, Component::Camera(Camera::new(true)));
    assert_eq!(current_camera(&store), Some(active));

    slot::attach(&mut store, other, pending).unwrap();
    assert_eq!(current_camera(&store), Some(pending));
    assert!(!store.get::<Camera>(active).unwrap().is_current());
}
