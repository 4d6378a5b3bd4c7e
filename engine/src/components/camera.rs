//! Camera component: which node the view follows and how

use crate::core::entity::EntityStore;
use crate::error::{SceneError, SceneResult};
use hecs::Entity;
use tracing::debug;

/// Camera parameters. At most one camera in a store is current.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    current: bool,
    centered: bool,
    smoothing: f32,
    zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Camera {
    /// Centered, unsmoothed camera at zoom 1
    pub fn new(current: bool) -> Self {
        Self {
            current,
            centered: true,
            smoothing: 0.0,
            zoom: 1.0,
        }
    }

    pub fn is_current(&self) -> bool {
        self.current
    }

    pub fn centered(&self) -> bool {
        self.centered
    }

    pub fn set_centered(&mut self, centered: bool) {
        self.centered = centered;
    }

    /// Follow speed; 0 snaps to the target every frame
    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    pub fn set_smoothing(&mut self, smoothing: f32) -> SceneResult<()> {
        if !smoothing.is_finite() || smoothing < 0.0 {
            return Err(SceneError::InvalidArgument(format!(
                "camera smoothing must be >= 0, got {smoothing}"
            )));
        }
        self.smoothing = smoothing;
        Ok(())
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Set the zoom factor. Non-positive values are rejected and the
    /// previous zoom is kept.
    pub fn set_zoom(&mut self, zoom: f32) -> SceneResult<()> {
        if !zoom.is_finite() || zoom <= 0.0 {
            return Err(SceneError::InvalidArgument(format!(
                "camera zoom must be > 0, got {zoom}"
            )));
        }
        self.zoom = zoom;
        Ok(())
    }
}

/// Carried by an unattached camera spawned as current. It takes over as the
/// current camera once it is attached to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActivateOnAttach;

impl Camera {
    /// Clear the current flag, returning whether it was set
    pub(super) fn take_current(&mut self) -> bool {
        std::mem::replace(&mut self.current, false)
    }
}

/// Make `camera` the only current camera in the store
pub fn make_current(store: &mut EntityStore, camera: Entity) {
    for (entity, cam) in store.query_mut::<&mut Camera>() {
        cam.current = entity == camera;
    }
    debug!(camera = ?camera, "Camera made current");
}

/// Activate or deactivate a camera component
pub fn set_current(store: &mut EntityStore, camera: Entity, current: bool) -> SceneResult<()> {
    if !store.contains(camera) {
        return Err(SceneError::StaleReference(camera));
    }
    if !store.has::<Camera>(camera) {
        return Err(SceneError::InvalidArgument(format!("{camera:?} is not a camera")));
    }
    let _ = store.remove_one::<ActivateOnAttach>(camera);
    if current {
        make_current(store, camera);
    } else if let Some(cam) = store.get_mut::<Camera>(camera) {
        cam.current = false;
    }
    Ok(())
}

/// Whether `camera` is current or waits to become current on attach
pub fn is_current_or_pending(store: &EntityStore, camera: Entity) -> bool {
    store.has::<ActivateOnAttach>(camera)
        || store.get::<Camera>(camera).map(|cam| cam.is_current()).unwrap_or(false)
}

/// The camera entity flagged current, if any
pub fn current_camera(store: &EntityStore) -> Option<Entity> {
    store
        .query::<&Camera>()
        .iter()
        .find(|(_, cam)| cam.current)
        .map(|(entity, _)| entity)
}
