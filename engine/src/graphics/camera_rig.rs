//! Active camera tracking
//!
//! The rig samples the current camera once per render frame and turns it
//! into a [`CameraView`]: the world position at the screen origin plus the
//! zoom factor. Smoothing blends from the last sampled position towards the
//! camera owner's global position, scaled by the frame duration.

use crate::components::{slot, Camera};
use crate::core::entity::hierarchy::node_kind;
use crate::core::entity::transform::global_position;
use crate::core::entity::{Entity, EntityStore};
use glam::Vec2;
use tracing::{debug, trace, warn};

/// Distance under which a smoothed camera snaps onto its target
pub const SNAP_EPSILON: f32 = 0.01;
/// Lower bound of the per-frame blend factor
pub const MIN_BLEND: f32 = 0.01;

/// What the renderer projects through this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    /// World position drawn at the screen origin
    pub position: Vec2,
    pub zoom: f32,
}

impl Default for CameraView {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigState {
    /// No usable camera, the view sits at the origin
    Idle,
    Tracking { camera: Entity },
}

#[derive(Debug, Clone)]
pub struct CameraRig {
    last_camera_position: Vec2,
    state: RigState,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraRig {
    pub fn new() -> Self {
        Self {
            last_camera_position: Vec2::ZERO,
            state: RigState::Idle,
        }
    }

    pub fn state(&self) -> RigState {
        self.state
    }

    pub fn last_camera_position(&self) -> Vec2 {
        self.last_camera_position
    }

    /// Sample the current camera and compute this frame's view
    pub fn update(&mut self, store: &mut EntityStore, frame_duration: f32, viewport: Vec2) -> CameraView {
        let Some((camera, owner, settings)) = Self::select(store) else {
            if self.state != RigState::Idle {
                debug!("Camera rig idle");
            }
            self.state = RigState::Idle;
            self.last_camera_position = Vec2::ZERO;
            return CameraView::default();
        };

        if self.state != (RigState::Tracking { camera }) {
            debug!(camera = ?camera, owner = ?owner, "Camera rig tracking");
            self.state = RigState::Tracking { camera };
        }

        let target = match global_position(store, owner) {
            Ok(target) => target,
            Err(e) => {
                warn!(camera = ?camera, error = %e, "Camera owner position unavailable");
                self.last_camera_position
            }
        };

        let position = if settings.smoothing() > 0.0 {
            smooth_towards(self.last_camera_position, target, settings.smoothing(), frame_duration)
        } else {
            target
        };
        self.last_camera_position = position;

        let zoom = settings.zoom();
        let position = if settings.centered() {
            position - viewport / (2.0 * zoom)
        } else {
            position
        };
        trace!(camera = ?camera, x = position.x, y = position.y, zoom, "Camera view");

        CameraView { position, zoom }
    }

    /// The current camera whose owner is a live spatial node
    fn select(store: &EntityStore) -> Option<(Entity, Entity, Camera)> {
        let camera = crate::components::camera::current_camera(store)?;
        let owner = slot::owner_of(store, camera)?;
        let spatial = node_kind(store, owner).map(|k| k.is_spatial()).unwrap_or(false);
        if !spatial {
            return None;
        }
        let settings = store.get::<Camera>(camera).ok().map(|c| *c)?;
        Some((camera, owner, settings))
    }
}

/// One smoothing step from `last` towards `target`
pub fn smooth_towards(last: Vec2, target: Vec2, smoothing: f32, frame_duration: f32) -> Vec2 {
    let t = (smoothing * frame_duration).clamp(MIN_BLEND, 1.0);
    let position = last.lerp(target, t);
    if position.distance(target) <= SNAP_EPSILON {
        target
    } else {
        position
    }
}
