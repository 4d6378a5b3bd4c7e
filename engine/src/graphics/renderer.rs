//! Camera-relative sprite rendering
//!
//! The renderer owns no textures. It walks the sprite components attached to
//! spatial nodes, projects each owner through the frame's [`CameraView`] and
//! hands rectangles to a [`Blitter`], which loads and draws the textures.

use crate::components::{Attachment, Sprite};
use crate::core::entity::hierarchy::node_kind;
use crate::core::entity::transform::global_position;
use crate::core::entity::{entity_to_id, Entity, EntityStore};
use crate::graphics::camera_rig::{CameraRig, CameraView};
use glam::Vec2;
use tracing::{trace, warn};

/// Integer pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flip {
    pub horizontal: bool,
    pub vertical: bool,
}

/// Handle to a texture owned by a [`Blitter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureInfo {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
}

/// Texture loading and drawing backend
pub trait Blitter {
    /// Load (or look up) the texture at `path`. `None` when it cannot be loaded.
    fn texture(&mut self, path: &str) -> Option<TextureInfo>;

    fn blit(&mut self, texture: TextureId, src: Rect, dst: Rect, flip: Flip);
}

/// World to screen projection under `view`
pub fn project(world: Vec2, view: &CameraView) -> Vec2 {
    (world - view.position) * view.zoom
}

/// Destination rectangle of size `w` x `h` centred on `screen`
pub fn centered_rect(screen: Vec2, w: u32, h: u32) -> Rect {
    Rect {
        x: (screen.x - w as f32 / 2.0).round() as i32,
        y: (screen.y - h as f32 / 2.0).round() as i32,
        w,
        h,
    }
}

pub struct Renderer2D {
    rig: CameraRig,
    viewport: Vec2,
}

impl Renderer2D {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            rig: CameraRig::new(),
            viewport,
        }
    }

    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    /// Sample the camera and draw every sprite. Returns the number of blits.
    pub fn render(&mut self, store: &mut EntityStore, blitter: &mut dyn Blitter, frame_duration: f32) -> usize {
        let view = self.rig.update(store, frame_duration, self.viewport);

        let mut sprites: Vec<(Entity, Sprite)> = store
            .query::<(&Sprite, &Attachment)>()
            .iter()
            .filter_map(|(_, (sprite, attachment))| attachment.owner.map(|owner| (owner, sprite.clone())))
            .collect();
        sprites.sort_by_key(|(owner, _)| entity_to_id(*owner));

        let mut drawn = 0;
        for (owner, sprite) in sprites {
            let spatial = node_kind(store, owner).map(|k| k.is_spatial()).unwrap_or(false);
            if !spatial {
                continue;
            }
            let Some(texture) = blitter.texture(&sprite.texture_path) else {
                warn!(node = ?owner, texture = sprite.texture_path.as_str(), "Texture unavailable, skipping sprite");
                continue;
            };
            let world = match global_position(store, owner) {
                Ok(world) => world,
                Err(e) => {
                    warn!(node = ?owner, error = %e, "Skipping sprite without position");
                    continue;
                }
            };

            let src = sprite.frame_rect(texture.width, texture.height);
            let dst = centered_rect(project(world, &view), src.w, src.h);
            trace!(node = ?owner, ?src, ?dst, "Blit sprite");
            blitter.blit(texture.id, src, dst, sprite.flip());
            drawn += 1;
        }
        drawn
    }
}
