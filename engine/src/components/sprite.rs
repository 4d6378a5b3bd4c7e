//! Sprite component: a texture sheet and the frame of it to draw

use crate::error::{SceneError, SceneResult};
use crate::graphics::renderer::{Flip, Rect};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    pub texture_path: String,
    hframes: u32,
    vframes: u32,
    pub frame: u32,
    pub flipped_h: bool,
    pub flipped_v: bool,
}

impl Default for Sprite {
    fn default() -> Self {
        Self::new("")
    }
}

impl Sprite {
    /// Single-frame sprite showing the whole texture
    pub fn new(texture_path: impl Into<String>) -> Self {
        Self {
            texture_path: texture_path.into(),
            hframes: 1,
            vframes: 1,
            frame: 0,
            flipped_h: false,
            flipped_v: false,
        }
    }

    pub fn hframes(&self) -> u32 {
        self.hframes
    }

    pub fn vframes(&self) -> u32 {
        self.vframes
    }

    /// Split the texture into a `hframes` x `vframes` grid
    pub fn set_frames(&mut self, hframes: u32, vframes: u32) -> SceneResult<()> {
        if hframes == 0 || vframes == 0 {
            return Err(SceneError::InvalidArgument(format!(
                "sprite frame grid must be at least 1x1, got {hframes}x{vframes}"
            )));
        }
        self.hframes = hframes;
        self.vframes = vframes;
        Ok(())
    }

    pub fn frame_count(&self) -> u32 {
        self.hframes.saturating_mul(self.vframes)
    }

    /// Source rectangle of the current frame inside a `width` x `height` texture
    pub fn frame_rect(&self, width: u32, height: u32) -> Rect {
        let w = width / self.hframes;
        let h = height / self.vframes;
        let frame = self.frame % self.frame_count().max(1);
        Rect {
            x: ((frame % self.hframes) * w) as i32,
            y: ((frame / self.hframes) * h) as i32,
            w,
            h,
        }
    }

    pub fn flip(&self) -> Flip {
        Flip {
            horizontal: self.flipped_h,
            vertical: self.flipped_v,
        }
    }
}
