//! Graphics module
//!
//! Camera tracking and the sprite projection that feeds an external
//! [`Blitter`].

pub mod camera_rig;
pub mod renderer;

pub use camera_rig::{CameraRig, CameraView, RigState};
pub use renderer::{Blitter, Flip, Rect, Renderer2D, TextureId, TextureInfo};
