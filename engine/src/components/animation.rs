//! Frame animation driving the sprite on the same node

use super::{slot, ComponentKind, Sprite};
use crate::core::entity::EntityStore;
use crate::error::{SceneError, SceneResult};
use hecs::Entity;
use std::collections::BTreeMap;
use tracing::trace;

/// Seconds a frame is shown when the script does not say otherwise
pub const DEFAULT_FRAME_DURATION: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationFrame {
    /// Sprite sheet frame index
    pub frame: u32,
    /// Seconds this frame stays up
    pub duration: f32,
}

impl AnimationFrame {
    pub fn new(frame: u32) -> Self {
        Self {
            frame,
            duration: DEFAULT_FRAME_DURATION,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Clip {
    frames: Vec<AnimationFrame>,
    looping: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Animation {
    clips: BTreeMap<String, Clip>,
    current: Option<String>,
    index: usize,
    timer: f32,
}

impl Animation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a named clip.
    ///
    /// Replacing the playing clip restarts it from its first frame.
    pub fn add_animation(
        &mut self,
        name: &str,
        frames: Vec<AnimationFrame>,
        looping: bool,
    ) -> SceneResult<()> {
        if frames.is_empty() {
            return Err(SceneError::InvalidArgument(format!(
                "animation '{name}' has no frames"
            )));
        }
        if let Some(bad) = frames.iter().find(|f| !(f.duration > 0.0)) {
            return Err(SceneError::InvalidArgument(format!(
                "animation '{name}' frame {} has non-positive duration {}",
                bad.frame, bad.duration
            )));
        }
        self.clips.insert(name.to_string(), Clip { frames, looping });
        if self.current.as_deref() == Some(name) {
            self.index = 0;
            self.timer = 0.0;
        }
        Ok(())
    }

    pub fn has_animation(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.clips.keys().map(String::as_str)
    }

    /// Name of the playing clip
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_playing(&self) -> bool {
        self.current.is_some()
    }

    /// Start a clip from its first frame, returning that frame.
    ///
    /// Playing the clip that is already running keeps its progress.
    pub fn play(&mut self, name: &str) -> SceneResult<u32> {
        let clip = self
            .clips
            .get(name)
            .ok_or_else(|| SceneError::NotFound(format!("animation '{name}'")))?;
        if self.current.as_deref() != Some(name) {
            self.current = Some(name.to_string());
            self.index = 0;
            self.timer = 0.0;
        }
        Ok(clip.frames[self.index].frame)
    }

    pub fn stop(&mut self) {
        self.current = None;
        self.index = 0;
        self.timer = 0.0;
    }

    /// Advance the playing clip by `delta` seconds and return the frame to show.
    ///
    /// A non-looping clip stops on its last frame.
    pub fn advance(&mut self, delta: f32) -> Option<u32> {
        let name = self.current.as_ref()?;
        let clip = self.clips.get(name)?;

        self.timer += delta.max(0.0);
        let mut finished = false;
        while self.timer >= clip.frames[self.index].duration {
            self.timer -= clip.frames[self.index].duration;
            if self.index + 1 < clip.frames.len() {
                self.index += 1;
            } else if clip.looping {
                self.index = 0;
            } else {
                finished = true;
                break;
            }
        }

        let frame = clip.frames[self.index].frame;
        trace!(animation = name.as_str(), index = self.index, frame, "Animation advanced");
        if finished {
            self.current = None;
            self.timer = 0.0;
        }
        Some(frame)
    }
}

/// Start `name` on an animation component and show its first frame on the
/// sprite attached to the same node
pub fn play_on(store: &mut EntityStore, component: Entity, name: &str) -> SceneResult<u32> {
    if !store.contains(component) {
        return Err(SceneError::StaleReference(component));
    }
    let frame = store
        .get_mut::<Animation>(component)
        .ok_or_else(|| SceneError::InvalidArgument(format!("{component:?} is not an animation")))?
        .play(name)?;
    if let Some(sprite) = slot::sibling(store, component, ComponentKind::Sprite) {
        if let Some(sprite) = store.get_mut::<Sprite>(sprite) {
            sprite.frame = frame;
        }
    }
    Ok(frame)
}

/// Advance the animation attached to `node` and push the frame to its sprite
pub fn advance_on(store: &mut EntityStore, node: Entity, delta: f32) {
    let Some(component) = slot::find::<Animation>(store, node) else {
        return;
    };
    let Some(frame) = store
        .get_mut::<Animation>(component)
        .and_then(|animation| animation.advance(delta))
    else {
        return;
    };
    if let Some(sprite) = slot::find::<Sprite>(store, node) {
        if let Some(sprite) = store.get_mut::<Sprite>(sprite) {
            sprite.frame = frame;
        }
    }
}
