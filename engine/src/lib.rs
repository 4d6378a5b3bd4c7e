//! Rogue Engine: a small 2D scene engine
//!
//! A tree of nodes with lazily propagated 2D transforms, components attached
//! one per kind, Rhai scripts driving nodes each frame, and a camera-relative
//! sprite renderer that draws through an external [`graphics::Blitter`].

pub mod app;
pub mod components;
pub mod config;
pub mod core;
pub mod error;
pub mod graphics;
pub mod input;
pub mod scene;
pub mod scripting;

// Re-export commonly used types
pub mod prelude {
    // Entity system types
    pub use crate::core::entity::{Entity, EntityStore, Name, NodeKind, SharedStore, Transform2D};

    // Components
    pub use crate::components::{
        Animation, AnimationFrame, Camera, Component, ComponentKind, InputMap, ScriptSet, Sprite,
    };

    // Math types
    pub use glam::Vec2;

    // Graphics types
    pub use crate::graphics::{Blitter, CameraRig, CameraView, Flip, Rect, Renderer2D, TextureId, TextureInfo};

    // Config types
    pub use crate::config::{AssetConfig, EngineConfig};

    // App types
    pub use crate::app::{AppError, EngineApp, EngineBuilder};

    // Scene and scripting types
    pub use crate::error::{SceneError, SceneResult};
    pub use crate::scene::SceneContext;
    pub use crate::scripting::ScriptEngine;

    // Input types
    pub use crate::input::{InputEvent, InputState, KeyState};

    pub use winit;
}

/// Default filter used when neither `RUST_LOG` nor a config filter is set
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Initialize logging for the engine
pub fn init_logging() {
    init_logging_with(None);
}

/// Initialize logging, falling back to `filter` when `RUST_LOG` is unset.
///
/// Calling it again after a subscriber is installed does nothing.
pub fn init_logging_with(filter: Option<&str>) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let fallback = filter.unwrap_or(DEFAULT_LOG_FILTER).to_string();
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
