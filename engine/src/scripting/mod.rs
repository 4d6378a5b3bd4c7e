//! Scripting system using Rhai
//!
//! A node can carry one hook script ([`ScriptHook`]) whose functions are
//! called with `this` bound to the node: `process(delta)` every frame and
//! `process_input(event)` for each key event. A script component
//! ([`crate::components::ScriptSet`]) adds further scripts called the same
//! way. Scripts whose hook is missing are skipped.

pub mod engine;
pub mod hot_reload;
pub mod modules;
pub mod script;
pub mod system;

pub use engine::{ScriptEngine, ScriptLoader};
pub use hot_reload::ScriptWatcher;
pub use modules::{ComponentRef, NodeRef, ScriptEnv};
pub use script::{ScriptHook, ScriptVars};

// Re-export commonly used types
pub use rhai::{Dynamic, EvalAltResult, Map};
