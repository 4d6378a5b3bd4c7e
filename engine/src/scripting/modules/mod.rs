//! Rhai bindings exposing the scene to scripts.
//!
//! Script values only carry entity handles. Every binding re-resolves its
//! handle through the shared store and raises a script error when the entity
//! is gone.

pub mod components;
pub mod input;
pub mod math;
pub mod node;

use crate::core::entity::SharedStore;
use crate::error::SceneError;
use crate::input::{KeyResolver, SharedInputState};
use crate::scripting::engine::ScriptLoader;
use rhai::{Engine, EvalAltResult};
use std::sync::Arc;
use tracing::debug;

pub use components::ComponentRef;
pub use node::NodeRef;

/// Everything the bindings need, captured by each registered closure
#[derive(Clone)]
pub struct ScriptEnv {
    pub store: SharedStore,
    pub input: SharedInputState,
    pub keys: Arc<dyn KeyResolver>,
    pub loader: Arc<ScriptLoader>,
}

/// Register all modules with the Rhai engine
pub fn register_all(engine: &mut Engine, env: &ScriptEnv) {
    debug!("Registering scripting modules");

    math::register_math_types(engine);
    node::register_node_api(engine, env);
    components::register_component_api(engine, env);
    input::register_input_api(engine, env);

    debug!("All scripting modules registered");
}

/// Convert a scene error into a script runtime error
pub(crate) fn script_error(err: SceneError) -> Box<EvalAltResult> {
    err.to_string().into()
}

pub(crate) type ScriptResult<T> = Result<T, Box<EvalAltResult>>;
