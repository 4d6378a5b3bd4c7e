//! Rhai engine wrapper with script caching

use crate::config::AssetConfig;
use crate::core::entity::SharedStore;
use crate::error::{SceneError, SceneResult};
use crate::input::{KeyResolver, SharedInputState, WinitKeyNames};
use crate::scripting::modules::{self, ScriptEnv};
use crate::scripting::script::has_function;
use crate::scripting::system;
use hecs::Entity;
use rhai::{CallFnOptions, Dynamic, Engine, EvalAltResult, Position, Scope, AST};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

/// Compiles scripts by name and caches the result
pub struct ScriptLoader {
    asset_config: AssetConfig,
    cache: RwLock<HashMap<String, Arc<AST>>>,
}

impl ScriptLoader {
    pub fn new(asset_config: AssetConfig) -> Self {
        Self {
            asset_config,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn asset_config(&self) -> &AssetConfig {
        &self.asset_config
    }

    /// Compiled script for `name`, compiling it on first use
    pub fn load(&self, engine: &Engine, name: &str) -> SceneResult<Arc<AST>> {
        if let Some(ast) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            debug!(script_name = name, "Script already cached");
            return Ok(Arc::clone(ast));
        }
        self.reload(engine, name)
    }

    /// Compile `name` from disk, replacing any cached version
    pub fn reload(&self, engine: &Engine, name: &str) -> SceneResult<Arc<AST>> {
        let path = self.asset_config.script_path(name)?;
        debug!(script_name = name, path = ?path, "Loading script");

        let source = std::fs::read_to_string(&path).map_err(|e| {
            SceneError::script(name, format!("failed to read script file {path:?}: {e}"))
        })?;
        let ast = Arc::new(compile_source(engine, name, &path, &source)?);

        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), Arc::clone(&ast));
        Ok(ast)
    }

    /// Check if a script is loaded in the cache
    pub fn is_loaded(&self, name: &str) -> bool {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Get the number of cached scripts
    pub fn cache_size(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Clear the script cache
    pub fn clear_cache(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

fn compile_source(engine: &Engine, name: &str, path: &Path, source: &str) -> SceneResult<AST> {
    engine.compile(source).map_err(|e| {
        let position = e.position();
        SceneError::script(
            name,
            format!(
                "{}:{}:{} - {}",
                path.display(),
                position.line().unwrap_or(0),
                position.position().unwrap_or(0),
                e
            ),
        )
    })
}

/// Render a runtime error with its script position
pub(crate) fn describe_error(script: &str, err: &EvalAltResult) -> String {
    let position = err.position();
    if position == Position::NONE {
        return format!("{script} - {err}");
    }
    format!(
        "{}:{}:{} - {}",
        script,
        position.line().unwrap_or(0),
        position.position().unwrap_or(0),
        err
    )
}

/// Run a script's top level with `bindings` as variables in its scope.
pub(crate) fn run_top_level(
    engine: &Engine,
    script: &str,
    ast: &AST,
    bindings: Vec<(&'static str, Dynamic)>,
) -> SceneResult<()> {
    let mut scope = Scope::new();
    for (name, value) in bindings {
        scope.push_dynamic(name, value);
    }
    engine
        .run_ast_with_scope(&mut scope, ast)
        .map_err(|e| SceneError::script(script, describe_error(script, &e)))
}

/// Call `function` from `ast` if it is defined with a matching arity.
///
/// `this` is bound to `this_value` when given. Returns whether the function
/// existed. The top level of the script is not re-run.
pub(crate) fn call_function(
    engine: &Engine,
    script: &str,
    ast: &AST,
    function: &str,
    this_value: Option<Dynamic>,
    args: Vec<Dynamic>,
) -> SceneResult<bool> {
    if !has_function(ast, function, args.len()) {
        return Ok(false);
    }

    let mut this_value = this_value;
    let mut options = CallFnOptions::new().eval_ast(false).rewind_scope(true);
    if let Some(value) = this_value.as_mut() {
        options = options.bind_this_ptr(value);
    }
    engine
        .call_fn_with_options::<Dynamic>(options, &mut Scope::new(), ast, function, args)
        .map_err(|e| SceneError::script(script, describe_error(script, &e)))?;
    Ok(true)
}

/// Script engine bound to one scene store
pub struct ScriptEngine {
    /// The Rhai engine instance
    engine: Arc<Engine>,
    env: ScriptEnv,
}

impl ScriptEngine {
    /// Script engine using the default key names
    pub fn new(store: SharedStore, input: SharedInputState, asset_config: AssetConfig) -> Self {
        Self::with_keys(store, input, Arc::new(WinitKeyNames), asset_config)
    }

    /// Script engine with a custom key name resolver
    pub fn with_keys(
        store: SharedStore,
        input: SharedInputState,
        keys: Arc<dyn KeyResolver>,
        asset_config: AssetConfig,
    ) -> Self {
        let mut engine = Engine::new();

        // Configure engine for safety
        engine.set_max_expr_depths(100, 100);
        engine.set_max_call_levels(50);
        engine.set_max_operations(1_000_000);
        engine.set_max_string_size(10_000);
        engine.set_max_array_size(10_000);
        engine.set_max_map_size(1_000);

        // Disable certain features for safety
        engine.disable_symbol("eval");

        engine.on_print(|text| info!(target: "script", "{text}"));
        engine.on_debug(|text, source, pos| {
            debug!(target: "script", source = source.unwrap_or(""), position = %pos, "{text}")
        });

        let env = ScriptEnv {
            store,
            input,
            keys,
            loader: Arc::new(ScriptLoader::new(asset_config)),
        };
        modules::register_all(&mut engine, &env);

        Self {
            engine: Arc::new(engine),
            env,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn loader(&self) -> &ScriptLoader {
        &self.env.loader
    }

    pub fn store(&self) -> &SharedStore {
        &self.env.store
    }

    /// Load `name`, run its top level with `node` in scope and make it the
    /// node's hook script
    pub fn set_script(&self, node: Entity, name: &str) -> SceneResult<()> {
        system::set_script(&self.engine, &self.env, node, name)
    }

    /// Load `name` into the script component `component`
    pub fn add_component_script(&self, component: Entity, name: &str) -> SceneResult<()> {
        system::add_component_script(&self.engine, &self.env, component, name)
    }

    /// Invoke a hook on the node's own script; absent hooks are a no-op
    pub fn call_node_hook(&self, node: Entity, hook: &str, args: Vec<Dynamic>) -> SceneResult<bool> {
        system::call_node_hook(&self.engine, &self.env, node, hook, args)
    }

    /// Invoke a hook on every script of the node's script component
    pub fn call_component_hooks(
        &self,
        node: Entity,
        hook: &str,
        args: Vec<Dynamic>,
    ) -> Vec<SceneError> {
        system::call_component_hooks(&self.engine, &self.env, node, hook, args)
    }

    /// Recompile `name` and swap it into every node using it
    pub fn reload_script(&self, name: &str) -> SceneResult<usize> {
        system::reload_script(&self.engine, &self.env, name)
    }

    /// Run a snippet of script code against the scene, with no node bound
    pub fn run(&self, code: &str) -> SceneResult<()> {
        let ast = self
            .engine
            .compile(code)
            .map_err(|e| SceneError::script("<inline>", e))?;
        run_top_level(&self.engine, "<inline>", &ast, Vec::new())
    }

    /// Evaluate an expression against the scene
    pub fn eval<T: Clone + Send + Sync + 'static>(&self, code: &str) -> SceneResult<T> {
        self.engine
            .eval::<T>(code)
            .map_err(|e| SceneError::script("<inline>", describe_error("<inline>", &e)))
    }
}
