//! Script execution: attaching scripts to nodes and invoking their hooks.
//!
//! None of these functions hold the store lock while script code runs, so
//! bindings called from a hook can take it themselves.

use crate::components::{slot, ScriptSet};
use crate::core::entity::hierarchy::node_kind;
use crate::error::{SceneError, SceneResult};
use crate::scripting::engine::{call_function, run_top_level};
use crate::scripting::modules::{ComponentRef, NodeRef, ScriptEnv};
use crate::scripting::script::ScriptHook;
use hecs::Entity;
use rhai::{Dynamic, Engine, AST};
use std::sync::Arc;
use tracing::{debug, trace};

/// Make `name` the hook script of `node`.
///
/// The script's top level runs first with `node` bound; if it fails the
/// node keeps its previous script.
pub fn set_script(engine: &Engine, env: &ScriptEnv, node: Entity, name: &str) -> SceneResult<()> {
    node_kind(&env.store.read(), node)?;
    let ast = env.loader.load(engine, name)?;

    run_top_level(engine, name, &ast, vec![("node", Dynamic::from(NodeRef(node)))])?;

    env.store
        .write()
        .insert_one(node, ScriptHook::new(name, ast))
        .map_err(|_| SceneError::StaleReference(node))?;
    debug!(node = ?node, script = name, "Script attached to node");
    Ok(())
}

/// Load `name` into a script component. Its top level runs with
/// `component` bound, and `node` too when the component is attached.
pub fn add_component_script(
    engine: &Engine,
    env: &ScriptEnv,
    component: Entity,
    name: &str,
) -> SceneResult<()> {
    let owner = {
        let store = env.store.read();
        if !store.contains(component) {
            return Err(SceneError::StaleReference(component));
        }
        if !store.has::<ScriptSet>(component) {
            return Err(SceneError::InvalidArgument(format!(
                "{component:?} is not a script component"
            )));
        }
        slot::owner_of(&store, component)
    };
    let ast = env.loader.load(engine, name)?;

    let mut bindings = vec![("component", Dynamic::from(ComponentRef(component)))];
    if let Some(owner) = owner {
        bindings.push(("node", Dynamic::from(NodeRef(owner))));
    }
    run_top_level(engine, name, &ast, bindings)?;

    let mut store = env.store.write();
    let set = store
        .get_mut::<ScriptSet>(component)
        .ok_or(SceneError::StaleReference(component))?;
    set.insert(name, ast);
    debug!(component = ?component, script = name, "Script added to component");
    Ok(())
}

/// Call `hook` on the node's own script. Returns whether it ran.
pub fn call_node_hook(
    engine: &Engine,
    env: &ScriptEnv,
    node: Entity,
    hook: &str,
    args: Vec<Dynamic>,
) -> SceneResult<bool> {
    let attached = env
        .store
        .read()
        .get::<ScriptHook>(node)
        .ok()
        .map(|h| (h.name.clone(), Arc::clone(&h.ast)));
    let Some((script, ast)) = attached else {
        return Ok(false);
    };

    trace!(node = ?node, script = script.as_str(), hook, "Calling node hook");
    call_function(engine, &script, &ast, hook, Some(Dynamic::from(NodeRef(node))), args)
}

/// Call `hook` on each script of the node's script component, in name
/// order. One failing script does not stop the others.
pub fn call_component_hooks(
    engine: &Engine,
    env: &ScriptEnv,
    node: Entity,
    hook: &str,
    args: Vec<Dynamic>,
) -> Vec<SceneError> {
    let scripts: Vec<(String, Arc<AST>)> = {
        let store = env.store.read();
        slot::find::<ScriptSet>(&store, node)
            .and_then(|component| store.get::<ScriptSet>(component).ok().map(|set| set.entries()))
            .unwrap_or_default()
    };

    let mut errors = Vec::new();
    for (script, ast) in scripts {
        let this = Some(Dynamic::from(NodeRef(node)));
        if let Err(e) = call_function(engine, &script, &ast, hook, this, args.clone()) {
            errors.push(e);
        }
    }
    errors
}

/// Recompile `name` and swap it into every hook and script component using
/// it. Top levels are not re-run. Returns how many attachments were updated.
pub fn reload_script(engine: &Engine, env: &ScriptEnv, name: &str) -> SceneResult<usize> {
    let ast = env.loader.reload(engine, name)?;

    let mut store = env.store.write();
    let mut swapped = 0;
    for (_, hook) in store.query_mut::<&mut ScriptHook>() {
        if hook.name == name {
            hook.ast = Arc::clone(&ast);
            swapped += 1;
        }
    }
    for (_, set) in store.query_mut::<&mut ScriptSet>() {
        if set.replace(name, Arc::clone(&ast)) {
            swapped += 1;
        }
    }
    debug!(script = name, swapped, "Reloaded script");
    Ok(swapped)
}
