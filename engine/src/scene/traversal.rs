//! Per-frame depth-first walks over the node tree.
//!
//! `process` visits children before the node's own hook; `process_input`
//! visits the node's hooks before its children. Hook errors are logged and
//! never stop the walk. The store lock is released before any hook runs.

use crate::components::animation;
use crate::core::entity::hierarchy::{children_of, node_kind};
use crate::core::entity::transform;
use crate::core::entity::{Entity, NodeKind};
use crate::input::InputEvent;
use crate::scripting::modules::input::event_to_map;
use crate::scripting::ScriptEngine;
use rhai::Dynamic;
use tracing::{error, trace, warn};

pub const PROCESS_HOOK: &str = "process";
pub const PROCESS_INPUT_HOOK: &str = "process_input";

/// Children snapshot of a live node, or `None` when the handle is stale
fn live_children(scripts: &ScriptEngine, node: Entity) -> Option<(NodeKind, Vec<Entity>)> {
    let store = scripts.store().read();
    let kind = node_kind(&store, node).ok()?;
    Some((kind, children_of(&store, node)))
}

/// Run one frame of `process` over the subtree rooted at `node`
pub fn process(scripts: &ScriptEngine, node: Entity, delta: f32) {
    let Some((kind, children)) = live_children(scripts, node) else {
        warn!(node = ?node, "Skipping process on stale node");
        return;
    };

    for child in children {
        process(scripts, child, delta);
    }

    // A child's hook may have destroyed this node.
    if !scripts.store().read().contains(node) {
        return;
    }

    trace!(node = ?node, delta, "Processing node");
    if let Err(e) = scripts.call_node_hook(node, PROCESS_HOOK, vec![Dynamic::from(delta as f64)]) {
        error!(node = ?node, error = %e, "process hook failed");
    }

    animation::advance_on(&mut scripts.store().write(), node, delta);

    for e in scripts.call_component_hooks(node, PROCESS_HOOK, vec![Dynamic::from(delta as f64)]) {
        error!(node = ?node, error = %e, "Script component process failed");
    }

    if kind.is_spatial() {
        let mut store = scripts.store().write();
        if store.contains(node) {
            if let Err(e) = transform::settle(&mut store, node) {
                warn!(node = ?node, error = %e, "Failed to settle transform");
            }
        }
    }
}

/// Deliver `event` to the subtree rooted at `node`
pub fn process_input(scripts: &ScriptEngine, node: Entity, event: &InputEvent) {
    if live_children(scripts, node).is_none() {
        warn!(node = ?node, "Skipping input on stale node");
        return;
    }

    let event_value = Dynamic::from(event_to_map(event));
    if let Err(e) = scripts.call_node_hook(node, PROCESS_INPUT_HOOK, vec![event_value.clone()]) {
        error!(node = ?node, error = %e, "process_input hook failed");
    }
    for e in scripts.call_component_hooks(node, PROCESS_INPUT_HOOK, vec![event_value]) {
        error!(node = ?node, error = %e, "Script component process_input failed");
    }

    // Re-read: the hooks may have added or removed children.
    let Some((_, children)) = live_children(scripts, node) else {
        return;
    };
    for child in children {
        process_input(scripts, child, event);
    }
}
