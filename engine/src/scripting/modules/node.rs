//! Node API for Rhai scripts

use super::components::ComponentRef;
use super::{script_error, ScriptEnv, ScriptResult};
use crate::components::{slot, ComponentKind};
use crate::core::entity::hierarchy::{self, node_kind};
use crate::core::entity::transform;
use crate::core::entity::{entity_to_id, EntityStore, Name, NodeKind, SharedStore};
use crate::error::{SceneError, SceneResult};
use crate::scripting::script::ScriptVars;
use crate::scripting::system;
use glam::Vec2;
use hecs::Entity;
use rhai::{Array, Dynamic, Engine, Map, NativeCallContext};
use tracing::{debug, warn};

/// Script-side handle to a scene node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef(pub Entity);

fn with_store<T>(
    store: &SharedStore,
    f: impl FnOnce(&mut EntityStore) -> SceneResult<T>,
) -> ScriptResult<T> {
    f(&mut store.write()).map_err(script_error)
}

fn component_of(store: &SharedStore, node: Entity, kind: ComponentKind) -> ScriptResult<Dynamic> {
    with_store(store, |s| {
        node_kind(s, node)?;
        Ok(slot::get(s, node, kind)
            .map(|c| Dynamic::from(ComponentRef(c)))
            .unwrap_or(Dynamic::UNIT))
    })
}

fn parse_kind(name: &str) -> ScriptResult<ComponentKind> {
    ComponentKind::parse(name).ok_or_else(|| {
        script_error(SceneError::InvalidArgument(format!(
            "unknown component kind '{name}'"
        )))
    })
}

/// Register node API with Rhai engine
pub fn register_node_api(engine: &mut Engine, env: &ScriptEnv) {
    debug!("Registering node API");

    engine.register_type_with_name::<NodeRef>("Node");
    register_constructors(engine, env);
    register_structure(engine, env);
    register_components(engine, env);
    register_positions(engine, env);

    // `this.vars.x = 1` goes through the getter, then writes back via the setter
    let store = env.store.clone();
    engine.register_get("vars", move |node: &mut NodeRef| {
        with_store(&store, |s| {
            node_kind(s, node.0)?;
            Ok(s.get::<ScriptVars>(node.0)
                .map(|vars| vars.0.clone())
                .unwrap_or_default())
        })
    });
    let store = env.store.clone();
    engine.register_set("vars", move |node: &mut NodeRef, vars: Map| {
        with_store(&store, |s| {
            node_kind(s, node.0)?;
            s.insert_one(node.0, ScriptVars(vars))
                .map_err(|_| SceneError::StaleReference(node.0))
        })
    });

    let script_env = env.clone();
    engine.register_fn(
        "set_script",
        move |ctx: NativeCallContext, node: &mut NodeRef, name: &str| {
            system::set_script(ctx.engine(), &script_env, node.0, name).map_err(script_error)
        },
    );
}

fn register_constructors(engine: &mut Engine, env: &ScriptEnv) {
    let store = env.store.clone();
    engine.register_fn("Node", move || {
        NodeRef(hierarchy::create_node(&mut store.write(), NodeKind::Generic))
    });
    let store = env.store.clone();
    engine.register_fn("Node2D", move || {
        NodeRef(hierarchy::create_node(&mut store.write(), NodeKind::Spatial2D))
    });
    let store = env.store.clone();
    engine.register_fn("Node2D", move |x: f64, y: f64| {
        with_store(&store, |s| {
            let node = hierarchy::create_node(s, NodeKind::Spatial2D);
            transform::set_local_position(s, node, Vec2::new(x as f32, y as f32))?;
            Ok(NodeRef(node))
        })
    });
    let store = env.store.clone();
    engine.register_fn("Node2D", move |x: i64, y: i64| {
        with_store(&store, |s| {
            let node = hierarchy::create_node(s, NodeKind::Spatial2D);
            transform::set_local_position(s, node, Vec2::new(x as f32, y as f32))?;
            Ok(NodeRef(node))
        })
    });
}

fn register_structure(engine: &mut Engine, env: &ScriptEnv) {
    engine
        .register_get("id", |node: &mut NodeRef| entity_to_id(node.0))
        .register_fn("==", |a: &mut NodeRef, b: NodeRef| *a == b)
        .register_fn("!=", |a: &mut NodeRef, b: NodeRef| *a != b)
        .register_fn("to_string", |node: &mut NodeRef| format!("Node({:?})", node.0))
        .register_fn("to_debug", |node: &mut NodeRef| format!("Node({:?})", node.0));

    let store = env.store.clone();
    engine.register_get("is_valid", move |node: &mut NodeRef| {
        node_kind(&store.read(), node.0).is_ok()
    });
    let store = env.store.clone();
    engine.register_get("kind", move |node: &mut NodeRef| {
        with_store(&store, |s| Ok(node_kind(s, node.0)?.as_str().to_string()))
    });
    let store = env.store.clone();
    engine.register_get("is_spatial", move |node: &mut NodeRef| {
        with_store(&store, |s| Ok(node_kind(s, node.0)?.is_spatial()))
    });

    let store = env.store.clone();
    engine.register_get("name", move |node: &mut NodeRef| {
        with_store(&store, |s| {
            node_kind(s, node.0)?;
            Ok(s.get::<Name>(node.0).map(|n| n.0.clone()).unwrap_or_default())
        })
    });
    let store = env.store.clone();
    engine.register_set("name", move |node: &mut NodeRef, name: &str| {
        with_store(&store, |s| {
            node_kind(s, node.0)?;
            s.insert_one(node.0, Name::new(name))
                .map_err(|_| SceneError::StaleReference(node.0))
        })
    });

    let store = env.store.clone();
    engine.register_fn("parent", move |node: &mut NodeRef| {
        with_store(&store, |s| {
            node_kind(s, node.0)?;
            Ok(hierarchy::parent_of(s, node.0)
                .filter(|p| s.contains(*p))
                .map(|p| Dynamic::from(NodeRef(p)))
                .unwrap_or(Dynamic::UNIT))
        })
    });
    let store = env.store.clone();
    engine.register_fn("children", move |node: &mut NodeRef| {
        with_store(&store, |s| {
            node_kind(s, node.0)?;
            Ok(hierarchy::children_of(s, node.0)
                .into_iter()
                .map(|c| Dynamic::from(NodeRef(c)))
                .collect::<Array>())
        })
    });

    let store = env.store.clone();
    engine.register_fn("add_child", move |node: &mut NodeRef, child: NodeRef| {
        match hierarchy::add_child(&mut store.write(), node.0, child.0) {
            Ok(()) => true,
            Err(e) => {
                warn!(parent = ?node.0, child = ?child.0, error = %e, "add_child failed");
                false
            }
        }
    });
    let store = env.store.clone();
    engine.register_fn("remove_child", move |node: &mut NodeRef, child: NodeRef| {
        with_store(&store, |s| {
            node_kind(s, node.0)?;
            if hierarchy::parent_of(s, child.0) != Some(node.0) {
                return Ok(false);
            }
            hierarchy::detach_from_parent(s, child.0)?;
            Ok(true)
        })
    });
    let store = env.store.clone();
    engine.register_fn("detach", move |node: &mut NodeRef| {
        with_store(&store, |s| hierarchy::detach_from_parent(s, node.0).map(|_| ()))
    });
    let store = env.store.clone();
    engine.register_fn("destroy", move |node: &mut NodeRef| {
        with_store(&store, |s| hierarchy::destroy_node(s, node.0))
    });
}

fn register_components(engine: &mut Engine, env: &ScriptEnv) {
    let store = env.store.clone();
    engine.register_fn("add_component", move |node: &mut NodeRef, component: ComponentRef| {
        match slot::attach(&mut store.write(), node.0, component.0) {
            Ok(()) => true,
            Err(e) => {
                warn!(node = ?node.0, component = ?component.0, error = %e, "add_component failed");
                false
            }
        }
    });
    let store = env.store.clone();
    engine.register_fn("get_component", move |node: &mut NodeRef, kind: &str| {
        component_of(&store, node.0, parse_kind(kind)?)
    });
    let store = env.store.clone();
    engine.register_fn("has_component", move |node: &mut NodeRef, kind: &str| {
        let kind = parse_kind(kind)?;
        with_store(&store, |s| {
            node_kind(s, node.0)?;
            Ok(slot::kinds(s, node.0).contains(&kind))
        })
    });
    let store = env.store.clone();
    engine.register_fn("remove_component", move |node: &mut NodeRef, kind: &str| {
        let kind = parse_kind(kind)?;
        with_store(&store, |s| match slot::detach(s, node.0, kind) {
            Ok(component) => Ok(Dynamic::from(ComponentRef(component))),
            Err(SceneError::NotFound(_)) => Ok(Dynamic::UNIT),
            Err(e) => Err(e),
        })
    });

    for kind in ComponentKind::ALL {
        let store = env.store.clone();
        let getter = match kind {
            ComponentKind::Sprite => "sprite",
            ComponentKind::Input => "input",
            ComponentKind::Script => "scripts",
            ComponentKind::Camera => "camera",
            ComponentKind::Animation => "animation",
        };
        engine.register_get(getter, move |node: &mut NodeRef| {
            component_of(&store, node.0, kind)
        });
    }
}

fn register_positions(engine: &mut Engine, env: &ScriptEnv) {
    let store = env.store.clone();
    engine.register_get("position", move |node: &mut NodeRef| {
        with_store(&store, |s| transform::local_position(s, node.0))
    });
    let store = env.store.clone();
    engine.register_set("position", move |node: &mut NodeRef, p: Vec2| {
        with_store(&store, |s| transform::set_local_position(s, node.0, p))
    });
    let store = env.store.clone();
    engine.register_get("global_position", move |node: &mut NodeRef| {
        with_store(&store, |s| transform::global_position(s, node.0))
    });
    let store = env.store.clone();
    engine.register_set("global_position", move |node: &mut NodeRef, p: Vec2| {
        with_store(&store, |s| transform::set_global_position(s, node.0, p))
    });

    let store = env.store.clone();
    engine.register_fn("get_position", move |node: &mut NodeRef| {
        with_store(&store, |s| transform::local_position(s, node.0))
    });
    let store = env.store.clone();
    engine.register_fn("get_global_position", move |node: &mut NodeRef| {
        with_store(&store, |s| transform::global_position(s, node.0))
    });

    let store = env.store.clone();
    engine.register_fn("set_position", move |node: &mut NodeRef, p: Vec2| {
        with_store(&store, |s| transform::set_local_position(s, node.0, p))
    });
    let store = env.store.clone();
    engine.register_fn("set_position", move |node: &mut NodeRef, x: f64, y: f64| {
        with_store(&store, |s| {
            transform::set_local_position(s, node.0, Vec2::new(x as f32, y as f32))
        })
    });
    let store = env.store.clone();
    engine.register_fn("set_position", move |node: &mut NodeRef, x: i64, y: i64| {
        with_store(&store, |s| {
            transform::set_local_position(s, node.0, Vec2::new(x as f32, y as f32))
        })
    });

    let store = env.store.clone();
    engine.register_fn("set_global_position", move |node: &mut NodeRef, p: Vec2| {
        with_store(&store, |s| transform::set_global_position(s, node.0, p))
    });
    let store = env.store.clone();
    engine.register_fn("set_global_position", move |node: &mut NodeRef, x: f64, y: f64| {
        with_store(&store, |s| {
            transform::set_global_position(s, node.0, Vec2::new(x as f32, y as f32))
        })
    });
    let store = env.store.clone();
    engine.register_fn("set_global_position", move |node: &mut NodeRef, x: i64, y: i64| {
        with_store(&store, |s| {
            transform::set_global_position(s, node.0, Vec2::new(x as f32, y as f32))
        })
    });

    let store = env.store.clone();
    engine.register_fn("translate", move |node: &mut NodeRef, x: f64, y: f64| {
        with_store(&store, |s| {
            let local = transform::local_position(s, node.0)?;
            transform::set_local_position(s, node.0, local + Vec2::new(x as f32, y as f32))
        })
    });
}
