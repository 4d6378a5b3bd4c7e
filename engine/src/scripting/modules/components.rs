//! Component API for Rhai scripts: constructors and per-kind accessors

use super::input::event_from_map;
use super::node::NodeRef;
use super::{script_error, ScriptEnv, ScriptResult};
use crate::components::animation::{self, AnimationFrame, DEFAULT_FRAME_DURATION};
use crate::components::camera::{self, Camera};
use crate::components::{
    component_kind, slot, spawn_component, Animation, Component, ComponentData, InputMap,
    ScriptSet, Sprite,
};
use crate::core::entity::{entity_to_id, SharedStore};
use crate::error::SceneError;
use crate::scripting::system;
use hecs::Entity;
use rhai::{Array, Dynamic, Engine, Map, NativeCallContext};
use std::sync::PoisonError;
use tracing::debug;

/// Script-side handle to a component instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentRef(pub Entity);

/// Run `f` against the component's payload, failing if the handle is stale
/// or points at another kind
fn with_payload<T: ComponentData, R>(
    store: &SharedStore,
    component: &ComponentRef,
    f: impl FnOnce(&mut T) -> Result<R, SceneError>,
) -> ScriptResult<R> {
    let mut store = store.write();
    if !store.contains(component.0) {
        return Err(script_error(SceneError::StaleReference(component.0)));
    }
    let payload = store.get_mut::<T>(component.0).ok_or_else(|| {
        script_error(SceneError::InvalidArgument(format!(
            "component is not a {}",
            T::KIND
        )))
    })?;
    f(payload).map_err(script_error)
}

fn spawn(store: &SharedStore, component: Component) -> ComponentRef {
    ComponentRef(spawn_component(&mut store.write(), component))
}

fn number(value: &Dynamic) -> Option<f64> {
    value
        .as_float()
        .ok()
        .or_else(|| value.as_int().ok().map(|i| i as f64))
}

/// Accepts `3` or `#{ frame: 3, duration: 0.2 }`
fn parse_frame(value: &Dynamic) -> Result<AnimationFrame, SceneError> {
    if let Ok(frame) = value.as_int() {
        return Ok(AnimationFrame::new(frame.max(0) as u32));
    }
    if let Some(map) = value.read_lock::<Map>() {
        let frame = map
            .get("frame")
            .and_then(|f| f.as_int().ok())
            .ok_or_else(|| SceneError::InvalidArgument("animation frame needs a 'frame' index".into()))?;
        let duration = map
            .get("duration")
            .and_then(number)
            .unwrap_or(DEFAULT_FRAME_DURATION as f64);
        return Ok(AnimationFrame {
            frame: frame.max(0) as u32,
            duration: duration as f32,
        });
    }
    Err(SceneError::InvalidArgument(format!(
        "animation frames must be integers or maps, got {}",
        value.type_name()
    )))
}

/// Register component API with Rhai engine
pub fn register_component_api(engine: &mut Engine, env: &ScriptEnv) {
    debug!("Registering component API");

    engine.register_type_with_name::<ComponentRef>("Component");
    register_common(engine, env);
    register_camera(engine, env);
    register_sprite(engine, env);
    register_input(engine, env);
    register_scripts(engine, env);
    register_animation(engine, env);
}

fn register_common(engine: &mut Engine, env: &ScriptEnv) {
    engine
        .register_get("id", |c: &mut ComponentRef| entity_to_id(c.0))
        .register_fn("==", |a: &mut ComponentRef, b: ComponentRef| *a == b)
        .register_fn("!=", |a: &mut ComponentRef, b: ComponentRef| *a != b)
        .register_fn("to_string", |c: &mut ComponentRef| format!("Component({:?})", c.0))
        .register_fn("to_debug", |c: &mut ComponentRef| format!("Component({:?})", c.0));

    let store = env.store.clone();
    engine.register_get("kind", move |c: &mut ComponentRef| {
        component_kind(&store.read(), c.0)
            .map(|kind| kind.as_str().to_string())
            .ok_or_else(|| script_error(SceneError::StaleReference(c.0)))
    });
    let store = env.store.clone();
    engine.register_get("is_valid", move |c: &mut ComponentRef| {
        component_kind(&store.read(), c.0).is_some()
    });
    let store = env.store.clone();
    engine.register_fn("owner", move |c: &mut ComponentRef| {
        slot::owner_of(&store.read(), c.0)
            .map(|owner| Dynamic::from(NodeRef(owner)))
            .unwrap_or(Dynamic::UNIT)
    });
}

fn register_camera(engine: &mut Engine, env: &ScriptEnv) {
    let store = env.store.clone();
    engine.register_fn("Camera", move || spawn(&store, Component::Camera(Camera::new(false))));
    let store = env.store.clone();
    engine.register_fn("Camera", move |current: bool| {
        spawn(&store, Component::Camera(Camera::new(current)))
    });

    // `current` is shared with animations: the playing clip name
    let store = env.store.clone();
    engine.register_get("current", move |c: &mut ComponentRef| {
        let guard = store.read();
        if guard.has::<Camera>(c.0) {
            return Ok(Dynamic::from(camera::is_current_or_pending(&guard, c.0)));
        }
        if let Ok(anim) = guard.get::<Animation>(c.0) {
            return Ok(anim
                .current()
                .map(|name| Dynamic::from(name.to_string()))
                .unwrap_or(Dynamic::UNIT));
        }
        Err(script_error(SceneError::InvalidArgument(
            "component has no 'current' property".into(),
        )))
    });
    let store = env.store.clone();
    engine.register_fn("set_current", move |c: &mut ComponentRef| {
        camera::set_current(&mut store.write(), c.0, true).map_err(script_error)
    });
    let store = env.store.clone();
    engine.register_fn("set_current", move |c: &mut ComponentRef, current: bool| {
        camera::set_current(&mut store.write(), c.0, current).map_err(script_error)
    });
    let store = env.store.clone();
    engine.register_set("current", move |c: &mut ComponentRef, current: bool| {
        camera::set_current(&mut store.write(), c.0, current).map_err(script_error)
    });

    let store = env.store.clone();
    engine.register_get("centered", move |c: &mut ComponentRef| {
        with_payload::<Camera, _>(&store, c, |cam| Ok(cam.centered()))
    });
    let store = env.store.clone();
    engine.register_set("centered", move |c: &mut ComponentRef, centered: bool| {
        with_payload::<Camera, _>(&store, c, |cam| {
            cam.set_centered(centered);
            Ok(())
        })
    });
    let store = env.store.clone();
    engine.register_fn("set_centered", move |c: &mut ComponentRef, centered: bool| {
        with_payload::<Camera, _>(&store, c, |cam| {
            cam.set_centered(centered);
            Ok(())
        })
    });

    let store = env.store.clone();
    engine.register_get("smoothing", move |c: &mut ComponentRef| {
        with_payload::<Camera, _>(&store, c, |cam| Ok(cam.smoothing() as f64))
    });
    let store = env.store.clone();
    engine.register_set("smoothing", move |c: &mut ComponentRef, value: f64| {
        with_payload::<Camera, _>(&store, c, |cam| cam.set_smoothing(value as f32))
    });
    let store = env.store.clone();
    engine.register_set("smoothing", move |c: &mut ComponentRef, value: i64| {
        with_payload::<Camera, _>(&store, c, |cam| cam.set_smoothing(value as f32))
    });
    let store = env.store.clone();
    engine.register_fn("set_smoothing", move |c: &mut ComponentRef, value: f64| {
        with_payload::<Camera, _>(&store, c, |cam| cam.set_smoothing(value as f32))
    });
    let store = env.store.clone();
    engine.register_fn("set_smoothing", move |c: &mut ComponentRef, value: i64| {
        with_payload::<Camera, _>(&store, c, |cam| cam.set_smoothing(value as f32))
    });

    let store = env.store.clone();
    engine.register_get("zoom", move |c: &mut ComponentRef| {
        with_payload::<Camera, _>(&store, c, |cam| Ok(cam.zoom() as f64))
    });
    let store = env.store.clone();
    engine.register_set("zoom", move |c: &mut ComponentRef, zoom: f64| {
        with_payload::<Camera, _>(&store, c, |cam| cam.set_zoom(zoom as f32))
    });
    let store = env.store.clone();
    engine.register_set("zoom", move |c: &mut ComponentRef, zoom: i64| {
        with_payload::<Camera, _>(&store, c, |cam| cam.set_zoom(zoom as f32))
    });
    let store = env.store.clone();
    engine.register_fn("set_zoom", move |c: &mut ComponentRef, zoom: f64| {
        with_payload::<Camera, _>(&store, c, |cam| cam.set_zoom(zoom as f32))
    });
    let store = env.store.clone();
    engine.register_fn("set_zoom", move |c: &mut ComponentRef, zoom: i64| {
        with_payload::<Camera, _>(&store, c, |cam| cam.set_zoom(zoom as f32))
    });
}

fn register_sprite(engine: &mut Engine, env: &ScriptEnv) {
    let store = env.store.clone();
    engine.register_fn("Sprite", move || spawn(&store, Component::Sprite(Sprite::default())));
    let store = env.store.clone();
    engine.register_fn("Sprite", move |path: &str| {
        spawn(&store, Component::Sprite(Sprite::new(path)))
    });

    let store = env.store.clone();
    engine.register_get("texture", move |c: &mut ComponentRef| {
        with_payload::<Sprite, _>(&store, c, |s| Ok(s.texture_path.clone()))
    });
    let store = env.store.clone();
    engine.register_set("texture", move |c: &mut ComponentRef, path: &str| {
        with_payload::<Sprite, _>(&store, c, |s| {
            s.texture_path = path.to_string();
            Ok(())
        })
    });
    let store = env.store.clone();
    engine.register_fn("set_texture", move |c: &mut ComponentRef, path: &str| {
        with_payload::<Sprite, _>(&store, c, |s| {
            s.texture_path = path.to_string();
            Ok(())
        })
    });

    let store = env.store.clone();
    engine.register_get("hframes", move |c: &mut ComponentRef| {
        with_payload::<Sprite, _>(&store, c, |s| Ok(s.hframes() as i64))
    });
    let store = env.store.clone();
    engine.register_set("hframes", move |c: &mut ComponentRef, h: i64| {
        with_payload::<Sprite, _>(&store, c, |s| {
            let v = s.vframes();
            s.set_frames(h.max(0) as u32, v)
        })
    });
    let store = env.store.clone();
    engine.register_get("vframes", move |c: &mut ComponentRef| {
        with_payload::<Sprite, _>(&store, c, |s| Ok(s.vframes() as i64))
    });
    let store = env.store.clone();
    engine.register_set("vframes", move |c: &mut ComponentRef, v: i64| {
        with_payload::<Sprite, _>(&store, c, |s| {
            let h = s.hframes();
            s.set_frames(h, v.max(0) as u32)
        })
    });
    let store = env.store.clone();
    engine.register_fn("set_frames", move |c: &mut ComponentRef, h: i64, v: i64| {
        with_payload::<Sprite, _>(&store, c, |s| s.set_frames(h.max(0) as u32, v.max(0) as u32))
    });

    let store = env.store.clone();
    engine.register_get("frame", move |c: &mut ComponentRef| {
        with_payload::<Sprite, _>(&store, c, |s| Ok(s.frame as i64))
    });
    let store = env.store.clone();
    engine.register_set("frame", move |c: &mut ComponentRef, frame: i64| {
        with_payload::<Sprite, _>(&store, c, |s| {
            s.frame = frame.max(0) as u32;
            Ok(())
        })
    });

    let store = env.store.clone();
    engine.register_get("flip_h", move |c: &mut ComponentRef| {
        with_payload::<Sprite, _>(&store, c, |s| Ok(s.flipped_h))
    });
    let store = env.store.clone();
    engine.register_set("flip_h", move |c: &mut ComponentRef, flip: bool| {
        with_payload::<Sprite, _>(&store, c, |s| {
            s.flipped_h = flip;
            Ok(())
        })
    });
    let store = env.store.clone();
    engine.register_get("flip_v", move |c: &mut ComponentRef| {
        with_payload::<Sprite, _>(&store, c, |s| Ok(s.flipped_v))
    });
    let store = env.store.clone();
    engine.register_set("flip_v", move |c: &mut ComponentRef, flip: bool| {
        with_payload::<Sprite, _>(&store, c, |s| {
            s.flipped_v = flip;
            Ok(())
        })
    });
}

fn register_input(engine: &mut Engine, env: &ScriptEnv) {
    let store = env.store.clone();
    engine.register_fn("Input", move || spawn(&store, Component::Input(InputMap::new())));

    let store = env.store.clone();
    let keys = env.keys.clone();
    engine.register_fn(
        "register_action",
        move |c: &mut ComponentRef, action: &str, key: &str, event_type: &str| {
            with_payload::<InputMap, _>(&store, c, |map| {
                let bindings = map.register_action(keys.as_ref(), action, key, event_type)?;
                Ok(bindings
                    .iter()
                    .map(|b| Dynamic::from(b.key_name.clone()))
                    .collect::<Array>())
            })
        },
    );
    let store = env.store.clone();
    let input = env.input.clone();
    engine.register_fn("get_action_strength", move |c: &mut ComponentRef, action: &str| {
        let held = input.read().unwrap_or_else(PoisonError::into_inner).clone();
        with_payload::<InputMap, _>(&store, c, |map| {
            Ok(map.action_strength(&held, action) as f64)
        })
    });
    let store = env.store.clone();
    let input = env.input.clone();
    engine.register_fn("is_action_pressed", move |c: &mut ComponentRef, action: &str| {
        let held = input.read().unwrap_or_else(PoisonError::into_inner).clone();
        with_payload::<InputMap, _>(&store, c, |map| Ok(map.action_strength(&held, action) > 0.0))
    });
    let store = env.store.clone();
    let keys = env.keys.clone();
    engine.register_fn(
        "is_action_triggered",
        move |c: &mut ComponentRef, event: Map, action: &str| {
            let event = event_from_map(keys.as_ref(), &event).map_err(script_error)?;
            with_payload::<InputMap, _>(&store, c, |map| Ok(map.is_action_triggered(&event, action)))
        },
    );
}

fn register_scripts(engine: &mut Engine, env: &ScriptEnv) {
    let store = env.store.clone();
    engine.register_fn("Scripts", move || spawn(&store, Component::Script(ScriptSet::new())));

    let script_env = env.clone();
    engine.register_fn(
        "add_script",
        move |ctx: NativeCallContext, c: &mut ComponentRef, name: &str| {
            system::add_component_script(ctx.engine(), &script_env, c.0, name).map_err(script_error)
        },
    );
    let store = env.store.clone();
    engine.register_fn("remove_script", move |c: &mut ComponentRef, name: &str| {
        with_payload::<ScriptSet, _>(&store, c, |set| Ok(set.remove(name)))
    });
    let store = env.store.clone();
    engine.register_fn("has_script", move |c: &mut ComponentRef, name: &str| {
        with_payload::<ScriptSet, _>(&store, c, |set| Ok(set.contains(name)))
    });
    let store = env.store.clone();
    engine.register_fn("list_scripts", move |c: &mut ComponentRef| {
        with_payload::<ScriptSet, _>(&store, c, |set| {
            Ok(set
                .names()
                .map(|name| Dynamic::from(name.to_string()))
                .collect::<Array>())
        })
    });
}

fn register_animation(engine: &mut Engine, env: &ScriptEnv) {
    let store = env.store.clone();
    engine.register_fn("Animation", move || {
        spawn(&store, Component::Animation(Animation::new()))
    });

    let store = env.store.clone();
    engine.register_fn(
        "add_animation",
        move |c: &mut ComponentRef, name: &str, frames: Array, looping: bool| {
            let frames = frames
                .iter()
                .map(parse_frame)
                .collect::<Result<Vec<_>, _>>()
                .map_err(script_error)?;
            with_payload::<Animation, _>(&store, c, |anim| anim.add_animation(name, frames, looping))
        },
    );
    let store = env.store.clone();
    engine.register_fn("play", move |c: &mut ComponentRef, name: &str| {
        animation::play_on(&mut store.write(), c.0, name)
            .map(|frame| frame as i64)
            .map_err(script_error)
    });
    let store = env.store.clone();
    engine.register_fn("stop", move |c: &mut ComponentRef| {
        with_payload::<Animation, _>(&store, c, |anim| {
            anim.stop();
            Ok(())
        })
    });
    let store = env.store.clone();
    engine.register_get("is_playing", move |c: &mut ComponentRef| {
        with_payload::<Animation, _>(&store, c, |anim| Ok(anim.is_playing()))
    });
}
