//! Input API for Rhai scripts

use super::{script_error, ScriptEnv};
use crate::error::{SceneError, SceneResult};
use crate::input::{key_name, InputEvent, KeyResolver, KeyState};
use rhai::{Dynamic, Engine, Map};
use std::sync::PoisonError;
use tracing::debug;

/// Table handed to `process_input` hooks: `#{ key, state, pressed }`
pub fn event_to_map(event: &InputEvent) -> Map {
    let mut map = Map::new();
    map.insert("key".into(), Dynamic::from(key_name(event.key)));
    map.insert("state".into(), Dynamic::from(event.state.as_str().to_string()));
    map.insert("pressed".into(), Dynamic::from(event.is_pressed()));
    map
}

/// Inverse of [`event_to_map`]; the key may be any name the resolver knows
pub fn event_from_map(keys: &dyn KeyResolver, map: &Map) -> SceneResult<InputEvent> {
    let key = map
        .get("key")
        .and_then(|k| k.clone().into_string().ok())
        .ok_or_else(|| SceneError::InvalidArgument("input event has no 'key'".into()))?;
    let key = keys
        .resolve(&key)
        .ok_or_else(|| SceneError::InvalidArgument(format!("unknown key name '{key}'")))?;
    let state: KeyState = map
        .get("state")
        .and_then(|s| s.clone().into_string().ok())
        .ok_or_else(|| SceneError::InvalidArgument("input event has no 'state'".into()))?
        .parse()?;
    Ok(InputEvent::new(key, state))
}

/// Register input API with Rhai engine
pub fn register_input_api(engine: &mut Engine, env: &ScriptEnv) {
    debug!("Registering input API");

    let input = env.input.clone();
    let keys = env.keys.clone();
    engine.register_fn("is_key_pressed", move |name: &str| {
        let key = keys.resolve(name).ok_or_else(|| {
            script_error(SceneError::InvalidArgument(format!("unknown key name '{name}'")))
        })?;
        Ok::<_, Box<rhai::EvalAltResult>>(
            input
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .is_key_pressed(key),
        )
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::WinitKeyNames;
    use winit::keyboard::KeyCode;

    #[test]
    fn test_event_map_round_trip() {
        let event = InputEvent::released(KeyCode::ArrowLeft);
        let map = event_to_map(&event);

        assert_eq!(map["key"].clone().into_string().unwrap(), "ArrowLeft");
        assert_eq!(map["state"].clone().into_string().unwrap(), "released");
        assert!(!map["pressed"].as_bool().unwrap());
        assert_eq!(event_from_map(&WinitKeyNames, &map).unwrap(), event);
    }

    #[test]
    fn test_event_from_map_accepts_friendly_names() {
        let mut map = Map::new();
        map.insert("key".into(), Dynamic::from("Space".to_string()));
        map.insert("state".into(), Dynamic::from("pressed".to_string()));
        assert_eq!(
            event_from_map(&WinitKeyNames, &map).unwrap(),
            InputEvent::pressed(KeyCode::Space)
        );

        map.remove("state");
        assert!(event_from_map(&WinitKeyNames, &map).is_err());
    }
}
