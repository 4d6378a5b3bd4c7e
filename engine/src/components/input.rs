//! Input component: named actions bound to keys

use crate::error::{SceneError, SceneResult};
use crate::input::{InputEvent, InputState, KeyResolver, KeyState};
use std::collections::BTreeMap;
use tracing::debug;
use winit::keyboard::KeyCode;

/// One key bound to an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionBinding {
    /// Name as the script wrote it
    pub key_name: String,
    pub key: KeyCode,
    /// Transition that triggers the action
    pub state: KeyState,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputMap {
    actions: BTreeMap<String, Vec<ActionBinding>>,
}

impl InputMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key_name` to `action` for the given event type ("pressed" or
    /// "released"), returning the action's bindings so far.
    ///
    /// Binding the same key and event type twice is a no-op.
    pub fn register_action(
        &mut self,
        keys: &dyn KeyResolver,
        action: &str,
        key_name: &str,
        event_type: &str,
    ) -> SceneResult<&[ActionBinding]> {
        let key = keys
            .resolve(key_name)
            .ok_or_else(|| SceneError::InvalidArgument(format!("unknown key name '{key_name}'")))?;
        let state: KeyState = event_type.parse()?;

        let bindings = self.actions.entry(action.to_string()).or_default();
        if !bindings.iter().any(|b| b.key == key && b.state == state) {
            bindings.push(ActionBinding {
                key_name: key_name.to_string(),
                key,
                state,
            });
            debug!(action, key = ?key, state = state.as_str(), "Registered action binding");
        }
        Ok(bindings)
    }

    pub fn bindings(&self, action: &str) -> &[ActionBinding] {
        self.actions.get(action).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    /// 1.0 while any key bound to `action` is held, else 0.0
    pub fn action_strength(&self, input: &InputState, action: &str) -> f32 {
        let held = self
            .bindings(action)
            .iter()
            .any(|binding| input.is_key_pressed(binding.key));
        if held {
            1.0
        } else {
            0.0
        }
    }

    /// Whether `event` is a transition some binding of `action` listens for
    pub fn is_action_triggered(&self, event: &InputEvent, action: &str) -> bool {
        self.bindings(action)
            .iter()
            .any(|binding| binding.key == event.key && binding.state == event.state)
    }
}
