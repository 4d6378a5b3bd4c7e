//! Input state tracking

use super::event::{InputEvent, KeyState};
use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use tracing::trace;
use winit::keyboard::KeyCode;

/// Held-key state shared with script bindings
pub type SharedInputState = Arc<RwLock<InputState>>;

/// Tracks which keys are currently held
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Currently pressed keys
    pub keys_pressed: HashSet<KeyCode>,
}

impl InputState {
    /// Create a new empty input state
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a key transition
    pub fn handle_event(&mut self, event: &InputEvent) {
        match event.state {
            KeyState::Pressed => {
                self.keys_pressed.insert(event.key);
                trace!("Key pressed: {:?}", event.key);
            }
            KeyState::Released => {
                self.keys_pressed.remove(&event.key);
                trace!("Key released: {:?}", event.key);
            }
        }
    }

    /// Check if a key is currently pressed
    pub fn is_key_pressed(&self, key_code: KeyCode) -> bool {
        self.keys_pressed.contains(&key_code)
    }

    /// Forget every held key, e.g. when the window loses focus
    pub fn clear(&mut self) {
        self.keys_pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_state_keyboard() {
        let mut state = InputState::new();

        state.handle_event(&InputEvent::pressed(KeyCode::KeyW));
        assert!(state.is_key_pressed(KeyCode::KeyW));

        state.handle_event(&InputEvent::released(KeyCode::KeyW));
        assert!(!state.is_key_pressed(KeyCode::KeyW));
    }

    #[test]
    fn test_clear() {
        let mut state = InputState::new();
        state.handle_event(&InputEvent::pressed(KeyCode::Space));
        state.handle_event(&InputEvent::pressed(KeyCode::KeyA));
        state.clear();
        assert!(state.keys_pressed.is_empty());
    }
}
