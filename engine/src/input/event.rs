//! Decoded keyboard events fed through the scene

use crate::error::{SceneError, SceneResult};
use std::fmt;
use std::str::FromStr;
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Whether a key went down or up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyState {
    Pressed,
    Released,
}

impl KeyState {
    pub fn as_str(self) -> &'static str {
        match self {
            KeyState::Pressed => "pressed",
            KeyState::Released => "released",
        }
    }
}

impl fmt::Display for KeyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyState {
    type Err = SceneError;

    fn from_str(s: &str) -> SceneResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pressed" | "down" => Ok(KeyState::Pressed),
            "released" | "up" => Ok(KeyState::Released),
            other => Err(SceneError::InvalidArgument(format!(
                "unknown key event type '{other}', expected 'pressed' or 'released'"
            ))),
        }
    }
}

impl From<ElementState> for KeyState {
    fn from(state: ElementState) -> Self {
        match state {
            ElementState::Pressed => KeyState::Pressed,
            ElementState::Released => KeyState::Released,
        }
    }
}

/// A single key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub key: KeyCode,
    pub state: KeyState,
}

impl InputEvent {
    pub fn new(key: KeyCode, state: KeyState) -> Self {
        Self { key, state }
    }

    pub fn pressed(key: KeyCode) -> Self {
        Self::new(key, KeyState::Pressed)
    }

    pub fn released(key: KeyCode) -> Self {
        Self::new(key, KeyState::Released)
    }

    /// Decode a physical key transition; unidentified keys yield `None`
    pub fn from_physical(key: PhysicalKey, state: ElementState) -> Option<Self> {
        match key {
            PhysicalKey::Code(code) => Some(Self::new(code, state.into())),
            PhysicalKey::Unidentified(_) => None,
        }
    }

    /// Decode a winit keyboard event. Auto-repeat events are dropped.
    pub fn from_key_event(event: &KeyEvent) -> Option<Self> {
        if event.repeat {
            return None;
        }
        Self::from_physical(event.physical_key, event.state)
    }

    pub fn is_pressed(&self) -> bool {
        self.state == KeyState::Pressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::NativeKeyCode;

    #[test]
    fn test_key_state_parse() {
        assert_eq!("pressed".parse::<KeyState>().unwrap(), KeyState::Pressed);
        assert_eq!("Released".parse::<KeyState>().unwrap(), KeyState::Released);
        assert!(matches!(
            "held".parse::<KeyState>(),
            Err(SceneError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_from_physical() {
        let event =
            InputEvent::from_physical(PhysicalKey::Code(KeyCode::KeyW), ElementState::Pressed)
                .unwrap();
        assert_eq!(event, InputEvent::pressed(KeyCode::KeyW));
        assert!(event.is_pressed());

        let unknown = InputEvent::from_physical(
            PhysicalKey::Unidentified(NativeKeyCode::Unidentified),
            ElementState::Released,
        );
        assert!(unknown.is_none());
    }
}
