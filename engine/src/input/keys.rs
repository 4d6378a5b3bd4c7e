//! Key name resolution for action bindings

use winit::keyboard::KeyCode;

/// Maps human key names ("A", "Space", "Left") to key codes
pub trait KeyResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Option<KeyCode>;
}

/// Name of a key code as handed to scripts ("KeyA", "ArrowLeft")
pub fn key_name(code: KeyCode) -> String {
    format!("{code:?}")
}

const LETTERS: [KeyCode; 26] = [
    KeyCode::KeyA,
    KeyCode::KeyB,
    KeyCode::KeyC,
    KeyCode::KeyD,
    KeyCode::KeyE,
    KeyCode::KeyF,
    KeyCode::KeyG,
    KeyCode::KeyH,
    KeyCode::KeyI,
    KeyCode::KeyJ,
    KeyCode::KeyK,
    KeyCode::KeyL,
    KeyCode::KeyM,
    KeyCode::KeyN,
    KeyCode::KeyO,
    KeyCode::KeyP,
    KeyCode::KeyQ,
    KeyCode::KeyR,
    KeyCode::KeyS,
    KeyCode::KeyT,
    KeyCode::KeyU,
    KeyCode::KeyV,
    KeyCode::KeyW,
    KeyCode::KeyX,
    KeyCode::KeyY,
    KeyCode::KeyZ,
];

const DIGITS: [KeyCode; 10] = [
    KeyCode::Digit0,
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

const FUNCTION_KEYS: [KeyCode; 12] = [
    KeyCode::F1,
    KeyCode::F2,
    KeyCode::F3,
    KeyCode::F4,
    KeyCode::F5,
    KeyCode::F6,
    KeyCode::F7,
    KeyCode::F8,
    KeyCode::F9,
    KeyCode::F10,
    KeyCode::F11,
    KeyCode::F12,
];

const NAMED: [(&str, KeyCode); 21] = [
    ("space", KeyCode::Space),
    ("return", KeyCode::Enter),
    ("enter", KeyCode::Enter),
    ("escape", KeyCode::Escape),
    ("esc", KeyCode::Escape),
    ("tab", KeyCode::Tab),
    ("backspace", KeyCode::Backspace),
    ("delete", KeyCode::Delete),
    ("left", KeyCode::ArrowLeft),
    ("right", KeyCode::ArrowRight),
    ("up", KeyCode::ArrowUp),
    ("down", KeyCode::ArrowDown),
    ("left shift", KeyCode::ShiftLeft),
    ("right shift", KeyCode::ShiftRight),
    ("shift", KeyCode::ShiftLeft),
    ("left ctrl", KeyCode::ControlLeft),
    ("right ctrl", KeyCode::ControlRight),
    ("ctrl", KeyCode::ControlLeft),
    ("left alt", KeyCode::AltLeft),
    ("right alt", KeyCode::AltRight),
    ("alt", KeyCode::AltLeft),
];

/// Default resolver over winit key codes.
///
/// Accepts single letters and digits, common names ("Space", "Return",
/// "Left"), "F1".."F12", and winit's own names ("KeyA", "ArrowLeft").
#[derive(Debug, Clone, Copy, Default)]
pub struct WinitKeyNames;

impl WinitKeyNames {
    fn all_codes() -> impl Iterator<Item = KeyCode> {
        LETTERS
            .into_iter()
            .chain(DIGITS)
            .chain(FUNCTION_KEYS)
            .chain(NAMED.into_iter().map(|(_, code)| code))
    }
}

impl KeyResolver for WinitKeyNames {
    fn resolve(&self, name: &str) -> Option<KeyCode> {
        let name = name.trim();
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_alphabetic() {
                let index = (c.to_ascii_lowercase() as u8 - b'a') as usize;
                return LETTERS.get(index).copied();
            }
            if let Some(digit) = c.to_digit(10) {
                return DIGITS.get(digit as usize).copied();
            }
            return None;
        }

        let lowered = name.to_ascii_lowercase();
        if let Some((_, code)) = NAMED.iter().find(|(alias, _)| *alias == lowered) {
            return Some(*code);
        }
        Self::all_codes().find(|code| key_name(*code).eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_and_digits() {
        let keys = WinitKeyNames;
        assert_eq!(keys.resolve("A"), Some(KeyCode::KeyA));
        assert_eq!(keys.resolve("z"), Some(KeyCode::KeyZ));
        assert_eq!(keys.resolve("7"), Some(KeyCode::Digit7));
        assert_eq!(keys.resolve("?"), None);
    }

    #[test]
    fn test_named_keys() {
        let keys = WinitKeyNames;
        assert_eq!(keys.resolve("Space"), Some(KeyCode::Space));
        assert_eq!(keys.resolve("Return"), Some(KeyCode::Enter));
        assert_eq!(keys.resolve("Left"), Some(KeyCode::ArrowLeft));
        assert_eq!(keys.resolve("Left Shift"), Some(KeyCode::ShiftLeft));
        assert_eq!(keys.resolve("F5"), Some(KeyCode::F5));
        assert_eq!(keys.resolve("Hyper"), None);
    }

    #[test]
    fn test_winit_names_round_trip() {
        let keys = WinitKeyNames;
        for code in [KeyCode::KeyQ, KeyCode::ArrowDown, KeyCode::Digit3, KeyCode::Escape] {
            assert_eq!(keys.resolve(&key_name(code)), Some(code));
        }
    }
}
