//! Keyboard input: decoded events, held-key state and key name resolution

pub mod event;
pub mod keys;
pub mod state;

pub use event::{InputEvent, KeyState};
pub use keys::{key_name, KeyResolver, WinitKeyNames};
pub use state::{InputState, SharedInputState};
