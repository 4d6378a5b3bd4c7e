//! Scene ownership and per-frame traversal

pub mod context;
pub mod traversal;

pub use context::SceneContext;
pub use traversal::{process, process_input, PROCESS_HOOK, PROCESS_INPUT_HOOK};
