//! Error types shared by the scene graph, components and scripting layer

use hecs::Entity;
use thiserror::Error;

/// Recoverable failures of structural scene operations
#[derive(Debug, Error)]
pub enum SceneError {
    /// The operation would create a second owner or a second instance of a kind
    #[error("conflict: {0}")]
    Conflict(String),

    /// A requested component or script is not present
    #[error("not found: {0}")]
    NotFound(String),

    /// Argument outside its valid domain (zero zoom, self-parenting, unknown key name)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A handle that no longer refers to a live entity
    #[error("stale reference to entity {0:?}")]
    StaleReference(Entity),

    /// A script failed to compile or raised an error while running
    #[error("script '{script}' failed: {message}")]
    ScriptFailure { script: String, message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),

    /// The script directory watcher could not be set up
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),
}

impl SceneError {
    pub(crate) fn script(script: impl Into<String>, message: impl ToString) -> Self {
        SceneError::ScriptFailure {
            script: script.into(),
            message: message.to_string(),
        }
    }
}

impl From<serde_json::Error> for SceneError {
    fn from(err: serde_json::Error) -> Self {
        SceneError::Config(err.to_string())
    }
}

/// Convenience alias used throughout the scene modules
pub type SceneResult<T> = Result<T, SceneError>;
