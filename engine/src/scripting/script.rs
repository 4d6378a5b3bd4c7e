//! Script attachments carried by node entities

use rhai::{Map, AST};
use std::sync::Arc;

/// The script a node runs its own hooks from
#[derive(Debug, Clone)]
pub struct ScriptHook {
    /// Name the script was loaded by
    pub name: String,
    pub ast: Arc<AST>,
}

impl ScriptHook {
    pub fn new(name: impl Into<String>, ast: Arc<AST>) -> Self {
        Self {
            name: name.into(),
            ast,
        }
    }
}

/// Per-node variables scripts keep between calls (`this.vars`)
#[derive(Debug, Clone, Default)]
pub struct ScriptVars(pub Map);

/// Whether `ast` defines `name` taking exactly `arity` parameters
pub fn has_function(ast: &AST, name: &str, arity: usize) -> bool {
    ast.iter_functions()
        .any(|f| f.name == name && f.params.len() == arity)
}
