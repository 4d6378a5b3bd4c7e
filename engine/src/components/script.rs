//! Script component: extra scripts run alongside a node's own hook

use rhai::AST;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Scripts keyed by the name they were loaded by
#[derive(Debug, Clone, Default)]
pub struct ScriptSet {
    scripts: BTreeMap<String, Arc<AST>>,
}

impl ScriptSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a script, replacing one loaded under the same name.
    /// Returns whether a script was replaced.
    pub fn insert(&mut self, name: impl Into<String>, ast: Arc<AST>) -> bool {
        self.scripts.insert(name.into(), ast).is_some()
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.scripts.remove(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<Arc<AST>> {
        self.scripts.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scripts.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scripts.keys().map(String::as_str)
    }

    /// Snapshot of every script, in name order
    pub fn entries(&self) -> Vec<(String, Arc<AST>)> {
        self.scripts
            .iter()
            .map(|(name, ast)| (name.clone(), Arc::clone(ast)))
            .collect()
    }

    /// Swap in a recompiled script if one with this name is present
    pub fn replace(&mut self, name: &str, ast: Arc<AST>) -> bool {
        match self.scripts.get_mut(name) {
            Some(slot) => {
                *slot = ast;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}
