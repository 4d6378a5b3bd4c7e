//! The scene owned by the frame loop: store, input state and script engine

use super::traversal;
use crate::components::{slot, spawn_component, Component};
use crate::config::AssetConfig;
use crate::core::entity::{hierarchy, Entity, NodeKind, SharedStore};
use crate::error::SceneResult;
use crate::graphics::{Blitter, Renderer2D};
use crate::input::{InputEvent, InputState, KeyResolver, SharedInputState, WinitKeyNames};
use crate::scripting::hot_reload::{ScriptWatcher, WatcherConfig};
use crate::scripting::ScriptEngine;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, error, info};

pub struct SceneContext {
    store: SharedStore,
    input: SharedInputState,
    scripts: ScriptEngine,
    assets: AssetConfig,
    watcher: Option<ScriptWatcher>,
}

impl SceneContext {
    pub fn new(assets: AssetConfig) -> Self {
        Self::with_keys(assets, Arc::new(WinitKeyNames))
    }

    pub fn with_keys(assets: AssetConfig, keys: Arc<dyn KeyResolver>) -> Self {
        let store = SharedStore::default();
        let input: SharedInputState = Arc::new(RwLock::new(InputState::new()));
        let scripts = ScriptEngine::with_keys(store.clone(), input.clone(), keys, assets.clone());
        Self {
            store,
            input,
            scripts,
            assets,
            watcher: None,
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn input(&self) -> &SharedInputState {
        &self.input
    }

    pub fn scripts(&self) -> &ScriptEngine {
        &self.scripts
    }

    pub fn create_node(&self, kind: NodeKind) -> Entity {
        hierarchy::create_node(&mut self.store.write(), kind)
    }

    pub fn add_child(&self, parent: Entity, child: Entity) -> SceneResult<()> {
        hierarchy::add_child(&mut self.store.write(), parent, child)
    }

    /// Spawn `component` and attach it to `node`. The component is destroyed
    /// again when the attach is rejected.
    pub fn add_component(&self, node: Entity, component: Component) -> SceneResult<Entity> {
        let mut store = self.store.write();
        let entity = spawn_component(&mut store, component);
        if let Err(e) = slot::attach(&mut store, node, entity) {
            let _ = store.despawn(entity);
            return Err(e);
        }
        Ok(entity)
    }

    pub fn destroy_node(&self, node: Entity) -> SceneResult<()> {
        hierarchy::destroy_node(&mut self.store.write(), node)
    }

    pub fn set_script(&self, node: Entity, name: &str) -> SceneResult<()> {
        self.scripts.set_script(node, name)
    }

    /// One `process` pass over the tree rooted at `root`
    pub fn process(&self, root: Entity, delta: f32) {
        traversal::process(&self.scripts, root, delta);
    }

    /// Deliver an event to the tree without touching the held-key state
    pub fn process_input(&self, root: Entity, event: &InputEvent) {
        traversal::process_input(&self.scripts, root, event);
    }

    /// Record a key transition, then deliver it to the tree
    pub fn input_event(&self, root: Entity, event: &InputEvent) {
        self.input
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .handle_event(event);
        self.process_input(root, event);
    }

    /// Release every held key
    pub fn clear_input(&self) {
        self.input.write().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// Sample the camera and draw the scene's sprites
    pub fn render(&self, renderer: &mut Renderer2D, blitter: &mut dyn Blitter, frame_duration: f32) -> usize {
        renderer.render(&mut self.store.write(), blitter, frame_duration)
    }

    /// Start watching the scripts directory for edits
    pub fn enable_hot_reload(&mut self) -> SceneResult<()> {
        if self.watcher.is_none() {
            self.watcher = Some(ScriptWatcher::new(self.assets.clone(), WatcherConfig::default())?);
            info!("Script hot reload enabled");
        }
        Ok(())
    }

    pub fn hot_reload_enabled(&self) -> bool {
        self.watcher.is_some()
    }

    /// Recompile scripts edited since the last call. Returns how many
    /// reloaded cleanly; a failed compile keeps the running version.
    pub fn reload_changed_scripts(&mut self) -> usize {
        let Some(watcher) = self.watcher.as_mut() else {
            return 0;
        };
        let changed = watcher.changed_scripts();
        self.reload_scripts(&changed)
    }

    /// Recompile each named script and swap it into live nodes
    pub fn reload_scripts(&self, names: &[String]) -> usize {
        let mut reloaded = 0;
        for name in names {
            match self.scripts.reload_script(name) {
                Ok(swapped) => {
                    info!(script = name.as_str(), swapped, "Script hot reloaded");
                    reloaded += 1;
                }
                Err(e) => error!(script = name.as_str(), error = %e, "Script reload failed"),
            }
        }
        if reloaded > 0 {
            debug!(reloaded, "Finished script reload pass");
        }
        reloaded
    }
}
