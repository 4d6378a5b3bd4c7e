//! Hot-reload watcher for script files
//!
//! The watcher only collects change notifications. Recompiling and swapping
//! scripts happens on the frame loop thread through
//! [`crate::scene::SceneContext::reload_changed_scripts`].

use crate::config::AssetConfig;
use crate::error::SceneResult;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Configuration for the script watcher
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Debounce duration to avoid multiple reloads for rapid file changes
    pub debounce_duration: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce_duration: Duration::from_millis(300),
        }
    }
}

/// Watches the scripts directory for edited `.rhai` files
pub struct ScriptWatcher {
    /// File system watcher
    _watcher: RecommendedWatcher,
    events: Receiver<Event>,
    assets: AssetConfig,
    config: WatcherConfig,
    last_reported: HashMap<String, Instant>,
    scripts_root: PathBuf,
}

impl ScriptWatcher {
    /// Start watching the scripts directory of `assets`
    pub fn new(assets: AssetConfig, config: WatcherConfig) -> SceneResult<Self> {
        let scripts_root = assets.scripts_root();
        info!(path = ?scripts_root, "Creating script watcher");

        let (event_tx, event_rx) = mpsc::channel::<Event>();
        let mut watcher = RecommendedWatcher::new(
            move |res| match res {
                Ok(event) => {
                    if let Err(e) = event_tx.send(event) {
                        error!(error = %e, "Failed to send file event");
                    }
                }
                Err(e) => error!(error = %e, "File watcher error"),
            },
            Config::default(),
        )?;
        watcher.watch(&scripts_root, RecursiveMode::NonRecursive)?;
        debug!(watch_path = ?scripts_root, "Started watching for script changes");

        Ok(Self {
            _watcher: watcher,
            events: event_rx,
            assets,
            config,
            last_reported: HashMap::new(),
            scripts_root,
        })
    }

    pub fn scripts_root(&self) -> &PathBuf {
        &self.scripts_root
    }

    /// Names of scripts changed since the last call, without blocking
    pub fn changed_scripts(&mut self) -> Vec<String> {
        let mut changed = BTreeSet::new();
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create()) {
                        continue;
                    }
                    for path in &event.paths {
                        if let Some(name) = self.assets.script_name_for(path) {
                            changed.insert(name);
                        }
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    debug!("Script watcher channel disconnected");
                    break;
                }
            }
        }

        let now = Instant::now();
        changed
            .into_iter()
            .filter(|name| {
                let due = self
                    .last_reported
                    .get(name)
                    .map(|last| now.duration_since(*last) >= self.config.debounce_duration)
                    .unwrap_or(true);
                if due {
                    self.last_reported.insert(name.clone(), now);
                } else {
                    debug!(script = name.as_str(), "Debouncing rapid script changes");
                }
                due
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watcher_starts_on_existing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let assets = AssetConfig::new(dir.path().to_path_buf(), "scripts".into(), "textures".into());
        std::fs::create_dir_all(assets.scripts_root()).unwrap();

        let mut watcher = ScriptWatcher::new(assets, WatcherConfig::default()).unwrap();
        assert!(watcher.changed_scripts().is_empty());
    }

    #[test]
    fn test_watcher_fails_on_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let assets = AssetConfig::new(dir.path().join("nope"), "scripts".into(), "textures".into());
        assert!(ScriptWatcher::new(assets, WatcherConfig::default()).is_err());
    }
}
