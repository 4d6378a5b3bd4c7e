//! Configuration types for the engine

use crate::error::{SceneError, SceneResult};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration for asset paths
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Root directory for all assets
    pub asset_root: PathBuf,
    /// Directory name for scripts (relative to asset_root)
    pub scripts_dir: String,
    /// Directory name for textures (relative to asset_root)
    pub textures_dir: String,
}

impl AssetConfig {
    /// Create a new AssetConfig with custom paths
    pub fn new(asset_root: PathBuf, scripts_dir: String, textures_dir: String) -> Self {
        debug!(
            asset_root = ?asset_root,
            scripts_dir = scripts_dir,
            textures_dir = textures_dir,
            "Creating new AssetConfig"
        );
        Self {
            asset_root,
            scripts_dir,
            textures_dir,
        }
    }

    /// Directory holding every script
    pub fn scripts_root(&self) -> PathBuf {
        self.asset_root.join(&self.scripts_dir)
    }

    /// Get the full path to a script file
    pub fn script_path(&self, name: &str) -> SceneResult<PathBuf> {
        check_asset_name(name, "script")?;
        let path = self.scripts_root().join(format!("{name}.rhai"));
        debug!(name = name, path = ?path, "Generated script path");
        Ok(path)
    }

    /// Get the full path to a texture file. The name keeps its extension.
    pub fn texture_path(&self, name: &str) -> SceneResult<PathBuf> {
        check_asset_name(name, "texture")?;
        Ok(self.asset_root.join(&self.textures_dir).join(name))
    }

    /// Map a script file on disk back to the name it is loaded by
    pub fn script_name_for(&self, path: &Path) -> Option<String> {
        if path.extension().and_then(|ext| ext.to_str()) != Some("rhai") {
            return None;
        }
        path.file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string)
    }

    /// Check if the asset directories exist
    pub fn validate(&self) -> SceneResult<()> {
        let scripts_path = self.scripts_root();

        if !self.asset_root.exists() {
            return Err(SceneError::Config(format!(
                "asset root directory not found: {:?}",
                self.asset_root
            )));
        }

        if !scripts_path.exists() {
            return Err(SceneError::Config(format!(
                "scripts directory not found: {scripts_path:?}"
            )));
        }

        Ok(())
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            scripts_dir: "scripts".to_string(),
            textures_dir: "textures".to_string(),
        }
    }
}

fn check_asset_name(name: &str, what: &str) -> SceneResult<()> {
    if name.is_empty() || name.contains("..") || name.contains('/') || name.contains('\\') {
        return Err(SceneError::InvalidArgument(format!(
            "invalid {what} name: {name}"
        )));
    }
    Ok(())
}

/// Top level settings for a windowed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub window_title: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Frames per second the loop paces itself to
    pub target_fps: u32,
    /// Script attached to the root node at startup
    pub main_script: String,
    /// Overrides the default log filter when `RUST_LOG` is unset
    pub log_filter: Option<String>,
    /// Watch the scripts directory and swap recompiled scripts into live nodes
    pub hot_reload: bool,
    pub assets: AssetConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_title: "Rogue Engine".to_string(),
            viewport_width: 800,
            viewport_height: 600,
            target_fps: 60,
            main_script: "main".to_string(),
            log_filter: None,
            hot_reload: false,
            assets: AssetConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a config from JSON text; missing fields take their defaults
    pub fn from_json(text: &str) -> SceneResult<Self> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.check()?;
        Ok(config)
    }

    /// Load a JSON config file
    pub fn load(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        debug!(path = ?path, "Loading engine config");
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Viewport size in pixels
    pub fn viewport(&self) -> Vec2 {
        Vec2::new(self.viewport_width as f32, self.viewport_height as f32)
    }

    /// Seconds per frame at the target rate
    pub fn frame_duration(&self) -> f32 {
        1.0 / self.target_fps.max(1) as f32
    }

    fn check(&self) -> SceneResult<()> {
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(SceneError::Config(format!(
                "viewport must be non-empty, got {}x{}",
                self.viewport_width, self.viewport_height
            )));
        }
        if self.target_fps == 0 {
            return Err(SceneError::Config("target_fps must be positive".into()));
        }
        check_asset_name(&self.main_script, "script")
            .map_err(|e| SceneError::Config(e.to_string()))
    }
}
