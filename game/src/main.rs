//! Game entry point: loads the config, runs the main script and drives the
//! frame loop

mod blitter;

use blitter::ImageBlitter;
use rogue_engine::prelude::*;
use std::path::PathBuf;
use tracing::{error, info};

const DEFAULT_CONFIG: &str = "game/config.json";

fn load_config() -> EngineConfig {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));

    if path.exists() {
        match EngineConfig::load(&path) {
            Ok(config) => return config,
            Err(e) => eprintln!("ignoring config {}: {e}", path.display()),
        }
    }

    let mut config = EngineConfig::default();
    config.assets.asset_root = if PathBuf::from("game/assets").is_dir() {
        PathBuf::from("game/assets")
    } else {
        PathBuf::from("assets")
    };
    config
}

fn main() {
    let config = load_config();
    rogue_engine::init_logging_with(config.log_filter.as_deref());
    info!(title = config.window_title.as_str(), "Starting game");

    let blitter = ImageBlitter::new(config.assets.clone());
    let app = EngineBuilder::from_config(config).build(blitter);

    if let Err(e) = app.run() {
        error!(error = %e, "Engine stopped with an error");
        std::process::exit(1);
    }
}
