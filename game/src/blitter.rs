//! Texture backend that reads image headers and logs draw calls

use rogue_engine::prelude::{Blitter, Flip, Rect, TextureId, TextureInfo};
use rogue_engine::config::AssetConfig;
use std::collections::HashMap;
use tracing::{trace, warn};

/// Loads texture sizes from disk with `image` and records every blit
pub struct ImageBlitter {
    assets: AssetConfig,
    textures: HashMap<String, Option<TextureInfo>>,
    next_id: u64,
    blits: u64,
}

impl ImageBlitter {
    pub fn new(assets: AssetConfig) -> Self {
        Self {
            assets,
            textures: HashMap::new(),
            next_id: 1,
            blits: 0,
        }
    }

    pub fn blits(&self) -> u64 {
        self.blits
    }

    fn load(&mut self, name: &str) -> Option<TextureInfo> {
        let path = match self.assets.texture_path(name) {
            Ok(path) => path,
            Err(e) => {
                warn!(texture = name, error = %e, "Rejected texture name");
                return None;
            }
        };
        match image::image_dimensions(&path) {
            Ok((width, height)) => {
                let id = TextureId(self.next_id);
                self.next_id += 1;
                Some(TextureInfo { id, width, height })
            }
            Err(e) => {
                warn!(path = ?path, error = %e, "Failed to load texture");
                None
            }
        }
    }
}

impl Blitter for ImageBlitter {
    fn texture(&mut self, path: &str) -> Option<TextureInfo> {
        if let Some(info) = self.textures.get(path) {
            return *info;
        }
        // Failures are cached too so a missing file is reported once.
        let info = self.load(path);
        self.textures.insert(path.to_string(), info);
        info
    }

    fn blit(&mut self, texture: TextureId, src: Rect, dst: Rect, flip: Flip) {
        self.blits += 1;
        trace!(texture = texture.0, ?src, ?dst, ?flip, "blit");
    }
}
