use serde::{Deserialize, Serialize};

use crate::layer::{Layer, LayerId, LayerKind};
use crate::symbology::{Rgba, default_white};
use crate::zoomify::{DEFAULT_TILE_SIZE, TileGrid};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelLayerOptions {
    pub name: String,
    /// Full-resolution image size `[width, height]` in pixels.
    pub image_size: [u32; 2],
    /// Location of the Zoomify pyramid (folder holding `TileGroupN/`).
    pub pyramid_path: String,
    #[serde(default = "default_white")]
    pub color: Rgba,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Blend additively with the channels below.
    #[serde(default)]
    pub additive: bool,
    /// Intensity window, normalized to `[0, 1]`.
    #[serde(default)]
    pub min: f32,
    #[serde(default = "default_max")]
    pub max: f32,
}

fn default_opacity() -> f32 {
    1.0
}

fn default_visible() -> bool {
    true
}

fn default_max() -> f32 {
    1.0
}

impl ChannelLayerOptions {
    pub fn new(name: impl Into<String>, image_size: [u32; 2], pyramid_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image_size,
            pyramid_path: pyramid_path.into(),
            color: default_white(),
            opacity: default_opacity(),
            visible: default_visible(),
            additive: false,
            min: 0.0,
            max: default_max(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelLayer {
    id: LayerId,
    options: ChannelLayerOptions,
    grid: TileGrid,
}

impl ChannelLayer {
    pub fn new(options: ChannelLayerOptions) -> Self {
        let grid = TileGrid::new(options.image_size, DEFAULT_TILE_SIZE);
        Self {
            id: LayerId::fresh(),
            options,
            grid,
        }
    }

    pub fn options(&self) -> &ChannelLayerOptions {
        &self.options
    }

    pub fn image_size(&self) -> [u32; 2] {
        self.options.image_size
    }

    pub fn pyramid_path(&self) -> &str {
        &self.options.pyramid_path
    }

    pub fn tile_grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn tile_url(&self, z: u8, x: u32, y: u32) -> Option<String> {
        self.grid.tile_url(&self.options.pyramid_path, z, x, y)
    }
}

impl Layer for ChannelLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn name(&self) -> &str {
        &self.options.name
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Channel
    }
}
