use layers::symbology::Rgba;
use layers::{ChannelLayer, Layer, LayerId, ObjectLayer};
use serde::Serialize;

/// Vector source handed to the engine for an object layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorLayerSpec {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
    pub stroke_color: Rgba,
    pub stroke_width: f32,
    pub fill_color: Option<Rgba>,
    pub outlines: Vec<(u32, Vec<[f64; 2]>)>,
    pub fill_triangles: Vec<[f64; 2]>,
}

/// Zoomify tile source handed to the engine for a channel layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayerSpec {
    pub id: LayerId,
    pub name: String,
    pub pyramid_path: String,
    pub image_size: [u32; 2],
    pub tile_size: u32,
    pub resolutions: Vec<f64>,
    pub color: Rgba,
    pub opacity: f32,
    pub visible: bool,
    pub additive: bool,
    pub min: f32,
    pub max: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EngineLayer {
    Vector(VectorLayerSpec),
    Tile(TileLayerSpec),
}

impl EngineLayer {
    pub fn id(&self) -> LayerId {
        match self {
            EngineLayer::Vector(v) => v.id,
            EngineLayer::Tile(t) => t.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            EngineLayer::Vector(v) => &v.name,
            EngineLayer::Tile(t) => &t.name,
        }
    }

    pub fn is_tile(&self) -> bool {
        matches!(self, EngineLayer::Tile(_))
    }
}

impl From<&ObjectLayer> for EngineLayer {
    fn from(layer: &ObjectLayer) -> Self {
        let snapshot = layer.extract();
        EngineLayer::Vector(VectorLayerSpec {
            id: layer.id(),
            name: layer.name().to_string(),
            visible: layer.options.visible,
            stroke_color: layer.options.stroke_color,
            stroke_width: layer.options.stroke_width,
            fill_color: layer.options.fill_color,
            outlines: snapshot.outlines,
            fill_triangles: snapshot.fill_triangles,
        })
    }
}

impl From<&ChannelLayer> for EngineLayer {
    fn from(layer: &ChannelLayer) -> Self {
        let opts = layer.options();
        let grid = layer.tile_grid();
        EngineLayer::Tile(TileLayerSpec {
            id: layer.id(),
            name: opts.name.clone(),
            pyramid_path: opts.pyramid_path.clone(),
            image_size: opts.image_size,
            tile_size: grid.tile_size(),
            resolutions: grid.resolutions(),
            color: opts.color,
            opacity: opts.opacity,
            visible: opts.visible,
            additive: opts.additive,
            min: opts.min,
            max: opts.max,
        })
    }
}
