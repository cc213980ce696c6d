use std::cell::RefCell;
use std::rc::Rc;

use layers::LayerId;

use crate::layer::EngineLayer;
use crate::view::View;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    DuplicateLayer(LayerId),
    TargetMissing(String),
    Backend(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::DuplicateLayer(id) => write!(f, "layer {} already on the map", id.0),
            EngineError::TargetMissing(target) => write!(f, "map target not found: {target}"),
            EngineError::Backend(msg) => write!(f, "map engine error: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Node the engine renders into (the `.map-container` of a viewport).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MapTarget {
    pub element_id: String,
}

impl MapTarget {
    pub fn new(element_id: impl Into<String>) -> Self {
        Self {
            element_id: element_id.into(),
        }
    }
}

/// Layer and view primitives of the tiled rendering engine.
///
/// Layers are stacked in insertion order; the last added is drawn on top.
pub trait MapEngine {
    fn add_layer(&mut self, layer: EngineLayer) -> Result<(), EngineError>;
    /// Returns `false` when no layer with `id` is on the map.
    fn remove_layer(&mut self, id: LayerId) -> bool;
    fn layer_count(&self) -> usize;
    fn layer_ids(&self) -> Vec<LayerId>;
    fn view(&self) -> &View;
    fn set_view(&mut self, view: View);
    /// Recomputes the render size after the target changed visibility or size.
    fn update_size(&mut self);
}

pub type SharedMap = Rc<RefCell<dyn MapEngine>>;

/// Builds one engine instance per viewport once its template is mounted.
pub trait MapEngineFactory {
    fn create(&self, target: &MapTarget) -> Result<SharedMap, EngineError>;
}
