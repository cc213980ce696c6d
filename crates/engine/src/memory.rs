use std::cell::RefCell;
use std::rc::Rc;

use layers::LayerId;

use crate::engine::{EngineError, MapEngine, MapEngineFactory, MapTarget, SharedMap};
use crate::layer::EngineLayer;
use crate::view::View;

/// Headless engine keeping the layer stack and view in memory.
#[derive(Debug, Default)]
pub struct MemoryMap {
    target: Option<MapTarget>,
    layers: Vec<EngineLayer>,
    view: View,
    size_updates: u32,
}

impl MemoryMap {
    pub fn new(target: MapTarget) -> Self {
        Self {
            target: Some(target),
            ..Self::default()
        }
    }

    pub fn target(&self) -> Option<&MapTarget> {
        self.target.as_ref()
    }

    pub fn layers(&self) -> &[EngineLayer] {
        &self.layers
    }

    pub fn size_updates(&self) -> u32 {
        self.size_updates
    }
}

impl MapEngine for MemoryMap {
    fn add_layer(&mut self, layer: EngineLayer) -> Result<(), EngineError> {
        if self.layers.iter().any(|l| l.id() == layer.id()) {
            return Err(EngineError::DuplicateLayer(layer.id()));
        }
        self.layers.push(layer);
        Ok(())
    }

    fn remove_layer(&mut self, id: LayerId) -> bool {
        let Some(pos) = self.layers.iter().position(|l| l.id() == id) else {
            return false;
        };
        self.layers.remove(pos);
        true
    }

    fn layer_count(&self) -> usize {
        self.layers.len()
    }

    fn layer_ids(&self) -> Vec<LayerId> {
        self.layers.iter().map(EngineLayer::id).collect()
    }

    fn view(&self) -> &View {
        &self.view
    }

    fn set_view(&mut self, view: View) {
        self.view = view;
    }

    fn update_size(&mut self) {
        self.size_updates += 1;
    }
}

/// Creates [`MemoryMap`]s and remembers them so hosts and tests can inspect
/// the engines handed out.
#[derive(Default)]
pub struct MemoryMapFactory {
    fail_with: Option<EngineError>,
    created: RefCell<Vec<Rc<RefCell<MemoryMap>>>>,
}

impl MemoryMapFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory whose every `create` call fails with `err`.
    pub fn failing(err: EngineError) -> Self {
        Self {
            fail_with: Some(err),
            created: RefCell::new(Vec::new()),
        }
    }

    pub fn created(&self) -> Vec<Rc<RefCell<MemoryMap>>> {
        self.created.borrow().clone()
    }
}

impl MapEngineFactory for MemoryMapFactory {
    fn create(&self, target: &MapTarget) -> Result<SharedMap, EngineError> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        let map = Rc::new(RefCell::new(MemoryMap::new(target.clone())));
        self.created.borrow_mut().push(map.clone());
        Ok(map)
    }
}
