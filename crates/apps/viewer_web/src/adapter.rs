use std::cell::RefCell;
use std::rc::Rc;

use engine::{EngineError, EngineLayer, MapEngine, MapEngineFactory, MapTarget, SharedMap, View};
use layers::LayerId;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// Page-side map adapter wrapping the tiled-mapping library.
    ///
    /// Layers and views cross the boundary as JSON strings.
    #[derive(Debug, Clone)]
    pub type MapAdapter;

    #[wasm_bindgen(method, catch, js_name = createMap)]
    fn create_map(this: &MapAdapter, target: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = addLayer)]
    fn add_layer(this: &MapAdapter, map: &JsValue, layer: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = removeLayer)]
    fn remove_layer(this: &MapAdapter, map: &JsValue, layer_id: f64);

    #[wasm_bindgen(method, js_name = setView)]
    fn set_view(this: &MapAdapter, map: &JsValue, view: &str);

    #[wasm_bindgen(method, js_name = updateSize)]
    fn update_size(this: &MapAdapter, map: &JsValue);
}

fn backend(err: JsValue) -> EngineError {
    EngineError::Backend(format!("{err:?}"))
}

/// One JS map instance. Layer ids and the view are mirrored on this side so
/// queries do not cross into JS.
#[derive(Debug)]
pub struct JsMapEngine {
    adapter: MapAdapter,
    map: JsValue,
    layers: Vec<LayerId>,
    view: View,
}

impl MapEngine for JsMapEngine {
    fn add_layer(&mut self, layer: EngineLayer) -> Result<(), EngineError> {
        let id = layer.id();
        if self.layers.contains(&id) {
            return Err(EngineError::DuplicateLayer(id));
        }
        let json = serde_json::to_string(&layer).map_err(|e| EngineError::Backend(e.to_string()))?;
        self.adapter.add_layer(&self.map, &json).map_err(backend)?;
        self.layers.push(id);
        Ok(())
    }

    fn remove_layer(&mut self, id: LayerId) -> bool {
        let Some(pos) = self.layers.iter().position(|l| *l == id) else {
            return false;
        };
        self.layers.remove(pos);
        self.adapter.remove_layer(&self.map, id.0 as f64);
        true
    }

    fn layer_count(&self) -> usize {
        self.layers.len()
    }

    fn layer_ids(&self) -> Vec<LayerId> {
        self.layers.clone()
    }

    fn view(&self) -> &View {
        &self.view
    }

    fn set_view(&mut self, view: View) {
        match serde_json::to_string(&view) {
            Ok(json) => self.adapter.set_view(&self.map, &json),
            Err(err) => {
                web_sys::console::log_1(&JsValue::from_str(&format!("view encode failed: {err}")))
            }
        }
        self.view = view;
    }

    fn update_size(&mut self) {
        self.adapter.update_size(&self.map);
    }
}

#[derive(Debug, Clone)]
pub struct JsMapEngineFactory {
    adapter: MapAdapter,
}

impl JsMapEngineFactory {
    pub fn new(adapter: MapAdapter) -> Self {
        Self { adapter }
    }
}

impl MapEngineFactory for JsMapEngineFactory {
    fn create(&self, target: &MapTarget) -> Result<SharedMap, EngineError> {
        let map = self.adapter.create_map(&target.element_id).map_err(backend)?;
        if map.is_null() || map.is_undefined() {
            return Err(EngineError::TargetMissing(target.element_id.clone()));
        }
        Ok(Rc::new(RefCell::new(JsMapEngine {
            adapter: self.adapter.clone(),
            map,
            layers: Vec::new(),
            view: View::default(),
        })))
    }
}
