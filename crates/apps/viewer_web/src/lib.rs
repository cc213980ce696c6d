use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use console_error_panic_hook::set_once;
use foundation::ViewportId;
use layers::{
    ChannelLayer, ChannelLayerOptions, Layer, LayerId, MapObject, ObjectLayer, ObjectLayerOptions,
};
use runtime::EventLoop;
use viewport::{
    AppInstance, Experiment, MapObjectSelectionHandler, SelectionEvent, SerializedViewport,
    Viewport, ViewportFactory,
};
use wasm_bindgen::prelude::*;

mod adapter;
mod dom;
mod fetch;

pub use adapter::{JsMapEngine, JsMapEngineFactory, MapAdapter};
pub use dom::DomHost;
pub use fetch::FetchTemplateLoader;

struct ViewerState {
    event_loop: EventLoop,
    factory: ViewportFactory,
    app: Rc<AppInstance>,
    viewports: BTreeMap<u64, Viewport>,
}

thread_local! {
    static STATE: RefCell<Option<ViewerState>> = const { RefCell::new(None) };
}

fn js_err(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

/// Runs `f` against the viewer, then drains the event loop outside the
/// borrow so queued work may call back into these exports.
fn with_viewer<T>(f: impl FnOnce(&mut ViewerState) -> Result<T, JsValue>) -> Result<T, JsValue> {
    let (out, event_loop) = STATE.with(|state| {
        let mut state = state.borrow_mut();
        let viewer = state
            .as_mut()
            .ok_or_else(|| JsValue::from_str("viewer not initialized"))?;
        Ok::<_, JsValue>((f(viewer), viewer.event_loop.clone()))
    })?;
    event_loop.run_until_idle();
    out
}

fn viewport_mut(state: &mut ViewerState, id: u32) -> Result<&mut Viewport, JsValue> {
    state
        .viewports
        .get_mut(&u64::from(id))
        .ok_or_else(|| JsValue::from_str(&format!("unknown viewport {id}")))
}

/// Viewport and layer ids cross to JS as `u32` handles.
fn handle(kind: &str, id: u64) -> Result<u32, String> {
    u32::try_from(id).map_err(|_| format!("{kind} id {id} does not fit a u32 handle"))
}

fn insert(state: &mut ViewerState, mut vp: Viewport) -> Result<u32, JsValue> {
    let ViewportId(id) = vp.id();
    let js_id = match handle("viewport", id) {
        Ok(js_id) => js_id,
        Err(err) => {
            vp.destroy().map_err(js_err)?;
            return Err(js_err(err));
        }
    };
    state.viewports.insert(id, vp);
    Ok(js_id)
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Sets up the viewer for one experiment. Viewport containers are appended
/// to the element with id `root_id`.
#[wasm_bindgen]
pub fn init_viewer(root_id: &str, adapter: MapAdapter, experiment_json: &str) -> Result<(), JsValue> {
    let experiment: Experiment = serde_json::from_str(experiment_json).map_err(js_err)?;
    let event_loop = EventLoop::new();
    let factory = ViewportFactory::new(
        &event_loop,
        Rc::new(DomHost::new(root_id)),
        Rc::new(FetchTemplateLoader::new(&event_loop)),
        Rc::new(JsMapEngineFactory::new(adapter)),
    );
    STATE.with(|state| {
        *state.borrow_mut() = Some(ViewerState {
            event_loop,
            factory,
            app: Rc::new(AppInstance::new(experiment)),
            viewports: BTreeMap::new(),
        });
    });
    Ok(())
}

/// Creates and injects a viewport with a map-object selection handler.
#[wasm_bindgen]
pub fn create_viewport() -> Result<u32, JsValue> {
    with_viewer(|state| {
        let mut vp = state.factory.create(Some(state.app.clone()));
        vp.inject_into_document_and_attach(state.app.clone())
            .map_err(js_err)?;
        vp.set_selection_handler(Rc::new(RefCell::new(MapObjectSelectionHandler::new())))
            .map_err(js_err)?;
        insert(state, vp)
    })
}

#[wasm_bindgen]
pub fn add_channel_layer(viewport: u32, options_json: &str) -> Result<u32, JsValue> {
    let options: ChannelLayerOptions = serde_json::from_str(options_json).map_err(js_err)?;
    with_viewer(|state| {
        let layer = ChannelLayer::new(options);
        let LayerId(id) = layer.id();
        let js_id = handle("layer", id).map_err(js_err)?;
        viewport_mut(state, viewport)?
            .add_channel_layer(layer)
            .map_err(js_err)?;
        Ok(js_id)
    })
}

/// `objects_json` is a list of `{id, outline: [[x, y], ...]}`.
#[wasm_bindgen]
pub fn add_object_layer(
    viewport: u32,
    name: &str,
    options_json: &str,
    objects_json: &str,
) -> Result<u32, JsValue> {
    let options: ObjectLayerOptions = serde_json::from_str(options_json).map_err(js_err)?;
    let objects: Vec<MapObject> = serde_json::from_str(objects_json).map_err(js_err)?;
    with_viewer(|state| {
        let layer = ObjectLayer::new(name, options).with_objects(objects);
        let LayerId(id) = layer.id();
        let js_id = handle("layer", id).map_err(js_err)?;
        viewport_mut(state, viewport)?
            .add_object_layer(layer)
            .map_err(js_err)?;
        Ok(js_id)
    })
}

/// Removes an object or channel layer by the id returned when it was added.
#[wasm_bindgen]
pub fn remove_layer(viewport: u32, layer: u32) -> Result<bool, JsValue> {
    let id = LayerId(u64::from(layer));
    with_viewer(|state| {
        let vp = viewport_mut(state, viewport)?;
        if let Some(l) = vp.object_layers().iter().find(|l| l.id() == id).cloned() {
            return vp.remove_object_layer(&l).map_err(js_err);
        }
        if let Some(l) = vp.channel_layers().iter().find(|l| l.id() == id).cloned() {
            return vp.remove_channel_layer(&l).map_err(js_err);
        }
        Ok(false)
    })
}

#[wasm_bindgen]
pub fn set_viewport_visible(viewport: u32, visible: bool) -> Result<(), JsValue> {
    with_viewer(|state| {
        let vp = viewport_mut(state, viewport)?;
        let res = if visible { vp.show() } else { vp.hide() };
        res.map_err(js_err)
    })
}

/// Forwards a selection event (`{"kind": "select", ...}`) to the viewport's
/// handler. Returns whether the selection changed.
#[wasm_bindgen]
pub fn select(viewport: u32, event_json: &str) -> Result<bool, JsValue> {
    let event: SelectionEvent = serde_json::from_str(event_json).map_err(js_err)?;
    with_viewer(|state| {
        viewport_mut(state, viewport)?
            .dispatch_selection(&event)
            .map_err(js_err)
    })
}

#[wasm_bindgen]
pub fn destroy_viewport(viewport: u32) -> Result<(), JsValue> {
    with_viewer(|state| {
        let mut vp = state
            .viewports
            .remove(&u64::from(viewport))
            .ok_or_else(|| JsValue::from_str(&format!("unknown viewport {viewport}")))?;
        vp.destroy().map_err(js_err)
    })
}

/// Calls `callback` with the viewport's JSON once its map is ready.
#[wasm_bindgen]
pub fn serialize_viewport(viewport: u32, callback: js_sys::Function) -> Result<(), JsValue> {
    with_viewer(|state| {
        let saved = viewport_mut(state, viewport)?.serialize();
        saved.on_settled(move |res| {
            let json = res
                .map_err(|e| e.to_string())
                .and_then(|s| s.to_json().map_err(|e| e.to_string()));
            match json {
                Ok(json) => {
                    if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                        log(&format!("serialize callback failed: {err:?}"));
                    }
                }
                Err(err) => log(&format!("serialize failed: {err}")),
            }
        });
        Ok(())
    })
}

#[wasm_bindgen]
pub fn restore_viewport(json: &str) -> Result<u32, JsValue> {
    let saved = SerializedViewport::from_json(json).map_err(js_err)?;
    with_viewer(|state| {
        let mut vp = state
            .factory
            .restore(&saved, state.app.clone())
            .map_err(js_err)?;
        if vp.selection_handler().is_none() {
            vp.set_selection_handler(Rc::new(RefCell::new(MapObjectSelectionHandler::new())))
                .map_err(js_err)?;
        }
        insert(state, vp)
    })
}
