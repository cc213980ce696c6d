use std::cell::{Cell, RefCell};
use std::rc::Rc;

use engine::{EngineLayer, MapEngine, MapEngineFactory, SharedMap, View};
use foundation::ViewportId;
use layers::{ChannelLayer, Layer, ObjectLayer};
use runtime::{CancellationToken, Deferred, EventLoop, Promise, deferred};
use tracing::{debug, warn};

use crate::app::AppInstance;
use crate::error::ViewportError;
use crate::host::{Display, DocumentHost};
use crate::scope::{ElementScope, ViewportElement};
use crate::selection::{SelectionEvent, SelectionHandler};
use crate::state::{SERIALIZATION_VERSION, SerializedObjectLayer, SerializedViewport};
use crate::template::{TemplateError, TemplateLoader, ViewportTemplate};

/// `Uninjected → Injecting → Ready | Failed → Destroyed`.
///
/// Layer mutations are accepted in every state but `Destroyed`; before
/// `Ready` they are queued against the `map` promise.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Lifecycle {
    Uninjected,
    Injecting,
    Ready,
    /// Template or engine construction failed; the rejected promises say why.
    Failed,
    Destroyed,
}

pub type SharedSelectionHandler = Rc<RefCell<dyn SelectionHandler>>;

/// Collaborators shared by every viewport of one factory.
pub(crate) struct ViewportServices {
    pub event_loop: EventLoop,
    pub host: Rc<dyn DocumentHost>,
    pub templates: Rc<dyn TemplateLoader>,
    pub engines: Rc<dyn MapEngineFactory>,
    pub template_url: String,
}

struct PendingHandles {
    map: Deferred<SharedMap, ViewportError>,
    element: Deferred<Rc<ViewportElement>, ViewportError>,
    scope: Deferred<Rc<ElementScope>, ViewportError>,
}

impl PendingHandles {
    fn reject_all(&self, err: ViewportError) {
        let _ = self.element.reject(err.clone());
        let _ = self.scope.reject(err.clone());
        let _ = self.map.reject(err);
    }
}

pub struct Viewport {
    id: ViewportId,
    app: Option<Rc<AppInstance>>,
    services: Rc<ViewportServices>,
    lifecycle: Rc<Cell<Lifecycle>>,
    cancel: CancellationToken,
    pending: Option<PendingHandles>,
    map: Promise<SharedMap, ViewportError>,
    element: Promise<Rc<ViewportElement>, ViewportError>,
    element_scope: Promise<Rc<ElementScope>, ViewportError>,
    object_layers: Vec<ObjectLayer>,
    channel_layers: Vec<ChannelLayer>,
    selection_handler: Option<SharedSelectionHandler>,
    visible: bool,
    view_installed: bool,
}

impl std::fmt::Debug for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewport")
            .field("id", &self.id)
            .field("lifecycle", &self.lifecycle.get())
            .field("object_layers", &self.object_layers.len())
            .field("channel_layers", &self.channel_layers.len())
            .field("visible", &self.visible)
            .finish()
    }
}

impl Viewport {
    pub(crate) fn new(
        id: ViewportId,
        app: Option<Rc<AppInstance>>,
        services: Rc<ViewportServices>,
    ) -> Self {
        let (map_d, map) = deferred(&services.event_loop);
        let (element_d, element) = deferred(&services.event_loop);
        let (scope_d, element_scope) = deferred(&services.event_loop);
        Self {
            id,
            app,
            services,
            lifecycle: Rc::new(Cell::new(Lifecycle::Uninjected)),
            cancel: CancellationToken::new(),
            pending: Some(PendingHandles {
                map: map_d,
                element: element_d,
                scope: scope_d,
            }),
            map,
            element,
            element_scope,
            object_layers: Vec::new(),
            channel_layers: Vec::new(),
            selection_handler: None,
            visible: true,
            view_installed: false,
        }
    }

    pub fn id(&self) -> ViewportId {
        self.id
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle.get()
    }

    pub fn is_destroyed(&self) -> bool {
        self.lifecycle() == Lifecycle::Destroyed
    }

    pub fn app_instance(&self) -> Option<&Rc<AppInstance>> {
        self.app.as_ref()
    }

    pub fn map(&self) -> Promise<SharedMap, ViewportError> {
        self.map.clone()
    }

    pub fn element(&self) -> Promise<Rc<ViewportElement>, ViewportError> {
        self.element.clone()
    }

    pub fn element_scope(&self) -> Promise<Rc<ElementScope>, ViewportError> {
        self.element_scope.clone()
    }

    pub fn object_layers(&self) -> &[ObjectLayer] {
        &self.object_layers
    }

    pub fn channel_layers(&self) -> &[ChannelLayer] {
        &self.channel_layers
    }

    pub fn selection_handler(&self) -> Option<&SharedSelectionHandler> {
        self.selection_handler.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Creates the container, then loads the template, mounts it and builds
    /// the map engine. `element`, `element_scope` and `map` settle in that
    /// order once the template request completes.
    pub fn inject_into_document_and_attach(
        &mut self,
        app: Rc<AppInstance>,
    ) -> Result<(), ViewportError> {
        match self.lifecycle.get() {
            Lifecycle::Uninjected => {}
            Lifecycle::Destroyed => return Err(ViewportError::Destroyed),
            _ => return Err(ViewportError::AlreadyInjected),
        }
        let Some(pending) = self.pending.take() else {
            return Err(ViewportError::AlreadyInjected);
        };

        let host = self.services.host.clone();
        if let Err(err) = host.create_container(self.id) {
            self.pending = Some(pending);
            return Err(err.into());
        }
        if !self.visible {
            if let Err(err) = host.set_display(self.id, Display::None) {
                warn!(viewport = %self.id, error = %err, "could not hide new container");
            }
        }

        self.app = Some(app.clone());
        self.lifecycle.set(Lifecycle::Injecting);
        debug!(viewport = %self.id, url = %self.services.template_url, "injecting viewport");

        let attach = Attach {
            id: self.id,
            app,
            host,
            engines: self.services.engines.clone(),
            lifecycle: self.lifecycle.clone(),
            cancel: self.cancel.clone(),
        };
        self.services
            .templates
            .load(&self.services.template_url)
            .on_settled(move |res| attach.finish(res, pending));
        Ok(())
    }

    pub fn set_selection_handler(
        &mut self,
        handler: SharedSelectionHandler,
    ) -> Result<(), ViewportError> {
        self.ensure_usable()?;
        self.selection_handler = Some(handler);
        Ok(())
    }

    /// Forwards a selection gesture to the handler. Returns whether the
    /// selection changed; `false` when no handler is set.
    pub fn dispatch_selection(&self, event: &SelectionEvent) -> Result<bool, ViewportError> {
        self.ensure_usable()?;
        Ok(self
            .selection_handler
            .as_ref()
            .is_some_and(|h| h.borrow_mut().handle(event)))
    }

    pub fn add_object_layer(&mut self, layer: ObjectLayer) -> Result<(), ViewportError> {
        self.ensure_usable()?;
        if self.object_layers.iter().any(|l| l.id() == layer.id()) {
            return Err(ViewportError::DuplicateLayer(layer.id()));
        }
        let descriptor = EngineLayer::from(&layer);
        self.object_layers.push(layer);
        self.queue_add(descriptor);
        Ok(())
    }

    /// Returns `Ok(false)` if the layer was never added.
    pub fn remove_object_layer(&mut self, layer: &ObjectLayer) -> Result<bool, ViewportError> {
        self.ensure_usable()?;
        let Some(pos) = self.object_layers.iter().position(|l| l.id() == layer.id()) else {
            debug!(viewport = %self.id, layer = layer.id().0, "object layer not on viewport");
            return Ok(false);
        };
        let removed = self.object_layers.remove(pos);
        self.queue_remove(removed.id());
        Ok(true)
    }

    /// The first channel layer ever added also installs a Zoomify view sized
    /// from its image.
    pub fn add_channel_layer(&mut self, layer: ChannelLayer) -> Result<(), ViewportError> {
        self.ensure_usable()?;
        if self.channel_layers.iter().any(|l| l.id() == layer.id()) {
            return Err(ViewportError::DuplicateLayer(layer.id()));
        }
        if !self.view_installed {
            self.view_installed = true;
            let view = View::zoomify(layer.tile_grid());
            self.with_map(move |map| map.borrow_mut().set_view(view));
        }
        let descriptor = EngineLayer::from(&layer);
        self.channel_layers.push(layer);
        self.queue_add(descriptor);
        Ok(())
    }

    /// Returns `Ok(false)` if the layer was never added.
    pub fn remove_channel_layer(&mut self, layer: &ChannelLayer) -> Result<bool, ViewportError> {
        self.ensure_usable()?;
        let Some(pos) = self.channel_layers.iter().position(|l| l.id() == layer.id()) else {
            debug!(viewport = %self.id, layer = layer.id().0, "channel layer not on viewport");
            return Ok(false);
        };
        let removed = self.channel_layers.remove(pos);
        self.queue_remove(removed.id());
        Ok(true)
    }

    /// Replaces the map view. Later channel layers keep this view.
    pub fn set_view(&mut self, view: View) -> Result<(), ViewportError> {
        self.ensure_usable()?;
        self.view_installed = true;
        self.with_map(move |map| map.borrow_mut().set_view(view));
        Ok(())
    }

    pub fn hide(&mut self) -> Result<(), ViewportError> {
        self.set_visible(false)
    }

    pub fn show(&mut self) -> Result<(), ViewportError> {
        self.set_visible(true)?;
        self.with_map(|map| map.borrow_mut().update_size());
        Ok(())
    }

    /// Removes the container and marks the scope destroyed. Template loads
    /// still in flight are dropped and their promises reject with
    /// [`ViewportError::Destroyed`].
    pub fn destroy(&mut self) -> Result<(), ViewportError> {
        self.ensure_usable()?;
        self.lifecycle.set(Lifecycle::Destroyed);
        self.cancel.cancel();
        if let Some(pending) = self.pending.take() {
            pending.reject_all(ViewportError::Destroyed);
        }
        self.element_scope.then(|scope| scope.destroy());
        let removed = self.services.host.remove_container(self.id);
        debug!(viewport = %self.id, removed, "viewport destroyed");
        Ok(())
    }

    /// Captures layers and selection now and the map view once `map`
    /// resolves (after every engine operation queued before this call).
    /// A viewport that was never injected has no map and rejects with
    /// [`ViewportError::NotInjected`].
    pub fn serialize(&self) -> Promise<SerializedViewport, ViewportError> {
        let rejection = match self.lifecycle() {
            Lifecycle::Destroyed => Some(ViewportError::Destroyed),
            Lifecycle::Uninjected => Some(ViewportError::NotInjected),
            _ => None,
        };
        if let Some(err) = rejection {
            return Promise::rejected(&self.services.event_loop, err);
        }
        let object_layers: Vec<SerializedObjectLayer> = self
            .object_layers
            .iter()
            .map(SerializedObjectLayer::from)
            .collect();
        let channel_layers = self
            .channel_layers
            .iter()
            .map(|l| l.options().clone())
            .collect();
        let selection = self.selection_handler.as_ref().map(|h| h.borrow().state());
        let visible = self.visible;

        self.map.map(move |map| SerializedViewport {
            version: SERIALIZATION_VERSION,
            visible,
            object_layers,
            channel_layers,
            selection,
            view: map.borrow().view().clone(),
        })
    }

    fn ensure_usable(&self) -> Result<(), ViewportError> {
        if self.is_destroyed() {
            Err(ViewportError::Destroyed)
        } else {
            Ok(())
        }
    }

    fn set_visible(&mut self, visible: bool) -> Result<(), ViewportError> {
        self.ensure_usable()?;
        self.visible = visible;
        let host = &self.services.host;
        if host.contains(self.id) {
            host.set_display(self.id, Display::from_visible(visible))?;
        }
        Ok(())
    }

    fn with_map(&self, f: impl FnOnce(&SharedMap) + 'static) {
        let cancel = self.cancel.clone();
        self.map.then(move |map| {
            if !cancel.is_cancelled() {
                f(map);
            }
        });
    }

    fn queue_add(&self, descriptor: EngineLayer) {
        let id = self.id;
        self.with_map(move |map| {
            if let Err(err) = map.borrow_mut().add_layer(descriptor) {
                warn!(viewport = %id, error = %err, "engine rejected layer");
            }
        });
    }

    fn queue_remove(&self, layer: layers::LayerId) {
        self.with_map(move |map| {
            map.borrow_mut().remove_layer(layer);
        });
    }
}

/// Completion of an injection, run when the template request settles.
struct Attach {
    id: ViewportId,
    app: Rc<AppInstance>,
    host: Rc<dyn DocumentHost>,
    engines: Rc<dyn MapEngineFactory>,
    lifecycle: Rc<Cell<Lifecycle>>,
    cancel: CancellationToken,
}

impl Attach {
    fn finish(self, res: Result<&String, &TemplateError>, pending: PendingHandles) {
        if self.cancel.is_cancelled() {
            debug!(viewport = %self.id, "template settled after destroy; dropping");
            pending.reject_all(ViewportError::Destroyed);
            return;
        }

        let mounted = res
            .map_err(|e| ViewportError::Template(e.clone()))
            .and_then(|markup| ViewportTemplate::parse(markup).map_err(ViewportError::from))
            .and_then(|template| -> Result<_, ViewportError> {
                let target = self.host.mount_template(self.id, &template)?;
                Ok((template, target))
            });
        let (template, target) = match mounted {
            Ok(v) => v,
            Err(err) => {
                warn!(viewport = %self.id, error = %err, "viewport template failed");
                self.lifecycle.set(Lifecycle::Failed);
                pending.reject_all(err);
                return;
            }
        };

        let element = Rc::new(ViewportElement {
            viewport: self.id,
            root_class: template.root_class().to_string(),
            map_target: target.clone(),
        });
        let scope = Rc::new(ElementScope::new(self.id, Some(self.app.clone())));
        let _ = pending.element.resolve(element);
        let _ = pending.scope.resolve(scope);

        match self.engines.create(&target) {
            Ok(map) => {
                let _ = pending.map.resolve(map);
                self.lifecycle.set(Lifecycle::Ready);
                debug!(viewport = %self.id, target = %target.element_id, "viewport ready");
            }
            Err(err) => {
                warn!(viewport = %self.id, error = %err, "map engine construction failed");
                self.lifecycle.set(Lifecycle::Failed);
                let _ = pending.map.reject(ViewportError::Engine(err));
            }
        }
    }
}

