use std::cell::RefCell;
use std::rc::Rc;

use engine::MapEngineFactory;
use foundation::IdAllocator;
use layers::ChannelLayer;
use runtime::EventLoop;

use crate::app::AppInstance;
use crate::error::ViewportError;
use crate::host::DocumentHost;
use crate::selection::MapObjectSelectionHandler;
use crate::state::{SERIALIZATION_VERSION, SerializedViewport};
use crate::template::{TemplateLoader, VIEWPORT_TEMPLATE_URL};
use crate::viewport::{Viewport, ViewportServices};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewportConfig {
    pub template_url: String,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            template_url: VIEWPORT_TEMPLATE_URL.to_string(),
        }
    }
}

/// Creates viewports wired to one document host, template loader and
/// engine factory.
pub struct ViewportFactory {
    services: Rc<ViewportServices>,
    ids: IdAllocator,
}

impl ViewportFactory {
    pub fn new(
        event_loop: &EventLoop,
        host: Rc<dyn DocumentHost>,
        templates: Rc<dyn TemplateLoader>,
        engines: Rc<dyn MapEngineFactory>,
    ) -> Self {
        Self::with_config(event_loop, host, templates, engines, ViewportConfig::default())
    }

    pub fn with_config(
        event_loop: &EventLoop,
        host: Rc<dyn DocumentHost>,
        templates: Rc<dyn TemplateLoader>,
        engines: Rc<dyn MapEngineFactory>,
        config: ViewportConfig,
    ) -> Self {
        Self {
            services: Rc::new(ViewportServices {
                event_loop: event_loop.clone(),
                host,
                templates,
                engines,
                template_url: config.template_url,
            }),
            ids: IdAllocator::new(),
        }
    }

    pub fn event_loop(&self) -> &EventLoop {
        &self.services.event_loop
    }

    pub fn host(&self) -> &Rc<dyn DocumentHost> {
        &self.services.host
    }

    /// Pure construction: nothing touches the document until
    /// [`Viewport::inject_into_document_and_attach`].
    pub fn create(&self, app: Option<Rc<AppInstance>>) -> Viewport {
        Viewport::new(self.ids.next_viewport(), app, self.services.clone())
    }

    /// Builds, injects and repopulates a viewport from a serialized one.
    ///
    /// Channel layers are re-added before object layers; the saved view is
    /// installed after them so it wins over the Zoomify default.
    pub fn restore(
        &self,
        state: &SerializedViewport,
        app: Rc<AppInstance>,
    ) -> Result<Viewport, ViewportError> {
        if state.version != SERIALIZATION_VERSION {
            return Err(ViewportError::UnsupportedVersion(state.version));
        }

        let mut vp = self.create(Some(app.clone()));
        vp.inject_into_document_and_attach(app)?;
        for options in &state.channel_layers {
            vp.add_channel_layer(ChannelLayer::new(options.clone()))?;
        }
        for layer in &state.object_layers {
            vp.add_object_layer(layer.to_layer())?;
        }
        if let Some(selection) = &state.selection {
            let handler = MapObjectSelectionHandler::from_state(selection);
            vp.set_selection_handler(Rc::new(RefCell::new(handler)))?;
        }
        vp.set_view(state.view.clone())?;
        if !state.visible {
            vp.hide()?;
        }
        Ok(vp)
    }
}
