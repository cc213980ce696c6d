use std::cell::RefCell;
use std::collections::BTreeSet;

use engine::MapTarget;
use foundation::ViewportId;
use viewport::{
    Display, DocumentHost, HostError, MAP_CONTAINER_CLASS, ViewportTemplate, map_target_id,
};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

/// Viewport containers as `div`s appended to one root element of the page.
#[derive(Debug)]
pub struct DomHost {
    root_id: String,
    ids: RefCell<BTreeSet<ViewportId>>,
}

impl DomHost {
    pub fn new(root_id: impl Into<String>) -> Self {
        Self {
            root_id: root_id.into(),
            ids: RefCell::new(BTreeSet::new()),
        }
    }

    fn container(&self, id: ViewportId) -> Result<Element, HostError> {
        document()?
            .get_element_by_id(&id.to_string())
            .ok_or(HostError::NoSuchContainer(id))
    }

    fn styled(&self, id: ViewportId) -> Result<HtmlElement, HostError> {
        self.container(id)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| HostError::Dom(format!("{id} is not an html element")))
    }
}

fn document() -> Result<Document, HostError> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| HostError::Dom("no document".to_string()))
}

fn dom_err(err: wasm_bindgen::JsValue) -> HostError {
    HostError::Dom(format!("{err:?}"))
}

impl DocumentHost for DomHost {
    fn create_container(&self, id: ViewportId) -> Result<(), HostError> {
        if self.ids.borrow().contains(&id) {
            return Err(HostError::ContainerExists(id));
        }
        let doc = document()?;
        let root = doc
            .get_element_by_id(&self.root_id)
            .ok_or_else(|| HostError::Dom(format!("missing #{}", self.root_id)))?;
        let div = doc.create_element("div").map_err(dom_err)?;
        div.set_id(&id.to_string());
        root.append_child(&div).map_err(dom_err)?;
        self.ids.borrow_mut().insert(id);
        Ok(())
    }

    fn mount_template(
        &self,
        id: ViewportId,
        template: &ViewportTemplate,
    ) -> Result<MapTarget, HostError> {
        let container = self.container(id)?;
        container.set_inner_html(template.markup());
        let map_node = container
            .query_selector(&format!(".{MAP_CONTAINER_CLASS}"))
            .map_err(dom_err)?
            .ok_or_else(|| HostError::Dom(format!("{id}: no .{MAP_CONTAINER_CLASS} after mount")))?;
        let target = MapTarget::new(map_target_id(id));
        map_node.set_id(&target.element_id);
        Ok(target)
    }

    fn set_display(&self, id: ViewportId, display: Display) -> Result<(), HostError> {
        self.styled(id)?
            .style()
            .set_property("display", display.css())
            .map_err(dom_err)
    }

    fn display(&self, id: ViewportId) -> Option<Display> {
        let value = self
            .styled(id)
            .ok()?
            .style()
            .get_property_value("display")
            .ok()?;
        Some(if value == "none" {
            Display::None
        } else {
            Display::Block
        })
    }

    fn remove_container(&self, id: ViewportId) -> bool {
        if !self.ids.borrow_mut().remove(&id) {
            return false;
        }
        if let Ok(el) = self.container(id) {
            el.remove();
        }
        true
    }

    fn contains(&self, id: ViewportId) -> bool {
        self.ids.borrow().contains(&id)
    }

    fn container_count(&self) -> usize {
        self.ids.borrow().len()
    }
}
