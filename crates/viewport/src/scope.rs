use std::cell::Cell;
use std::rc::Rc;

use engine::MapTarget;
use foundation::ViewportId;

use crate::app::AppInstance;

/// The mounted viewport fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewportElement {
    pub viewport: ViewportId,
    pub root_class: String,
    pub map_target: MapTarget,
}

/// Context bound into a mounted viewport fragment.
#[derive(Debug)]
pub struct ElementScope {
    viewport: ViewportId,
    app_instance: Option<Rc<AppInstance>>,
    destroyed: Cell<bool>,
}

impl ElementScope {
    pub fn new(viewport: ViewportId, app_instance: Option<Rc<AppInstance>>) -> Self {
        Self {
            viewport,
            app_instance,
            destroyed: Cell::new(false),
        }
    }

    pub fn viewport(&self) -> ViewportId {
        self.viewport
    }

    pub fn app_instance(&self) -> Option<&Rc<AppInstance>> {
        self.app_instance.as_ref()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    pub fn destroy(&self) {
        self.destroyed.set(true);
    }
}
