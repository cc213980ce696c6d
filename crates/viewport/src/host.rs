//! Registry of viewport containers in the hosting document.
//!
//! Each viewport owns exactly one container keyed by its [`ViewportId`];
//! all mutations are scoped to that container.

use std::cell::RefCell;
use std::collections::BTreeMap;

use engine::MapTarget;
use foundation::ViewportId;

use crate::error::HostError;
use crate::template::ViewportTemplate;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Display {
    Block,
    None,
}

impl Display {
    pub fn from_visible(visible: bool) -> Self {
        if visible { Display::Block } else { Display::None }
    }

    pub fn css(self) -> &'static str {
        match self {
            Display::Block => "block",
            Display::None => "none",
        }
    }
}

pub trait DocumentHost {
    /// Appends an empty container for `id` to the shared viewport region.
    fn create_container(&self, id: ViewportId) -> Result<(), HostError>;
    /// Fills the container with the viewport template and returns the node
    /// the map engine renders into.
    fn mount_template(
        &self,
        id: ViewportId,
        template: &ViewportTemplate,
    ) -> Result<MapTarget, HostError>;
    fn set_display(&self, id: ViewportId, display: Display) -> Result<(), HostError>;
    fn display(&self, id: ViewportId) -> Option<Display>;
    /// Returns `false` if there was no container for `id`.
    fn remove_container(&self, id: ViewportId) -> bool;
    fn contains(&self, id: ViewportId) -> bool;
    fn container_count(&self) -> usize;
}

pub fn map_target_id(id: ViewportId) -> String {
    format!("{id}-map")
}

#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub display: Display,
    pub root_class: Option<String>,
    pub markup: Option<String>,
    pub map_target: Option<MapTarget>,
}

/// Document host without a DOM, used headless and in tests.
#[derive(Debug, Default)]
pub struct MemoryHost {
    containers: RefCell<BTreeMap<ViewportId, Container>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn container(&self, id: ViewportId) -> Option<Container> {
        self.containers.borrow().get(&id).cloned()
    }

    /// Containers whose mounted root element carries `class`.
    pub fn count_with_root_class(&self, class: &str) -> usize {
        self.containers
            .borrow()
            .values()
            .filter(|c| c.root_class.as_deref() == Some(class))
            .count()
    }
}

impl DocumentHost for MemoryHost {
    fn create_container(&self, id: ViewportId) -> Result<(), HostError> {
        let mut containers = self.containers.borrow_mut();
        if containers.contains_key(&id) {
            return Err(HostError::ContainerExists(id));
        }
        containers.insert(
            id,
            Container {
                display: Display::Block,
                root_class: None,
                markup: None,
                map_target: None,
            },
        );
        Ok(())
    }

    fn mount_template(
        &self,
        id: ViewportId,
        template: &ViewportTemplate,
    ) -> Result<MapTarget, HostError> {
        let mut containers = self.containers.borrow_mut();
        let container = containers
            .get_mut(&id)
            .ok_or(HostError::NoSuchContainer(id))?;
        let target = MapTarget::new(map_target_id(id));
        container.root_class = Some(template.root_class().to_string());
        container.markup = Some(template.markup().to_string());
        container.map_target = Some(target.clone());
        Ok(target)
    }

    fn set_display(&self, id: ViewportId, display: Display) -> Result<(), HostError> {
        let mut containers = self.containers.borrow_mut();
        let container = containers
            .get_mut(&id)
            .ok_or(HostError::NoSuchContainer(id))?;
        container.display = display;
        Ok(())
    }

    fn display(&self, id: ViewportId) -> Option<Display> {
        self.containers.borrow().get(&id).map(|c| c.display)
    }

    fn remove_container(&self, id: ViewportId) -> bool {
        self.containers.borrow_mut().remove(&id).is_some()
    }

    fn contains(&self, id: ViewportId) -> bool {
        self.containers.borrow().contains_key(&id)
    }

    fn container_count(&self) -> usize {
        self.containers.borrow().len()
    }
}
