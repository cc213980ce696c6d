use engine::EngineError;
use foundation::ViewportId;
use layers::LayerId;

use crate::template::TemplateError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    ContainerExists(ViewportId),
    NoSuchContainer(ViewportId),
    Dom(String),
}

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostError::ContainerExists(id) => write!(f, "container for {id} already exists"),
            HostError::NoSuchContainer(id) => write!(f, "no container for {id}"),
            HostError::Dom(msg) => write!(f, "document error: {msg}"),
        }
    }
}

impl std::error::Error for HostError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewportError {
    /// The operation needs a map, but the viewport was never injected.
    NotInjected,
    AlreadyInjected,
    Destroyed,
    DuplicateLayer(LayerId),
    UnsupportedVersion(u32),
    Template(TemplateError),
    Engine(EngineError),
    Host(HostError),
}

impl std::fmt::Display for ViewportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewportError::NotInjected => write!(f, "viewport not injected into a document"),
            ViewportError::AlreadyInjected => write!(f, "viewport already injected"),
            ViewportError::Destroyed => write!(f, "viewport destroyed"),
            ViewportError::DuplicateLayer(id) => {
                write!(f, "layer {} already added to this viewport", id.0)
            }
            ViewportError::UnsupportedVersion(v) => {
                write!(f, "unsupported serialized viewport version {v}")
            }
            ViewportError::Template(e) => write!(f, "{e}"),
            ViewportError::Engine(e) => write!(f, "{e}"),
            ViewportError::Host(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ViewportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewportError::Template(e) => Some(e),
            ViewportError::Engine(e) => Some(e),
            ViewportError::Host(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TemplateError> for ViewportError {
    fn from(e: TemplateError) -> Self {
        ViewportError::Template(e)
    }
}

impl From<EngineError> for ViewportError {
    fn from(e: EngineError) -> Self {
        ViewportError::Engine(e)
    }
}

impl From<HostError> for ViewportError {
    fn from(e: HostError) -> Self {
        ViewportError::Host(e)
    }
}
