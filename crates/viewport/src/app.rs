use serde::{Deserialize, Serialize};

/// Experiment metadata as returned by `GET /api/experiments/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experiment {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Experiment {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
        }
    }
}

/// One opened experiment in the client. Viewports and tools hold it by `Rc`
/// and compare it by pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInstance {
    pub experiment: Experiment,
}

impl AppInstance {
    pub fn new(experiment: Experiment) -> Self {
        Self { experiment }
    }
}
