use engine::View;
use layers::{ChannelLayerOptions, MapObject, ObjectLayer, ObjectLayerOptions};
use serde::{Deserialize, Serialize};

use crate::selection::SelectionState;

pub const SERIALIZATION_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedObjectLayer {
    pub name: String,
    pub options: ObjectLayerOptions,
    #[serde(default)]
    pub objects: Vec<MapObject>,
}

impl From<&ObjectLayer> for SerializedObjectLayer {
    fn from(layer: &ObjectLayer) -> Self {
        use layers::Layer;
        Self {
            name: layer.name().to_string(),
            options: layer.options.clone(),
            objects: layer.objects().to_vec(),
        }
    }
}

impl SerializedObjectLayer {
    pub fn to_layer(&self) -> ObjectLayer {
        ObjectLayer::new(self.name.clone(), self.options.clone()).with_objects(self.objects.clone())
    }
}

/// Everything needed to rebuild a viewport: layers in display order, the
/// selection handler's state, and the map view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedViewport {
    pub version: u32,
    pub visible: bool,
    pub object_layers: Vec<SerializedObjectLayer>,
    pub channel_layers: Vec<ChannelLayerOptions>,
    pub selection: Option<SelectionState>,
    pub view: View,
}

impl SerializedViewport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
