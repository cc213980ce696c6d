use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level handle of a layer.
///
/// Every constructed layer gets a fresh id, so two layers are "the same layer"
/// exactly when their ids match (clones share the id).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub u64);

static NEXT_LAYER_ID: AtomicU64 = AtomicU64::new(1);

impl LayerId {
    pub fn fresh() -> Self {
        LayerId(NEXT_LAYER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Vector outlines of map objects.
    Objects,
    /// Tiled image pyramid of one imaging channel.
    Channel,
}

pub trait Layer {
    fn id(&self) -> LayerId;
    fn name(&self) -> &str;
    fn kind(&self) -> LayerKind;
}

#[cfg(test)]
mod tests {
    use super::LayerId;

    #[test]
    fn fresh_ids_are_unique() {
        let a = LayerId::fresh();
        let b = LayerId::fresh();
        assert_ne!(a, b);
        assert!(b > a);
    }
}
