use std::collections::BTreeMap;

use foundation::Extent;
use layers::zoomify::TileGrid;
use layers::{MapObject, ObjectLayer, ObjectLayerOptions};
use serde::Serialize;

use crate::error::ToolError;

/// Layout of a Zoomify pyramid, as printed by `tmaps zoomify`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoomifySummary {
    pub image_size: [u32; 2],
    pub tile_size: u32,
    pub tiers: Vec<[u32; 2]>,
    pub resolutions: Vec<f64>,
    pub extent: Extent,
    pub total_tiles: u64,
    pub first_tile: Option<String>,
}

pub fn zoomify_summary(
    image_size: [u32; 2],
    pyramid_path: &str,
    tile_size: u32,
) -> Result<ZoomifySummary, ToolError> {
    if image_size.contains(&0) || tile_size == 0 {
        return Err(ToolError::InvalidArgument(
            "width, height and tile size must be positive".to_string(),
        ));
    }
    let grid = TileGrid::new(image_size, tile_size);
    Ok(ZoomifySummary {
        image_size: grid.image_size(),
        tile_size: grid.tile_size(),
        tiers: (0..=grid.max_zoom())
            .filter_map(|z| grid.tier_size(z))
            .collect(),
        resolutions: grid.resolutions(),
        extent: grid.extent(),
        total_tiles: grid.total_tiles(),
        first_tile: grid.tile_url(pyramid_path, 0, 0, 0),
    })
}

/// Per-type overview of the map objects of an experiment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectTypeSummary {
    pub object_type: String,
    pub count: usize,
    /// `None` when no object of the type has an outline.
    pub bounds: Option<Extent>,
}

/// Builds one object layer per type, the way a viewport would show them,
/// and reports how many objects each holds and the area they cover.
pub fn object_summaries(objects: BTreeMap<String, Vec<MapObject>>) -> Vec<ObjectTypeSummary> {
    objects
        .into_iter()
        .map(|(object_type, objects)| {
            let options = ObjectLayerOptions {
                object_type: Some(object_type.clone()),
                ..Default::default()
            };
            let layer = ObjectLayer::new(object_type.clone(), options).with_objects(objects);
            ObjectTypeSummary {
                count: layer.object_count(),
                bounds: layer.bounds(),
                object_type,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use foundation::Extent;
    use layers::MapObject;

    use super::{object_summaries, zoomify_summary};
    use crate::error::ToolError;

    #[test]
    fn zoomify_summary_describes_every_tier() {
        let s = zoomify_summary([1000, 600], "/pyramids/DAPI", 256).unwrap();
        assert_eq!(s.tiers, vec![[1, 1], [2, 2], [4, 3]]);
        assert_eq!(s.resolutions, vec![4.0, 2.0, 1.0]);
        assert_eq!(s.total_tiles, 17);
        assert_eq!(s.extent, Extent::for_image([1000, 600]));
        assert_eq!(
            s.first_tile.as_deref(),
            Some("/pyramids/DAPI/TileGroup0/0-0-0.jpg")
        );

        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["tile_size"], 256);
        assert_eq!(json["tiers"][2], serde_json::json!([4, 3]));
    }

    #[test]
    fn zoomify_summary_rejects_empty_sizes() {
        for (size, tile) in [([0, 10], 256), ([10, 0], 256), ([10, 10], 0)] {
            assert!(matches!(
                zoomify_summary(size, "/p", tile),
                Err(ToolError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn object_summaries_count_and_bound_each_type() {
        let mut objects = BTreeMap::new();
        objects.insert(
            "cells".to_string(),
            vec![
                MapObject {
                    id: 2,
                    outline: vec![[5.0, -5.0], [6.0, -5.0], [6.0, -6.0]],
                },
                MapObject {
                    id: 10,
                    outline: vec![[0.0, 0.0], [2.0, 0.0], [2.0, -2.0]],
                },
            ],
        );
        objects.insert("nuclei".to_string(), Vec::new());

        let summaries = object_summaries(objects);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].object_type, "cells");
        assert_eq!(summaries[0].count, 2);
        assert_eq!(
            summaries[0].bounds,
            Some(Extent::new([0.0, -6.0], [6.0, 0.0]))
        );
        assert_eq!(summaries[1].count, 0);
        assert_eq!(summaries[1].bounds, None);
    }
}
