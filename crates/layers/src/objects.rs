use earcutr::earcut;
use foundation::Extent;
use serde::{Deserialize, Serialize};

use crate::layer::{Layer, LayerId, LayerKind};
use crate::symbology::{Rgba, default_white};

/// One segmented object (e.g. a cell) with its outline in image pixel
/// coordinates (y pointing down is stored as negative y).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapObject {
    pub id: u32,
    pub outline: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectLayerOptions {
    /// Map-object type shown by this layer, e.g. `"cells"`.
    pub object_type: Option<String>,
    pub visible: bool,
    #[serde(default = "default_white")]
    pub stroke_color: Rgba,
    pub fill_color: Option<Rgba>,
    pub stroke_width: f32,
}

impl Default for ObjectLayerOptions {
    fn default() -> Self {
        Self {
            object_type: None,
            visible: true,
            stroke_color: default_white(),
            fill_color: None,
            stroke_width: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectLayer {
    id: LayerId,
    name: String,
    pub options: ObjectLayerOptions,
    objects: Vec<MapObject>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ObjectLayerSnapshot {
    pub outlines: Vec<(u32, Vec<[f64; 2]>)>,
    // Flat triangle list (3 vertices per triangle), only when a fill color is set.
    pub fill_triangles: Vec<[f64; 2]>,
}

impl ObjectLayer {
    pub fn new(name: impl Into<String>, options: ObjectLayerOptions) -> Self {
        Self {
            id: LayerId::fresh(),
            name: name.into(),
            options,
            objects: Vec::new(),
        }
    }

    pub fn with_objects(mut self, objects: impl IntoIterator<Item = MapObject>) -> Self {
        self.add_objects(objects);
        self
    }

    pub fn add_objects(&mut self, objects: impl IntoIterator<Item = MapObject>) {
        self.objects.extend(objects);
    }

    pub fn objects(&self) -> &[MapObject] {
        &self.objects
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn bounds(&self) -> Option<Extent> {
        let mut points = self.objects.iter().flat_map(|o| o.outline.iter());
        let first = points.next()?;
        let mut e = Extent::new(*first, *first);
        for p in points {
            e.min[0] = e.min[0].min(p[0]);
            e.min[1] = e.min[1].min(p[1]);
            e.max[0] = e.max[0].max(p[0]);
            e.max[1] = e.max[1].max(p[1]);
        }
        Some(e)
    }

    pub fn extract(&self) -> ObjectLayerSnapshot {
        let mut out = ObjectLayerSnapshot::default();
        for object in &self.objects {
            let mut ring = object.outline.clone();
            drop_closing_duplicate(&mut ring);
            if ring.len() < 2 {
                continue;
            }
            if self.options.fill_color.is_some() {
                out.fill_triangles.extend(triangulate_outline(&ring));
            }
            out.outlines.push((object.id, ring));
        }
        out
    }
}

impl Layer for ObjectLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Objects
    }
}

fn triangulate_outline(ring: &[[f64; 2]]) -> Vec<[f64; 2]> {
    if ring.len() < 3 {
        return Vec::new();
    }
    let coords: Vec<f64> = ring.iter().flat_map(|p| [p[0], p[1]]).collect();
    let indices = match earcut(&coords, &[], 2) {
        Ok(ix) => ix,
        Err(_) => return Vec::new(),
    };
    indices.into_iter().filter_map(|i| ring.get(i).copied()).collect()
}

fn drop_closing_duplicate(points: &mut Vec<[f64; 2]>) {
    if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
        if points.len() >= 2
            && (first[0] - last[0]).abs() < 1e-9
            && (first[1] - last[1]).abs() < 1e-9
        {
            points.pop();
        }
    }
}
