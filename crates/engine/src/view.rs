use foundation::Extent;
use layers::zoomify::TileGrid;
use serde::{Deserialize, Serialize};

/// Projection code of image-pixel views built for Zoomify pyramids.
pub const ZOOMIFY: &str = "ZOOMIFY";
/// Projection code of a freshly constructed map.
pub const WEB_MERCATOR: &str = "EPSG:3857";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Meters,
    Pixels,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub code: String,
    pub units: Units,
    pub extent: Option<Extent>,
}

impl Projection {
    pub fn web_mercator() -> Self {
        Self {
            code: WEB_MERCATOR.to_string(),
            units: Units::Meters,
            extent: None,
        }
    }

    pub fn zoomify(extent: Extent) -> Self {
        Self {
            code: ZOOMIFY.to_string(),
            units: Units::Pixels,
            extent: Some(extent),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub projection: Projection,
    pub center: [f64; 2],
    pub zoom: f64,
    /// Map units per pixel per zoom level. Empty means unconstrained zoom.
    #[serde(default)]
    pub resolutions: Vec<f64>,
}

impl Default for View {
    fn default() -> Self {
        Self {
            projection: Projection::web_mercator(),
            center: [0.0, 0.0],
            zoom: 0.0,
            resolutions: Vec::new(),
        }
    }
}

impl View {
    /// Pixel-space view showing a whole Zoomify pyramid at its coarsest tier.
    pub fn zoomify(grid: &TileGrid) -> Self {
        let extent = grid.extent();
        Self {
            center: extent.center(),
            projection: Projection::zoomify(extent),
            zoom: 0.0,
            resolutions: grid.resolutions(),
        }
    }

    pub fn max_zoom(&self) -> Option<f64> {
        if self.resolutions.is_empty() {
            None
        } else {
            Some((self.resolutions.len() - 1) as f64)
        }
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = match self.max_zoom() {
            Some(max) => zoom.clamp(0.0, max),
            None => zoom.max(0.0),
        };
    }

    pub fn set_center(&mut self, center: [f64; 2]) {
        self.center = match self.projection.extent {
            Some(e) => [
                center[0].clamp(e.min[0], e.max[0]),
                center[1].clamp(e.min[1], e.max[1]),
            ],
            None => center,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::{View, WEB_MERCATOR, ZOOMIFY};
    use layers::zoomify::TileGrid;

    #[test]
    fn default_view_is_not_zoomify() {
        let v = View::default();
        assert_eq!(v.projection.code(), WEB_MERCATOR);
        assert_ne!(v.projection.code(), ZOOMIFY);
        assert_eq!(v.max_zoom(), None);
    }

    #[test]
    fn zoomify_view_is_centered_on_image() {
        let v = View::zoomify(&TileGrid::new([1000, 600], 256));
        assert_eq!(v.projection.code(), ZOOMIFY);
        assert_eq!(v.center, [500.0, -300.0]);
        assert_eq!(v.max_zoom(), Some(2.0));
        assert_eq!(v.resolutions, vec![4.0, 2.0, 1.0]);
    }

    #[test]
    fn zoom_and_center_are_clamped_to_the_image() {
        let mut v = View::zoomify(&TileGrid::new([1000, 600], 256));
        v.set_zoom(10.0);
        assert_eq!(v.zoom, 2.0);
        v.set_center([-5.0, 20.0]);
        assert_eq!(v.center, [0.0, 0.0]);
    }

    #[test]
    fn view_round_trips_through_json() {
        let v = View::zoomify(&TileGrid::new([123, 123], 256));
        let json = serde_json::to_string(&v).unwrap();
        let back: View = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }
}
