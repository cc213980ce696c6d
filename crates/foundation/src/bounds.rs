use serde::{Deserialize, Serialize};

/// Axis-aligned extent `[min_x, min_y, max_x, max_y]` in map units.
///
/// Image pixel space uses a flipped y axis, so a `w x h` image spans
/// `[0, -h, w, 0]`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Extent {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Extent { min, max }
    }

    pub fn for_image(size: [u32; 2]) -> Self {
        Extent {
            min: [0.0, -(size[1] as f64)],
            max: [size[0] as f64, 0.0],
        }
    }

    pub fn width(&self) -> f64 {
        (self.max[0] - self.min[0]).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.max[1] - self.min[1]).max(0.0)
    }

    pub fn center(&self) -> [f64; 2] {
        [
            0.5 * (self.min[0] + self.max[0]),
            0.5 * (self.min[1] + self.max[1]),
        ]
    }
}
