//! Zoomify tile pyramid addressing.
//!
//! A pyramid for an image of `w x h` pixels has one tier per zoom level. Tier
//! `z` covers the image with `tier_size(z)` tiles of `tile_size` pixels, the
//! last tier being the full-resolution image. Tiles are stored in folders of
//! 256 tiles (`TileGroupN`) numbered across all tiers.

use foundation::Extent;

pub const DEFAULT_TILE_SIZE: u32 = 256;
const TILES_PER_GROUP: u64 = 256;

#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    image_size: [u32; 2],
    tile_size: u32,
    tier_sizes: Vec<[u32; 2]>,
    tiles_before: Vec<u64>,
}

impl TileGrid {
    pub fn new(image_size: [u32; 2], tile_size: u32) -> Self {
        let tile_size = tile_size.max(1);
        let (w, h) = (image_size[0] as u64, image_size[1] as u64);

        let mut tier_sizes = Vec::new();
        let mut span = tile_size as u64;
        while w > span || h > span {
            tier_sizes.push([w.div_ceil(span) as u32, h.div_ceil(span) as u32]);
            span += span;
        }
        tier_sizes.push([1, 1]);
        tier_sizes.reverse();

        let mut tiles_before = Vec::with_capacity(tier_sizes.len());
        let mut acc = 0u64;
        for [tw, th] in &tier_sizes {
            tiles_before.push(acc);
            acc += (*tw as u64) * (*th as u64);
        }

        Self {
            image_size,
            tile_size,
            tier_sizes,
            tiles_before,
        }
    }

    pub fn image_size(&self) -> [u32; 2] {
        self.image_size
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn num_tiers(&self) -> usize {
        self.tier_sizes.len()
    }

    pub fn max_zoom(&self) -> u8 {
        (self.num_tiers() - 1) as u8
    }

    pub fn tier_size(&self, z: u8) -> Option<[u32; 2]> {
        self.tier_sizes.get(z as usize).copied()
    }

    pub fn total_tiles(&self) -> u64 {
        let last = self.tier_sizes.len() - 1;
        let [tw, th] = self.tier_sizes[last];
        self.tiles_before[last] + (tw as u64) * (th as u64)
    }

    /// Map units per pixel for each zoom level, coarsest first.
    pub fn resolutions(&self) -> Vec<f64> {
        let n = self.num_tiers() as i32;
        (0..n).map(|z| 2f64.powi(n - 1 - z)).collect()
    }

    pub fn extent(&self) -> Extent {
        Extent::for_image(self.image_size)
    }

    pub fn tile_group(&self, z: u8, x: u32, y: u32) -> Option<u64> {
        let [tw, th] = self.tier_size(z)?;
        if x >= tw || y >= th {
            return None;
        }
        let index = x as u64 + (y as u64) * (tw as u64) + self.tiles_before[z as usize];
        Some(index / TILES_PER_GROUP)
    }

    pub fn tile_url(&self, pyramid_path: &str, z: u8, x: u32, y: u32) -> Option<String> {
        let group = self.tile_group(z, x, y)?;
        Some(format!(
            "{}/TileGroup{group}/{z}-{x}-{y}.jpg",
            pyramid_path.trim_end_matches('/')
        ))
    }
}
