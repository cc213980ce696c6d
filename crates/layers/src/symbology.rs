/// RGBA in `[0, 1]`.
pub type Rgba = [f32; 4];

pub const WHITE: Rgba = [1.0, 1.0, 1.0, 1.0];

pub(crate) fn default_white() -> Rgba {
    WHITE
}
