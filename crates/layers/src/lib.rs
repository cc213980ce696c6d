pub mod channel;
pub mod layer;
pub mod objects;
pub mod symbology;
pub mod zoomify;

pub use channel::*;
pub use layer::*;
pub use objects::*;
