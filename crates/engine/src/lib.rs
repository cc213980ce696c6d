pub mod engine;
pub mod layer;
pub mod memory;
pub mod view;

pub use engine::*;
pub use layer::*;
pub use memory::*;
pub use view::*;
