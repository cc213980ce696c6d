pub mod app;
pub mod error;
pub mod factory;
pub mod host;
pub mod scope;
pub mod selection;
pub mod state;
pub mod template;
pub mod viewport;

pub use app::*;
pub use error::*;
pub use factory::*;
pub use host::*;
pub use scope::*;
pub use selection::*;
pub use state::*;
pub use template::*;
pub use viewport::*;
