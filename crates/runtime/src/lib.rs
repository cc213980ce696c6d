pub mod cancel;
pub mod event_loop;
pub mod promise;

pub use cancel::*;
pub use event_loop::*;
pub use promise::*;
