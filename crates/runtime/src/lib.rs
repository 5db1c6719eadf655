pub mod event_bus;
pub mod pool;

pub use event_bus::*;
pub use pool::*;
