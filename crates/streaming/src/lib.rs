pub mod cache;
pub mod fetch;
pub mod preload;
pub mod request;
pub mod source;

pub use cache::*;
pub use fetch::*;
pub use preload::*;
pub use request::*;
pub use source::*;
