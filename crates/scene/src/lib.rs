//! The interactive supplier map, independent of any browser API.
//!
//! [`MapController`] owns all view state and talks to the outside world only
//! through [`MapSurface`] (the map widget), [`DetailPanel`] (the side panel)
//! and [`streaming::Fetch`] (the network).

pub mod app;
pub mod config;
pub mod controller;
pub mod details;
pub mod mode;
pub mod surface;

#[cfg(test)]
pub(crate) mod testing;

pub use app::*;
pub use config::*;
pub use controller::*;
pub use details::*;
pub use mode::*;
pub use surface::*;
