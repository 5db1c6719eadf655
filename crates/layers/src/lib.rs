pub mod labels;
pub mod layer;
pub mod overlay;
pub mod query;
pub mod symbology;
pub mod vector;

pub use layer::*;
