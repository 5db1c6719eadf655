//! Text and HTML produced for the supplier detail panel and map popups.

pub mod card;
pub mod html;
pub mod number;
pub mod palette;
pub mod taxid;
pub mod validity;

pub use card::*;
pub use taxid::*;
pub use validity::*;
