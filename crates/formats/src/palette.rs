//! CSS colors shared by map styles and supplier cards.
//!
//! Values are CSS custom properties so the page theme owns the actual colors.

use catalog::{ALL_MATERIALS, CHARCOAL, IRON_ORE};

pub const FILL_COLOR: &str = "var(--fill-color)";
pub const STROKE_COLOR: &str = "var(--stroke-color)";
pub const WEAK_STROKE_COLOR: &str = "var(--weak-stroke-color)";
pub const ORANGE_COLOR: &str = "var(--primary-color)";
pub const GREEN_COLOR: &str = "var(--secondary-color)";
/// Municipality has suppliers, none of them matching the active filter.
pub const INACTIVE_COLOR: &str = "var(--off)";

pub const GOOD_RATING_COLOR: &str = GREEN_COLOR;
pub const BAD_RATING_COLOR: &str = ORANGE_COLOR;

/// Ratings strictly above this are highlighted as good.
pub const GOOD_RATING_THRESHOLD: f64 = 80.0;

/// Highlight for a material (or the "all" sentinel); unknown types use the stroke color.
pub fn material_color(material: &str) -> &'static str {
    match material {
        CHARCOAL => GREEN_COLOR,
        IRON_ORE => ORANGE_COLOR,
        ALL_MATERIALS => ORANGE_COLOR,
        _ => STROKE_COLOR,
    }
}

pub fn rating_color(rating: Option<f64>) -> &'static str {
    match rating {
        Some(r) if r > GOOD_RATING_THRESHOLD => GOOD_RATING_COLOR,
        _ => BAD_RATING_COLOR,
    }
}

/// Fills for forest-production overlays.
pub const PASTEL_COLORS: [&str; 10] = [
    "#FFB3BA", "#FFDFBA", "#FFFFBA", "#BAFFC9", "#BAE1FF", "#E0BBE4", "#FFCCE6", "#D4A5A5",
    "#C9C9FF", "#B5EAD7",
];

pub fn pastel_for(seed: u64) -> &'static str {
    PASTEL_COLORS[(seed % PASTEL_COLORS.len() as u64) as usize]
}
