use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use catalog::{SupplierIndex, is_all_materials};
use formats::palette::{
    FILL_COLOR, INACTIVE_COLOR, WEAK_STROKE_COLOR, material_color, pastel_for,
};
use serde::Serialize;

/// Polygon style, serialized with Leaflet's `PathOptions` field names.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathStyle {
    pub color: String,
    pub fill_color: String,
    pub fill_opacity: f64,
    pub weight: f64,
    pub class_name: String,
    pub interactive: bool,
}

impl PathStyle {
    pub fn new(color: &str, fill_color: &str, fill_opacity: f64, weight: f64, class_name: &str) -> Self {
        Self {
            color: color.to_string(),
            fill_color: fill_color.to_string(),
            fill_opacity,
            weight,
            class_name: class_name.to_string(),
            interactive: true,
        }
    }
}

pub fn state_style() -> PathStyle {
    PathStyle::new(WEAK_STROKE_COLOR, FILL_COLOR, 1.0, 2.0, "state-layer")
}

/// Municipality fill while satellite imagery is showing.
pub fn hidden_city_style() -> PathStyle {
    PathStyle {
        interactive: false,
        ..PathStyle::new("transparent", "transparent", 0.0, 0.0, "")
    }
}

/// Overlay style: property parcels are translucent white, production
/// areas get a pastel picked from the record id.
pub fn shapefile_style(record_id: u64, is_property: bool) -> PathStyle {
    let color = if is_property {
        "#FFFFFF77"
    } else {
        pastel_for(record_id)
    };
    PathStyle::new(color, color, 0.1, 2.0, "shapefile-layer")
}

/// Style of one municipality for the active material filter.
///
/// Neutral by default. A city with suppliers is highlighted when the filter
/// is the "all" sentinel or one of its suppliers deals in the filtered
/// material; a city whose suppliers are all filtered out gets the inactive
/// fill instead.
pub fn city_style(city_key: &str, filter: &str, index: &SupplierIndex) -> PathStyle {
    let mut style = PathStyle::new(WEAK_STROKE_COLOR, FILL_COLOR, 1.0, 1.0, "city-layer");

    let Some(suppliers) = index.suppliers(city_key) else {
        return style;
    };

    let matches = is_all_materials(filter) || suppliers.iter().any(|s| s.material_type == filter);
    style.fill_color = if matches {
        material_color(filter).to_string()
    } else {
        INACTIVE_COLOR.to_string()
    };
    style
}

/// Memoizes [`city_style`] by `(city key, filter)` for the session.
///
/// Entries are never invalidated; the cache is bounded by
/// municipalities × material types. Rebuild the resolver if the supplier
/// index changes.
#[derive(Debug, Default)]
pub struct StyleResolver {
    cache: RefCell<HashMap<(String, String), Rc<PathStyle>>>,
    computations: Cell<u64>,
}

impl StyleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn style_for(&self, city_key: &str, filter: &str, index: &SupplierIndex) -> Rc<PathStyle> {
        let cache_key = (city_key.to_string(), filter.to_string());
        if let Some(hit) = self.cache.borrow().get(&cache_key) {
            return hit.clone();
        }

        self.computations.set(self.computations.get() + 1);
        let style = Rc::new(city_style(city_key, filter, index));
        self.cache.borrow_mut().insert(cache_key, style.clone());
        style
    }

    /// Number of times a style was actually computed.
    pub fn computations(&self) -> u64 {
        self.computations.get()
    }

    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use catalog::SupplierIndex;
    use formats::palette::{
        FILL_COLOR, GREEN_COLOR, INACTIVE_COLOR, ORANGE_COLOR, STROKE_COLOR,
    };
    use serde_json::json;

    use super::{StyleResolver, city_style, hidden_city_style};

    fn index() -> SupplierIndex {
        SupplierIndex::from_json(json!([
            {"state": {"abbr": "MG"}, "city": {"name": "Sete Lagoas"}, "material_type": "Carvão Vegetal"},
            {"state": {"abbr": "MG"}, "city": {"name": "Itabira"}, "material_type": "Minério de Ferro"},
            {"state": {"abbr": "MG"}, "city": {"name": "Arcos"}, "material_type": "Calcário"}
        ]))
        .unwrap()
    }

    #[test]
    fn city_without_suppliers_is_neutral() {
        let s = city_style("31-Belo Horizonte", "Todos", &index());
        assert_eq!(s.fill_color, FILL_COLOR);
        assert_eq!(s.class_name, "city-layer");
    }

    #[test]
    fn highlight_follows_filter() {
        let idx = index();
        assert_eq!(city_style("31-Sete Lagoas", "Todos", &idx).fill_color, ORANGE_COLOR);
        assert_eq!(city_style("31-Sete Lagoas", "Carvão Vegetal", &idx).fill_color, GREEN_COLOR);
        assert_eq!(city_style("31-Itabira", "Minério de Ferro", &idx).fill_color, ORANGE_COLOR);
        assert_eq!(city_style("31-Arcos", "Calcário", &idx).fill_color, STROKE_COLOR);
    }

    #[test]
    fn filtered_out_city_is_inactive_not_highlighted() {
        let s = city_style("31-Itabira", "Carvão Vegetal", &index());
        assert_eq!(s.fill_color, INACTIVE_COLOR);
    }

    #[test]
    fn resolver_is_memoized_and_reference_stable() {
        let idx = index();
        let r = StyleResolver::new();
        let a = r.style_for("31-Sete Lagoas", "Todos", &idx);
        let b = r.style_for("31-Sete Lagoas", "Todos", &idx);
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(r.computations(), 1);

        r.style_for("31-Sete Lagoas", "Carvão Vegetal", &idx);
        r.style_for("31-Sete Lagoas", "Todos", &idx);
        assert_eq!(r.computations(), 2);
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn hidden_style_is_not_interactive() {
        let s = hidden_city_style();
        assert!(!s.interactive);
        assert_eq!(s.fill_opacity, 0.0);
    }

    #[test]
    fn serializes_with_leaflet_names() {
        let v = serde_json::to_value(city_style("31-Arcos", "Todos", &index())).unwrap();
        assert_eq!(v["fillColor"], json!(ORANGE_COLOR));
        assert_eq!(v["className"], json!("city-layer"));
        assert!(v.get("fill_color").is_none());
    }
}
