use foundation::{GeoBounds, LatLng};
use serde_json::{Map, Value};

/// One polygon feature of a boundary collection, in collection order.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub index: usize,
    /// GeoJSON `id` (state abbreviation for state outlines), as a string.
    pub id: Option<String>,
    /// `properties.name`
    pub name: Option<String>,
    pub properties: Map<String, Value>,
    pub bounds: Option<GeoBounds>,
}

impl BoundaryFeature {
    pub fn from_value(index: usize, feature: &Value) -> Self {
        let properties = feature
            .get("properties")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        let name = properties
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string);
        let id = feature.get("id").and_then(value_to_text);
        let bounds = feature.get("geometry").and_then(geometry_bounds);
        Self {
            index,
            id,
            name,
            properties,
            bounds,
        }
    }

    /// IBGE code of a state outline, whose id is either the abbreviation
    /// or the numeric code itself.
    pub fn state_code(&self) -> Option<u8> {
        let id = self.id.as_deref()?.trim();
        id.parse().ok().or_else(|| catalog::state_code(id))
    }
}

/// Features of a FeatureCollection. A single Feature is treated as a
/// one-element collection; anything else yields no features.
pub fn boundary_features(data: &Value) -> Vec<BoundaryFeature> {
    feature_values(data)
        .iter()
        .enumerate()
        .map(|(i, f)| BoundaryFeature::from_value(i, f))
        .collect()
}

pub(crate) fn feature_values(data: &Value) -> Vec<&Value> {
    match data.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => data
            .get("features")
            .and_then(Value::as_array)
            .map(|a| a.iter().collect())
            .unwrap_or_default(),
        Some("Feature") => vec![data],
        _ => Vec::new(),
    }
}

/// Bounds of every position in a geometry, at any nesting depth.
pub fn geometry_bounds(geometry: &Value) -> Option<GeoBounds> {
    if let Some(parts) = geometry.get("geometries").and_then(Value::as_array) {
        return parts
            .iter()
            .filter_map(geometry_bounds)
            .reduce(|a, b| a.union(&b));
    }
    let mut points = Vec::new();
    collect_positions(geometry.get("coordinates")?, &mut points);
    GeoBounds::from_points(points)
}

/// Bounds of all features in a collection.
pub fn collection_bounds(data: &Value) -> Option<GeoBounds> {
    boundary_features(data)
        .into_iter()
        .filter_map(|f| f.bounds)
        .reduce(|a, b| a.union(&b))
}

// GeoJSON positions are [lng, lat, ...].
fn collect_positions(coords: &Value, out: &mut Vec<LatLng>) {
    let Some(items) = coords.as_array() else {
        return;
    };
    if let [Value::Number(lng), Value::Number(lat), ..] = items.as_slice() {
        if let (Some(lng), Some(lat)) = (lng.as_f64(), lat.as_f64()) {
            out.push(LatLng::new(lat, lng));
        }
        return;
    }
    for item in items {
        collect_positions(item, out);
    }
}

pub(crate) fn value_to_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
