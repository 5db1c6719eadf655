use foundation::GeoBounds;

use crate::overlay::{PROPERTY_ATTRIBUTE, ShapefileOverlay};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SearchDirection {
    Next,
    Prev,
}

/// Position of one overlay feature: `(overlay index, feature index)`.
pub type FeaturePath = (usize, usize);

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub path: FeaturePath,
    /// Zero-based position among the current matches.
    pub position: usize,
    pub total: usize,
    pub bounds: Option<GeoBounds>,
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn contains(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

/// Features whose supplier name, shapefile name or parcel id contains the
/// query, case-insensitively, in overlay order.
pub fn matching_features(overlays: &[ShapefileOverlay], query: &str) -> Vec<FeaturePath> {
    let needle = normalize(query);
    if needle.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::new();
    for (oi, overlay) in overlays.iter().enumerate() {
        let record_match = contains(overlay.supplier_name.as_deref(), &needle)
            || contains(Some(&overlay.name), &needle);
        for (fi, feature) in overlay.features.iter().enumerate() {
            let parcel = feature.attribute_text(PROPERTY_ATTRIBUTE);
            if record_match || contains(parcel.as_deref(), &needle) {
                out.push((oi, fi));
            }
        }
    }
    out
}

/// Cursor over the matches of the last query.
///
/// Stepping with the same query over the same matches moves the cursor,
/// wrapping at both ends. A different query, or a change in the loaded
/// overlays that alters the match list, restarts from the first match
/// (`Next`) or the last (`Prev`).
#[derive(Debug, Default)]
pub struct ShapefileSearch {
    query: String,
    matches: Vec<FeaturePath>,
    cursor: Option<usize>,
}

impl ShapefileSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(
        &mut self,
        overlays: &[ShapefileOverlay],
        query: &str,
        direction: SearchDirection,
    ) -> Option<SearchHit> {
        let query = normalize(query);
        let matches = matching_features(overlays, &query);
        if matches.is_empty() {
            self.reset();
            return None;
        }

        let total = matches.len();
        let continuing = query == self.query && matches == self.matches;
        let position = match (self.cursor.filter(|_| continuing), direction) {
            (Some(c), SearchDirection::Next) => (c + 1) % total,
            (Some(c), SearchDirection::Prev) => (c + total - 1) % total,
            (None, SearchDirection::Next) => 0,
            (None, SearchDirection::Prev) => total - 1,
        };

        self.query = query;
        self.matches = matches;
        self.cursor = Some(position);

        let path = self.matches[position];
        Some(SearchHit {
            path,
            position,
            total,
            bounds: overlays[path.0].features[path.1].bounds,
        })
    }

    pub fn reset(&mut self) {
        self.query.clear();
        self.matches.clear();
        self.cursor = None;
    }

    pub fn current(&self) -> Option<FeaturePath> {
        self.cursor.map(|c| self.matches[c])
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::overlay::{ShapefileOverlay, ShapefileRecord};

    fn overlay(id: u64, name: &str, supplier: &str, parcels: &[&str]) -> ShapefileOverlay {
        let features: Vec<_> = parcels
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let x = -44.0 + i as f64;
                json!({"type": "Feature", "properties": {"MATRICULA": m},
                       "geometry": {"type": "Point", "coordinates": [x, -19.0]}})
            })
            .collect();
        let record = ShapefileRecord {
            id,
            name: name.to_string(),
            supplier_name: Some(supplier.to_string()),
            geojson: json!({"type": "FeatureCollection", "features": features}).to_string(),
        };
        ShapefileOverlay::from_record(&record).unwrap()
    }

    fn overlays() -> Vec<ShapefileOverlay> {
        vec![
            overlay(1, "Fazenda Alegre", "Carvoaria Sul", &["1001", "1002"]),
            overlay(2, "Sítio Novo", "Mineração Norte", &["2001"]),
            overlay(3, "Fazenda Santa Rita", "Carvoaria Sul", &["3001"]),
        ]
    }

    #[test]
    fn matches_supplier_name_shapefile_name_and_parcel() {
        let o = overlays();
        assert_eq!(matching_features(&o, "carvoaria"), vec![(0, 0), (0, 1), (2, 0)]);
        assert_eq!(matching_features(&o, "  SÍTIO "), vec![(1, 0)]);
        assert_eq!(matching_features(&o, "1002"), vec![(0, 1)]);
        assert!(matching_features(&o, "   ").is_empty());
    }

    #[test]
    fn next_and_prev_cycle_with_wraparound() {
        let o = overlays();
        let mut search = ShapefileSearch::new();
        let steps: Vec<_> = [
            SearchDirection::Next,
            SearchDirection::Next,
            SearchDirection::Next,
            SearchDirection::Next,
            SearchDirection::Prev,
        ]
        .into_iter()
        .map(|d| search.step(&o, "fazenda", d).unwrap().path)
        .collect();
        assert_eq!(steps, vec![(0, 0), (0, 1), (2, 0), (0, 0), (2, 0)]);
    }

    #[test]
    fn new_query_restarts_and_prev_starts_at_end() {
        let o = overlays();
        let mut search = ShapefileSearch::new();
        search.step(&o, "fazenda", SearchDirection::Next);
        search.step(&o, "fazenda", SearchDirection::Next);

        let hit = search.step(&o, "carvoaria", SearchDirection::Prev).unwrap();
        assert_eq!(hit.path, (2, 0));
        assert_eq!(hit.position, 2);
        assert_eq!(hit.total, 3);
        assert!(hit.bounds.is_some());
    }

    #[test]
    fn no_match_clears_cursor() {
        let o = overlays();
        let mut search = ShapefileSearch::new();
        search.step(&o, "norte", SearchDirection::Next);
        assert_eq!(search.current(), Some((1, 0)));
        assert!(search.step(&o, "inexistente", SearchDirection::Next).is_none());
        assert_eq!(search.current(), None);
    }
}
