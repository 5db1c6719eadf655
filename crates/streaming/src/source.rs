use serde::{Deserialize, Serialize};

/// Where boundary data and the supplier list come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub states_url: String,
    /// `{uf}` is replaced with the numeric state code.
    pub cities_url_template: String,
    /// `{state}` is replaced with the state abbreviation.
    pub shapefiles_url_template: String,
    pub suppliers_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            states_url: "static/data/geojson/br_states.json".to_string(),
            cities_url_template: "static/data/geojson/geojs-{uf}-mun.json".to_string(),
            shapefiles_url_template: "/api/shapefiles/{state}".to_string(),
            suppliers_url: "/api/suppliers/".to_string(),
        }
    }
}

impl SourceConfig {
    /// Same layout rooted at `base` (used by native tools pointing at a live host).
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        let d = SourceConfig::default();
        Self {
            states_url: format!("{base}/{}", d.states_url),
            cities_url_template: format!("{base}/{}", d.cities_url_template),
            shapefiles_url_template: format!("{base}{}", d.shapefiles_url_template),
            suppliers_url: format!("{base}{}", d.suppliers_url),
        }
    }
}

/// A cacheable unit of boundary data.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegionKey {
    /// National state outlines.
    States,
    /// Municipalities of one state, by IBGE code.
    Cities(u8),
    /// Property shapefile records of one state, by abbreviation.
    Shapefiles(String),
}

impl RegionKey {
    pub fn cache_key(&self) -> String {
        match self {
            RegionKey::States => "states".to_string(),
            RegionKey::Cities(code) => format!("cities-{code}"),
            RegionKey::Shapefiles(abbr) => format!("shapefiles-{abbr}"),
        }
    }

    pub fn url(&self, sources: &SourceConfig) -> String {
        match self {
            RegionKey::States => sources.states_url.clone(),
            RegionKey::Cities(code) => sources
                .cities_url_template
                .replace("{uf}", &code.to_string()),
            RegionKey::Shapefiles(abbr) => sources.shapefiles_url_template.replace("{state}", abbr),
        }
    }
}

impl std::fmt::Display for RegionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.cache_key())
    }
}
