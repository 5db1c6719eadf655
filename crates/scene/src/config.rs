use formats::CardConfig;
use foundation::LatLng;
use serde::{Deserialize, Serialize};
use streaming::{DEFAULT_PRELOAD_WINDOW, SourceConfig};

/// Everything the map needs to know at startup. Every field has a default,
/// so a partial JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Satellite imagery replaces the vector fills strictly above this zoom.
    pub satellite_zoom: f64,
    /// `[lat, lng]` of the initial view.
    pub center: [f64; 2],
    pub host_city_key: String,
    pub host_label_text: String,
    /// `[lat, lng]`
    pub host_label_at: [f64; 2],
    pub satellite_tiles_url: String,
    pub preload_window: usize,
    /// Boundary cache capacity; unbounded when absent.
    pub cache_capacity: Option<usize>,
    pub sources: SourceConfig,
    pub cards: CardConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            min_zoom: 4.0,
            max_zoom: 17.0,
            satellite_zoom: 11.0,
            center: [-14.235, -51.925],
            host_city_key: "31-Sete Lagoas".to_string(),
            host_label_text: "GELF Sete Lagoas".to_string(),
            host_label_at: [-19.4457253885, -44.2600188074],
            satellite_tiles_url:
                "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}"
                    .to_string(),
            preload_window: DEFAULT_PRELOAD_WINDOW,
            cache_capacity: None,
            sources: SourceConfig::default(),
            cards: CardConfig::default(),
        }
    }
}

impl MapConfig {
    pub fn center(&self) -> LatLng {
        LatLng::new(self.center[0], self.center[1])
    }

    pub fn host_label_at(&self) -> LatLng {
        LatLng::new(self.host_label_at[0], self.host_label_at[1])
    }

    /// State whose selection shows the host label.
    pub fn host_state_code(&self) -> Option<u8> {
        let (code, _) = self.host_city_key.split_once('-')?;
        code.parse().ok()
    }
}
