use std::cell::RefCell;
use std::rc::Rc;

use catalog::{ALL_MATERIALS, CatalogError, CityKey, SupplierIndex, all_state_codes, state_abbr};
use chrono::NaiveDate;
use foundation::LatLng;
use layers::labels::Tooltip;
use layers::overlay::{OverlayError, ShapefileOverlay, parse_records};
use layers::query::{SearchDirection, SearchHit, ShapefileSearch};
use layers::symbology::{PathStyle, StyleResolver, hidden_city_style, state_style};
use layers::vector::{BoundaryFeature, boundary_features};
use layers::{LayerId, LayerKind};
use runtime::EventBus;
use streaming::{
    BoundaryCache, CacheError, Fetch, FetchError, GenerationCounter, PreloadReport, RegionKey,
    preload,
};
use tracing::{debug, warn};

use crate::config::MapConfig;
use crate::details::{DetailPanel, SupplierDetails};
use crate::mode::BasemapMode;
use crate::surface::{MapEvent, MapSurface, PointerKind};

#[derive(Debug)]
pub enum MapError {
    Load(CacheError),
    Suppliers(FetchError),
    Catalog(CatalogError),
    Overlay(OverlayError),
    /// A clicked state outline whose id maps to no IBGE code.
    UnknownState(String),
}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapError::Load(e) => write!(f, "{e}"),
            MapError::Suppliers(e) => write!(f, "failed to load suppliers: {e}"),
            MapError::Catalog(e) => write!(f, "{e}"),
            MapError::Overlay(e) => write!(f, "{e}"),
            MapError::UnknownState(id) => write!(f, "unknown state {id:?}"),
        }
    }
}

impl std::error::Error for MapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MapError::Load(e) => Some(e),
            MapError::Suppliers(e) => Some(e),
            MapError::Catalog(e) => Some(e),
            MapError::Overlay(e) => Some(e),
            MapError::UnknownState(_) => None,
        }
    }
}

impl From<CacheError> for MapError {
    fn from(e: CacheError) -> Self {
        MapError::Load(e)
    }
}

impl From<FetchError> for MapError {
    fn from(e: FetchError) -> Self {
        MapError::Suppliers(e)
    }
}

impl From<CatalogError> for MapError {
    fn from(e: CatalogError) -> Self {
        MapError::Catalog(e)
    }
}

impl From<OverlayError> for MapError {
    fn from(e: OverlayError) -> Self {
        MapError::Overlay(e)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied(LayerId),
    /// A newer request was issued while this one was in flight; its
    /// response was dropped.
    Superseded,
}

#[derive(Debug)]
struct StatesLayer {
    id: LayerId,
    features: Vec<BoundaryFeature>,
}

#[derive(Debug)]
struct CitiesLayer {
    id: LayerId,
    keys: Vec<CityKey>,
    names: Vec<String>,
}

#[derive(Debug)]
struct ViewState {
    states: Option<StatesLayer>,
    cities: Option<CitiesLayer>,
    active_state: Option<u8>,
    filter: String,
    mode: BasemapMode,
    hovered: Option<usize>,
    overlay_ids: Vec<LayerId>,
    overlays: Vec<ShapefileOverlay>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            states: None,
            cities: None,
            active_state: None,
            filter: ALL_MATERIALS.to_string(),
            mode: BasemapMode::Vector,
            hovered: None,
            overlay_ids: Vec::new(),
            overlays: Vec::new(),
        }
    }
}

/// Owns the map's view state and drives a [`MapSurface`].
///
/// Every network load goes through the shared [`BoundaryCache`]. A failed
/// load is recorded on the event bus and leaves the surface exactly as it
/// was. Municipality and overlay loads carry a request generation; a
/// response that is no longer the latest is discarded.
///
/// No `RefCell` borrow is held across an `.await` or a surface call.
pub struct MapController<F, S, P> {
    config: MapConfig,
    cache: BoundaryCache<F>,
    surface: S,
    details: SupplierDetails<P>,
    styles: StyleResolver,
    index: RefCell<Rc<SupplierIndex>>,
    city_requests: GenerationCounter,
    overlay_requests: GenerationCounter,
    events: EventBus,
    today: fn() -> NaiveDate,
    view: RefCell<ViewState>,
    search: RefCell<ShapefileSearch>,
}

impl<F: Fetch, S: MapSurface, P: DetailPanel> MapController<F, S, P> {
    /// `today` supplies the UTC date used for document validity.
    pub fn new(config: MapConfig, fetcher: F, surface: S, panel: P, today: fn() -> NaiveDate) -> Self {
        let mut cache = BoundaryCache::new(fetcher, config.sources.clone());
        if let Some(capacity) = config.cache_capacity {
            cache = cache.with_capacity(capacity);
        }
        let details = SupplierDetails::new(panel, config.cards.clone());

        Self {
            config,
            cache,
            surface,
            details,
            styles: StyleResolver::new(),
            index: RefCell::new(Rc::new(SupplierIndex::default())),
            city_requests: GenerationCounter::new(),
            overlay_requests: GenerationCounter::new(),
            events: EventBus::new(),
            today,
            view: RefCell::new(ViewState::default()),
            search: RefCell::new(ShapefileSearch::new()),
        }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn cache(&self) -> &BoundaryCache<F> {
        &self.cache
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn details(&self) -> &SupplierDetails<P> {
        &self.details
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn style_resolver(&self) -> &StyleResolver {
        &self.styles
    }

    pub fn supplier_index(&self) -> Rc<SupplierIndex> {
        self.index.borrow().clone()
    }

    pub fn mode(&self) -> BasemapMode {
        self.view.borrow().mode
    }

    pub fn active_state(&self) -> Option<u8> {
        self.view.borrow().active_state
    }

    pub fn active_material_type(&self) -> String {
        self.view.borrow().filter.clone()
    }

    pub fn overlay_count(&self) -> usize {
        self.view.borrow().overlays.len()
    }

    pub(crate) fn today(&self) -> NaiveDate {
        (self.today)()
    }

    /// Records `err` on the event bus under `kind` and hands it back.
    pub(crate) fn fail(&self, kind: &'static str, err: impl Into<MapError>) -> MapError {
        let err = err.into();
        self.events.error(kind, err.to_string());
        err
    }

    /// Replaces the supplier index. Memoized styles are dropped and the
    /// current municipality layer is restyled.
    pub fn set_supplier_index(&self, index: SupplierIndex) {
        *self.index.borrow_mut() = Rc::new(index);
        self.styles.clear();
        self.restyle_cities();
    }

    /// Restyles the current municipality layer in place. Nothing is fetched.
    pub fn set_active_material_type(&self, material: &str) {
        self.view.borrow_mut().filter = material.to_string();
        self.restyle_cities();
    }

    fn styles_for_keys(&self, keys: &[CityKey], mode: BasemapMode, filter: &str) -> Vec<Rc<PathStyle>> {
        if mode.is_satellite() {
            let hidden = Rc::new(hidden_city_style());
            return vec![hidden; keys.len()];
        }
        let index = self.index.borrow().clone();
        keys.iter()
            .map(|k| self.styles.style_for(k.as_str(), filter, &index))
            .collect()
    }

    fn restyle_cities(&self) {
        let view = self.view.borrow();
        let Some(cities) = view.cities.as_ref() else {
            return;
        };
        let id = cities.id;
        let styles = self.styles_for_keys(&cities.keys, view.mode, &view.filter);
        drop(view);
        self.surface.restyle_layer(id, &styles);
    }

    pub async fn load_states(&self) -> Result<LayerId, MapError> {
        let data = self
            .cache
            .load(&RegionKey::States)
            .await
            .map_err(|e| self.fail("states", e))?;

        let features = boundary_features(&data);
        let styles = vec![Rc::new(state_style()); features.len()];

        let previous = self.view.borrow_mut().states.take();
        if let Some(previous) = previous {
            self.surface.remove_layer(previous.id);
        }
        let id = self
            .surface
            .add_geojson_layer(LayerKind::States, &data, &styles);
        self.view.borrow_mut().states = Some(StatesLayer { id, features });

        self.events
            .info("states", format!("{} state outlines attached", styles.len()));
        Ok(id)
    }

    /// Shows the municipalities of `state_code`.
    ///
    /// The previous municipality layer stays attached until the new data has
    /// arrived and is still wanted.
    pub async fn load_state_cities(&self, state_code: u8) -> Result<LoadOutcome, MapError> {
        let generation = self.city_requests.next();
        let data = self
            .cache
            .load(&RegionKey::Cities(state_code))
            .await
            .map_err(|e| self.fail("cities", e))?;

        if !self.city_requests.is_current(generation) {
            self.events.warn(
                "cities",
                format!("discarded superseded municipalities of state {state_code}"),
            );
            return Ok(LoadOutcome::Superseded);
        }

        let previous = {
            let mut view = self.view.borrow_mut();
            view.hovered = None;
            view.cities.take()
        };
        if let Some(previous) = previous {
            self.surface.hide_tooltip();
            self.surface.remove_layer(previous.id);
        }

        let names: Vec<String> = boundary_features(&data)
            .into_iter()
            .map(|f| f.name.unwrap_or_default())
            .collect();
        let keys: Vec<CityKey> = names.iter().map(|n| CityKey::new(state_code, n)).collect();
        let styles = {
            let view = self.view.borrow();
            self.styles_for_keys(&keys, view.mode, &view.filter)
        };

        let id = self
            .surface
            .add_geojson_layer(LayerKind::Cities, &data, &styles);
        let satellite = {
            let mut view = self.view.borrow_mut();
            view.cities = Some(CitiesLayer { id, keys, names });
            view.active_state = Some(state_code);
            view.mode.is_satellite()
        };
        self.update_host_label(state_code);
        self.events.info(
            "cities",
            format!("{} municipalities of state {state_code} attached", styles.len()),
        );

        if satellite && self.load_overlays().await.is_err() {
            warn!(state_code, "municipalities attached without property overlays");
        }
        Ok(LoadOutcome::Applied(id))
    }

    fn update_host_label(&self, state_code: u8) {
        if self.config.host_state_code() == Some(state_code) {
            let label = Tooltip::host(&self.config.host_label_text, self.config.host_label_at());
            self.surface.set_host_label(Some(&label));
        } else {
            self.surface.set_host_label(None);
        }
    }

    /// Warms the municipality cache for every state.
    pub async fn preload_cities(&self) -> PreloadReport {
        let keys = all_state_codes().map(RegionKey::Cities).collect();
        let report = preload(&self.cache, keys, self.config.preload_window).await;
        if report.failed.is_empty() {
            self.events
                .info("preload", format!("{} states preloaded", report.loaded));
        } else {
            self.events.warn(
                "preload",
                format!(
                    "{} states preloaded, failed: {}",
                    report.loaded,
                    report.failed.join(", ")
                ),
            );
        }
        report
    }

    pub async fn handle_event(&self, event: MapEvent) -> Result<(), MapError> {
        match event {
            MapEvent::ZoomEnd { zoom } => self.on_zoom_end(zoom).await,
            MapEvent::Feature {
                layer,
                feature,
                kind,
                at,
            } => match self.layer_kind(layer) {
                Some(LayerKind::States) if kind == PointerKind::Click => {
                    self.select_state(feature).await
                }
                Some(LayerKind::Cities) => {
                    self.on_city_pointer(feature, kind, at);
                    Ok(())
                }
                Some(LayerKind::Shapefile) if kind == PointerKind::Click => {
                    self.surface.open_popup(layer, feature);
                    Ok(())
                }
                Some(_) => Ok(()),
                None => {
                    debug!(?layer, "event for a detached layer ignored");
                    Ok(())
                }
            },
        }
    }

    fn layer_kind(&self, layer: LayerId) -> Option<LayerKind> {
        let view = self.view.borrow();
        if view.states.as_ref().is_some_and(|s| s.id == layer) {
            Some(LayerKind::States)
        } else if view.cities.as_ref().is_some_and(|c| c.id == layer) {
            Some(LayerKind::Cities)
        } else if view.overlay_ids.contains(&layer) {
            Some(LayerKind::Shapefile)
        } else {
            None
        }
    }

    async fn select_state(&self, feature: usize) -> Result<(), MapError> {
        let code = {
            let view = self.view.borrow();
            match view.states.as_ref().and_then(|s| s.features.get(feature)) {
                Some(f) => f
                    .state_code()
                    .ok_or_else(|| MapError::UnknownState(f.id.clone().unwrap_or_default())),
                None => Err(MapError::UnknownState(format!("feature #{feature}"))),
            }
        };
        let code = code.map_err(|e| self.fail("states", e))?;
        self.load_state_cities(code).await.map(|_| ())
    }

    /// Hover tooltips and clicks on the municipality layer.
    pub fn on_city_pointer(&self, feature: usize, kind: PointerKind, at: LatLng) {
        let (key, name, mode, hovered) = {
            let view = self.view.borrow();
            let Some(cities) = view.cities.as_ref() else {
                return;
            };
            let (Some(key), Some(name)) = (cities.keys.get(feature), cities.names.get(feature))
            else {
                return;
            };
            (key.clone(), name.clone(), view.mode, view.hovered)
        };

        match kind {
            PointerKind::Over => {
                let is_host = key.as_str() == self.config.host_city_key;
                if mode.is_satellite() || is_host || name.is_empty() {
                    return;
                }
                self.surface.show_tooltip(&Tooltip::hover(name, at));
                self.view.borrow_mut().hovered = Some(feature);
            }
            PointerKind::Move => {
                if hovered == Some(feature) {
                    self.surface.move_tooltip(at);
                }
            }
            PointerKind::Out => {
                if hovered == Some(feature) {
                    self.view.borrow_mut().hovered = None;
                    self.surface.hide_tooltip();
                }
            }
            PointerKind::Click => {
                if mode.is_satellite() {
                    return;
                }
                let index = self.supplier_index();
                if self.details.open(&index, key.as_str(), None, self.today()) {
                    self.events.info("details", format!("opened {key}"));
                }
            }
        }
    }

    pub async fn on_zoom_end(&self, zoom: f64) -> Result<(), MapError> {
        let target = BasemapMode::for_zoom(zoom, self.config.satellite_zoom);
        let current = std::mem::replace(&mut self.view.borrow_mut().mode, target);
        if current == target {
            return Ok(());
        }
        match target {
            BasemapMode::Satellite => self.enter_satellite().await,
            BasemapMode::Vector => {
                self.leave_satellite();
                Ok(())
            }
        }
    }

    async fn enter_satellite(&self) -> Result<(), MapError> {
        self.surface.set_satellite_basemap(true);
        self.view.borrow_mut().hovered = None;
        self.surface.hide_tooltip();
        self.details.close();
        self.surface.set_search_controls_visible(true);
        self.restyle_cities();
        self.events.info("basemap", "satellite");
        self.load_overlays().await.map(|_| ())
    }

    fn leave_satellite(&self) {
        self.overlay_requests.next();
        self.surface.set_satellite_basemap(false);
        self.surface.set_search_controls_visible(false);
        self.clear_overlays();
        self.restyle_cities();
        self.events.info("basemap", "vector");
    }

    fn clear_overlays(&self) {
        let ids = {
            let mut view = self.view.borrow_mut();
            view.overlays.clear();
            std::mem::take(&mut view.overlay_ids)
        };
        for id in ids {
            self.surface.remove_layer(id);
        }
        self.search.borrow_mut().reset();
    }

    /// Loads the property overlays of the active state. Returns how many
    /// were attached; zero when no state is active or the response was
    /// superseded.
    pub async fn load_overlays(&self) -> Result<usize, MapError> {
        let Some(code) = self.view.borrow().active_state else {
            return Ok(0);
        };
        let Some(abbr) = state_abbr(code) else {
            return Err(self.fail("shapefiles", MapError::UnknownState(code.to_string())));
        };

        let generation = self.overlay_requests.next();
        let body = self
            .cache
            .load(&RegionKey::Shapefiles(abbr.to_string()))
            .await
            .map_err(|e| self.fail("shapefiles", e))?;

        let wanted = {
            let view = self.view.borrow();
            view.mode.is_satellite() && view.active_state == Some(code)
        };
        if !wanted || !self.overlay_requests.is_current(generation) {
            self.events
                .warn("shapefiles", format!("discarded overlays of {abbr}"));
            return Ok(0);
        }

        let records = parse_records(&body).map_err(|e| self.fail("shapefiles", e))?;
        self.clear_overlays();

        let mut attached = 0;
        for record in &records {
            match ShapefileOverlay::from_record(record) {
                Ok(overlay) => {
                    let id = self.surface.add_overlay(&overlay);
                    let mut view = self.view.borrow_mut();
                    view.overlay_ids.push(id);
                    view.overlays.push(overlay);
                    attached += 1;
                }
                Err(e) => self.events.warn("shapefiles", e.to_string()),
            }
        }
        self.events
            .info("shapefiles", format!("{attached} overlays of {abbr} attached"));
        Ok(attached)
    }

    /// Moves to the next or previous overlay feature matching `query`,
    /// fits the map to it and opens its popup.
    pub fn search_shapefiles(&self, query: &str, direction: SearchDirection) -> Option<SearchHit> {
        let (hit, layer) = {
            let view = self.view.borrow();
            let hit = self
                .search
                .borrow_mut()
                .step(&view.overlays, query, direction)?;
            let layer = *view.overlay_ids.get(hit.path.0)?;
            (hit, layer)
        };
        if let Some(bounds) = hit.bounds {
            self.surface.fit_bounds(bounds);
        }
        self.surface.open_popup(layer, hit.path.1);
        Some(hit)
    }

    pub fn close_details(&self) {
        self.details.close();
    }
}
