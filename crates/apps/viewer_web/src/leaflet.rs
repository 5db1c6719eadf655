//! Leaflet-backed [`MapSurface`].
//!
//! A thin JS shim owns the `L.Map` and a registry of GeoJSON layers keyed by
//! numeric id. Feature interactions and zoom changes are reported back
//! through two Rust closures.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use foundation::{GeoBounds, LatLng};
use layers::labels::Tooltip;
use layers::overlay::ShapefileOverlay;
use layers::symbology::PathStyle;
use layers::{LayerId, LayerKind};
use scene::{MapConfig, MapEvent, MapSurface, PointerKind};
use serde::Serialize;
use serde_json::Value;
use tracing::error;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(inline_js = "
export function sm_create_map(containerId, options, onFeature, onZoom) {
    const map = L.map(containerId, {
        zoomControl: false,
        attributionControl: false,
        minZoom: options.minZoom,
        maxZoom: options.maxZoom,
        maxBounds: L.latLngBounds(L.latLng(180, -180), L.latLng(-90, 180)),
    });
    map.setView(options.center, options.minZoom);
    map.on('zoomend', () => onZoom(map.getZoom()));
    return {
        map,
        onFeature,
        layers: new Map(),
        satellite: L.tileLayer(options.satelliteUrl, {
            attribution: '&copy; <a href=\"https://www.esri.com/\">Esri</a>',
        }),
        tooltip: null,
        hostLabel: null,
    };
}

function sm_wire(handle, id, layer, index) {
    const report = (kind) => (e) => {
        handle.onFeature(id, index, kind, e.latlng.lat, e.latlng.lng);
    };
    layer.on('mouseover', report('over'));
    layer.on('mousemove', report('move'));
    layer.on('mouseout', report('out'));
    layer.on('click', report('click'));
}

export function sm_add_geojson(handle, id, data, styles, popups) {
    const order = new Map();
    const list = data && data.type === 'FeatureCollection' ? data.features : [data];
    list.forEach((feature, i) => order.set(feature, i));
    const features = [];
    const group = L.geoJSON(data, {
        style: (feature) => styles[order.get(feature)],
        onEachFeature: (feature, layer) => {
            const index = order.get(feature);
            features[index] = layer;
            if (popups) {
                layer.bindPopup(popups[index], {
                    closeButton: true,
                    closeOnEscapeKey: true,
                    className: 'shapefile-popup',
                });
                layer.on('remove', () => layer.closePopup());
            }
            sm_wire(handle, id, layer, index);
        },
    });
    group.addTo(handle.map);
    handle.layers.set(id, { group, features });
}

export function sm_restyle(handle, id, styles) {
    const entry = handle.layers.get(id);
    if (!entry) return;
    entry.features.forEach((layer, i) => {
        if (styles[i]) layer.setStyle(styles[i]);
        const el = layer.getElement && layer.getElement();
        if (el && styles[i]) {
            const interactive = styles[i].interactive !== false;
            el.style.pointerEvents = interactive ? '' : 'none';
            el.classList.toggle('leaflet-interactive', interactive);
        }
    });
}

export function sm_remove(handle, id) {
    const entry = handle.layers.get(id);
    if (!entry) return;
    entry.features.forEach((layer) => layer && layer.off());
    handle.map.removeLayer(entry.group);
    handle.layers.delete(id);
}

export function sm_open_popup(handle, id, index) {
    const entry = handle.layers.get(id);
    const layer = entry && entry.features[index];
    if (layer) layer.openPopup();
}

function sm_make_tooltip(t) {
    return L.tooltip({ permanent: t.permanent, direction: 'top', className: t.className })
        .setLatLng([t.lat, t.lng])
        .setContent(t.text);
}

export function sm_show_tooltip(handle, t) {
    if (handle.tooltip) handle.map.removeLayer(handle.tooltip);
    handle.tooltip = sm_make_tooltip(t);
    handle.map.addLayer(handle.tooltip);
}

export function sm_move_tooltip(handle, lat, lng) {
    if (handle.tooltip) handle.tooltip.setLatLng([lat, lng]);
}

export function sm_hide_tooltip(handle) {
    if (handle.tooltip) handle.map.removeLayer(handle.tooltip);
    handle.tooltip = null;
}

export function sm_set_host_label(handle, t) {
    if (handle.hostLabel) handle.hostLabel.remove();
    handle.hostLabel = null;
    if (t) {
        handle.hostLabel = sm_make_tooltip(t);
        handle.hostLabel.addTo(handle.map);
    }
}

export function sm_set_satellite(handle, visible) {
    const has = handle.map.hasLayer(handle.satellite);
    if (visible && !has) {
        handle.satellite.addTo(handle.map);
        handle.satellite.bringToBack();
    } else if (!visible && has) {
        handle.map.removeLayer(handle.satellite);
    }
}

export function sm_fit_bounds(handle, south, west, north, east) {
    handle.map.fitBounds([[south, west], [north, east]]);
}
")]
extern "C" {
    fn sm_create_map(
        container_id: &str,
        options: JsValue,
        on_feature: &Closure<dyn FnMut(f64, u32, String, f64, f64)>,
        on_zoom: &Closure<dyn FnMut(f64)>,
    ) -> JsValue;
    fn sm_add_geojson(handle: &JsValue, id: f64, data: JsValue, styles: JsValue, popups: JsValue);
    fn sm_restyle(handle: &JsValue, id: f64, styles: JsValue);
    fn sm_remove(handle: &JsValue, id: f64);
    fn sm_open_popup(handle: &JsValue, id: f64, index: u32);
    fn sm_show_tooltip(handle: &JsValue, tooltip: JsValue);
    fn sm_move_tooltip(handle: &JsValue, lat: f64, lng: f64);
    fn sm_hide_tooltip(handle: &JsValue);
    fn sm_set_host_label(handle: &JsValue, tooltip: JsValue);
    fn sm_set_satellite(handle: &JsValue, visible: bool);
    fn sm_fit_bounds(handle: &JsValue, south: f64, west: f64, north: f64, east: f64);
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MapOptions<'a> {
    min_zoom: f64,
    max_zoom: f64,
    center: [f64; 2],
    satellite_url: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TooltipJs<'a> {
    text: &'a str,
    lat: f64,
    lng: f64,
    permanent: bool,
    class_name: &'a str,
}

impl<'a> From<&'a Tooltip> for TooltipJs<'a> {
    fn from(t: &'a Tooltip) -> Self {
        Self {
            text: &t.text,
            lat: t.at.lat,
            lng: t.at.lng,
            permanent: t.permanent,
            class_name: t.class_name,
        }
    }
}

/// Receives events from the map once the controller exists.
pub type EventSink = Rc<RefCell<Option<Box<dyn Fn(MapEvent)>>>>;

pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> JsValue {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value.serialize(&serializer).unwrap_or_else(|e| {
        error!("serializing for js failed: {e}");
        JsValue::NULL
    })
}

fn pointer_kind(kind: &str) -> Option<PointerKind> {
    match kind {
        "over" => Some(PointerKind::Over),
        "move" => Some(PointerKind::Move),
        "out" => Some(PointerKind::Out),
        "click" => Some(PointerKind::Click),
        _ => None,
    }
}

pub struct LeafletSurface {
    handle: JsValue,
    next_id: Cell<u64>,
    _on_feature: Closure<dyn FnMut(f64, u32, String, f64, f64)>,
    _on_zoom: Closure<dyn FnMut(f64)>,
}

impl LeafletSurface {
    /// Creates the map inside `#{container_id}`. Events are dropped until
    /// `sink` holds a handler.
    pub fn new(container_id: &str, config: &MapConfig, sink: EventSink) -> Self {
        let feature_sink = sink.clone();
        let on_feature = Closure::<dyn FnMut(f64, u32, String, f64, f64)>::new(
            move |layer: f64, feature: u32, kind: String, lat: f64, lng: f64| {
                let Some(kind) = pointer_kind(&kind) else {
                    return;
                };
                if let Some(handler) = feature_sink.borrow().as_ref() {
                    handler(MapEvent::Feature {
                        layer: LayerId(layer as u64),
                        feature: feature as usize,
                        kind,
                        at: LatLng::new(lat, lng),
                    });
                }
            },
        );
        let on_zoom = Closure::<dyn FnMut(f64)>::new(move |zoom: f64| {
            if let Some(handler) = sink.borrow().as_ref() {
                handler(MapEvent::ZoomEnd { zoom });
            }
        });

        let options = to_js(&MapOptions {
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            center: config.center,
            satellite_url: &config.satellite_tiles_url,
        });
        let handle = sm_create_map(container_id, options, &on_feature, &on_zoom);

        Self {
            handle,
            next_id: Cell::new(1),
            _on_feature: on_feature,
            _on_zoom: on_zoom,
        }
    }

    fn allocate(&self) -> LayerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        LayerId(id)
    }
}

impl MapSurface for LeafletSurface {
    fn add_geojson_layer(&self, _kind: LayerKind, data: &Value, styles: &[Rc<PathStyle>]) -> LayerId {
        let id = self.allocate();
        let styles: Vec<&PathStyle> = styles.iter().map(|s| s.as_ref()).collect();
        sm_add_geojson(&self.handle, id.0 as f64, to_js(data), to_js(&styles), JsValue::NULL);
        id
    }

    fn restyle_layer(&self, layer: LayerId, styles: &[Rc<PathStyle>]) {
        let styles: Vec<&PathStyle> = styles.iter().map(|s| s.as_ref()).collect();
        sm_restyle(&self.handle, layer.0 as f64, to_js(&styles));
    }

    fn remove_layer(&self, layer: LayerId) {
        sm_remove(&self.handle, layer.0 as f64);
    }

    fn add_overlay(&self, overlay: &ShapefileOverlay) -> LayerId {
        let id = self.allocate();
        let styles = overlay.styles();
        let popups: Vec<&str> = overlay
            .features
            .iter()
            .map(|f| f.popup_html.as_str())
            .collect();
        sm_add_geojson(
            &self.handle,
            id.0 as f64,
            to_js(&overlay.collection),
            to_js(&styles),
            to_js(&popups),
        );
        id
    }

    fn open_popup(&self, layer: LayerId, feature: usize) {
        sm_open_popup(&self.handle, layer.0 as f64, feature as u32);
    }

    fn show_tooltip(&self, tooltip: &Tooltip) {
        sm_show_tooltip(&self.handle, to_js(&TooltipJs::from(tooltip)));
    }

    fn move_tooltip(&self, at: LatLng) {
        sm_move_tooltip(&self.handle, at.lat, at.lng);
    }

    fn hide_tooltip(&self) {
        sm_hide_tooltip(&self.handle);
    }

    fn set_host_label(&self, label: Option<&Tooltip>) {
        let js = label.map_or(JsValue::NULL, |t| to_js(&TooltipJs::from(t)));
        sm_set_host_label(&self.handle, js);
    }

    fn set_satellite_basemap(&self, visible: bool) {
        sm_set_satellite(&self.handle, visible);
    }

    fn set_search_controls_visible(&self, visible: bool) {
        crate::dom::set_search_controls_visible(visible);
    }

    fn fit_bounds(&self, bounds: GeoBounds) {
        sm_fit_bounds(
            &self.handle,
            bounds.south_west.lat,
            bounds.south_west.lng,
            bounds.north_east.lat,
            bounds.north_east.lng,
        );
    }
}
