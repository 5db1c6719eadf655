use std::rc::Rc;

use foundation::{GeoBounds, LatLng};
use layers::labels::Tooltip;
use layers::overlay::ShapefileOverlay;
use layers::symbology::PathStyle;
use layers::{LayerId, LayerKind};
use serde_json::Value;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PointerKind {
    Over,
    Move,
    Out,
    Click,
}

/// Input forwarded from the map widget.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Pointer interaction with feature `feature` of `layer`, in the order
    /// the features appear in the data the layer was created from.
    Feature {
        layer: LayerId,
        feature: usize,
        kind: PointerKind,
        at: LatLng,
    },
    ZoomEnd { zoom: f64 },
}

/// Rendering target for the map.
///
/// Methods take `&self`: the controller and the widget's event callbacks
/// share one surface on a single thread.
pub trait MapSurface {
    /// Attaches a GeoJSON layer. `styles[i]` styles the i-th feature.
    fn add_geojson_layer(&self, kind: LayerKind, data: &Value, styles: &[Rc<PathStyle>]) -> LayerId;

    fn restyle_layer(&self, layer: LayerId, styles: &[Rc<PathStyle>]);

    /// Detaches a layer and every listener registered on it.
    fn remove_layer(&self, layer: LayerId);

    /// Attaches a shapefile overlay with per-feature styles and popups.
    fn add_overlay(&self, overlay: &ShapefileOverlay) -> LayerId;

    fn open_popup(&self, layer: LayerId, feature: usize);

    /// Shows the transient tooltip, replacing any previous one.
    fn show_tooltip(&self, tooltip: &Tooltip);

    fn move_tooltip(&self, at: LatLng);

    fn hide_tooltip(&self);

    fn set_host_label(&self, label: Option<&Tooltip>);

    fn set_satellite_basemap(&self, visible: bool);

    fn set_search_controls_visible(&self, visible: bool);

    fn fit_bounds(&self, bounds: GeoBounds);
}

impl<T: MapSurface + ?Sized> MapSurface for Rc<T> {
    fn add_geojson_layer(&self, kind: LayerKind, data: &Value, styles: &[Rc<PathStyle>]) -> LayerId {
        (**self).add_geojson_layer(kind, data, styles)
    }

    fn restyle_layer(&self, layer: LayerId, styles: &[Rc<PathStyle>]) {
        (**self).restyle_layer(layer, styles)
    }

    fn remove_layer(&self, layer: LayerId) {
        (**self).remove_layer(layer)
    }

    fn add_overlay(&self, overlay: &ShapefileOverlay) -> LayerId {
        (**self).add_overlay(overlay)
    }

    fn open_popup(&self, layer: LayerId, feature: usize) {
        (**self).open_popup(layer, feature)
    }

    fn show_tooltip(&self, tooltip: &Tooltip) {
        (**self).show_tooltip(tooltip)
    }

    fn move_tooltip(&self, at: LatLng) {
        (**self).move_tooltip(at)
    }

    fn hide_tooltip(&self) {
        (**self).hide_tooltip()
    }

    fn set_host_label(&self, label: Option<&Tooltip>) {
        (**self).set_host_label(label)
    }

    fn set_satellite_basemap(&self, visible: bool) {
        (**self).set_satellite_basemap(visible)
    }

    fn set_search_controls_visible(&self, visible: bool) {
        (**self).set_search_controls_visible(visible)
    }

    fn fit_bounds(&self, bounds: GeoBounds) {
        (**self).fit_bounds(bounds)
    }
}
