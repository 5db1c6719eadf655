//! Recording render targets for controller tests.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use formats::SupplierCard;
use foundation::{GeoBounds, LatLng};
use layers::labels::Tooltip;
use layers::overlay::ShapefileOverlay;
use layers::symbology::PathStyle;
use layers::{LayerId, LayerKind};
use serde_json::Value;

use crate::details::DetailPanel;
use crate::surface::MapSurface;

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    Add { id: LayerId, kind: LayerKind, features: usize },
    Restyle(LayerId),
    Remove(LayerId),
    AddOverlay { id: LayerId, record_id: u64 },
    OpenPopup(LayerId, usize),
    ShowTooltip(String),
    MoveTooltip,
    HideTooltip,
    HostLabel(Option<String>),
    Satellite(bool),
    SearchControls(bool),
    FitBounds(GeoBounds),
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    next_id: Cell<u64>,
    calls: RefCell<Vec<SurfaceCall>>,
    layers: RefCell<BTreeMap<LayerId, (LayerKind, Vec<Rc<PathStyle>>)>>,
    tooltip: RefCell<Option<Tooltip>>,
    host_label: RefCell<Option<Tooltip>>,
}

impl RecordingSurface {
    fn allocate(&self) -> LayerId {
        let id = LayerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        id
    }

    fn record(&self, call: SurfaceCall) {
        self.calls.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Currently attached layers of `kind`.
    pub fn attached(&self, kind: LayerKind) -> Vec<LayerId> {
        self.layers
            .borrow()
            .iter()
            .filter(|(_, (k, _))| *k == kind)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn styles(&self, id: LayerId) -> Vec<Rc<PathStyle>> {
        self.layers
            .borrow()
            .get(&id)
            .map(|(_, s)| s.clone())
            .unwrap_or_default()
    }

    pub fn tooltip(&self) -> Option<Tooltip> {
        self.tooltip.borrow().clone()
    }

    pub fn host_label(&self) -> Option<Tooltip> {
        self.host_label.borrow().clone()
    }
}

impl MapSurface for RecordingSurface {
    fn add_geojson_layer(&self, kind: LayerKind, _data: &Value, styles: &[Rc<PathStyle>]) -> LayerId {
        let id = self.allocate();
        self.layers.borrow_mut().insert(id, (kind, styles.to_vec()));
        self.record(SurfaceCall::Add {
            id,
            kind,
            features: styles.len(),
        });
        id
    }

    fn restyle_layer(&self, layer: LayerId, styles: &[Rc<PathStyle>]) {
        if let Some((_, s)) = self.layers.borrow_mut().get_mut(&layer) {
            *s = styles.to_vec();
        }
        self.record(SurfaceCall::Restyle(layer));
    }

    fn remove_layer(&self, layer: LayerId) {
        self.layers.borrow_mut().remove(&layer);
        self.record(SurfaceCall::Remove(layer));
    }

    fn add_overlay(&self, overlay: &ShapefileOverlay) -> LayerId {
        let id = self.allocate();
        let styles = overlay.styles().into_iter().map(Rc::new).collect();
        self.layers
            .borrow_mut()
            .insert(id, (LayerKind::Shapefile, styles));
        self.record(SurfaceCall::AddOverlay {
            id,
            record_id: overlay.record_id,
        });
        id
    }

    fn open_popup(&self, layer: LayerId, feature: usize) {
        self.record(SurfaceCall::OpenPopup(layer, feature));
    }

    fn show_tooltip(&self, tooltip: &Tooltip) {
        *self.tooltip.borrow_mut() = Some(tooltip.clone());
        self.record(SurfaceCall::ShowTooltip(tooltip.text.clone()));
    }

    fn move_tooltip(&self, at: LatLng) {
        if let Some(t) = self.tooltip.borrow_mut().as_mut() {
            t.at = at;
        }
        self.record(SurfaceCall::MoveTooltip);
    }

    fn hide_tooltip(&self) {
        self.tooltip.borrow_mut().take();
        self.record(SurfaceCall::HideTooltip);
    }

    fn set_host_label(&self, label: Option<&Tooltip>) {
        *self.host_label.borrow_mut() = label.cloned();
        self.record(SurfaceCall::HostLabel(label.map(|l| l.text.clone())));
    }

    fn set_satellite_basemap(&self, visible: bool) {
        self.record(SurfaceCall::Satellite(visible));
    }

    fn set_search_controls_visible(&self, visible: bool) {
        self.record(SurfaceCall::SearchControls(visible));
    }

    fn fit_bounds(&self, bounds: GeoBounds) {
        self.record(SurfaceCall::FitBounds(bounds));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelCall {
    Title(String),
    /// Supplier ids of the rendered cards.
    Cards(Vec<u64>),
    SlideIn,
    SlideOut,
}

#[derive(Debug, Default)]
pub struct RecordingPanel {
    calls: RefCell<Vec<PanelCall>>,
    cards: RefCell<Vec<SupplierCard>>,
}

impl RecordingPanel {
    pub fn calls(&self) -> Vec<PanelCall> {
        self.calls.borrow().clone()
    }

    pub fn last_cards(&self) -> Vec<SupplierCard> {
        self.cards.borrow().clone()
    }

    pub fn is_open(&self) -> bool {
        self.calls
            .borrow()
            .iter()
            .rev()
            .find(|c| matches!(c, PanelCall::SlideIn | PanelCall::SlideOut))
            == Some(&PanelCall::SlideIn)
    }
}

impl DetailPanel for RecordingPanel {
    fn set_title(&self, title: &str) {
        self.calls.borrow_mut().push(PanelCall::Title(title.to_string()));
    }

    fn replace_cards(&self, cards: &[SupplierCard]) {
        *self.cards.borrow_mut() = cards.to_vec();
        self.calls
            .borrow_mut()
            .push(PanelCall::Cards(cards.iter().map(|c| c.supplier_id).collect()));
    }

    fn slide_in(&self) {
        self.calls.borrow_mut().push(PanelCall::SlideIn);
    }

    fn slide_out(&self) {
        self.calls.borrow_mut().push(PanelCall::SlideOut);
    }
}
