//! Browser front-end for the supplier map.
//!
//! `start` runs on module load and installs logging and the error toast.
//! The page calls `init_map` to build the map against Leaflet and its DOM,
//! and the admin pages call the `admin` initializers instead.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use layers::query::SearchDirection;
use scene::{MapApp, MapEvent};
use tracing::{debug, error, info};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, HtmlElement, HtmlInputElement};

pub mod admin;
pub mod config;
pub mod dom;
pub mod fetch;
pub mod leaflet;
pub mod logging;

use dom::DomDetailPanel;
use fetch::GlooFetch;
use leaflet::{EventSink, LeafletSurface};

pub type WebApp = MapApp<GlooFetch, Rc<LeafletSurface>, DomDetailPanel>;

thread_local! {
    /// Owns the application for the lifetime of the page; callbacks hold
    /// weak references.
    static APP: RefCell<Option<Rc<WebApp>>> = const { RefCell::new(None) };
}

/// Document validity is judged on the UTC calendar day, whatever the
/// browser's zone.
fn utc_day<Tz: TimeZone>(now: DateTime<Tz>) -> NaiveDate {
    now.naive_utc().date()
}

fn today() -> NaiveDate {
    utc_day(Utc::now())
}

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        console_error_panic_hook::hook(info);
        dom::show_toast(&info.to_string(), None);
    }));
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    install_panic_hook();
    logging::init();
    dom::install_error_toast()?;
    dom::expose_copy_text()?;
    Ok(())
}

/// Builds the map on the current page. Call once the DOM is ready.
#[wasm_bindgen]
pub fn init_map() {
    spawn_local(async {
        if let Err(err) = bootstrap().await {
            let message = err
                .as_string()
                .unwrap_or_else(|| format!("{err:?}"));
            error!("map startup failed: {message}");
            dom::show_toast(&message, None);
        }
    });
}

async fn bootstrap() -> Result<(), JsValue> {
    let document = dom::document()?;
    dom::required(&document, dom::MAP_ID)?;
    let close = dom::required(&document, dom::CLOSE_DETAILS_ID)?;
    let panel = DomDetailPanel::from_document(&document)?;

    let config = config::load(&document);
    let sink: EventSink = Rc::new(RefCell::new(None));
    let surface = Rc::new(LeafletSurface::new(dom::MAP_ID, &config, sink.clone()));
    let app = Rc::new(MapApp::new(config, GlooFetch, surface, panel, today));
    APP.with(|slot| *slot.borrow_mut() = Some(app.clone()));

    let weak = Rc::downgrade(&app);
    *sink.borrow_mut() = Some(Box::new(move |event| dispatch(&weak, event)));
    wire_close_button(&close, Rc::downgrade(&app))?;

    let report = app
        .start()
        .await
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    info!(
        "map ready: {} municipalities with suppliers",
        report.cities_with_suppliers
    );

    let filter_app = Rc::downgrade(&app);
    dom::fill_material_filter(&document, &report.filter_options, move |material| {
        if let Some(app) = filter_app.upgrade() {
            app.controller().set_active_material_type(&material);
        }
    })?;
    wire_search_controls(&document, Rc::downgrade(&app))?;

    let preload_app = app.clone();
    spawn_local(async move {
        let report = preload_app.controller().preload_cities().await;
        info!(
            "preloaded {} municipality layers, {} failed",
            report.loaded,
            report.failed.len()
        );
    });

    dom::hide_loader(&document);
    Ok(())
}

fn dispatch(app: &Weak<WebApp>, event: MapEvent) {
    let Some(app) = app.upgrade() else {
        return;
    };
    spawn_local(async move {
        if let Err(e) = app.controller().handle_event(event).await {
            debug!("map event not applied: {e}");
        }
    });
}

fn wire_close_button(button: &HtmlElement, app: Weak<WebApp>) -> Result<(), JsValue> {
    let on_click = Closure::<dyn Fn()>::new(move || {
        if let Some(app) = app.upgrade() {
            app.controller().close_details();
        }
    });
    button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    on_click.forget();
    Ok(())
}

fn wire_search_controls(document: &Document, app: Weak<WebApp>) -> Result<(), JsValue> {
    let Some(controls) = dom::optional(document, dom::SEARCH_CONTROLS_ID) else {
        return Ok(());
    };
    for (button_id, direction) in [
        ("#next-button", SearchDirection::Next),
        ("#prev-button", SearchDirection::Prev),
    ] {
        let Some(button) = controls.query_selector(button_id)? else {
            continue;
        };
        let root = controls.clone();
        let app = app.clone();
        let on_click = Closure::<dyn Fn()>::new(move || {
            let Some(app) = app.upgrade() else {
                return;
            };
            let query = root
                .query_selector("input")
                .ok()
                .flatten()
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                .map(|input| input.value())
                .unwrap_or_default();
            if app.controller().search_shapefiles(&query, direction).is_none() {
                debug!("no shapefile matches {query:?}");
            }
        });
        button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        on_click.forget();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, NaiveDate, TimeZone};
    use pretty_assertions::assert_eq;

    use super::utc_day;

    #[test]
    fn late_evening_in_brasilia_is_already_tomorrow() {
        let brasilia = FixedOffset::west_opt(3 * 3600).unwrap();
        let now = brasilia.with_ymd_and_hms(2026, 10, 19, 22, 30, 0).unwrap();
        assert_eq!(utc_day(now), NaiveDate::from_ymd_opt(2026, 10, 20).unwrap());

        let morning = brasilia.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap();
        assert_eq!(utc_day(morning), NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
    }
}
