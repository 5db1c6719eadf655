//! Helpers for the supplier admin forms and the dashboard charts.

use std::cell::Cell;
use std::rc::Rc;

use serde::Deserialize;
use serde_json::Value;
use streaming::Fetch;
use tracing::error;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, FormData, HtmlFormElement, HtmlInputElement, HtmlSelectElement};

use crate::dom;
use crate::fetch::GlooFetch;
use crate::leaflet::to_js;

const PLACEHOLDER_OPTION: &str = r#"<option value="">Select</option>"#;
const RESIZE_DEBOUNCE_MS: i32 = 200;

#[wasm_bindgen(inline_js = "
export function sm_resize_charts() {
    if (typeof Plotly === 'undefined') return;
    document.querySelectorAll('.plotly-chart').forEach((el) => Plotly.Plots.resize(el));
}

export function sm_render_chart(container, data, layout) {
    Plotly.purge(container);
    Plotly.react(container, data, layout, { displayModeBar: false, showTips: false });
    Plotly.relayout(container, { autosize: true });
    Plotly.Plots.resize(container);
}
")]
extern "C" {
    fn sm_resize_charts();
    #[wasm_bindgen(catch)]
    fn sm_render_chart(container: &Element, data: JsValue, layout: JsValue) -> Result<(), JsValue>;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CityOption {
    pub id: u64,
    pub name: String,
}

/// Decimal comma to decimal point, first occurrence only.
pub fn normalize_decimal(value: &str) -> String {
    value.replacen(',', ".", 1)
}

/// Record id of an admin change page (`.../{id}/change/`).
pub fn change_page_id(url: &str) -> Option<u64> {
    url.match_indices("/change").find_map(|(at, _)| {
        let head = &url[..at];
        let digits = head.len() - head.trim_end_matches(|c: char| c.is_ascii_digit()).len();
        head[head.len() - digits..].parse().ok()
    })
}

pub fn cities_url(state_id: &str) -> String {
    format!("/cities/?state={state_id}")
}

pub fn supplier_url(id: u64) -> String {
    format!("/supplier?id={id}")
}

pub fn parse_city_options(body: Value) -> Result<Vec<CityOption>, serde_json::Error> {
    serde_json::from_value(body)
}

fn supplier_city_id(body: &Value) -> Option<String> {
    match body.get("city")?.get("id")? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// `application/x-www-form-urlencoded` encoding of one key or value.
fn form_encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'*' | b'-' | b'.' | b'_' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// `{base}?chart_id={id}&{form fields}`, every part form-encoded.
pub fn chart_update_url(base: &str, chart_id: &str, fields: &[(String, String)]) -> String {
    let mut url = format!("{base}?chart_id={}", form_encode(chart_id));
    for (key, value) in fields {
        url.push('&');
        url.push_str(&form_encode(key));
        url.push('=');
        url.push_str(&form_encode(value));
    }
    url
}

/// What a chart update response asks the container to show.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartUpdate {
    /// A Plotly figure to render in place of the current one.
    Figure { data: Value, layout: Value },
    /// Markup the server sent instead of a figure (an empty-state message).
    Html(String),
}

/// Reads `chart_data` from an update response. Nothing changes when it is
/// missing or empty.
pub fn chart_update(body: &Value) -> Option<ChartUpdate> {
    let raw = body.get("chart_data")?.as_str().filter(|s| !s.is_empty())?;
    match serde_json::from_str::<Value>(raw) {
        Ok(figure) if figure.is_object() => Some(ChartUpdate::Figure {
            data: figure.get("data").cloned().unwrap_or(Value::Null),
            layout: figure.get("layout").cloned().unwrap_or(Value::Null),
        }),
        _ => Some(ChartUpdate::Html(raw.to_string())),
    }
}

fn form_fields(form: &HtmlFormElement) -> Result<Vec<(String, String)>, JsValue> {
    let data = FormData::new_with_form(form)?;
    let mut fields = Vec::new();
    let Some(entries) = js_sys::try_iter(&data)? else {
        return Ok(fields);
    };
    for entry in entries {
        let entry: js_sys::Array = entry?.unchecked_into();
        // File inputs carry no text value.
        if let (Some(key), Some(value)) = (entry.get(0).as_string(), entry.get(1).as_string()) {
            fields.push((key, value));
        }
    }
    Ok(fields)
}

async fn update_chart(container: Element, url: String) {
    let body = match GlooFetch.get_json(&url).await {
        Ok(body) => body,
        Err(e) => {
            error!("error updating chart {}: {e}", container.id());
            return;
        }
    };
    let Some(update) = chart_update(&body) else {
        return;
    };

    container.set_inner_html("");
    match update {
        ChartUpdate::Figure { data, layout } => {
            if let Err(e) = sm_render_chart(&container, to_js(&data), to_js(&layout)) {
                error!("plotly could not render chart {}: {e:?}", container.id());
            }
        }
        ChartUpdate::Html(html) => container.set_inner_html(&html),
    }
}

fn select(document: &Document, name: &str) -> Option<HtmlSelectElement> {
    document
        .query_selector(&format!(r#"select[name="{name}"]"#))
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into().ok())
}

async fn load_cities(city_select: HtmlSelectElement, state_id: String) {
    if state_id.is_empty() {
        city_select.set_inner_html(PLACEHOLDER_OPTION);
        city_select.set_disabled(true);
        return;
    }

    let options = match GlooFetch.get_json(&cities_url(&state_id)).await {
        Ok(body) => parse_city_options(body).map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };
    let options = match options {
        Ok(options) => options,
        Err(e) => {
            error!("error loading cities: {e}");
            city_select.set_disabled(true);
            return;
        }
    };

    let mut html = String::from(PLACEHOLDER_OPTION);
    for city in &options {
        html.push_str(&format!(
            r#"<option value="{}">{}</option>"#,
            city.id,
            formats::html::escape(&city.name)
        ));
    }
    city_select.set_inner_html(&html);
    city_select.set_disabled(false);

    preselect_edited_city(&city_select).await;
}

async fn preselect_edited_city(city_select: &HtmlSelectElement) {
    let Some(href) = dom::window().ok().and_then(|w| w.location().href().ok()) else {
        return;
    };
    let Some(id) = change_page_id(&href) else {
        return;
    };
    match GlooFetch.get_json(&supplier_url(id)).await {
        Ok(body) => {
            if let Some(city_id) = supplier_city_id(&body) {
                city_select.set_value(&city_id);
            }
        }
        Err(e) => error!("error loading supplier: {e}"),
    }
}

/// Wires the state select to the city select on the supplier form.
#[wasm_bindgen]
pub fn init_city_state_dependency() -> Result<(), JsValue> {
    let document = dom::document()?;
    let (Some(state_select), Some(city_select)) =
        (select(&document, "state"), select(&document, "city"))
    else {
        return Ok(());
    };

    city_select.set_disabled(state_select.value().is_empty());

    let target = city_select.clone();
    let on_change = Closure::<dyn Fn(web_sys::Event)>::new(move |event: web_sys::Event| {
        let Some(select) = event
            .target()
            .and_then(|t| t.dyn_into::<HtmlSelectElement>().ok())
        else {
            return;
        };
        spawn_local(load_cities(target.clone(), select.value()));
    });
    state_select.set_onchange(Some(on_change.as_ref().unchecked_ref()));
    on_change.forget();

    let initial = state_select.value();
    if !initial.is_empty() {
        spawn_local(load_cities(city_select, initial));
    }
    Ok(())
}

/// Rewrites `1,5` as `1.5` when a numeric text field loses focus.
#[wasm_bindgen]
pub fn init_numeric_fields() -> Result<(), JsValue> {
    let document = dom::document()?;
    let fields = document.query_selector_all(r#"input[type="text"].numeric-field"#)?;
    for i in 0..fields.length() {
        let Some(field) = fields
            .item(i)
            .and_then(|n| n.dyn_into::<HtmlInputElement>().ok())
        else {
            continue;
        };
        let target = field.clone();
        let on_blur = Closure::<dyn Fn()>::new(move || {
            let value = target.value();
            if !value.is_empty() {
                target.set_value(&normalize_decimal(&value));
            }
        });
        field.add_event_listener_with_callback("blur", on_blur.as_ref().unchecked_ref())?;
        on_blur.forget();
    }
    Ok(())
}

/// Resizes every `.plotly-chart` after window resizes settle and after
/// htmx swaps in new content.
#[wasm_bindgen]
pub fn init_chart_resizing() -> Result<(), JsValue> {
    let window = dom::window()?;
    let pending = Rc::new(Cell::new(None::<i32>));

    let resize = Closure::<dyn Fn()>::new(|| sm_resize_charts());
    let resize: js_sys::Function = resize.into_js_value().unchecked_into();

    let debounce_window = window.clone();
    let debounced = resize.clone();
    let on_resize = Closure::<dyn Fn()>::new(move || {
        if let Some(handle) = pending.take() {
            debounce_window.clear_timeout_with_handle(handle);
        }
        match debounce_window
            .set_timeout_with_callback_and_timeout_and_arguments_0(&debounced, RESIZE_DEBOUNCE_MS)
        {
            Ok(handle) => pending.set(Some(handle)),
            Err(e) => error!("could not schedule chart resize: {e:?}"),
        }
    });
    window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
    on_resize.forget();

    if let Some(body) = dom::document()?.body() {
        body.add_event_listener_with_callback("htmx:afterSwap", &resize)?;
    }
    Ok(())
}

/// Intercepts filter form submits and redraws every `.plotly-chart` whose
/// `data-related-form` names the submitted form, from `update_url`.
#[wasm_bindgen]
pub fn init_chart_filters(update_url: String) -> Result<(), JsValue> {
    let document = dom::document()?;
    let root = document.clone();
    let on_submit = Closure::<dyn Fn(web_sys::Event)>::new(move |event: web_sys::Event| {
        event.prevent_default();
        let Some(form) = event
            .target()
            .and_then(|t| t.dyn_into::<HtmlFormElement>().ok())
        else {
            return;
        };
        let fields = match form_fields(&form) {
            Ok(fields) => fields,
            Err(e) => {
                error!("could not read filter form {}: {e:?}", form.id());
                return;
            }
        };
        let selector = format!(r#".plotly-chart[data-related-form="{}"]"#, form.id());
        let Ok(charts) = root.query_selector_all(&selector) else {
            return;
        };
        for i in 0..charts.length() {
            let Some(chart) = charts.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let chart_id = chart.id();
            if chart_id.is_empty() {
                continue;
            }
            let url = chart_update_url(&update_url, &chart_id, &fields);
            spawn_local(update_chart(chart, url));
        }
    });
    document.add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref())?;
    on_submit.forget();
    Ok(())
}
