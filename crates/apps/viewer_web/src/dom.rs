use std::cell::Cell;

use formats::SupplierCard;
use formats::html::escape;
use tracing::{error, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Document, Element, HtmlElement, Window};

pub const DETAILS_ID: &str = "details";
pub const DETAILS_TITLE_ID: &str = "details-title";
pub const CARDS_CONTAINER_ID: &str = "supplier-cards-container";
pub const CLOSE_DETAILS_ID: &str = "close-details";
pub const MAP_ID: &str = "map";
pub const MATERIAL_FILTER_ID: &str = "material-filter";
pub const SEARCH_CONTROLS_ID: &str = "shapes-search-controls";
pub const LOADER_ID: &str = "main-loader";

const HIDDEN_CLASS: &str = "translate-x-full";
const SHOWN_CLASS: &str = "translate-x-0";
const ACTIVE_MATERIAL_CLASS: &str = "active-material";
const TOAST_MS: i32 = 5_000;
const TOAST_FADE_MS: i32 = 500;
const COPYABLE_SELECTOR: &str = ".copyable-text";
const COPIED_CLASS: &str = "copied";
const COPIED_MS: i32 = 1_000;

#[wasm_bindgen(inline_js = "
export function sm_write_clipboard(text) {
    return navigator.clipboard.writeText(text);
}
")]
extern "C" {
    fn sm_write_clipboard(text: &str) -> js_sys::Promise;
}

thread_local! {
    /// Pending removal of the `copied` mark, shared by every copyable text.
    static COPIED_TIMEOUT: Cell<Option<i32>> = const { Cell::new(None) };
}

pub fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("window unavailable"))
}

pub fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("document unavailable"))
}

/// Looks up an element the page cannot work without.
pub fn required(document: &Document, id: &str) -> Result<HtmlElement, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{id}")))?
        .dyn_into::<HtmlElement>()
        .map_err(|_| JsValue::from_str(&format!("#{id} is not an HTML element")))
}

pub fn optional(document: &Document, id: &str) -> Option<HtmlElement> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

/// Side panel backed by `#details`.
pub struct DomDetailPanel {
    document: Document,
    details: HtmlElement,
    title: HtmlElement,
    container: HtmlElement,
}

impl DomDetailPanel {
    pub fn from_document(document: &Document) -> Result<Self, JsValue> {
        Ok(Self {
            document: document.clone(),
            details: required(document, DETAILS_ID)?,
            title: required(document, DETAILS_TITLE_ID)?,
            container: required(document, CARDS_CONTAINER_ID)?,
        })
    }

    fn card_element(&self, card: &SupplierCard) -> Result<Element, JsValue> {
        let el = self.document.create_element("div")?;
        el.set_class_name("w-full h-fit");
        el.set_attribute("data-supplier-id", &card.supplier_id.to_string())?;
        el.set_inner_html(&card.html);
        Ok(el)
    }
}

impl scene::DetailPanel for DomDetailPanel {
    fn set_title(&self, title: &str) {
        self.title.set_text_content(Some(title));
    }

    fn replace_cards(&self, cards: &[SupplierCard]) {
        self.container.set_inner_html("");
        for card in cards {
            let appended = self
                .card_element(card)
                .and_then(|el| self.container.append_child(&el).map(|_| ()));
            if let Err(e) = appended {
                warn!("could not render card {}: {e:?}", card.supplier_id);
            }
        }
    }

    fn slide_in(&self) {
        let classes = self.details.class_list();
        let _ = classes.remove_1(HIDDEN_CLASS);
        let _ = classes.add_1(SHOWN_CLASS);
    }

    fn slide_out(&self) {
        let classes = self.details.class_list();
        let _ = classes.remove_1(SHOWN_CLASS);
        let _ = classes.add_1(HIDDEN_CLASS);
    }
}

pub fn set_search_controls_visible(visible: bool) {
    let Some(controls) = document()
        .ok()
        .and_then(|d| optional(&d, SEARCH_CONTROLS_ID))
    else {
        return;
    };
    let _ = controls.class_list().toggle_with_force("hidden", !visible);
}

pub fn hide_loader(document: &Document) {
    if let Some(loader) = optional(document, LOADER_ID) {
        let _ = loader.style().set_property("display", "none");
    }
}

/// Fills `.material-filter-content` with one option per material. Clicking
/// an option marks it active and calls `on_select` with its value.
pub fn fill_material_filter(
    document: &Document,
    materials: &[String],
    on_select: impl Fn(String) + 'static,
) -> Result<(), JsValue> {
    let Some(filter) = optional(document, MATERIAL_FILTER_ID) else {
        return Ok(());
    };
    let Some(content) = filter.query_selector(".material-filter-content")? else {
        return Ok(());
    };

    let filter_root = filter.clone();
    let handler = Closure::<dyn Fn(web_sys::Event)>::new(move |event: web_sys::Event| {
        let Some(selected) = event
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
        else {
            return;
        };
        if let Ok(options) = filter_root.query_selector_all(".material-filter-option") {
            for i in 0..options.length() {
                if let Some(opt) = options.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                    let _ = opt.class_list().remove_1(ACTIVE_MATERIAL_CLASS);
                }
            }
        }
        let _ = selected.class_list().add_1(ACTIVE_MATERIAL_CLASS);
        if let Some(value) = selected.get_attribute("data-value") {
            on_select(value);
        }
    });

    for (i, material) in materials.iter().enumerate() {
        let option = document.create_element("div")?;
        option.set_class_name(&option_classes(i == 0));
        option.set_attribute("data-value", material)?;
        option.set_text_content(Some(material));
        option.add_event_listener_with_callback("click", handler.as_ref().unchecked_ref())?;
        content.append_child(&option)?;
    }
    handler.forget();
    Ok(())
}

fn option_classes(active: bool) -> String {
    let mut classes = String::from("hover:text-slate-500 material-filter-option");
    if active {
        classes.push(' ');
        classes.push_str(ACTIVE_MATERIAL_CLASS);
    }
    classes
}

pub(crate) fn toast_html(message: &str, detail: Option<&str>) -> String {
    let mut html = format!("<strong>Ocorreu um erro!</strong><br>{}", escape(message));
    if let Some(detail) = detail {
        html.push_str(&format!("<br><small>({})</small>", escape(detail)));
    }
    html
}

/// Shows a transient error box in the bottom-right corner.
pub fn show_toast(message: &str, detail: Option<&str>) {
    if let Err(e) = try_show_toast(message, detail) {
        web_sys::console::error_1(&e);
    }
}

fn try_show_toast(message: &str, detail: Option<&str>) -> Result<(), JsValue> {
    let window = window()?;
    let document = document()?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))?;

    let toast = document.create_element("div")?.dyn_into::<HtmlElement>()?;
    toast.set_attribute(
        "style",
        "position: fixed; bottom: 20px; right: 20px; padding: 15px 20px; \
         background-color: #c93a3a; color: #fff; font-size: 16px; border-radius: 8px; \
         box-shadow: 0 4px 8px rgba(0, 0, 0, 0.2); max-width: 600px; z-index: 1000; \
         transition: opacity 0.5s;",
    )?;
    toast.set_inner_html(&toast_html(message, detail));
    body.append_child(&toast)?;

    let fading = toast.clone();
    let remove = Closure::once_into_js(move || fading.remove());
    let window_for_fade = window.clone();
    let fade = Closure::once_into_js(move || {
        let _ = toast.style().set_property("opacity", "0");
        let _ = window_for_fade.set_timeout_with_callback_and_timeout_and_arguments_0(
            remove.unchecked_ref(),
            TOAST_FADE_MS,
        );
    });
    window.set_timeout_with_callback_and_timeout_and_arguments_0(fade.unchecked_ref(), TOAST_MS)?;
    Ok(())
}

/// Routes uncaught page errors to the toast.
pub fn install_error_toast() -> Result<(), JsValue> {
    let handler = Closure::<dyn Fn(JsValue, JsValue, JsValue, JsValue) -> bool>::new(
        |message: JsValue, source: JsValue, line: JsValue, column: JsValue| {
            let message = message.as_string().unwrap_or_default();
            let detail = format!(
                "{} - linha {}, coluna {}",
                source.as_string().unwrap_or_default(),
                line.as_f64().unwrap_or_default(),
                column.as_f64().unwrap_or_default(),
            );
            show_toast(&message, Some(&detail));
            true
        },
    );
    window()?.set_onerror(Some(handler.as_ref().unchecked_ref()));
    handler.forget();
    Ok(())
}

/// Stores `handle` as the pending `copied` reset and returns the one it
/// replaces, which the caller must cancel.
fn replace_copied_timeout(handle: i32) -> Option<i32> {
    COPIED_TIMEOUT.with(|slot| slot.replace(Some(handle)))
}

/// Copies the element's `data-value` to the clipboard and marks it `copied`
/// for one second. Only the most recently copied element keeps the mark.
pub fn copy_text(element: Element) {
    let value = element.get_attribute("data-value").unwrap_or_default();
    if let Ok(copyables) = document().and_then(|d| d.query_selector_all(COPYABLE_SELECTOR)) {
        for i in 0..copyables.length() {
            if let Some(el) = copyables.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                let _ = el.class_list().remove_1(COPIED_CLASS);
            }
        }
    }

    spawn_local(async move {
        if let Err(e) = JsFuture::from(sm_write_clipboard(&value)).await {
            error!("clipboard write failed: {e:?}");
            return;
        }
        let _ = element.class_list().add_1(COPIED_CLASS);
        if let Err(e) = schedule_copied_reset(element) {
            error!("could not schedule copied reset: {e:?}");
        }
    });
}

fn schedule_copied_reset(element: Element) -> Result<(), JsValue> {
    let window = window()?;
    let reset = Closure::once_into_js(move || {
        let _ = element.class_list().remove_1(COPIED_CLASS);
    });
    let handle = window
        .set_timeout_with_callback_and_timeout_and_arguments_0(reset.unchecked_ref(), COPIED_MS)?;
    if let Some(previous) = replace_copied_timeout(handle) {
        window.clear_timeout_with_handle(previous);
    }
    Ok(())
}

/// Publishes [`copy_text`] as `window.copyText` for `onclick` attributes.
pub fn expose_copy_text() -> Result<(), JsValue> {
    let copy = Closure::<dyn Fn(Element)>::new(copy_text);
    let window: JsValue = window()?.into();
    js_sys::Reflect::set(&window, &JsValue::from_str("copyText"), copy.as_ref())?;
    copy.forget();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_filter_option_starts_active() {
        assert_eq!(option_classes(true), "hover:text-slate-500 material-filter-option active-material");
        assert_eq!(option_classes(false), "hover:text-slate-500 material-filter-option");
    }

    #[test]
    fn toast_escapes_message() {
        let html = toast_html("<b>boom</b>", Some("app.js - linha 3, coluna 9"));
        assert!(html.starts_with("<strong>Ocorreu um erro!</strong>"));
        assert!(html.contains("&lt;b&gt;boom&lt;/b&gt;"));
        assert!(html.ends_with("<small>(app.js - linha 3, coluna 9)</small>"));
    }

    #[test]
    fn a_new_copy_replaces_the_pending_reset() {
        assert_eq!(replace_copied_timeout(7), None);
        assert_eq!(replace_copied_timeout(9), Some(7));
        assert_eq!(replace_copied_timeout(11), Some(9));
    }
}
