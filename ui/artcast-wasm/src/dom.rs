//! DOM helpers.
//!
//! Pages render whole sections with `set_inner_html`; interactive elements
//! carry `data-action` attributes picked up by the delegated listeners in
//! `events.rs`.

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlInputElement, HtmlTextAreaElement, Window};

pub fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))
}

pub fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("window has no document"))
}

pub fn by_id(id: &str) -> Option<Element> {
    document().ok()?.get_element_by_id(id)
}

pub fn by_id_typed<T: JsCast>(id: &str) -> Option<T> {
    by_id(id).and_then(|e| e.dyn_into::<T>().ok())
}

/// Replace the markup of `#id`, if present.
pub fn render_into(id: &str, html: &str) {
    if let Some(el) = by_id(id) {
        el.set_inner_html(html);
    }
}

/// Current value of an `<input>` or `<textarea>`, trimmed.
pub fn field_value(id: &str) -> String {
    if let Some(input) = by_id_typed::<HtmlInputElement>(id) {
        return input.value().trim().to_string();
    }
    by_id_typed::<HtmlTextAreaElement>(id)
        .map(|t| t.value().trim().to_string())
        .unwrap_or_default()
}

pub fn pathname() -> String {
    window()
        .and_then(|w| w.location().pathname())
        .unwrap_or_else(|_| "/".into())
}

pub fn alert(message: &str) {
    if let Ok(w) = window() {
        let _ = w.alert_with_message(message);
    }
}

/// Copy text through `navigator.clipboard`, ignoring hosts without it.
pub fn copy_to_clipboard(text: &str) {
    let Ok(w) = window() else { return };
    let clipboard = js_sys::Reflect::get(&w.navigator(), &JsValue::from_str("clipboard"))
        .ok()
        .filter(|c| !c.is_undefined() && !c.is_null());
    let Some(clipboard) = clipboard else { return };
    if let Ok(write) = js_sys::Reflect::get(&clipboard, &JsValue::from_str("writeText")) {
        if let Some(write) = write.dyn_ref::<js_sys::Function>() {
            let _ = write.call1(&clipboard, &JsValue::from_str(text));
        }
    }
}

/// Locale string for a unix timestamp.
pub fn format_epoch(secs: u64) -> String {
    let date = js_sys::Date::new(&JsValue::from_f64(secs as f64 * 1000.0));
    String::from(date.to_locale_string("default", &JsValue::UNDEFINED))
}

/// Escape text for interpolation into markup.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

pub fn disabled_attr(enabled: bool) -> &'static str {
    if enabled { "" } else { " disabled" }
}

/// Inline error banner, empty when there is nothing to show.
pub fn error_banner(error: Option<&str>) -> String {
    match error {
        Some(msg) => format!(r#"<div class="banner banner--error">{}</div>"#, escape(msg)),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"<img src="x">"#), "&lt;img src=&quot;x&quot;&gt;");
        assert_eq!(escape("a & b"), "a &amp; b");
    }
}
