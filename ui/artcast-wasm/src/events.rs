//! Event binding.
//!
//! Pages are re-rendered with `set_inner_html`, so listeners are delegated
//! from the document: every interactive element carries `data-action`, and
//! card buttons also carry `data-id`.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, Event, MouseEvent};

use crate::{dom, gallery, header, listing, manager};

/// Helper: attach a delegated listener for `$event` on the document.
macro_rules! on_document {
    ($doc:expr, $event:literal, $ty:ty, $cb:expr) => {{
        let cb = Closure::wrap(Box::new($cb) as Box<dyn FnMut($ty)>);
        $doc.add_event_listener_with_callback($event, cb.as_ref().unchecked_ref())?;
        cb.forget();
    }};
}

/// The nearest element with a `data-action`, and the action name.
fn action_of(event: &Event) -> Option<(String, Element)> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let el = target.closest("[data-action]").ok()??;
    let action = el.get_attribute("data-action")?;
    Some((action, el))
}

fn id_of(el: &Element) -> Option<u64> {
    el.get_attribute("data-id")?.parse().ok()
}

/// Bind the document-level listeners. Call once after init.
pub fn bind_events() -> Result<(), JsValue> {
    let doc = dom::document()?;

    on_document!(doc, "click", MouseEvent, move |event: MouseEvent| {
        if let Some((action, el)) = action_of(&event) {
            on_click(&event, &action, &el);
        }
    });

    on_document!(doc, "input", Event, move |event: Event| {
        if let Some((action, _)) = action_of(&event) {
            if action == "list-field" {
                listing::on_input();
            }
        }
    });

    Ok(())
}

fn on_click(event: &MouseEvent, action: &str, el: &Element) {
    match action {
        // ── Header ──
        "connect" => spawn_local(header::on_connect()),
        "toggle-account" => header::toggle_dropdown(),
        "copy-address" => header::copy_address(),
        "disconnect" => header::on_disconnect(),

        // ── Gallery ──
        "stake" => {
            if let Some(id) = id_of(el) {
                spawn_local(gallery::on_stake(id));
            }
        }
        "like" => {
            if let Some(id) = id_of(el) {
                spawn_local(gallery::on_like(id));
            }
        }
        "add-network" => spawn_local(gallery::on_add_network()),
        "reload-gallery" => spawn_local(gallery::load()),

        // ── Listing ──
        "list-submit" => {
            event.prevent_default();
            spawn_local(listing::on_submit());
        }

        // ── Manager ──
        "open-market" => spawn_local(manager::on_open_market()),
        "close-market" => spawn_local(manager::on_close_market()),
        "set-winner" => spawn_local(manager::on_set_winner()),

        other => tracing::debug!(action = other, "unhandled action"),
    }
}
