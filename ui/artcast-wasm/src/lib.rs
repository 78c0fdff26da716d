//! Artcast WASM front end.
//!
//! Browser view layer for the art prediction market. Pages live in their own
//! modules; wallet, contract and record-store logic comes from `ac-wallet-core`.

pub mod api;
pub mod arkiv;
pub mod dom;
pub mod events;
pub mod gallery;
pub mod header;
pub mod home;
pub mod host;
pub mod listing;
pub mod logging;
pub mod manager;
pub mod state;
pub mod storage;

use ac_wallet_core::{Session, SessionEvent};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::arkiv::ArkivStore;
use crate::host::BrowserWallet;
use crate::state::Route;
use crate::storage::LocalKeyValueStore;

/// WASM entry point – called automatically when the module is instantiated.
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    // Improve panic messages in the browser console
    console_error_panic_hook::set_once();
    logging::init();

    init().await
}

async fn init() -> Result<(), JsValue> {
    let deployment = api::load_deployment().await;
    let route = Route::from_path(&dom::pathname());

    let host = BrowserWallet::detect();
    if host.is_none() {
        tracing::warn!("no injected wallet found, waiting for ethereum#initialized");
        listen_for_late_wallet()?;
    }
    let store = ArkivStore::detect();
    if store.is_none() {
        tracing::warn!("arkiv bridge missing, listing and likes are unavailable");
    }

    // Restore the saved address before the first render
    let session = Session::restore(host.clone(), LocalKeyValueStore, deployment.chain.chain_id.clone());
    if let Some(wallet) = host.as_deref() {
        session.subscribe_to(wallet);
    }
    session.watch(on_session_event);

    state::with_mut(|s| {
        s.deployment = deployment;
        s.route = route;
        s.session = Some(session);
        s.store = store;
    });

    events::bind_events()?;
    header::render();
    load_page();

    tracing::info!(?route, "artcast started");
    Ok(())
}

/// Some extensions inject `window.ethereum` after the page has loaded and
/// announce it with `ethereum#initialized`.
fn listen_for_late_wallet() -> Result<(), JsValue> {
    let window = dom::window()?;
    let handler = Closure::once_into_js(on_wallet_injected);
    window.add_event_listener_with_callback("ethereum#initialized", handler.unchecked_ref())
}

fn on_wallet_injected() {
    let Some(wallet) = BrowserWallet::detect() else {
        tracing::warn!("ethereum#initialized fired without window.ethereum");
        return;
    };
    let Some(session) = state::session() else {
        return;
    };
    if !session.attach_host(Rc::clone(&wallet)) {
        return;
    }
    session.subscribe_to(&*wallet);
    tracing::info!(restored = session.is_connected(), "late wallet attached");
    header::render();
    load_page();
}

fn on_session_event(event: &SessionEvent) {
    state::with_mut(|s| s.header_open = false);
    header::render();
    match event {
        SessionEvent::ChainChanged(_) => {
            if state::route() == Route::Gallery {
                spawn_local(gallery::load());
            }
        }
        _ => load_page(),
    }
}

/// Render the current route, fetching chain data for pages that need it.
pub fn load_page() {
    match state::route() {
        Route::Gallery => spawn_local(gallery::load()),
        Route::Manager => spawn_local(manager::load()),
        _ => render_page(),
    }
}

pub fn render_page() {
    match state::route() {
        Route::Home => home::render(),
        Route::List => listing::render(),
        Route::Gallery => gallery::render(),
        Route::Manager => manager::render(),
        Route::NotFound => home::render_not_found(),
    }
}
