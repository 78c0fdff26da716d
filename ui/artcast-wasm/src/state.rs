//! Global application state.
//!
//! Uses `RefCell`-wrapped `thread_local!` storage (WASM is single-threaded).
//! Never hold a borrow across a call into the session: its watchers
//! re-enter this module to re-render.

use ac_api_types::{ArtworkDraft, Deployment};
use ac_chain_client::{WalletError, WalletResult};
use ac_chain_evm::EvmMarketGateway;
use ac_wallet_core::manager::{DEFAULT_DURATION_DAYS, DEFAULT_MIN_STAKE};
use ac_wallet_core::{GalleryView, ListingPhase, ManagerDashboard, Session};
use std::cell::RefCell;
use std::rc::Rc;

use crate::arkiv::ArkivStore;
use crate::host::BrowserWallet;
use crate::storage::LocalKeyValueStore;

pub type AppSession = Session<BrowserWallet, LocalKeyValueStore>;
pub type AppGateway = EvmMarketGateway<Rc<BrowserWallet>>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Route {
    #[default]
    Home,
    List,
    Gallery,
    Manager,
    NotFound,
}

impl Route {
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/').trim_end_matches("/index.html") {
            "" => Route::Home,
            "/list" => Route::List,
            "/gallery" => Route::Gallery,
            "/manager" => Route::Manager,
            _ => Route::NotFound,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct GalleryPage {
    pub loading: bool,
    pub error: Option<String>,
    pub offer_add_network: bool,
    pub view: Option<GalleryView>,
    /// Artwork whose stake transaction is in flight.
    pub pending: Option<u64>,
    pub notice: Option<String>,
    /// Last failed stake, shown above the cards.
    pub stake_error: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ListPage {
    pub draft: ArtworkDraft,
    pub phase: ListingPhase,
    pub error: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ManagerPage {
    pub loading: bool,
    pub error: Option<String>,
    pub dashboard: Option<ManagerDashboard>,
    pub submitting: bool,
    pub duration_days: String,
    pub min_stake: String,
    pub winner: String,
}

impl Default for ManagerPage {
    fn default() -> Self {
        Self {
            loading: true,
            error: None,
            dashboard: None,
            submitting: false,
            duration_days: DEFAULT_DURATION_DAYS.to_owned(),
            min_stake: DEFAULT_MIN_STAKE.to_owned(),
            winner: String::new(),
        }
    }
}

/// Central application state.
#[derive(Default)]
pub struct AppState {
    pub deployment: Deployment,
    pub route: Route,
    pub session: Option<AppSession>,
    pub store: Option<Rc<ArkivStore>>,
    pub header_open: bool,
    pub gallery: GalleryPage,
    pub list: ListPage,
    pub manager: ManagerPage,
}

// ── Thread-local singleton ──

thread_local! {
    static STATE: RefCell<AppState> = RefCell::new(AppState::default());
}

/// Run a closure with shared read access to the state.
pub fn with<F, R>(f: F) -> R
where
    F: FnOnce(&AppState) -> R,
{
    STATE.with(|s| f(&s.borrow()))
}

/// Run a closure with mutable access to the state.
pub fn with_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut AppState) -> R,
{
    STATE.with(|s| f(&mut s.borrow_mut()))
}

// ── Convenience accessors ──

pub fn deployment() -> Deployment {
    with(|s| s.deployment.clone())
}

pub fn route() -> Route {
    with(|s| s.route)
}

pub fn session() -> Option<AppSession> {
    with(|s| s.session.clone())
}

pub fn store() -> Option<Rc<ArkivStore>> {
    with(|s| s.store.clone())
}

/// Contract access for the current session; read-only when disconnected.
pub fn market_gateway() -> WalletResult<AppGateway> {
    let session = session().ok_or(WalletError::NoWalletFound)?;
    // Signed calls go through the connected account's handle; reads only need the host.
    match session.handle() {
        Some(handle) => EvmMarketGateway::new(Rc::clone(handle.provider()), &deployment(), Some(handle.account())),
        None => {
            let host = session.host().ok_or(WalletError::NoWalletFound)?;
            EvmMarketGateway::new(host, &deployment(), None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_by_pathname() {
        assert_eq!(Route::from_path("/"), Route::Home);
        assert_eq!(Route::from_path("/index.html"), Route::Home);
        assert_eq!(Route::from_path("/gallery/"), Route::Gallery);
        assert_eq!(Route::from_path("/list"), Route::List);
        assert_eq!(Route::from_path("/manager"), Route::Manager);
        assert_eq!(Route::from_path("/nope"), Route::NotFound);
    }
}
