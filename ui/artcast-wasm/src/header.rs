//! Navigation bar and wallet widget.

use ac_chain_client::WalletError;
use ac_wallet_core::connect_alert;
use ac_wallet_core::manager::is_manager;

use crate::dom::{self, escape};
use crate::state;

pub fn render() {
    let deployment = state::deployment();
    let session = state::session();
    let has_wallet = session.as_ref().is_some_and(|s| s.host().is_some());
    let address = session.as_ref().and_then(|s| s.address());
    let open = state::with(|s| s.header_open);

    let manager_link = if is_manager(address.as_ref(), &deployment.manager_address) {
        r#"<a href="/manager">Manager</a>"#
    } else {
        ""
    };

    let wallet = match &address {
        None => r#"<button class="btn btn--primary" data-action="connect">Connect Wallet</button>"#.to_string(),
        Some(addr) => {
            let dropdown = if open {
                format!(
                    r#"<div class="dropdown">
  <p class="dropdown__label">Connected</p>
  <p class="dropdown__address">{full}</p>
  <button class="dropdown__item" data-action="copy-address">Copy Address</button>
  <a class="dropdown__item" href="{explorer}" target="_blank" rel="noopener noreferrer">View on Explorer</a>
  <button class="dropdown__item dropdown__item--danger" data-action="disconnect">Disconnect</button>
</div>"#,
                    full = escape(addr.as_str()),
                    explorer = escape(&deployment.explorer_link(addr)),
                )
            } else {
                String::new()
            };
            format!(
                r#"<button class="btn btn--account" data-action="toggle-account">{}</button>{dropdown}"#,
                escape(&addr.short())
            )
        }
    };

    let missing = if has_wallet {
        String::new()
    } else {
        format!(
            r#"<div class="banner banner--warn">{}</div>"#,
            connect_alert(&WalletError::NoWalletFound)
        )
    };

    let html = format!(
        r#"<nav class="nav">
  <a class="nav__brand" href="/">Artcast</a>
  <div class="nav__links">
    <a href="/gallery">Gallery</a>
    <a href="/list">List Artwork</a>
    {manager_link}
  </div>
  <div class="nav__wallet">{wallet}</div>
</nav>
{missing}"#
    );
    dom::render_into("header", &html);
}

pub async fn on_connect() {
    let Some(session) = state::session() else {
        dom::alert(connect_alert(&WalletError::NoWalletFound));
        return;
    };
    // Success re-renders through the session watcher
    if let Err(err) = session.connect().await {
        tracing::warn!(error = %err, "wallet connection failed");
        dom::alert(connect_alert(&err));
    }
}

pub fn on_disconnect() {
    if let Some(session) = state::session() {
        session.disconnect();
    }
}

pub fn toggle_dropdown() {
    state::with_mut(|s| s.header_open = !s.header_open);
    render();
}

pub fn copy_address() {
    if let Some(addr) = state::session().and_then(|s| s.address()) {
        dom::copy_to_clipboard(addr.as_str());
    }
    state::with_mut(|s| s.header_open = false);
    render();
}
