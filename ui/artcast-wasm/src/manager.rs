//! `/manager`: market lifecycle controls for the platform manager.
//!
//! The address check here only hides the controls; the market contract
//! enforces who may call them.

use ac_chain_client::WalletResult;
use ac_wallet_core::manager::{self as workflow, ManagerDashboard, is_manager, load_dashboard};

use crate::dom::{self, disabled_attr, escape};
use crate::state;

fn viewer_is_manager() -> bool {
    let viewer = state::session().and_then(|s| s.address());
    is_manager(viewer.as_ref(), &state::deployment().manager_address)
}

pub fn render() {
    if !viewer_is_manager() {
        dom::render_into(
            "page",
            r#"<section class="manager manager--denied">
  <h1>Access Denied</h1>
  <p>This page is for the Platform Manager only.</p>
</section>"#,
        );
        return;
    }

    let page = state::with(|s| s.manager.clone());
    let dashboard = page.dashboard.unwrap_or(ManagerDashboard {
        market_id: 0,
        market: None,
    });
    let status = if page.loading {
        "Loading market status...".to_string()
    } else {
        dashboard.status().describe(dom::format_epoch)
    };

    let html = format!(
        r#"<section class="manager">
  <h1>Market Manager</h1>
  <div class="card card--status">
    <h2>Current Market</h2>
    <p>{status}</p>
  </div>
  {error}
  <div class="card">
    <h2>Open New Market</h2>
    <label for="manager-duration">Duration (days)</label>
    <input id="manager-duration" type="number" min="1" value="{duration}">
    <label for="manager-min-stake">Minimum stake</label>
    <input id="manager-min-stake" type="text" value="{min_stake}">
    <button class="btn btn--primary" data-action="open-market"{open}>Open Market</button>
  </div>
  <div class="card">
    <h2>Close Market</h2>
    <button class="btn" data-action="close-market"{close}>Close Market</button>
  </div>
  <div class="card">
    <h2>Set Winner</h2>
    <label for="manager-winner">Winning Token ID</label>
    <input id="manager-winner" type="number" min="0" value="{winner}">
    <button class="btn" data-action="set-winner"{settle}>Set Winner</button>
  </div>
</section>"#,
        status = escape(&status),
        error = dom::error_banner(page.error.as_deref()),
        duration = escape(&page.duration_days),
        min_stake = escape(&page.min_stake),
        winner = escape(&page.winner),
        open = disabled_attr(!page.loading && dashboard.can_open(page.submitting)),
        close = disabled_attr(!page.loading && dashboard.can_close(page.submitting)),
        settle = disabled_attr(!page.loading && dashboard.can_set_winner(page.submitting)),
    );
    dom::render_into("page", &html);
}

/// Re-read the current market. Non-managers get the denial page without any chain reads.
pub async fn load() {
    if !viewer_is_manager() {
        render();
        return;
    }
    state::with_mut(|s| {
        s.manager.loading = true;
        s.manager.error = None;
    });
    render();

    let result = match state::market_gateway() {
        Ok(gateway) => load_dashboard(&gateway).await,
        Err(err) => Err(err),
    };
    state::with_mut(|s| {
        s.manager.loading = false;
        match result {
            Ok(dashboard) => s.manager.dashboard = Some(dashboard),
            Err(err) => {
                tracing::warn!(error = %err, "manager dashboard load failed");
                s.manager.error = Some(err.to_string());
            }
        }
    });
    render();
}

/// Copy the form inputs into state and mark an action in flight.
fn begin() {
    let duration = dom::field_value("manager-duration");
    let min_stake = dom::field_value("manager-min-stake");
    let winner = dom::field_value("manager-winner");
    state::with_mut(|s| {
        s.manager.duration_days = duration;
        s.manager.min_stake = min_stake;
        s.manager.winner = winner;
        s.manager.submitting = true;
        s.manager.error = None;
    });
    render();
}

async fn finish(result: WalletResult<String>) {
    state::with_mut(|s| s.manager.submitting = false);
    match result {
        Ok(message) => {
            dom::alert(&message);
            state::with_mut(|s| s.manager.winner.clear());
            load().await;
        }
        Err(err) if err.is_user_rejection() => {
            render();
            dom::alert("Transaction rejected in wallet.");
        }
        Err(err) => {
            tracing::warn!(error = %err, "manager action failed");
            state::with_mut(|s| s.manager.error = Some(err.to_string()));
            render();
        }
    }
}

pub async fn on_open_market() {
    begin();
    let (days, min_stake) = state::with(|s| (s.manager.duration_days.clone(), s.manager.min_stake.clone()));
    let decimals = state::deployment().stake_token_decimals;
    let result = match state::market_gateway() {
        Ok(gateway) => workflow::open_market(&gateway, &days, &min_stake, decimals).await,
        Err(err) => Err(err),
    };
    finish(result).await;
}

pub async fn on_close_market() {
    begin();
    let result = match state::market_gateway() {
        Ok(gateway) => workflow::close_market(&gateway).await,
        Err(err) => Err(err),
    };
    finish(result).await;
}

pub async fn on_set_winner() {
    begin();
    let winner = state::with(|s| s.manager.winner.clone());
    let result = match state::market_gateway() {
        Ok(gateway) => workflow::set_winner(&gateway, &winner).await,
        Err(err) => Err(err),
    };
    finish(result).await;
}
