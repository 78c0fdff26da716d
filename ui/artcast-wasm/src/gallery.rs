//! `/gallery`: current market submissions with Stake / Like actions.

use ac_api_types::Artwork;
use ac_chain_client::{WalletError, WalletResult, add_chain};
use ac_wallet_core::gallery::{
    IMAGE_PLACEHOLDER, STAKE_NEEDS_WALLET, StakeFailure, TX_REJECTED, load_error_message, load_gallery,
};
use ac_wallet_core::{CardAction, GalleryView, connect_alert, gallery};

use crate::dom::{self, disabled_attr, escape};
use crate::state::{self, GalleryPage};

pub fn render() {
    let page = state::with(|s| s.gallery.clone());
    let headline = page
        .view
        .as_ref()
        .map(GalleryView::headline)
        .unwrap_or_default();

    let notice = page
        .notice
        .as_deref()
        .map(|n| format!(r#"<div class="banner banner--info">{}</div>"#, escape(n)))
        .unwrap_or_default();

    let html = format!(
        r#"<section class="gallery">
  <h1>Gallery</h1>
  <p class="muted">{headline}</p>
  {notice}
  {body}
</section>"#,
        headline = escape(&headline),
        body = body(&page),
    );
    dom::render_into("page", &html);
}

fn body(page: &GalleryPage) -> String {
    if page.loading {
        return r#"<p class="muted">Loading artworks...</p>"#.to_string();
    }
    if let Some(error) = &page.error {
        let add = if page.offer_add_network {
            r#"<button class="btn btn--primary" data-action="add-network">Add network</button>"#
        } else {
            ""
        };
        return format!(
            r#"{}<div class="actions">{add}<button class="btn" data-action="reload-gallery">Try again</button></div>"#,
            dom::error_banner(Some(error))
        );
    }
    let Some(view) = &page.view else {
        return String::new();
    };
    let stake_error = dom::error_banner(page.stake_error.as_deref());
    if view.artworks.is_empty() {
        return r#"<p class="muted">No artworks have been submitted to this market yet.</p>"#.to_string();
    }
    let cards: String = view
        .artworks
        .iter()
        .map(|artwork| card(view, artwork, page.pending))
        .collect();
    format!(r#"{stake_error}<div class="grid">{cards}</div>"#)
}

fn card(view: &GalleryView, artwork: &Artwork, pending: Option<u64>) -> String {
    let action = view.action_for(artwork.id, pending);
    let (name, enabled) = match action {
        CardAction::Like => ("like", true),
        CardAction::Stake => ("stake", pending.is_none()),
        CardAction::Staking => ("stake", false),
    };
    let label = if action == CardAction::Staking {
        "Staking..."
    } else {
        action.label()
    };
    format!(
        r#"<article class="card">
  <img class="card__image" src="{src}" alt="Artwork {id}" onerror="this.onerror=null;this.src='{placeholder}'">
  <div class="card__meta">
    <p>Token ID: {id}</p>
    <p title="{artist}">Artist: {artist_short}</p>
  </div>
  <button class="btn btn--primary" data-action="{name}" data-id="{id}"{disabled}>{label}</button>
</article>"#,
        src = escape(&artwork.image_uri),
        id = artwork.id,
        placeholder = IMAGE_PLACEHOLDER,
        artist = escape(artwork.artist.as_str()),
        artist_short = escape(&artwork.artist.short()),
        disabled = disabled_attr(enabled),
    )
}

async fn fetch_view() -> WalletResult<GalleryView> {
    let session = state::session().ok_or(WalletError::NoWalletFound)?;
    let host = session.host().ok_or(WalletError::NoWalletFound)?;
    let gateway = state::market_gateway()?;
    let viewer = session.address();
    load_gallery(host.as_ref(), &state::deployment().chain.chain_id, &gateway, viewer.as_ref()).await
}

/// Switch networks if needed and read the current market.
pub async fn load() {
    state::with_mut(|s| {
        s.gallery.loading = true;
        s.gallery.error = None;
        s.gallery.offer_add_network = false;
        s.gallery.notice = None;
        s.gallery.stake_error = None;
    });
    render();

    let result = fetch_view().await;
    if let Err(err) = &result {
        tracing::warn!(error = %err, "gallery load failed");
    }
    state::with_mut(|s| {
        s.gallery.loading = false;
        match result {
            Ok(view) => s.gallery.view = Some(view),
            Err(err) => {
                s.gallery.view = None;
                s.gallery.offer_add_network = matches!(err, WalletError::ChainNotConfigured(_));
                s.gallery.error = Some(if matches!(err, WalletError::NoWalletFound) {
                    connect_alert(&err).to_owned()
                } else {
                    load_error_message(&err)
                });
            }
        }
    });
    render();
}

pub async fn on_stake(artwork_id: u64) {
    let Some(mut view) = state::with(|s| s.gallery.view.clone()) else {
        return;
    };
    let viewer = state::session().and_then(|s| s.address());
    if viewer.is_none() {
        dom::alert(STAKE_NEEDS_WALLET);
        return;
    }

    state::with_mut(|s| {
        s.gallery.pending = Some(artwork_id);
        s.gallery.notice = None;
        s.gallery.stake_error = None;
    });
    render();

    let result = match state::market_gateway() {
        Ok(gateway) => gallery::stake(&gateway, &mut view, artwork_id, viewer.as_ref()).await,
        Err(err) => Err(err),
    };

    let failure = result.as_ref().err().map(|err| {
        tracing::warn!(artwork_id, error = %err, "stake failed");
        StakeFailure::from_error(err)
    });
    state::with_mut(|s| {
        s.gallery.pending = None;
        match &failure {
            None => {
                s.gallery.view = Some(view);
                s.gallery.notice = Some(format!("Staked on artwork #{artwork_id}."));
            }
            Some(StakeFailure::Inline(message)) => s.gallery.stake_error = Some(message.clone()),
            Some(StakeFailure::Rejected) => {}
        }
    });
    render();

    if failure == Some(StakeFailure::Rejected) {
        dom::alert(TX_REJECTED);
    }
}

pub async fn on_like(artwork_id: u64) {
    let Some(view) = state::with(|s| s.gallery.view.clone()) else {
        return;
    };
    let Some(store) = state::store() else {
        dom::alert("The Arkiv data network is not available on this page.");
        return;
    };

    match gallery::like(&*store, &view, artwork_id).await {
        Ok(likes) => {
            state::with_mut(|s| {
                s.gallery.notice = Some(format!("Liked artwork #{artwork_id} ({likes} likes)."));
            });
            render();
        }
        Err(err) => {
            tracing::warn!(artwork_id, error = %format!("{err:#}"), "like failed");
            dom::alert(&format!("{err:#}"));
        }
    }
}

/// Register the network with the wallet, then retry the load.
pub async fn on_add_network() {
    let Some(host) = state::session().and_then(|s| s.host()) else {
        dom::alert(connect_alert(&WalletError::NoWalletFound));
        return;
    };
    match add_chain(host.as_ref(), &state::deployment().chain).await {
        Ok(()) => load().await,
        Err(err) => {
            tracing::warn!(error = %err, "adding network failed");
            dom::alert(&load_error_message(&err));
        }
    }
}
