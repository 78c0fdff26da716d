//! `/list`: mint an artwork and register it with the current market.

use ac_api_types::ArtworkDraft;
use ac_chain_client::WalletError;
use ac_wallet_core::ListingPhase;
use ac_wallet_core::listing::list_artwork;

use crate::dom::{self, disabled_attr, escape};
use crate::state;

const STORE_MISSING: &str = "The Arkiv data network is not available on this page.";

pub fn render() {
    let page = state::with(|s| s.list.clone());
    let connected = state::session().is_some_and(|s| s.is_connected());

    let body = if !connected {
        r#"<p class="muted">Connect your wallet to list an artwork.</p>"#.to_string()
    } else {
        let disabled = disabled_attr(page.phase.accepts_input());
        format!(
            r#"<form class="form" onsubmit="return false">
  <label for="list-title">Title</label>
  <input id="list-title" type="text" data-action="list-field" value="{title}"{disabled}>
  <label for="list-description">Description</label>
  <textarea id="list-description" rows="4" data-action="list-field"{disabled}>{description}</textarea>
  <label for="list-image">Image URI</label>
  <input id="list-image" type="url" placeholder="https:// or ipfs://" data-action="list-field" value="{image}"{disabled}>
  <div id="list-preview">{preview}</div>
  {error}
  <button type="button" class="btn btn--primary" data-action="list-submit"{submit}>{label}</button>
</form>"#,
            title = escape(&page.draft.title),
            description = escape(&page.draft.description),
            image = escape(&page.draft.image_uri),
            preview = preview(&page.draft),
            error = dom::error_banner(page.error.as_deref()),
            submit = disabled_attr(page.phase == ListingPhase::Idle),
            label = page.phase.button_label(),
        )
    };

    dom::render_into(
        "page",
        &format!(r#"<section class="listing"><h1>List Your Artwork</h1>{body}</section>"#),
    );
}

fn preview(draft: &ArtworkDraft) -> String {
    let uri = draft.image_uri.trim();
    if uri.is_empty() {
        return String::new();
    }
    format!(
        r#"<img class="preview" src="{}" alt="Preview">"#,
        escape(uri)
    )
}

/// Keep the draft in sync with the form without re-rendering it.
pub fn on_input() {
    let draft = ArtworkDraft {
        title: dom::field_value("list-title"),
        description: dom::field_value("list-description"),
        image_uri: dom::field_value("list-image"),
    };
    let html = preview(&draft);
    let uploaded = state::with_mut(|s| {
        s.list.draft = draft;
        s.list.error = None;
        let uploaded = s.list.phase == ListingPhase::Uploaded;
        if uploaded {
            s.list.phase = ListingPhase::Idle;
        }
        uploaded
    });
    if uploaded {
        render();
    } else {
        dom::render_into("list-preview", &html);
    }
}

pub async fn on_submit() {
    on_input();
    let draft = state::with(|s| s.list.draft.clone());
    let creator = state::session().and_then(|s| s.address());

    let gateway = match state::market_gateway() {
        Ok(gateway) => gateway,
        Err(err) => return fail(err.to_string()),
    };
    let Some(store) = state::store() else {
        return fail(STORE_MISSING.to_owned());
    };

    state::with_mut(|s| {
        s.list.phase = ListingPhase::Uploading;
        s.list.error = None;
    });
    render();

    match list_artwork(&gateway, &*store, creator.as_ref(), &draft).await {
        Ok(outcome) => {
            tracing::info!(token_id = outcome.token_id, entity = %outcome.entity_key, "artwork listed");
            state::with_mut(|s| {
                s.list.phase = ListingPhase::Uploaded;
                s.list.draft = ArtworkDraft::default();
            });
            render();
        }
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), "listing failed");
            let rejected = err
                .downcast_ref::<WalletError>()
                .is_some_and(WalletError::is_user_rejection);
            if rejected {
                state::with_mut(|s| s.list.phase = ListingPhase::Idle);
                render();
                dom::alert("Transaction rejected in wallet.");
            } else {
                fail(format!("{err:#}"));
            }
        }
    }
}

fn fail(message: String) {
    state::with_mut(|s| {
        s.list.phase = ListingPhase::Idle;
        s.list.error = Some(message);
    });
    render();
}
