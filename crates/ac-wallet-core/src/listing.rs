use ac_api_types::{ArtworkDraft, WalletAddress};
use ac_chain_client::{MarketGateway, WalletError};
use ac_storage::{EntityStore, create_listing_record};
use anyhow::{Context, Result, bail};
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListingPhase {
    #[default]
    Idle,
    Uploading,
    Uploaded,
}

impl ListingPhase {
    pub fn button_label(self) -> &'static str {
        match self {
            ListingPhase::Idle => "Upload Artwork",
            ListingPhase::Uploading => "Uploading...",
            ListingPhase::Uploaded => "Uploaded Successfully!",
        }
    }

    pub fn accepts_input(self) -> bool {
        self != ListingPhase::Uploading
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingOutcome {
    pub token_id: u64,
    pub entity_key: String,
}

pub fn validate_draft(draft: &ArtworkDraft) -> Result<()> {
    if draft.title.trim().is_empty() {
        bail!("Please enter a title for your artwork.");
    }
    let uri = draft.image_uri.trim();
    if uri.is_empty() {
        bail!("Please provide an image URI.");
    }
    if !uri.contains("://") && !uri.starts_with("data:image/") {
        bail!("Image URI must be a URL such as https://... or ipfs://...");
    }
    Ok(())
}

/// Mint the artwork, register it with the current market, then create its
/// record on the data network. Completed steps stay in place if a later one fails.
pub async fn list_artwork<G, E>(
    gateway: &G,
    store: &E,
    creator: Option<&WalletAddress>,
    draft: &ArtworkDraft,
) -> Result<ListingOutcome>
where
    G: MarketGateway + ?Sized,
    E: EntityStore + ?Sized,
{
    let creator = creator.ok_or(WalletError::NotConnected)?;
    validate_draft(draft)?;

    let minted = gateway.mint(creator, draft.image_uri.trim()).await?;
    info!(token_id = minted.token_id, "artwork token minted");

    gateway.submit_artwork(minted.token_id).await?;
    info!(token_id = minted.token_id, "artwork submitted to market");

    let receipt = create_listing_record(store, minted.token_id, creator, draft)
        .await
        .with_context(|| format!("token {} was minted but its record was not saved", minted.token_id))?;

    Ok(ListingOutcome {
        token_id: minted.token_id,
        entity_key: receipt.entity_key,
    })
}
