use ac_api_types::{Artwork, ChainId, TokenAmount, WalletAddress};
use ac_chain_client::{MarketGateway, Provider, WalletError, WalletResult, ensure_chain};
use ac_storage::{EntityStore, record_like};
use anyhow::bail;
use futures::future::join_all;
use std::collections::HashSet;
use tracing::{info, warn};

pub const NETWORK_LABEL: &str = "Polkadot Hub Testnet";
pub const STAKE_NEEDS_WALLET: &str = "Please connect your wallet to stake.";
pub const TX_REJECTED: &str = "Transaction rejected in wallet.";
pub const IMAGE_PLACEHOLDER: &str = "https://placehold.co/600x600/222/888?text=Image+Failed";

/// What a card's button offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    Stake,
    Staking,
    Like,
}

impl CardAction {
    pub fn label(self) -> &'static str {
        match self {
            CardAction::Stake | CardAction::Staking => "Stake",
            CardAction::Like => "Like",
        }
    }
}

/// Submissions of the current market as seen by one viewer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalleryView {
    pub market_id: u64,
    pub stake_token: Option<WalletAddress>,
    pub min_stake: TokenAmount,
    pub artworks: Vec<Artwork>,
    pub staked: HashSet<u64>,
}

impl GalleryView {
    pub fn headline(&self) -> String {
        format!("Showing submissions for Market #{}", self.market_id)
    }

    pub fn artwork(&self, artwork_id: u64) -> Option<&Artwork> {
        self.artworks.iter().find(|a| a.id == artwork_id)
    }

    pub fn is_staked(&self, artwork_id: u64) -> bool {
        self.staked.contains(&artwork_id)
    }

    /// `pending` is the artwork whose stake is in flight, if any.
    pub fn action_for(&self, artwork_id: u64, pending: Option<u64>) -> CardAction {
        if self.is_staked(artwork_id) {
            CardAction::Like
        } else if pending == Some(artwork_id) {
            CardAction::Staking
        } else {
            CardAction::Stake
        }
    }
}

/// Switch to `chain`, then read the current market, its submissions and the
/// viewer's existing stakes. Artworks whose metadata cannot be read are skipped.
pub async fn load_gallery<P, G>(
    provider: &P,
    chain: &ChainId,
    gateway: &G,
    viewer: Option<&WalletAddress>,
) -> WalletResult<GalleryView>
where
    P: Provider + ?Sized,
    G: MarketGateway + ?Sized,
{
    ensure_chain(provider, chain).await?;

    let market_id = gateway.current_market_id().await?;
    let stake_token = gateway.stake_token().await?;
    let market = gateway.market(market_id).await?;
    let submissions = gateway.submitted_artworks(market_id).await?;

    let lookups = submissions.iter().map(|s| gateway.token_uri(s.artwork_id));
    let uris = join_all(lookups).await;

    let artworks: Vec<Artwork> = submissions
        .into_iter()
        .zip(uris)
        .filter_map(|(submission, uri)| match uri {
            Ok(image_uri) => Some(Artwork {
                id: submission.artwork_id,
                artist: submission.artist,
                image_uri,
            }),
            Err(err) => {
                warn!(artwork = submission.artwork_id, error = %err, "skipping artwork without metadata");
                None
            }
        })
        .collect();

    let mut staked = HashSet::new();
    if let Some(viewer) = viewer {
        for art in &artworks {
            match gateway.stake_of(market_id, art.id, viewer).await {
                Ok(shares) if !shares.is_zero() => {
                    staked.insert(art.id);
                }
                Ok(_) => {}
                Err(err) => warn!(artwork = art.id, error = %err, "stake lookup failed"),
            }
        }
    }

    info!(market_id, artworks = artworks.len(), "gallery loaded");
    Ok(GalleryView {
        market_id,
        stake_token: Some(stake_token),
        min_stake: market.min_stake_amount,
        artworks,
        staked,
    })
}

/// Approve the market's minimum stake, then predict on `artwork_id`.
/// Nothing is rolled back if the second step fails.
pub async fn stake<G: MarketGateway + ?Sized>(
    gateway: &G,
    view: &mut GalleryView,
    artwork_id: u64,
    viewer: Option<&WalletAddress>,
) -> WalletResult<()> {
    let (Some(_), Some(token)) = (viewer, view.stake_token.clone()) else {
        return Err(WalletError::NotConnected);
    };
    if view.market_id == 0 {
        return Err(WalletError::NotConnected);
    }

    gateway.approve(&token, &view.min_stake).await?;
    gateway.predict(artwork_id, &view.min_stake).await?;

    view.staked.insert(artwork_id);
    info!(artwork_id, amount = %view.min_stake, "stake placed");
    Ok(())
}

/// Record a like for an artwork the viewer has staked on. Returns the new count.
pub async fn like<E: EntityStore + ?Sized>(
    store: &E,
    view: &GalleryView,
    artwork_id: u64,
) -> anyhow::Result<u64> {
    let Some(artwork) = view.artwork(artwork_id) else {
        bail!("artwork {artwork_id} is not in this market");
    };
    if !view.is_staked(artwork_id) {
        bail!("Stake on artwork {artwork_id} before liking it.");
    }
    record_like(store, artwork).await
}

/// Inline message for a failed gallery load.
pub fn load_error_message(err: &WalletError) -> String {
    match err {
        WalletError::UserRejected(_) => {
            format!("Please connect to the {NETWORK_LABEL} ({}) to use the app.", ac_api_types::POLKADOT_HUB_TESTNET)
        }
        WalletError::ChainNotConfigured(chain) => {
            format!("{NETWORK_LABEL} ({chain}) is not added to your wallet. Please add it.")
        }
        WalletError::ChainMismatch { expected, actual } => {
            format!("Your wallet is on network {actual}. Please switch to the {NETWORK_LABEL} ({expected}).")
        }
        other => other.to_string(),
    }
}

/// Inline message for a failed stake.
fn stake_error_message(err: &WalletError) -> String {
    match err {
        WalletError::NotConnected => STAKE_NEEDS_WALLET.to_owned(),
        other => other.to_string(),
    }
}

/// How a failed stake reaches the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StakeFailure {
    /// Declined in the wallet: a blocking alert, cards left as they were.
    Rejected,
    /// Message rendered above the cards.
    Inline(String),
}

impl StakeFailure {
    pub fn from_error(err: &WalletError) -> Self {
        if err.is_user_rejection() {
            Self::Rejected
        } else {
            Self::Inline(stake_error_message(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ac_api_types::POLKADOT_HUB_TESTNET;
    use ac_chain_client::testing::{FakeGateway, ScriptedProvider};
    use ac_chain_client::{METHOD_CHAIN_ID, METHOD_SWITCH_CHAIN, ProviderError, UNRECOGNIZED_CHAIN_CODE};
    use ac_storage::{InMemoryEntityStore, artwork_attributes};
    use serde_json::json;

    const VIEWER: &str = "0x00000000000000000000000000000000000000cc";
    const ARTIST: &str = "0x00000000000000000000000000000000000000aa";

    fn on_chain() -> ScriptedProvider {
        let provider = ScriptedProvider::new();
        provider.respond(METHOD_CHAIN_ID, json!(POLKADOT_HUB_TESTNET));
        provider
    }

    fn chain() -> ChainId {
        ChainId::new(POLKADOT_HUB_TESTNET)
    }

    fn viewer() -> WalletAddress {
        WalletAddress::new(VIEWER)
    }

    #[tokio::test]
    async fn loads_artworks_and_existing_stakes() -> anyhow::Result<()> {
        let gateway = FakeGateway::new(Some(viewer()))
            .with_open_market(2, 100)
            .with_artwork(5, ARTIST, "ipfs://5")
            .with_artwork(6, ARTIST, "ipfs://6")
            .with_artwork(7, ARTIST, "ipfs://7")
            .with_broken_metadata(6)
            .with_stake(5, VIEWER, 100);

        let view = load_gallery(&on_chain(), &chain(), &gateway, Some(&viewer())).await?;
        assert_eq!(view.headline(), "Showing submissions for Market #2");
        assert_eq!(view.min_stake, TokenAmount::new("100"));
        let ids: Vec<u64> = view.artworks.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![5, 7]);
        assert_eq!(view.action_for(5, None), CardAction::Like);
        assert_eq!(view.action_for(7, None), CardAction::Stake);
        Ok(())
    }

    #[tokio::test]
    async fn wrong_network_is_switched_before_reading() -> anyhow::Result<()> {
        let provider = ScriptedProvider::new();
        provider.push(METHOD_CHAIN_ID, Ok(json!("0x1")));
        provider.respond(METHOD_CHAIN_ID, json!(POLKADOT_HUB_TESTNET));
        provider.respond(METHOD_SWITCH_CHAIN, serde_json::Value::Null);
        let gateway = FakeGateway::new(None).with_open_market(1, 100);

        load_gallery(&provider, &chain(), &gateway, None).await?;
        assert_eq!(provider.calls_to(METHOD_SWITCH_CHAIN), 1);
        Ok(())
    }

    #[tokio::test]
    async fn chain_errors_become_inline_messages() -> anyhow::Result<()> {
        let gateway = FakeGateway::new(None).with_open_market(1, 100);

        let provider = ScriptedProvider::new();
        provider.respond(METHOD_CHAIN_ID, json!("0x1"));
        provider.fail(METHOD_SWITCH_CHAIN, ProviderError::rejected());
        let err = load_gallery(&provider, &chain(), &gateway, None).await.unwrap_err();
        assert_eq!(
            load_error_message(&err),
            "Please connect to the Polkadot Hub Testnet (0x190F1B46) to use the app."
        );

        let provider = ScriptedProvider::new();
        provider.respond(METHOD_CHAIN_ID, json!("0x1"));
        provider.fail(METHOD_SWITCH_CHAIN, ProviderError::new(UNRECOGNIZED_CHAIN_CODE, "unknown"));
        let err = load_gallery(&provider, &chain(), &gateway, None).await.unwrap_err();
        assert_eq!(
            load_error_message(&err),
            "Polkadot Hub Testnet (0x190F1B46) is not added to your wallet. Please add it."
        );
        Ok(())
    }

    #[tokio::test]
    async fn staking_switches_button_to_like() -> anyhow::Result<()> {
        let gateway = FakeGateway::new(Some(viewer()))
            .with_open_market(1, 100)
            .with_artwork(7, ARTIST, "ipfs://7");
        let mut view = load_gallery(&on_chain(), &chain(), &gateway, Some(&viewer())).await?;
        assert_eq!(view.action_for(7, None), CardAction::Stake);
        assert_eq!(view.action_for(7, Some(7)), CardAction::Staking);

        stake(&gateway, &mut view, 7, Some(&viewer())).await?;
        assert_eq!(gateway.writes(), vec!["approve", "predict"]);
        assert_eq!(view.action_for(7, None), CardAction::Like);
        assert_eq!(view.action_for(7, None).label(), "Like");
        Ok(())
    }

    #[tokio::test]
    async fn failed_predict_keeps_approval_and_stake_button() -> anyhow::Result<()> {
        let gateway = FakeGateway::new(Some(viewer()))
            .with_open_market(1, 100)
            .with_artwork(7, ARTIST, "ipfs://7");
        let mut view = load_gallery(&on_chain(), &chain(), &gateway, Some(&viewer())).await?;

        gateway.fail_next("predict", WalletError::external("execution reverted"));
        let err = stake(&gateway, &mut view, 7, Some(&viewer())).await.unwrap_err();
        assert_eq!(
            StakeFailure::from_error(&err),
            StakeFailure::Inline("execution reverted".to_owned())
        );
        assert_eq!(gateway.writes(), vec!["approve"]);
        assert_eq!(view.action_for(7, None), CardAction::Stake);
        Ok(())
    }

    #[tokio::test]
    async fn only_wallet_rejection_blocks_with_an_alert() -> anyhow::Result<()> {
        let gateway = FakeGateway::new(Some(viewer()))
            .with_open_market(1, 100)
            .with_artwork(7, ARTIST, "ipfs://7");
        let mut view = load_gallery(&on_chain(), &chain(), &gateway, Some(&viewer())).await?;

        gateway.fail_next("approve", WalletError::UserRejected("User denied transaction signature.".into()));
        let err = stake(&gateway, &mut view, 7, Some(&viewer())).await.unwrap_err();
        assert_eq!(StakeFailure::from_error(&err), StakeFailure::Rejected);
        assert!(gateway.writes().is_empty());

        gateway.fail_next("predict", WalletError::external("insufficient allowance"));
        let err = stake(&gateway, &mut view, 7, Some(&viewer())).await.unwrap_err();
        assert_eq!(
            StakeFailure::from_error(&err),
            StakeFailure::Inline("insufficient allowance".to_owned())
        );
        assert_eq!(view.action_for(7, None), CardAction::Stake);
        Ok(())
    }

    #[tokio::test]
    async fn stake_requires_a_connected_wallet() -> anyhow::Result<()> {
        let gateway = FakeGateway::new(None)
            .with_open_market(1, 100)
            .with_artwork(7, ARTIST, "ipfs://7");
        let mut view = load_gallery(&on_chain(), &chain(), &gateway, None).await?;

        let err = stake(&gateway, &mut view, 7, None).await.unwrap_err();
        assert_eq!(StakeFailure::from_error(&err), StakeFailure::Inline(STAKE_NEEDS_WALLET.to_owned()));
        assert!(gateway.writes().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn like_updates_stored_record_after_stake() -> anyhow::Result<()> {
        let gateway = FakeGateway::new(Some(viewer()))
            .with_open_market(1, 100)
            .with_artwork(7, ARTIST, "ipfs://7")
            .with_stake(7, VIEWER, 100);
        let view = load_gallery(&on_chain(), &chain(), &gateway, Some(&viewer())).await?;

        let store = InMemoryEntityStore::new();
        let key = store.seed(
            json!({ "nftId": 7, "creator": ARTIST, "imageURI": "ipfs://7", "likes": 1 }),
            artwork_attributes(),
        );
        assert_eq!(like(&store, &view, 7).await?, 2);
        assert_eq!(store.get(&key).unwrap().payload["likes"], json!(2));
        Ok(())
    }

    #[tokio::test]
    async fn like_before_stake_is_refused() -> anyhow::Result<()> {
        let gateway = FakeGateway::new(Some(viewer()))
            .with_open_market(1, 100)
            .with_artwork(7, ARTIST, "ipfs://7");
        let view = load_gallery(&on_chain(), &chain(), &gateway, Some(&viewer())).await?;

        let store = InMemoryEntityStore::new();
        assert!(like(&store, &view, 7).await.is_err());
        Ok(())
    }
}
