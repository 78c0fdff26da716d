use ac_api_types::{
    ArtworkSubmission, ChainId, ChainParams, MarketInfo, TokenAmount, TxHash, WalletAddress,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, info};

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub const METHOD_REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
pub const METHOD_CHAIN_ID: &str = "eth_chainId";
pub const METHOD_SWITCH_CHAIN: &str = "wallet_switchEthereumChain";
pub const METHOD_ADD_CHAIN: &str = "wallet_addEthereumChain";

/// EIP-1193 code for a request the user declined.
pub const USER_REJECTED_CODE: i64 = 4001;
/// Code returned by `wallet_switchEthereumChain` for a network the wallet does not know.
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;

/// Error object raised by the host wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("provider error {code}: {message}")]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl ProviderError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn rejected() -> Self {
        Self::new(USER_REJECTED_CODE, "User rejected the request.")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("Please install MetaMask!")]
    NoWalletFound,
    #[error("request rejected in wallet: {0}")]
    UserRejected(String),
    #[error("network {0} is not added to your wallet")]
    ChainNotConfigured(ChainId),
    #[error("wallet is on network {actual}, expected {expected}")]
    ChainMismatch { expected: ChainId, actual: ChainId },
    #[error("Please connect your wallet.")]
    NotConnected,
    #[error("{0}")]
    ExternalCall(String),
}

impl WalletError {
    pub fn external(message: impl Into<String>) -> Self {
        WalletError::ExternalCall(message.into())
    }

    pub fn is_user_rejection(&self) -> bool {
        matches!(self, WalletError::UserRejected(_))
    }
}

impl From<ProviderError> for WalletError {
    fn from(err: ProviderError) -> Self {
        match err.code {
            USER_REJECTED_CODE => WalletError::UserRejected(err.message),
            _ => WalletError::ExternalCall(err.message),
        }
    }
}

pub type WalletResult<T> = Result<T, WalletError>;

/// Request/notify interface of a browser-resident wallet.
///
/// Implementations are single-threaded: the browser host holds `JsValue`s.
#[async_trait(?Send)]
pub trait Provider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;

    /// Suspend between confirmation polls without blocking the event loop.
    async fn pause(&self, millis: u32);
}

#[async_trait(?Send)]
impl<P: Provider + ?Sized> Provider for Rc<P> {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        (**self).request(method, params).await
    }

    async fn pause(&self, millis: u32) {
        (**self).pause(millis).await
    }
}

/// Prompt the wallet for account access. Returns the granted accounts in wallet order.
pub async fn request_accounts<P: Provider + ?Sized>(provider: &P) -> WalletResult<Vec<WalletAddress>> {
    let value = provider.request(METHOD_REQUEST_ACCOUNTS, json!([])).await?;
    let accounts: Vec<String> = serde_json::from_value(value)
        .map_err(|err| WalletError::external(format!("malformed account list: {err}")))?;
    Ok(accounts.into_iter().map(WalletAddress).collect())
}

pub async fn current_chain<P: Provider + ?Sized>(provider: &P) -> WalletResult<ChainId> {
    let value = provider.request(METHOD_CHAIN_ID, json!([])).await?;
    match value {
        Value::String(id) => Ok(ChainId(id)),
        Value::Number(n) => n
            .as_u64()
            .map(|id| ChainId(format!("0x{id:x}")))
            .ok_or_else(|| WalletError::external(format!("unexpected chain id: {n}"))),
        other => Err(WalletError::external(format!("unexpected chain id: {other}"))),
    }
}

/// Ask the wallet to make `chain` its active network.
///
/// Rejection and unknown-network errors are passed through as distinct variants;
/// nothing is retried.
pub async fn switch_chain<P: Provider + ?Sized>(provider: &P, chain: &ChainId) -> WalletResult<()> {
    debug!(chain = %chain, "requesting network switch");
    provider
        .request(METHOD_SWITCH_CHAIN, json!([{ "chainId": chain.as_str() }]))
        .await
        .map_err(|err| match err.code {
            UNRECOGNIZED_CHAIN_CODE => WalletError::ChainNotConfigured(chain.clone()),
            _ => WalletError::from(err),
        })?;
    Ok(())
}

/// Register a network with the wallet (`wallet_addEthereumChain`).
pub async fn add_chain<P: Provider + ?Sized>(provider: &P, params: &ChainParams) -> WalletResult<()> {
    let params = serde_json::to_value(params)
        .map_err(|err| WalletError::external(format!("chain params: {err}")))?;
    provider.request(METHOD_ADD_CHAIN, Value::Array(vec![params])).await?;
    info!("network registered with wallet");
    Ok(())
}

/// Switch only when the wallet reports a different network, then confirm.
pub async fn ensure_chain<P: Provider + ?Sized>(provider: &P, chain: &ChainId) -> WalletResult<()> {
    let active = current_chain(provider).await?;
    if active.same_as(chain) {
        return Ok(());
    }

    switch_chain(provider, chain).await?;

    let active = current_chain(provider).await?;
    if !active.same_as(chain) {
        return Err(WalletError::ChainMismatch {
            expected: chain.clone(),
            actual: active,
        });
    }
    Ok(())
}

/// Notifications pushed by the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletNotification {
    AccountsChanged(Vec<WalletAddress>),
    ChainChanged(ChainId),
}

/// Source of wallet notifications, injected into the session store.
pub trait NotificationSource {
    fn subscribe(&self, listener: Rc<dyn Fn(&WalletNotification)>);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintResult {
    pub token_id: u64,
    pub receipt: TxReceipt,
}

/// Calls against the NFT, prediction-market and stake-token contracts.
///
/// Writes resolve only after the transaction is confirmed.
#[async_trait(?Send)]
pub trait MarketGateway {
    async fn current_market_id(&self) -> WalletResult<u64>;
    async fn stake_token(&self) -> WalletResult<WalletAddress>;
    async fn market(&self, market_id: u64) -> WalletResult<MarketInfo>;
    async fn submitted_artworks(&self, market_id: u64) -> WalletResult<Vec<ArtworkSubmission>>;
    async fn token_uri(&self, token_id: u64) -> WalletResult<String>;
    async fn stake_of(
        &self,
        market_id: u64,
        artwork_id: u64,
        predictor: &WalletAddress,
    ) -> WalletResult<TokenAmount>;

    async fn approve(&self, token: &WalletAddress, amount: &TokenAmount) -> WalletResult<TxReceipt>;
    async fn predict(&self, artwork_id: u64, amount: &TokenAmount) -> WalletResult<TxReceipt>;
    async fn mint(&self, to: &WalletAddress, token_uri: &str) -> WalletResult<MintResult>;
    async fn submit_artwork(&self, token_id: u64) -> WalletResult<TxReceipt>;
    async fn open_market(&self, duration_days: u64, min_stake: &TokenAmount) -> WalletResult<TxReceipt>;
    async fn close_market(&self) -> WalletResult<TxReceipt>;
    async fn set_winner(&self, artwork_id: u64) -> WalletResult<TxReceipt>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;
    use ac_api_types::POLKADOT_HUB_TESTNET;

    #[tokio::test]
    async fn switch_chain_maps_wallet_codes() -> anyhow::Result<()> {
        let chain = ChainId::new(POLKADOT_HUB_TESTNET);

        let provider = ScriptedProvider::new();
        provider.fail(METHOD_SWITCH_CHAIN, ProviderError::rejected());
        let err = switch_chain(&provider, &chain).await.unwrap_err();
        assert!(err.is_user_rejection());

        let provider = ScriptedProvider::new();
        provider.fail(
            METHOD_SWITCH_CHAIN,
            ProviderError::new(UNRECOGNIZED_CHAIN_CODE, "Unrecognized chain ID"),
        );
        let err = switch_chain(&provider, &chain).await.unwrap_err();
        assert_eq!(err, WalletError::ChainNotConfigured(chain.clone()));

        let provider = ScriptedProvider::new();
        provider.fail(METHOD_SWITCH_CHAIN, ProviderError::new(-32603, "internal"));
        let err = switch_chain(&provider, &chain).await.unwrap_err();
        assert_eq!(err, WalletError::ExternalCall("internal".to_owned()));

        Ok(())
    }

    #[tokio::test]
    async fn switch_chain_sends_hex_id() -> anyhow::Result<()> {
        let provider = ScriptedProvider::new();
        provider.respond(METHOD_SWITCH_CHAIN, Value::Null);
        switch_chain(&provider, &ChainId::new(POLKADOT_HUB_TESTNET)).await?;

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, json!([{ "chainId": "0x190F1B46" }]));
        Ok(())
    }

    #[tokio::test]
    async fn ensure_chain_skips_switch_when_already_active() -> anyhow::Result<()> {
        let provider = ScriptedProvider::new();
        provider.respond(METHOD_CHAIN_ID, json!("0x190f1b46"));
        ensure_chain(&provider, &ChainId::new(POLKADOT_HUB_TESTNET)).await?;
        assert_eq!(provider.calls_to(METHOD_SWITCH_CHAIN), 0);
        Ok(())
    }

    #[tokio::test]
    async fn ensure_chain_reports_mismatch_after_switch() -> anyhow::Result<()> {
        let provider = ScriptedProvider::new();
        provider.respond(METHOD_CHAIN_ID, json!("0x1"));
        provider.respond(METHOD_SWITCH_CHAIN, Value::Null);
        let err = ensure_chain(&provider, &ChainId::new(POLKADOT_HUB_TESTNET))
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::ChainMismatch { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn add_chain_uses_wallet_field_names() -> anyhow::Result<()> {
        let provider = ScriptedProvider::new();
        provider.respond(METHOD_ADD_CHAIN, Value::Null);
        add_chain(&provider, &ChainParams::polkadot_hub_testnet()).await?;

        let (_, params) = &provider.calls()[0];
        assert_eq!(params[0]["chainId"], "0x190F1B46");
        assert_eq!(params[0]["nativeCurrency"]["symbol"], "PAS");
        assert!(params[0]["rpcUrls"].is_array());
        Ok(())
    }

    #[tokio::test]
    async fn numeric_chain_ids_must_be_unsigned_integers() -> anyhow::Result<()> {
        let provider = ScriptedProvider::new();
        provider.push(METHOD_CHAIN_ID, Ok(json!(420_420_422)));
        provider.push(METHOD_CHAIN_ID, Ok(json!(-1)));
        provider.push(METHOD_CHAIN_ID, Ok(json!(1.5)));

        assert_eq!(current_chain(&provider).await?, ChainId::new("0x190f1b46"));
        for _ in 0..2 {
            let err = current_chain(&provider).await.unwrap_err();
            assert!(matches!(err, WalletError::ExternalCall(ref msg) if msg.starts_with("unexpected chain id")));
        }
        Ok(())
    }

    #[tokio::test]
    async fn request_accounts_parses_list() -> anyhow::Result<()> {
        let provider = ScriptedProvider::new();
        provider.respond(METHOD_REQUEST_ACCOUNTS, json!(["0xabcd", "0x1234"]));
        let accounts = request_accounts(&provider).await?;
        assert_eq!(accounts, vec![WalletAddress::new("0xabcd"), WalletAddress::new("0x1234")]);
        Ok(())
    }
}
