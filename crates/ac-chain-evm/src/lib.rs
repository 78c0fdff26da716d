use ac_api_types::{ArtworkSubmission, Deployment, MarketInfo, TokenAmount, TxHash, WalletAddress};
use ac_chain_client::{MarketGateway, MintResult, Provider, TxReceipt, WalletError, WalletResult};
use alloy::primitives::{Address, B256, U256, hex};
use alloy::sol_types::{SolCall, SolEvent};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

pub const METHOD_CALL: &str = "eth_call";
pub const METHOD_SEND_TRANSACTION: &str = "eth_sendTransaction";
pub const METHOD_GET_RECEIPT: &str = "eth_getTransactionReceipt";
pub const METHOD_GET_LOGS: &str = "eth_getLogs";

pub const RECEIPT_POLL_INTERVAL_MS: u32 = 1_000;
/// Roughly two minutes of polling before a pending transaction is reported.
pub const MAX_RECEIPT_POLLS: u32 = 120;

/// Fixed contract interfaces.
pub mod abi {
    alloy::sol! {
        interface IPredictionMarket {
            function currentMarketId() external view returns (uint256);
            function usdc() external view returns (address);
            function markets(uint256 marketId) external view returns (
                uint256 id,
                address vault,
                uint256 predictionWindowEnd,
                uint256 minStakeAmount,
                bool isOpen,
                bool isSettled,
                uint256 winningArtworkId,
                uint256 totalSharesInMarket,
                uint256 predictorPoolAmount
            );
            function predictions(uint256 marketId, uint256 artworkId, address predictor)
                external view returns (uint256 amount, uint256 shares);
            function submitArtwork(uint256 artworkId) external;
            function predict(uint256 artworkId, uint256 amount) external;
            function openMarket(uint256 durationDays, uint256 minStakeAmount) external;
            function closeMarket() external;
            function setWinner(uint256 artworkId) external;

            event ArtworkSubmitted(
                uint256 indexed marketId,
                uint256 indexed artworkId,
                address indexed artist
            );
        }

        interface IArtworkNft {
            function mint(address to, string uri) external returns (uint256);
            function tokenURI(uint256 tokenId) external view returns (string);

            event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);
        }

        interface IERC20 {
            function approve(address spender, uint256 amount) external returns (bool);
        }
    }
}

use abi::{IArtworkNft, IERC20, IPredictionMarket};

// ── JSON-RPC shapes ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RpcLog {
    pub address: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    #[serde(default)]
    block_number: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    logs: Vec<RpcLog>,
}

/// A mined transaction together with the logs it emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedTx {
    pub receipt: TxReceipt,
    pub logs: Vec<RpcLog>,
}

fn decode_hex(raw: &str) -> WalletResult<Vec<u8>> {
    let digits = raw.trim().trim_start_matches("0x");
    hex::decode(digits).map_err(|err| WalletError::external(format!("invalid hex '{raw}': {err}")))
}

fn parse_quantity(raw: &str) -> Option<u64> {
    u64::from_str_radix(raw.trim().trim_start_matches("0x"), 16).ok()
}

fn parse_topic(raw: &str) -> WalletResult<B256> {
    let bytes = decode_hex(raw)?;
    if bytes.len() != 32 {
        return Err(WalletError::external(format!("invalid log topic '{raw}'")));
    }
    Ok(B256::from_slice(&bytes))
}

fn topic_for(id: u64) -> B256 {
    B256::from(U256::from(id).to_be_bytes::<32>())
}

fn to_u64(value: U256, what: &str) -> WalletResult<u64> {
    u64::try_from(value).map_err(|_| WalletError::external(format!("{what} out of range: {value}")))
}

fn parse_address(address: &WalletAddress) -> WalletResult<Address> {
    address
        .as_str()
        .trim()
        .parse()
        .map_err(|_| WalletError::external(format!("invalid address '{address}'")))
}

fn parse_amount(amount: &TokenAmount) -> WalletResult<U256> {
    U256::from_str_radix(amount.as_str().trim(), 10)
        .map_err(|_| WalletError::external(format!("invalid amount '{amount}'")))
}

fn decode_failed(what: &str) -> impl Fn(alloy::sol_types::Error) -> WalletError + '_ {
    move |err| WalletError::external(format!("could not decode {what}: {err}"))
}

/// Raw contract access over an EIP-1193 provider.
pub struct EvmClient<P> {
    provider: P,
    max_polls: u32,
}

impl<P: Provider> EvmClient<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            max_polls: MAX_RECEIPT_POLLS,
        }
    }

    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = max_polls.max(1);
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Read-only `eth_call` against the latest block.
    pub async fn call(&self, to: Address, data: Vec<u8>) -> WalletResult<Vec<u8>> {
        let params = json!([{ "to": to.to_string(), "data": hex::encode_prefixed(data) }, "latest"]);
        let result = self.provider.request(METHOD_CALL, params).await?;
        match result.as_str() {
            Some(raw) => decode_hex(raw),
            None => Err(WalletError::external(format!("unexpected eth_call result: {result}"))),
        }
    }

    pub async fn send(&self, from: Address, to: Address, data: Vec<u8>) -> WalletResult<TxHash> {
        let params = json!([{
            "from": from.to_string(),
            "to": to.to_string(),
            "data": hex::encode_prefixed(data),
        }]);
        let result = self.provider.request(METHOD_SEND_TRANSACTION, params).await?;
        match result {
            Value::String(hash) => {
                debug!(tx = %hash, "transaction sent");
                Ok(TxHash(hash))
            }
            other => Err(WalletError::external(format!("unexpected transaction hash: {other}"))),
        }
    }

    /// Poll until the transaction is mined. A status-0 receipt is an error.
    pub async fn wait_for_receipt(&self, hash: &TxHash) -> WalletResult<ConfirmedTx> {
        for attempt in 0..self.max_polls {
            let result = self
                .provider
                .request(METHOD_GET_RECEIPT, json!([hash.as_str()]))
                .await?;

            if result.is_null() {
                if attempt + 1 < self.max_polls {
                    self.provider.pause(RECEIPT_POLL_INTERVAL_MS).await;
                }
                continue;
            }

            let receipt: RpcReceipt = serde_json::from_value(result)
                .map_err(|err| WalletError::external(format!("malformed receipt: {err}")))?;

            if receipt.status.as_deref().and_then(parse_quantity) == Some(0) {
                return Err(WalletError::external(format!("transaction {hash} reverted")));
            }

            return Ok(ConfirmedTx {
                receipt: TxReceipt {
                    tx_hash: hash.clone(),
                    block_number: receipt.block_number.as_deref().and_then(parse_quantity),
                },
                logs: receipt.logs,
            });
        }

        Err(WalletError::external(format!(
            "transaction {hash} not confirmed after {} polls",
            self.max_polls
        )))
    }

    pub async fn transact(&self, from: Address, to: Address, data: Vec<u8>) -> WalletResult<ConfirmedTx> {
        let hash = self.send(from, to, data).await?;
        let confirmed = self.wait_for_receipt(&hash).await?;
        info!(tx = %hash, block = ?confirmed.receipt.block_number, "transaction confirmed");
        Ok(confirmed)
    }

    /// `eth_getLogs` over the whole chain history. `None` topics match anything.
    pub async fn logs(&self, address: Address, topics: &[Option<B256>]) -> WalletResult<Vec<RpcLog>> {
        let topics: Vec<Value> = topics
            .iter()
            .map(|t| match t {
                Some(topic) => Value::String(hex::encode_prefixed(topic)),
                None => Value::Null,
            })
            .collect();
        let params = json!([{
            "address": address.to_string(),
            "fromBlock": "0x0",
            "toBlock": "latest",
            "topics": topics,
        }]);
        let result = self.provider.request(METHOD_GET_LOGS, params).await?;
        serde_json::from_value(result)
            .map_err(|err| WalletError::external(format!("malformed log list: {err}")))
    }
}

/// `MarketGateway` backed by the deployed NFT, market and stake-token contracts.
pub struct EvmMarketGateway<P> {
    client: EvmClient<P>,
    nft: Address,
    market: Address,
    account: Option<Address>,
}

impl<P: Provider> EvmMarketGateway<P> {
    /// Writes need `account`; reads work without one.
    pub fn new(provider: P, deployment: &Deployment, account: Option<&WalletAddress>) -> WalletResult<Self> {
        Ok(Self {
            client: EvmClient::new(provider),
            nft: parse_address(&deployment.nft_address)?,
            market: parse_address(&deployment.market_address)?,
            account: account.map(parse_address).transpose()?,
        })
    }

    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.client = self.client.with_max_polls(max_polls);
        self
    }

    fn sender(&self) -> WalletResult<Address> {
        self.account.ok_or(WalletError::NotConnected)
    }

    async fn write_market(&self, data: Vec<u8>) -> WalletResult<TxReceipt> {
        let from = self.sender()?;
        Ok(self.client.transact(from, self.market, data).await?.receipt)
    }
}

fn decode_submission(log: &RpcLog) -> WalletResult<ArtworkSubmission> {
    if log.topics.len() < 4 {
        return Err(WalletError::external("ArtworkSubmitted log is missing topics"));
    }
    let market_id = U256::from_be_bytes(parse_topic(&log.topics[1])?.0);
    let artwork_id = U256::from_be_bytes(parse_topic(&log.topics[2])?.0);
    let artist = Address::from_word(parse_topic(&log.topics[3])?);
    Ok(ArtworkSubmission {
        market_id: to_u64(market_id, "market id")?,
        artwork_id: to_u64(artwork_id, "artwork id")?,
        artist: WalletAddress(artist.to_string()),
    })
}

fn minted_token_id(nft: Address, logs: &[RpcLog]) -> WalletResult<u64> {
    let transfer = hex::encode_prefixed(IArtworkNft::Transfer::SIGNATURE_HASH);
    let log = logs
        .iter()
        .find(|log| {
            log.address.parse::<Address>().ok() == Some(nft)
                && log.topics.len() == 4
                && log.topics[0].eq_ignore_ascii_case(&transfer)
        })
        .ok_or_else(|| WalletError::external("mint receipt has no Transfer event"))?;
    to_u64(U256::from_be_bytes(parse_topic(&log.topics[3])?.0), "token id")
}

#[async_trait(?Send)]
impl<P: Provider> MarketGateway for EvmMarketGateway<P> {
    async fn current_market_id(&self) -> WalletResult<u64> {
        let data = IPredictionMarket::currentMarketIdCall {}.abi_encode();
        let raw = self.client.call(self.market, data).await?;
        let id = IPredictionMarket::currentMarketIdCall::abi_decode_returns(&raw)
            .map_err(decode_failed("currentMarketId"))?;
        to_u64(id, "market id")
    }

    async fn stake_token(&self) -> WalletResult<WalletAddress> {
        let data = IPredictionMarket::usdcCall {}.abi_encode();
        let raw = self.client.call(self.market, data).await?;
        let token = IPredictionMarket::usdcCall::abi_decode_returns(&raw).map_err(decode_failed("usdc"))?;
        Ok(WalletAddress(token.to_string()))
    }

    async fn market(&self, market_id: u64) -> WalletResult<MarketInfo> {
        let data = IPredictionMarket::marketsCall {
            marketId: U256::from(market_id),
        }
        .abi_encode();
        let raw = self.client.call(self.market, data).await?;
        let m = IPredictionMarket::marketsCall::abi_decode_returns(&raw).map_err(decode_failed("markets"))?;
        Ok(MarketInfo {
            id: to_u64(m.id, "market id")?,
            vault: WalletAddress(m.vault.to_string()),
            prediction_window_end: to_u64(m.predictionWindowEnd, "window end")?,
            min_stake_amount: TokenAmount(m.minStakeAmount.to_string()),
            is_open: m.isOpen,
            is_settled: m.isSettled,
            winning_artwork_id: to_u64(m.winningArtworkId, "winning artwork")?,
            total_shares_in_market: TokenAmount(m.totalSharesInMarket.to_string()),
            predictor_pool_amount: TokenAmount(m.predictorPoolAmount.to_string()),
        })
    }

    async fn submitted_artworks(&self, market_id: u64) -> WalletResult<Vec<ArtworkSubmission>> {
        let topics = [
            Some(IPredictionMarket::ArtworkSubmitted::SIGNATURE_HASH),
            Some(topic_for(market_id)),
        ];
        let logs = self.client.logs(self.market, &topics).await?;

        let mut submissions = Vec::with_capacity(logs.len());
        for log in &logs {
            match decode_submission(log) {
                Ok(submission) => submissions.push(submission),
                Err(err) => warn!(error = %err, "skipping undecodable ArtworkSubmitted log"),
            }
        }
        debug!(market_id, count = submissions.len(), "artwork submissions loaded");
        Ok(submissions)
    }

    async fn token_uri(&self, token_id: u64) -> WalletResult<String> {
        let data = IArtworkNft::tokenURICall {
            tokenId: U256::from(token_id),
        }
        .abi_encode();
        let raw = self.client.call(self.nft, data).await?;
        IArtworkNft::tokenURICall::abi_decode_returns(&raw).map_err(decode_failed("tokenURI"))
    }

    async fn stake_of(
        &self,
        market_id: u64,
        artwork_id: u64,
        predictor: &WalletAddress,
    ) -> WalletResult<TokenAmount> {
        let data = IPredictionMarket::predictionsCall {
            marketId: U256::from(market_id),
            artworkId: U256::from(artwork_id),
            predictor: parse_address(predictor)?,
        }
        .abi_encode();
        let raw = self.client.call(self.market, data).await?;
        let prediction = IPredictionMarket::predictionsCall::abi_decode_returns(&raw)
            .map_err(decode_failed("predictions"))?;
        Ok(TokenAmount(prediction.shares.to_string()))
    }

    async fn approve(&self, token: &WalletAddress, amount: &TokenAmount) -> WalletResult<TxReceipt> {
        let from = self.sender()?;
        let data = IERC20::approveCall {
            spender: self.market,
            amount: parse_amount(amount)?,
        }
        .abi_encode();
        Ok(self.client.transact(from, parse_address(token)?, data).await?.receipt)
    }

    async fn predict(&self, artwork_id: u64, amount: &TokenAmount) -> WalletResult<TxReceipt> {
        let data = IPredictionMarket::predictCall {
            artworkId: U256::from(artwork_id),
            amount: parse_amount(amount)?,
        }
        .abi_encode();
        self.write_market(data).await
    }

    async fn mint(&self, to: &WalletAddress, token_uri: &str) -> WalletResult<MintResult> {
        let from = self.sender()?;
        let data = IArtworkNft::mintCall {
            to: parse_address(to)?,
            uri: token_uri.to_owned(),
        }
        .abi_encode();
        let confirmed = self.client.transact(from, self.nft, data).await?;
        let token_id = minted_token_id(self.nft, &confirmed.logs)?;
        info!(token_id, "artwork minted");
        Ok(MintResult {
            token_id,
            receipt: confirmed.receipt,
        })
    }

    async fn submit_artwork(&self, token_id: u64) -> WalletResult<TxReceipt> {
        let data = IPredictionMarket::submitArtworkCall {
            artworkId: U256::from(token_id),
        }
        .abi_encode();
        self.write_market(data).await
    }

    async fn open_market(&self, duration_days: u64, min_stake: &TokenAmount) -> WalletResult<TxReceipt> {
        let data = IPredictionMarket::openMarketCall {
            durationDays: U256::from(duration_days),
            minStakeAmount: parse_amount(min_stake)?,
        }
        .abi_encode();
        self.write_market(data).await
    }

    async fn close_market(&self) -> WalletResult<TxReceipt> {
        self.write_market(IPredictionMarket::closeMarketCall {}.abi_encode())
            .await
    }

    async fn set_winner(&self, artwork_id: u64) -> WalletResult<TxReceipt> {
        let data = IPredictionMarket::setWinnerCall {
            artworkId: U256::from(artwork_id),
        }
        .abi_encode();
        self.write_market(data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ac_chain_client::ProviderError;
    use ac_chain_client::testing::ScriptedProvider;
    use std::rc::Rc;

    const ACCOUNT: &str = "0x00000000000000000000000000000000000000aa";

    fn word(value: u64) -> String {
        hex::encode_prefixed(U256::from(value).to_be_bytes::<32>())
    }

    fn address_topic(address: &str) -> String {
        let address: Address = address.parse().unwrap();
        hex::encode_prefixed(address.into_word())
    }

    fn gateway(provider: &Rc<ScriptedProvider>, account: Option<&str>) -> EvmMarketGateway<Rc<ScriptedProvider>> {
        let account = account.map(WalletAddress::new);
        EvmMarketGateway::new(provider.clone(), &Deployment::default(), account.as_ref()).unwrap()
    }

    fn mined_receipt(logs: Value) -> Value {
        json!({ "blockNumber": "0x10", "status": "0x1", "logs": logs })
    }

    #[tokio::test]
    async fn reads_current_market_id() -> anyhow::Result<()> {
        let provider = Rc::new(ScriptedProvider::new());
        provider.respond(METHOD_CALL, json!(word(7)));

        let id = gateway(&provider, None).current_market_id().await?;
        assert_eq!(id, 7);

        let (_, params) = &provider.calls()[0];
        let selector = hex::encode_prefixed(IPredictionMarket::currentMarketIdCall::SELECTOR);
        assert_eq!(params[0]["data"], json!(selector));
        assert_eq!(params[1], json!("latest"));
        Ok(())
    }

    #[tokio::test]
    async fn decodes_market_record() -> anyhow::Result<()> {
        let encoded = IPredictionMarket::marketsCall::abi_encode_returns(&IPredictionMarket::marketsReturn {
            id: U256::from(3),
            vault: Address::ZERO,
            predictionWindowEnd: U256::from(1_700_000_000u64),
            minStakeAmount: U256::from(100),
            isOpen: true,
            isSettled: false,
            winningArtworkId: U256::ZERO,
            totalSharesInMarket: U256::from(5),
            predictorPoolAmount: U256::from(500),
        });
        let provider = Rc::new(ScriptedProvider::new());
        provider.respond(METHOD_CALL, json!(hex::encode_prefixed(encoded)));

        let market = gateway(&provider, None).market(3).await?;
        assert_eq!(market.id, 3);
        assert!(market.is_open);
        assert_eq!(market.min_stake_amount, TokenAmount::new("100"));
        assert_eq!(market.predictor_pool_amount, TokenAmount::new("500"));
        Ok(())
    }

    #[tokio::test]
    async fn submissions_are_filtered_by_market_topic() -> anyhow::Result<()> {
        let provider = Rc::new(ScriptedProvider::new());
        let signature = hex::encode_prefixed(IPredictionMarket::ArtworkSubmitted::SIGNATURE_HASH);
        provider.respond(
            METHOD_GET_LOGS,
            json!([
                {
                    "address": Deployment::default().market_address.as_str(),
                    "topics": [signature, word(2), word(11), address_topic(ACCOUNT)],
                    "data": "0x"
                },
                {
                    "address": Deployment::default().market_address.as_str(),
                    "topics": [signature],
                    "data": "0x"
                }
            ]),
        );

        let submissions = gateway(&provider, None).submitted_artworks(2).await?;
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].artwork_id, 11);
        assert!(submissions[0].artist.same_as(&WalletAddress::new(ACCOUNT)));

        let (_, params) = &provider.calls()[0];
        assert_eq!(params[0]["fromBlock"], json!("0x0"));
        assert_eq!(params[0]["topics"][1], json!(word(2)));
        Ok(())
    }

    #[tokio::test]
    async fn writes_wait_for_confirmation() -> anyhow::Result<()> {
        let provider = Rc::new(ScriptedProvider::new());
        provider.respond(METHOD_SEND_TRANSACTION, json!("0xabc"));
        provider.push(METHOD_GET_RECEIPT, Ok(Value::Null));
        provider.push(METHOD_GET_RECEIPT, Ok(Value::Null));
        provider.respond(METHOD_GET_RECEIPT, mined_receipt(json!([])));

        let receipt = gateway(&provider, Some(ACCOUNT)).close_market().await?;
        assert_eq!(receipt.tx_hash, TxHash("0xabc".to_owned()));
        assert_eq!(receipt.block_number, Some(16));
        assert_eq!(provider.calls_to(METHOD_GET_RECEIPT), 3);
        assert_eq!(provider.pauses(), 2);

        let (_, params) = &provider.calls()[0];
        assert_eq!(params[0]["from"], json!(ACCOUNT.parse::<Address>()?.to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn reverted_transaction_is_an_error() -> anyhow::Result<()> {
        let provider = Rc::new(ScriptedProvider::new());
        provider.respond(METHOD_SEND_TRANSACTION, json!("0xdead"));
        provider.respond(METHOD_GET_RECEIPT, json!({ "status": "0x0", "logs": [] }));

        let err = gateway(&provider, Some(ACCOUNT)).set_winner(4).await.unwrap_err();
        assert_eq!(err, WalletError::external("transaction 0xdead reverted"));
        Ok(())
    }

    #[tokio::test]
    async fn unconfirmed_transaction_gives_up_after_bounded_polls() -> anyhow::Result<()> {
        let provider = Rc::new(ScriptedProvider::new());
        provider.respond(METHOD_SEND_TRANSACTION, json!("0x1"));
        provider.respond(METHOD_GET_RECEIPT, Value::Null);

        let gateway = gateway(&provider, Some(ACCOUNT)).with_max_polls(3);
        let err = gateway.submit_artwork(1).await.unwrap_err();
        assert!(err.to_string().contains("not confirmed"));
        assert_eq!(provider.calls_to(METHOD_GET_RECEIPT), 3);
        Ok(())
    }

    #[tokio::test]
    async fn mint_reads_token_id_from_transfer_log() -> anyhow::Result<()> {
        let nft = Deployment::default().nft_address;
        let provider = Rc::new(ScriptedProvider::new());
        provider.respond(METHOD_SEND_TRANSACTION, json!("0x2"));
        provider.respond(
            METHOD_GET_RECEIPT,
            mined_receipt(json!([{
                "address": nft.as_str().to_ascii_lowercase(),
                "topics": [
                    hex::encode_prefixed(IArtworkNft::Transfer::SIGNATURE_HASH),
                    word(0),
                    address_topic(ACCOUNT),
                    word(42)
                ],
                "data": "0x"
            }])),
        );

        let minted = gateway(&provider, Some(ACCOUNT))
            .mint(&WalletAddress::new(ACCOUNT), "ipfs://art")
            .await?;
        assert_eq!(minted.token_id, 42);
        Ok(())
    }

    #[tokio::test]
    async fn writes_require_an_account() -> anyhow::Result<()> {
        let provider = Rc::new(ScriptedProvider::new());
        let gateway = gateway(&provider, None);

        let err = gateway.predict(1, &TokenAmount::new("100")).await.unwrap_err();
        assert_eq!(err, WalletError::NotConnected);
        assert!(provider.calls().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn rejected_signature_maps_to_user_rejection() -> anyhow::Result<()> {
        let provider = Rc::new(ScriptedProvider::new());
        provider.fail(METHOD_SEND_TRANSACTION, ProviderError::rejected());

        let token = WalletAddress::new("0x00000000000000000000000000000000000000a0");
        let err = gateway(&provider, Some(ACCOUNT))
            .approve(&token, &TokenAmount::new("100"))
            .await
            .unwrap_err();
        assert!(err.is_user_rejection());
        Ok(())
    }

    #[tokio::test]
    async fn stake_reads_prediction_shares() -> anyhow::Result<()> {
        let encoded = IPredictionMarket::predictionsCall::abi_encode_returns(&IPredictionMarket::predictionsReturn {
            amount: U256::from(100),
            shares: U256::from(9),
        });
        let provider = Rc::new(ScriptedProvider::new());
        provider.respond(METHOD_CALL, json!(hex::encode_prefixed(encoded)));

        let shares = gateway(&provider, None)
            .stake_of(1, 2, &WalletAddress::new(ACCOUNT))
            .await?;
        assert_eq!(shares, TokenAmount::new("9"));
        Ok(())
    }
}
