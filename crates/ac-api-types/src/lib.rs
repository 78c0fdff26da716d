use serde::{Deserialize, Serialize};
use std::fmt;

/// Polkadot Hub Testnet, the network the market contracts are deployed on.
pub const POLKADOT_HUB_TESTNET: &str = "0x190F1B46";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct WalletAddress(pub String);

impl WalletAddress {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Hex addresses compare without regard to checksum casing.
    pub fn same_as(&self, other: &WalletAddress) -> bool {
        self.0.trim().eq_ignore_ascii_case(other.0.trim())
    }

    /// `0x1234...abcd` form used in the header.
    pub fn short(&self) -> String {
        let s = self.0.as_str();
        if s.len() <= 10 || !s.is_ascii() {
            return s.to_owned();
        }
        format!("{}...{}", &s[..6], &s[s.len() - 4..])
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ChainId(pub String);

impl ChainId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses `0x`-prefixed hex or plain decimal.
    pub fn numeric(&self) -> Option<u64> {
        let raw = self.0.trim();
        match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16).ok(),
            None => raw.parse().ok(),
        }
    }

    pub fn same_as(&self, other: &ChainId) -> bool {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a == b,
            _ => self.0.eq_ignore_ascii_case(&other.0),
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw token amount in base units, kept as a decimal string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct TokenAmount(pub String);

impl TokenAmount {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.trim().trim_start_matches('0').is_empty()
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct TxHash(pub String);

impl TxHash {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Network description in the shape `wallet_addEthereumChain` expects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChainParams {
    pub chain_id: ChainId,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    #[serde(default)]
    pub block_explorer_urls: Vec<String>,
}

impl ChainParams {
    pub fn polkadot_hub_testnet() -> Self {
        Self {
            chain_id: ChainId::new(POLKADOT_HUB_TESTNET),
            chain_name: "Polkadot Hub TestNet".to_owned(),
            native_currency: NativeCurrency {
                name: "Paseo".to_owned(),
                symbol: "PAS".to_owned(),
                decimals: 18,
            },
            rpc_urls: vec!["https://testnet-passet-hub-eth-rpc.polkadot.io".to_owned()],
            block_explorer_urls: vec!["https://blockscout-passet-hub.parity-testnet.parity.io".to_owned()],
        }
    }
}

/// Fixed contract addresses and network for one deployment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Deployment {
    pub chain: ChainParams,
    pub nft_address: WalletAddress,
    pub market_address: WalletAddress,
    pub manager_address: WalletAddress,
    pub store_explorer_url: String,
    pub stake_token_decimals: u8,
}

impl Default for Deployment {
    fn default() -> Self {
        Self {
            chain: ChainParams::polkadot_hub_testnet(),
            nft_address: WalletAddress::new("0x7aD0A9dB054101be9428fa89bB1194506586D1aD"),
            market_address: WalletAddress::new("0x66E1e28A6E6BD3a4c30a53C964e65ADa11Cf9EB8"),
            manager_address: WalletAddress::new("0xc35fc43ae078961bfc34ffb6c2148571b6f87920"),
            store_explorer_url: "https://explorer.mendoza.hoodi.arkiv.network".to_owned(),
            stake_token_decimals: 18,
        }
    }
}

impl Deployment {
    pub fn explorer_link(&self, address: &WalletAddress) -> String {
        format!("{}/{}", self.store_explorer_url.trim_end_matches('/'), address)
    }
}

/// On-chain market record as returned by `markets(id)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarketInfo {
    pub id: u64,
    pub vault: WalletAddress,
    pub prediction_window_end: u64,
    pub min_stake_amount: TokenAmount,
    pub is_open: bool,
    pub is_settled: bool,
    pub winning_artwork_id: u64,
    pub total_shares_in_market: TokenAmount,
    pub predictor_pool_amount: TokenAmount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketStatus {
    NoMarket,
    Open { market_id: u64, closes_at_epoch_secs: u64 },
    Closed { market_id: u64 },
    Settled { market_id: u64, winning_artwork_id: u64 },
}

impl MarketStatus {
    pub fn from_market(market: Option<&MarketInfo>) -> Self {
        match market {
            None => MarketStatus::NoMarket,
            Some(m) if m.is_settled => MarketStatus::Settled {
                market_id: m.id,
                winning_artwork_id: m.winning_artwork_id,
            },
            Some(m) if !m.is_open => MarketStatus::Closed { market_id: m.id },
            Some(m) => MarketStatus::Open {
                market_id: m.id,
                closes_at_epoch_secs: m.prediction_window_end,
            },
        }
    }

    /// Status line for the manager dashboard. `format_time` renders the window end.
    pub fn describe(&self, format_time: impl Fn(u64) -> String) -> String {
        match self {
            MarketStatus::NoMarket => "No Market Active".to_owned(),
            MarketStatus::Open {
                market_id,
                closes_at_epoch_secs,
            } => format!(
                "Market #{market_id} is OPEN. Closes: {}",
                format_time(*closes_at_epoch_secs)
            ),
            MarketStatus::Closed { market_id } => {
                format!("Market #{market_id} Closed. Awaiting Winner...")
            }
            MarketStatus::Settled {
                market_id,
                winning_artwork_id,
            } => format!("Market #{market_id} Settled. Winner: Token {winning_artwork_id}"),
        }
    }
}

/// Decoded `ArtworkSubmitted` event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtworkSubmission {
    pub market_id: u64,
    pub artwork_id: u64,
    pub artist: WalletAddress,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Artwork {
    pub id: u64,
    pub artist: WalletAddress,
    pub image_uri: String,
}

/// User input on the listing page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ArtworkDraft {
    pub title: String,
    pub description: String,
    pub image_uri: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market(is_open: bool, is_settled: bool) -> MarketInfo {
        MarketInfo {
            id: 4,
            vault: WalletAddress::new("0x0000000000000000000000000000000000000001"),
            prediction_window_end: 1_700_000_000,
            min_stake_amount: TokenAmount::new("100"),
            is_open,
            is_settled,
            winning_artwork_id: 3,
            total_shares_in_market: TokenAmount::default(),
            predictor_pool_amount: TokenAmount::default(),
        }
    }

    #[test]
    fn short_address_keeps_prefix_and_suffix() {
        let addr = WalletAddress::new("0xABCD000000000000000000000000000000001234");
        assert_eq!(addr.short(), "0xABCD...1234");
        assert_eq!(WalletAddress::new("0x12").short(), "0x12");
    }

    #[test]
    fn addresses_compare_ignoring_case() {
        let a = WalletAddress::new("0xc35fc43ae078961bfc34ffb6c2148571b6f87920");
        let b = WalletAddress::new("0xC35FC43AE078961BFC34FFB6C2148571B6F87920");
        assert!(a.same_as(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn chain_ids_compare_numerically() {
        let hex = ChainId::new(POLKADOT_HUB_TESTNET);
        assert_eq!(hex.numeric(), Some(420_420_422));
        assert!(hex.same_as(&ChainId::new("0x190f1b46")));
        assert!(hex.same_as(&ChainId::new("420420422")));
        assert!(!hex.same_as(&ChainId::new("0x1")));
    }

    #[test]
    fn market_status_follows_flags() {
        assert_eq!(MarketStatus::from_market(None), MarketStatus::NoMarket);
        assert_eq!(
            MarketStatus::from_market(Some(&market(true, false))),
            MarketStatus::Open {
                market_id: 4,
                closes_at_epoch_secs: 1_700_000_000
            }
        );
        assert_eq!(
            MarketStatus::from_market(Some(&market(false, false))),
            MarketStatus::Closed { market_id: 4 }
        );
        let settled = MarketStatus::from_market(Some(&market(false, true)));
        assert_eq!(
            settled.describe(|t| t.to_string()),
            "Market #4 Settled. Winner: Token 3"
        );
    }

    #[test]
    fn partial_deployment_json_falls_back_to_defaults() {
        let json = r#"{ "manager_address": "0x0000000000000000000000000000000000000abc" }"#;
        let deployment: Deployment = serde_json::from_str(json).unwrap();
        assert_eq!(deployment.manager_address.as_str(), "0x0000000000000000000000000000000000000abc");
        assert_eq!(deployment.chain.chain_id.as_str(), POLKADOT_HUB_TESTNET);
        assert_eq!(deployment.stake_token_decimals, 18);
    }

    #[test]
    fn tx_hash_serializes_as_bare_string() {
        let hash = TxHash::new("0xabc123");
        assert_eq!(hash.as_str(), "0xabc123");
        assert_eq!(serde_json::json!([hash.as_str()]), serde_json::json!(["0xabc123"]));
        assert_eq!(serde_json::to_string(&hash).unwrap(), r#""0xabc123""#);
    }

    #[test]
    fn zero_amounts() {
        assert!(TokenAmount::new("0").is_zero());
        assert!(TokenAmount::new("000").is_zero());
        assert!(!TokenAmount::new("100").is_zero());
    }
}
