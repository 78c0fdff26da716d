use ac_api_types::{MarketInfo, MarketStatus, TokenAmount, WalletAddress};
use ac_chain_client::{MarketGateway, WalletError, WalletResult};
use alloy::primitives::utils::{ParseUnits, parse_units};
use tracing::info;

pub const DEFAULT_DURATION_DAYS: &str = "7";
pub const DEFAULT_MIN_STAKE: &str = "100";

/// Client-side gate for the dashboard. The contract performs the real check.
pub fn is_manager(viewer: Option<&WalletAddress>, manager: &WalletAddress) -> bool {
    viewer.is_some_and(|v| v.same_as(manager))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerDashboard {
    pub market_id: u64,
    pub market: Option<MarketInfo>,
}

impl ManagerDashboard {
    pub fn status(&self) -> MarketStatus {
        MarketStatus::from_market(self.market.as_ref())
    }

    fn is_open(&self) -> bool {
        self.market.as_ref().is_some_and(|m| m.is_open)
    }

    pub fn can_open(&self, submitting: bool) -> bool {
        !submitting && !self.is_open()
    }

    pub fn can_close(&self, submitting: bool) -> bool {
        !submitting && self.is_open()
    }

    pub fn can_set_winner(&self, submitting: bool) -> bool {
        !submitting
            && self
                .market
                .as_ref()
                .is_some_and(|m| !m.is_open && !m.is_settled)
    }
}

/// Market id 0 means no market has been opened yet.
pub async fn load_dashboard<G: MarketGateway + ?Sized>(gateway: &G) -> WalletResult<ManagerDashboard> {
    let market_id = gateway.current_market_id().await?;
    let market = if market_id == 0 {
        None
    } else {
        Some(gateway.market(market_id).await?)
    };
    Ok(ManagerDashboard { market_id, market })
}

/// Convert a human amount such as `"100"` or `"2.5"` to base units.
pub fn to_base_units(amount: &str, decimals: u8) -> WalletResult<TokenAmount> {
    let invalid = || WalletError::external(format!("Invalid minimum stake: {amount}"));
    match parse_units(amount.trim(), decimals).map_err(|_| invalid())? {
        ParseUnits::U256(value) => Ok(TokenAmount(value.to_string())),
        ParseUnits::I256(_) => Err(invalid()),
    }
}

pub async fn open_market<G: MarketGateway + ?Sized>(
    gateway: &G,
    duration_days: &str,
    min_stake: &str,
    decimals: u8,
) -> WalletResult<String> {
    let days: u64 = duration_days
        .trim()
        .parse()
        .ok()
        .filter(|d| *d > 0)
        .ok_or_else(|| WalletError::external("Please enter a valid duration in days."))?;
    let amount = to_base_units(min_stake, decimals)?;

    gateway.open_market(days, &amount).await?;
    info!(days, min_stake = %amount, "market opened");
    Ok("Market opened successfully!".to_owned())
}

pub async fn close_market<G: MarketGateway + ?Sized>(gateway: &G) -> WalletResult<String> {
    gateway.close_market().await?;
    info!("market closed");
    Ok("Market closed successfully!".to_owned())
}

pub async fn set_winner<G: MarketGateway + ?Sized>(gateway: &G, winning_artwork_id: &str) -> WalletResult<String> {
    let raw = winning_artwork_id.trim();
    if raw.is_empty() {
        return Err(WalletError::external("Please enter a winning Token ID."));
    }
    let artwork_id: u64 = raw
        .parse()
        .map_err(|_| WalletError::external(format!("Invalid Token ID: {raw}")))?;

    gateway.set_winner(artwork_id).await?;
    info!(artwork_id, "market winner set");
    Ok(format!("Winner set to Token ID {artwork_id}!"))
}
