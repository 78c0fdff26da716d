//! In-memory doubles for the wallet host, its notifications, and the contracts.

use crate::{
    MarketGateway, MintResult, NotificationSource, Provider, ProviderError, TxReceipt,
    WalletError, WalletNotification, WalletResult,
};
use ac_api_types::{ArtworkSubmission, MarketInfo, TokenAmount, TxHash, WalletAddress};
use async_trait::async_trait;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

type Handler = Box<dyn Fn(&Value) -> Result<Value, ProviderError>>;

/// Provider answering from per-method handlers, recording every request.
#[derive(Default)]
pub struct ScriptedProvider {
    handlers: RefCell<HashMap<String, Handler>>,
    queued: RefCell<HashMap<String, VecDeque<Result<Value, ProviderError>>>>,
    calls: RefCell<Vec<(String, Value)>>,
    pauses: Cell<usize>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every `method` request with `value`.
    pub fn respond(&self, method: &str, value: Value) {
        self.handle(method, move |_| Ok(value.clone()));
    }

    pub fn fail(&self, method: &str, err: ProviderError) {
        self.handle(method, move |_| Err(err.clone()));
    }

    pub fn handle(
        &self,
        method: &str,
        handler: impl Fn(&Value) -> Result<Value, ProviderError> + 'static,
    ) {
        self.handlers
            .borrow_mut()
            .insert(method.to_owned(), Box::new(handler));
    }

    /// One-shot answer consumed before the method's handler.
    pub fn push(&self, method: &str, result: Result<Value, ProviderError>) {
        self.queued
            .borrow_mut()
            .entry(method.to_owned())
            .or_default()
            .push_back(result);
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.borrow().clone()
    }

    pub fn calls_to(&self, method: &str) -> usize {
        self.calls.borrow().iter().filter(|(m, _)| m == method).count()
    }

    pub fn pauses(&self) -> usize {
        self.pauses.get()
    }
}

#[async_trait(?Send)]
impl Provider for ScriptedProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.calls
            .borrow_mut()
            .push((method.to_owned(), params.clone()));

        let queued = self
            .queued
            .borrow_mut()
            .get_mut(method)
            .and_then(VecDeque::pop_front);
        if let Some(result) = queued {
            return result;
        }

        match self.handlers.borrow().get(method) {
            Some(handler) => handler(&params),
            None => Err(ProviderError::new(-32601, format!("method {method} not scripted"))),
        }
    }

    async fn pause(&self, _millis: u32) {
        self.pauses.set(self.pauses.get() + 1);
    }
}

/// Notification source fired by hand from tests.
#[derive(Default)]
pub struct ManualNotifier {
    listeners: RefCell<Vec<Rc<dyn Fn(&WalletNotification)>>>,
}

impl ManualNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, notification: WalletNotification) {
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener(&notification);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl NotificationSource for ManualNotifier {
    fn subscribe(&self, listener: Rc<dyn Fn(&WalletNotification)>) {
        self.listeners.borrow_mut().push(listener);
    }
}

#[derive(Debug, Default)]
struct FakeMarketState {
    current_market_id: u64,
    markets: HashMap<u64, MarketInfo>,
    submissions: Vec<ArtworkSubmission>,
    token_uris: HashMap<u64, String>,
    broken_uris: Vec<u64>,
    next_token_id: u64,
    allowance: u128,
    stakes: HashMap<(u64, u64, String), u128>,
    failures: HashMap<String, WalletError>,
    writes: Vec<String>,
    tx_counter: u64,
}

/// Contract behaviour kept in memory, acting for one connected account.
pub struct FakeGateway {
    account: Option<WalletAddress>,
    stake_token: WalletAddress,
    state: RefCell<FakeMarketState>,
}

impl FakeGateway {
    pub fn new(account: Option<WalletAddress>) -> Self {
        Self {
            account,
            stake_token: WalletAddress::new("0x00000000000000000000000000000000000000a0"),
            state: RefCell::new(FakeMarketState {
                next_token_id: 1,
                ..FakeMarketState::default()
            }),
        }
    }

    /// Seed an open market with the given minimum stake.
    pub fn with_open_market(self, market_id: u64, min_stake: u128) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.current_market_id = market_id;
            state
                .markets
                .insert(market_id, open_market_info(market_id, 1_700_000_000, min_stake));
        }
        self
    }

    /// Seed a submitted artwork in the current market.
    pub fn with_artwork(self, artwork_id: u64, artist: &str, uri: &str) -> Self {
        {
            let mut state = self.state.borrow_mut();
            let market_id = state.current_market_id;
            state.submissions.push(ArtworkSubmission {
                market_id,
                artwork_id,
                artist: WalletAddress::new(artist),
            });
            state.token_uris.insert(artwork_id, uri.to_owned());
        }
        self
    }

    /// Make `token_uri` fail for one token.
    pub fn with_broken_metadata(self, artwork_id: u64) -> Self {
        self.state.borrow_mut().broken_uris.push(artwork_id);
        self
    }

    pub fn with_stake(self, artwork_id: u64, predictor: &str, shares: u128) -> Self {
        {
            let mut state = self.state.borrow_mut();
            let market_id = state.current_market_id;
            state
                .stakes
                .insert((market_id, artwork_id, predictor.to_ascii_lowercase()), shares);
        }
        self
    }

    /// Fail the next call to `operation` (e.g. `"predict"`) with `err`.
    pub fn fail_next(&self, operation: &str, err: WalletError) {
        self.state
            .borrow_mut()
            .failures
            .insert(operation.to_owned(), err);
    }

    /// Names of the write operations that completed, in order.
    pub fn writes(&self) -> Vec<String> {
        self.state.borrow().writes.clone()
    }

    fn check(&self, operation: &str) -> WalletResult<()> {
        match self.state.borrow_mut().failures.remove(operation) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn account(&self) -> WalletResult<WalletAddress> {
        self.account.clone().ok_or(WalletError::NotConnected)
    }

    fn commit(&self, operation: &str) -> TxReceipt {
        let mut state = self.state.borrow_mut();
        state.tx_counter += 1;
        state.writes.push(operation.to_owned());
        TxReceipt {
            tx_hash: TxHash(format!("0x{:064x}", state.tx_counter)),
            block_number: Some(state.tx_counter),
        }
    }
}

fn open_market_info(market_id: u64, window_end: u64, min_stake: u128) -> MarketInfo {
    MarketInfo {
        id: market_id,
        vault: WalletAddress::new("0x00000000000000000000000000000000000000b0"),
        prediction_window_end: window_end,
        min_stake_amount: TokenAmount::new(min_stake.to_string()),
        is_open: true,
        is_settled: false,
        winning_artwork_id: 0,
        total_shares_in_market: TokenAmount::new("0"),
        predictor_pool_amount: TokenAmount::new("0"),
    }
}

fn parse_amount(amount: &TokenAmount) -> WalletResult<u128> {
    amount
        .as_str()
        .parse()
        .map_err(|_| WalletError::external(format!("invalid amount {amount}")))
}

#[async_trait(?Send)]
impl MarketGateway for FakeGateway {
    async fn current_market_id(&self) -> WalletResult<u64> {
        self.check("current_market_id")?;
        Ok(self.state.borrow().current_market_id)
    }

    async fn stake_token(&self) -> WalletResult<WalletAddress> {
        self.check("stake_token")?;
        Ok(self.stake_token.clone())
    }

    async fn market(&self, market_id: u64) -> WalletResult<MarketInfo> {
        self.check("market")?;
        self.state
            .borrow()
            .markets
            .get(&market_id)
            .cloned()
            .ok_or_else(|| WalletError::external(format!("market {market_id} does not exist")))
    }

    async fn submitted_artworks(&self, market_id: u64) -> WalletResult<Vec<ArtworkSubmission>> {
        self.check("submitted_artworks")?;
        Ok(self
            .state
            .borrow()
            .submissions
            .iter()
            .filter(|s| s.market_id == market_id)
            .cloned()
            .collect())
    }

    async fn token_uri(&self, token_id: u64) -> WalletResult<String> {
        let state = self.state.borrow();
        if state.broken_uris.contains(&token_id) {
            return Err(WalletError::external("execution reverted: invalid token"));
        }
        state
            .token_uris
            .get(&token_id)
            .cloned()
            .ok_or_else(|| WalletError::external("execution reverted: invalid token"))
    }

    async fn stake_of(
        &self,
        market_id: u64,
        artwork_id: u64,
        predictor: &WalletAddress,
    ) -> WalletResult<TokenAmount> {
        self.check("stake_of")?;
        let key = (market_id, artwork_id, predictor.as_str().to_ascii_lowercase());
        let shares = self.state.borrow().stakes.get(&key).copied().unwrap_or(0);
        Ok(TokenAmount::new(shares.to_string()))
    }

    async fn approve(&self, token: &WalletAddress, amount: &TokenAmount) -> WalletResult<TxReceipt> {
        self.account()?;
        self.check("approve")?;
        if !token.same_as(&self.stake_token) {
            return Err(WalletError::external("unknown token"));
        }
        self.state.borrow_mut().allowance = parse_amount(amount)?;
        Ok(self.commit("approve"))
    }

    async fn predict(&self, artwork_id: u64, amount: &TokenAmount) -> WalletResult<TxReceipt> {
        let account = self.account()?;
        self.check("predict")?;
        let amount = parse_amount(amount)?;
        {
            let mut state = self.state.borrow_mut();
            let market_id = state.current_market_id;
            let open = state.markets.get(&market_id).is_some_and(|m| m.is_open);
            if !open {
                return Err(WalletError::external("execution reverted: market not open"));
            }
            if state.allowance < amount {
                return Err(WalletError::external("execution reverted: insufficient allowance"));
            }
            state.allowance -= amount;
            *state
                .stakes
                .entry((market_id, artwork_id, account.as_str().to_ascii_lowercase()))
                .or_default() += amount;
        }
        Ok(self.commit("predict"))
    }

    async fn mint(&self, _to: &WalletAddress, token_uri: &str) -> WalletResult<MintResult> {
        self.account()?;
        self.check("mint")?;
        let token_id = {
            let mut state = self.state.borrow_mut();
            let id = state.next_token_id;
            state.next_token_id += 1;
            state.token_uris.insert(id, token_uri.to_owned());
            id
        };
        Ok(MintResult {
            token_id,
            receipt: self.commit("mint"),
        })
    }

    async fn submit_artwork(&self, token_id: u64) -> WalletResult<TxReceipt> {
        let account = self.account()?;
        self.check("submit_artwork")?;
        {
            let mut state = self.state.borrow_mut();
            let market_id = state.current_market_id;
            state.submissions.push(ArtworkSubmission {
                market_id,
                artwork_id: token_id,
                artist: account,
            });
        }
        Ok(self.commit("submit_artwork"))
    }

    async fn open_market(&self, duration_days: u64, min_stake: &TokenAmount) -> WalletResult<TxReceipt> {
        self.account()?;
        self.check("open_market")?;
        let min_stake = parse_amount(min_stake)?;
        {
            let mut state = self.state.borrow_mut();
            let current = state.current_market_id;
            if state.markets.get(&current).is_some_and(|m| m.is_open) {
                return Err(WalletError::external("execution reverted: market already open"));
            }
            let id = current + 1;
            let window_end = 1_700_000_000 + duration_days * 86_400;
            state.current_market_id = id;
            state.markets.insert(id, open_market_info(id, window_end, min_stake));
        }
        Ok(self.commit("open_market"))
    }

    async fn close_market(&self) -> WalletResult<TxReceipt> {
        self.account()?;
        self.check("close_market")?;
        {
            let mut state = self.state.borrow_mut();
            let current = state.current_market_id;
            match state.markets.get_mut(&current) {
                Some(m) if m.is_open => m.is_open = false,
                _ => return Err(WalletError::external("execution reverted: market not open")),
            }
        }
        Ok(self.commit("close_market"))
    }

    async fn set_winner(&self, artwork_id: u64) -> WalletResult<TxReceipt> {
        self.account()?;
        self.check("set_winner")?;
        {
            let mut state = self.state.borrow_mut();
            let current = state.current_market_id;
            match state.markets.get_mut(&current) {
                Some(m) if !m.is_open && !m.is_settled => {
                    m.is_settled = true;
                    m.winning_artwork_id = artwork_id;
                }
                _ => return Err(WalletError::external("execution reverted: cannot settle")),
            }
        }
        Ok(self.commit("set_winner"))
    }
}
