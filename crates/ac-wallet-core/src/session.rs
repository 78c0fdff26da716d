use ac_api_types::{ChainId, WalletAddress};
use ac_chain_client::{
    NotificationSource, Provider, WalletError, WalletNotification, WalletResult, request_accounts,
};
use ac_storage::{KeyValueStore, WALLET_ADDRESS_KEY};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, info, warn};

/// Wallet access bound to one account and network.
pub struct CallHandle<P> {
    account: WalletAddress,
    chain: ChainId,
    provider: Rc<P>,
}

impl<P> Clone for CallHandle<P> {
    fn clone(&self) -> Self {
        Self {
            account: self.account.clone(),
            chain: self.chain.clone(),
            provider: Rc::clone(&self.provider),
        }
    }
}

impl<P> CallHandle<P> {
    pub fn account(&self) -> &WalletAddress {
        &self.account
    }

    pub fn chain(&self) -> &ChainId {
        &self.chain
    }

    pub fn provider(&self) -> &Rc<P> {
        &self.provider
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Connected(WalletAddress),
    AccountSwitched(WalletAddress),
    Disconnected,
    ChainChanged(ChainId),
}

type Watcher = Rc<dyn Fn(&SessionEvent)>;

struct SessionState<P, S> {
    host: Option<Rc<P>>,
    storage: S,
    chain: ChainId,
    address: Option<WalletAddress>,
    handle: Option<CallHandle<P>>,
    watchers: Vec<Watcher>,
}

/// Who is connected. Clones share one state.
pub struct Session<P, S> {
    state: Rc<RefCell<SessionState<P, S>>>,
}

impl<P, S> Clone for Session<P, S> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<P, S> Session<P, S>
where
    P: Provider + 'static,
    S: KeyValueStore + 'static,
{
    pub fn new(host: Option<Rc<P>>, storage: S, chain: ChainId) -> Self {
        Self {
            state: Rc::new(RefCell::new(SessionState {
                host,
                storage,
                chain,
                address: None,
                handle: None,
                watchers: Vec::new(),
            })),
        }
    }

    /// Seed the address persisted by a previous visit. The call handle is
    /// built only once a host wallet is present.
    pub fn restore(host: Option<Rc<P>>, storage: S, chain: ChainId) -> Self {
        let session = Self::new(host, storage, chain);
        {
            let mut guard = session.state.borrow_mut();
            let state = &mut *guard;
            let saved = state
                .storage
                .get(WALLET_ADDRESS_KEY)
                .map(WalletAddress)
                .filter(|a| !a.is_empty());
            if let Some(address) = saved {
                debug!(address = %address, "restored wallet session");
                state.handle = state.host.as_ref().map(|host| CallHandle {
                    account: address.clone(),
                    chain: state.chain.clone(),
                    provider: Rc::clone(host),
                });
                state.address = Some(address);
            }
        }
        session
    }

    /// Bind a host wallet that became available after startup. Returns `false`
    /// and keeps the current host when one is already bound.
    pub fn attach_host(&self, host: Rc<P>) -> bool {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if state.host.is_some() {
            return false;
        }
        debug!(restored = state.address.is_some(), "wallet attached after startup");
        state.handle = state.address.as_ref().map(|address| CallHandle {
            account: address.clone(),
            chain: state.chain.clone(),
            provider: Rc::clone(&host),
        });
        state.host = Some(host);
        true
    }

    pub fn address(&self) -> Option<WalletAddress> {
        self.state.borrow().address.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.state.borrow().address.is_some()
    }

    pub fn handle(&self) -> Option<CallHandle<P>> {
        self.state.borrow().handle.clone()
    }

    pub fn host(&self) -> Option<Rc<P>> {
        self.state.borrow().host.clone()
    }

    pub fn chain(&self) -> ChainId {
        self.state.borrow().chain.clone()
    }

    /// Prompt the wallet for access and adopt its first account.
    pub async fn connect(&self) -> WalletResult<WalletAddress> {
        let host = self.host().ok_or(WalletError::NoWalletFound)?;

        let accounts = request_accounts(host.as_ref()).await?;
        let Some(account) = accounts.into_iter().next() else {
            return Err(WalletError::external("No accounts found"));
        };

        self.adopt(&account);
        info!(address = %account, "wallet connected");
        self.notify(&SessionEvent::Connected(account.clone()));
        Ok(account)
    }

    pub fn disconnect(&self) {
        {
            let mut state = self.state.borrow_mut();
            state.address = None;
            state.handle = None;
            if let Err(err) = state.storage.remove(WALLET_ADDRESS_KEY) {
                warn!(error = %err, "could not clear saved wallet address");
            }
        }
        info!("wallet disconnected");
        self.notify(&SessionEvent::Disconnected);
    }

    /// React to a notification pushed by the wallet.
    pub fn apply(&self, notification: &WalletNotification) {
        match notification {
            WalletNotification::AccountsChanged(accounts) => match accounts.first() {
                None => self.disconnect(),
                Some(first) => {
                    let unchanged = self
                        .address()
                        .is_some_and(|current| current.same_as(first));
                    if !unchanged {
                        self.adopt(first);
                        info!(address = %first, "wallet switched account");
                        self.notify(&SessionEvent::AccountSwitched(first.clone()));
                    }
                }
            },
            WalletNotification::ChainChanged(chain) => {
                debug!(chain = %chain, "wallet switched network");
                self.notify(&SessionEvent::ChainChanged(chain.clone()));
            }
        }
    }

    pub fn subscribe_to(&self, source: &dyn NotificationSource) {
        let weak: Weak<RefCell<SessionState<P, S>>> = Rc::downgrade(&self.state);
        source.subscribe(Rc::new(move |notification: &WalletNotification| {
            if let Some(state) = weak.upgrade() {
                Session { state }.apply(notification);
            }
        }));
    }

    /// Called after every change to the session.
    pub fn watch(&self, listener: impl Fn(&SessionEvent) + 'static) {
        self.state.borrow_mut().watchers.push(Rc::new(listener));
    }

    fn adopt(&self, account: &WalletAddress) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if let Err(err) = state.storage.set(WALLET_ADDRESS_KEY, account.as_str()) {
            warn!(error = %err, "could not persist wallet address");
        }
        state.handle = state.host.as_ref().map(|host| CallHandle {
            account: account.clone(),
            chain: state.chain.clone(),
            provider: Rc::clone(host),
        });
        state.address = Some(account.clone());
    }

    fn notify(&self, event: &SessionEvent) {
        let watchers = self.state.borrow().watchers.clone();
        for watcher in watchers {
            watcher(event);
        }
    }
}

/// Alert text shown when `connect` fails.
pub fn connect_alert(err: &WalletError) -> &'static str {
    match err {
        WalletError::NoWalletFound => "Please install MetaMask!",
        WalletError::UserRejected(_) => "Please connect to MetaMask.",
        _ => "An error occurred while connecting to MetaMask.",
    }
}
