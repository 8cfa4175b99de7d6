//! Reads of token balances and exchange reserves
//!
//! The session declares which reads it currently displays (the watched set).
//! Each read is tracked per key, so a response is applied only if the key is
//! still watched and no newer read of it was issued since

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use alloy_primitives::{Address, U256};
use futures::future::join_all;
use swap_client_api::{token::Token, ChainId};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::{
    exchange::{error::ExchangeError, ExchangeBackend},
    supersede::Supersession,
};

/// A value read from chain
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReadKey {
    /// An account's balance of a token
    Balance {
        /// The chain the token is on
        chain_id: ChainId,
        /// The account holding the balance
        account: Address,
        /// The token held
        token: Address,
    },
    /// The exchange's reserve of a token
    Reserve {
        /// The chain the exchange is on
        chain_id: ChainId,
        /// The exchange contract
        exchange: Address,
        /// The token reserved
        token: Address,
    },
}

impl ReadKey {
    /// The balance read for an account and token, if both are set
    pub fn balance(account: Option<Address>, token: Option<&Token>) -> Option<Self> {
        let token = token?;
        Some(ReadKey::Balance { chain_id: token.chain_id, account: account?, token: token.address })
    }

    /// The reserve read for a token, if it is set and the exchange is deployed
    pub fn reserve(exchange: Address, token: Option<&Token>) -> Option<Self> {
        if exchange == Address::ZERO {
            return None;
        }
        let token = token?;
        Some(ReadKey::Reserve { chain_id: token.chain_id, exchange, token: token.address })
    }
}

/// The latest read of a key
#[derive(Debug, Default)]
struct ReadSlot {
    /// The outstanding read, if any
    requests: Supersession<()>,
    /// The latest applied value
    value: Option<U256>,
}

/// The mutable state of the readers
#[derive(Debug, Default)]
struct ReaderState {
    /// The keys currently displayed
    watched: HashSet<ReadKey>,
    /// The revision of the newest watched set
    revision: u64,
    /// The read state of each watched key
    slots: HashMap<ReadKey, ReadSlot>,
}

/// Reads balances and reserves through the exchange backend
pub struct Readers<B> {
    /// The exchange backend
    backend: Arc<B>,
    /// The reader state; never held across a backend call
    state: Mutex<ReaderState>,
}

impl<B: ExchangeBackend> Readers<B> {
    /// Constructor
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend, state: Mutex::default() }
    }

    /// Replace the watched set with the one at `revision`, returning the keys
    /// that were not watched before and so have no value yet
    ///
    /// A set older than the newest revision seen is ignored
    pub async fn watch<I>(&self, revision: u64, keys: I) -> Vec<ReadKey>
    where
        I: IntoIterator<Item = ReadKey>,
    {
        let keys: HashSet<ReadKey> = keys.into_iter().collect();
        let mut state = self.state.lock().await;
        if revision < state.revision {
            debug!("ignoring watched set older than revision {}", state.revision);
            return Vec::new();
        }
        state.revision = revision;

        state.slots.retain(|key, _| keys.contains(key));
        let added = keys.difference(&state.watched).copied().collect();
        state.watched = keys;
        added
    }

    /// Read each of the given watched keys once, concurrently
    ///
    /// Keys that are not watched are skipped
    #[instrument(skip_all, fields(num_keys = keys.len()))]
    pub async fn refresh(&self, keys: &[ReadKey]) {
        let tickets: Vec<_> = {
            let mut state = self.state.lock().await;
            let mut tickets = Vec::with_capacity(keys.len());
            for key in keys {
                if !state.watched.contains(key) {
                    continue;
                }
                let slot = state.slots.entry(*key).or_default();
                tickets.push((*key, slot.requests.begin(())));
            }
            tickets
        };

        let reads = tickets.iter().map(|(key, _)| self.read(*key));
        let results = join_all(reads).await;

        let mut state = self.state.lock().await;
        for ((key, ticket), result) in tickets.into_iter().zip(results) {
            let Some(slot) = state.slots.get_mut(&key) else {
                debug!("discarding read of unwatched {key:?}");
                continue;
            };
            if !slot.requests.complete(&ticket) {
                debug!("discarding superseded read of {key:?}");
                continue;
            }

            match result {
                Ok(value) => slot.value = Some(value),
                Err(e) => {
                    warn!("error reading {key:?}: {e}");
                    slot.value = None;
                },
            }
        }
    }

    /// Read every watched key once
    pub async fn refresh_watched(&self) {
        let keys: Vec<ReadKey> = self.state.lock().await.watched.iter().copied().collect();
        self.refresh(&keys).await;
    }

    /// The latest value read for a key
    pub async fn value(&self, key: ReadKey) -> Option<U256> {
        self.state.lock().await.slots.get(&key).and_then(|slot| slot.value)
    }

    /// The latest balance read for an account and token
    pub async fn balance_of(&self, account: Option<Address>, token: Option<&Token>) -> Option<U256> {
        self.value(ReadKey::balance(account, token)?).await
    }

    /// The latest reserve read for a token
    pub async fn reserve_of(&self, exchange: Address, token: Option<&Token>) -> Option<U256> {
        self.value(ReadKey::reserve(exchange, token)?).await
    }

    /// Build a token descriptor for an address outside the catalog from its
    /// on-chain metadata
    #[instrument(skip(self))]
    pub async fn describe_token(
        &self,
        chain_id: ChainId,
        address: Address,
    ) -> Result<Token, ExchangeError> {
        let (symbol, decimals) = futures::try_join!(
            self.backend.token_symbol(address),
            self.backend.token_decimals(address)
        )?;

        Ok(Token { chain_id, address, name: symbol.clone(), symbol, decimals, logo_uri: None })
    }

    /// Issue the backend call for a key
    async fn read(&self, key: ReadKey) -> Result<U256, ExchangeError> {
        match key {
            ReadKey::Balance { account, token, .. } => self.backend.balance_of(token, account).await,
            ReadKey::Reserve { exchange, token, .. } => self.backend.get_reserve(exchange, token).await,
        }
    }
}
