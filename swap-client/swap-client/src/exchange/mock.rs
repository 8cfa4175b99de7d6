//! A mock exchange backend for testing
//!
//! Prices swaps with a flat fee, records every call, and lets tests script
//! failures or hold calls in flight to exercise interleavings

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc, Mutex,
    },
};

use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use swap_client_api::{
    intent::{LiquidityIntent, SwapIntent},
    quote::QuoteParams,
};
use tokio::sync::Notify;

use super::{error::ExchangeError, ExchangeBackend};

/// The fee the mock exchange charges on swaps, 0.2%
const MOCK_FEE_BPS: u64 = 20;
/// The number of scheduler yields `wait_until` tolerates
const MAX_WAIT_YIELDS: usize = 10_000;

// ---------
// | Types |
// ---------

/// The backend methods, used to script failures and gates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    /// `get_amount_out`
    Quote,
    /// `get_reserve`
    Reserve,
    /// `balance_of`
    Balance,
    /// `token_symbol` and `token_decimals`
    Metadata,
    /// `approve`
    Approve,
    /// `swap`
    Swap,
    /// `add_liquidity`
    AddLiquidity,
    /// `remove_liquidity`
    RemoveLiquidity,
    /// `wait_for_confirmation`
    Confirm,
}

/// A call received by the mock
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExchangeCall {
    /// A quote request
    GetAmountOut(QuoteParams),
    /// A reserve read
    GetReserve(Address),
    /// A balance read
    BalanceOf {
        /// The token read
        token: Address,
        /// The account read
        account: Address,
    },
    /// A symbol or decimals read
    Metadata(Address),
    /// An approval
    Approve {
        /// The token approved
        token: Address,
        /// The approved spender
        spender: Address,
        /// The approved amount
        amount: U256,
    },
    /// A swap
    Swap {
        /// The token sold
        token_in: Address,
        /// The token bought
        token_out: Address,
        /// The amount sold
        amount_in: U256,
        /// The minimum amount bought
        min_amount_out: U256,
    },
    /// A liquidity deposit
    AddLiquidity(Address, U256),
    /// A liquidity withdrawal
    RemoveLiquidity(Address, U256),
    /// A confirmation wait
    WaitForConfirmation(TxHash),
}

impl ExchangeCall {
    /// The method that received the call
    pub fn method(&self) -> Method {
        match self {
            ExchangeCall::GetAmountOut(_) => Method::Quote,
            ExchangeCall::GetReserve(_) => Method::Reserve,
            ExchangeCall::BalanceOf { .. } => Method::Balance,
            ExchangeCall::Metadata(_) => Method::Metadata,
            ExchangeCall::Approve { .. } => Method::Approve,
            ExchangeCall::Swap { .. } => Method::Swap,
            ExchangeCall::AddLiquidity(..) => Method::AddLiquidity,
            ExchangeCall::RemoveLiquidity(..) => Method::RemoveLiquidity,
            ExchangeCall::WaitForConfirmation(_) => Method::Confirm,
        }
    }

    /// Whether the call mutates chain state
    pub fn is_write(&self) -> bool {
        matches!(
            self.method(),
            Method::Approve | Method::Swap | Method::AddLiquidity | Method::RemoveLiquidity
        )
    }
}

// -----------------
// | Mock Exchange |
// -----------------

/// A mock exchange backend
#[derive(Default)]
pub struct MockExchange {
    /// Every call received, in order
    calls: Mutex<Vec<ExchangeCall>>,
    /// Errors returned by a method until cleared
    failures: Mutex<HashMap<Method, ExchangeError>>,
    /// Gates a method's calls wait on before answering
    gates: Mutex<HashMap<Method, Arc<Notify>>>,
    /// Token balances by `(token, account)`
    balances: Mutex<HashMap<(Address, Address), U256>>,
    /// Exchange reserves by token
    reserves: Mutex<HashMap<Address, U256>>,
    /// Token symbols and decimals by address
    metadata: Mutex<HashMap<Address, (String, u8)>>,
    /// The last transaction hash handed out
    last_tx: AtomicU8,
}

impl MockExchange {
    /// Create a new mock
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a method fail with the given error
    pub fn fail(&self, method: Method, error: ExchangeError) {
        self.failures.lock().unwrap().insert(method, error);
    }

    /// Make a method's calls wait for a permit on the returned gate
    pub fn gate(&self, method: Method) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(method, gate.clone());
        gate
    }

    /// Let a method's future calls through immediately; calls already waiting
    /// still need a permit
    pub fn ungate(&self, method: Method) {
        self.gates.lock().unwrap().remove(&method);
    }

    /// Set an account's balance of a token
    pub fn set_balance(&self, token: Address, account: Address, balance: U256) {
        self.balances.lock().unwrap().insert((token, account), balance);
    }

    /// Set the exchange's reserve of a token
    pub fn set_reserve(&self, token: Address, reserve: U256) {
        self.reserves.lock().unwrap().insert(token, reserve);
    }

    /// Register a token's symbol and decimals
    pub fn set_metadata(&self, token: Address, symbol: &str, decimals: u8) {
        self.metadata.lock().unwrap().insert(token, (symbol.to_string(), decimals));
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<ExchangeCall> {
        self.calls.lock().unwrap().clone()
    }

    /// The number of calls a method has received
    pub fn count(&self, method: Method) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.method() == method).count()
    }

    /// The number of times a specific call was received
    pub fn count_call(&self, call: &ExchangeCall) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    /// Forget all calls received so far
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// The output the mock prices a swap at
    pub fn price(amount_in: U256) -> U256 {
        amount_in * U256::from(10_000 - MOCK_FEE_BPS) / U256::from(10_000u64)
    }

    /// Record a call, wait on the method's gate if any, and return the
    /// scripted failure if any
    async fn enter(&self, call: ExchangeCall) -> Result<(), ExchangeError> {
        let method = call.method();
        self.calls.lock().unwrap().push(call);

        let gate = self.gates.lock().unwrap().get(&method).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        match self.failures.lock().unwrap().get(&method) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Hand out a new transaction hash
    fn next_tx_hash(&self) -> TxHash {
        let n = self.last_tx.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        TxHash::with_last_byte(n)
    }
}

#[async_trait]
impl ExchangeBackend for MockExchange {
    async fn get_amount_out(
        &self,
        _exchange: Address,
        params: QuoteParams,
    ) -> Result<U256, ExchangeError> {
        self.enter(ExchangeCall::GetAmountOut(params)).await?;
        Ok(Self::price(params.amount_in))
    }

    async fn get_reserve(&self, _exchange: Address, token: Address) -> Result<U256, ExchangeError> {
        self.enter(ExchangeCall::GetReserve(token)).await?;
        Ok(self.reserves.lock().unwrap().get(&token).copied().unwrap_or_default())
    }

    async fn balance_of(&self, token: Address, account: Address) -> Result<U256, ExchangeError> {
        self.enter(ExchangeCall::BalanceOf { token, account }).await?;
        Ok(self.balances.lock().unwrap().get(&(token, account)).copied().unwrap_or_default())
    }

    async fn token_symbol(&self, token: Address) -> Result<String, ExchangeError> {
        self.enter(ExchangeCall::Metadata(token)).await?;
        let metadata = self.metadata.lock().unwrap();
        let (symbol, _) =
            metadata.get(&token).ok_or_else(|| ExchangeError::call_reverted("not a token"))?;
        Ok(symbol.clone())
    }

    async fn token_decimals(&self, token: Address) -> Result<u8, ExchangeError> {
        self.enter(ExchangeCall::Metadata(token)).await?;
        let metadata = self.metadata.lock().unwrap();
        let (_, decimals) =
            metadata.get(&token).ok_or_else(|| ExchangeError::call_reverted("not a token"))?;
        Ok(*decimals)
    }

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, ExchangeError> {
        self.enter(ExchangeCall::Approve { token, spender, amount }).await?;
        Ok(self.next_tx_hash())
    }

    async fn swap(&self, _exchange: Address, intent: &SwapIntent) -> Result<TxHash, ExchangeError> {
        self.enter(ExchangeCall::Swap {
            token_in: intent.token_in().address,
            token_out: intent.token_out().address,
            amount_in: intent.amount_in(),
            min_amount_out: intent.min_amount_out(),
        })
        .await?;
        Ok(self.next_tx_hash())
    }

    async fn add_liquidity(
        &self,
        _exchange: Address,
        intent: &LiquidityIntent,
    ) -> Result<TxHash, ExchangeError> {
        self.enter(ExchangeCall::AddLiquidity(intent.token.address, intent.amount)).await?;
        Ok(self.next_tx_hash())
    }

    async fn remove_liquidity(
        &self,
        _exchange: Address,
        intent: &LiquidityIntent,
    ) -> Result<TxHash, ExchangeError> {
        self.enter(ExchangeCall::RemoveLiquidity(intent.token.address, intent.amount)).await?;
        Ok(self.next_tx_hash())
    }

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<(), ExchangeError> {
        self.enter(ExchangeCall::WaitForConfirmation(tx_hash)).await
    }
}

// -----------
// | Helpers |
// -----------

/// Yield to the scheduler until the condition holds
pub async fn wait_until<F: Fn() -> bool>(condition: F) {
    for _ in 0..MAX_WAIT_YIELDS {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached after {MAX_WAIT_YIELDS} yields");
}

/// Install a test log subscriber, honoring `RUST_LOG`
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
