//! The on-chain collaborators of the client: the exchange contract and the
//! ERC-20 tokens it trades

pub mod abi;
pub mod error;
#[cfg(test)]
pub(crate) mod mock;
pub mod rpc;

use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use swap_client_api::{
    intent::{LiquidityIntent, SwapIntent},
    quote::QuoteParams,
};

use self::error::ExchangeError;

/// Exposes the calls the client makes against the exchange and its tokens
///
/// Read methods resolve to the returned value. Write methods resolve once the
/// signing wallet has accepted and broadcast the transaction, yielding its
/// hash; inclusion is observed separately through `wait_for_confirmation`
#[async_trait]
pub trait ExchangeBackend: Send + Sync {
    // --- Exchange Reads --- //

    /// Estimate the output of swapping `amount_in` of `token_in`
    async fn get_amount_out(
        &self,
        exchange: Address,
        params: QuoteParams,
    ) -> Result<U256, ExchangeError>;

    /// The exchange's recorded holding of a token
    async fn get_reserve(&self, exchange: Address, token: Address) -> Result<U256, ExchangeError>;

    // --- Token Reads --- //

    /// An account's balance of a token
    async fn balance_of(&self, token: Address, account: Address) -> Result<U256, ExchangeError>;

    /// A token's ticker symbol
    async fn token_symbol(&self, token: Address) -> Result<String, ExchangeError>;

    /// A token's decimal precision
    async fn token_decimals(&self, token: Address) -> Result<u8, ExchangeError>;

    // --- Writes --- //

    /// Approve `spender` to move `amount` of `token` from the wallet's account
    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, ExchangeError>;

    /// Submit a swap
    async fn swap(&self, exchange: Address, intent: &SwapIntent) -> Result<TxHash, ExchangeError>;

    /// Submit a liquidity deposit
    async fn add_liquidity(
        &self,
        exchange: Address,
        intent: &LiquidityIntent,
    ) -> Result<TxHash, ExchangeError>;

    /// Submit a liquidity withdrawal
    async fn remove_liquidity(
        &self,
        exchange: Address,
        intent: &LiquidityIntent,
    ) -> Result<TxHash, ExchangeError>;

    /// Wait for a transaction to be included, failing if it reverted
    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<(), ExchangeError>;
}
