//! An exchange backend that reads and writes through a JSON-RPC node
//!
//! Signing is delegated to whatever wallet the provider was built with; this
//! module never touches key material beyond handing a signer to alloy

use std::time::Duration;

use alloy::{
    network::EthereumWallet,
    providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use swap_client_api::{
    intent::{LiquidityIntent, SwapIntent},
    quote::QuoteParams,
};
use tracing::{info, instrument, warn};

use super::{
    abi::{IERC20, ITokenSwap},
    error::ExchangeError,
    ExchangeBackend,
};
use crate::{config::SwapClientConfig, error::SwapClientError};

/// The number of confirmations after which a transaction counts as confirmed
const ONE_CONFIRMATION: u64 = 1;

/// Build an HTTP provider for the given url, signing with `signer` if one is
/// given
pub fn build_provider(
    rpc_url: &str,
    signer: Option<PrivateKeySigner>,
) -> Result<DynProvider, SwapClientError> {
    let url: Url = rpc_url.parse().map_err(SwapClientError::config)?;
    let provider = match signer {
        Some(signer) => {
            ProviderBuilder::new().wallet(EthereumWallet::from(signer)).connect_http(url).erased()
        },
        None => ProviderBuilder::new().connect_http(url).erased(),
    };
    Ok(provider)
}

/// An exchange backend over an alloy provider
#[derive(Clone)]
pub struct RpcExchange {
    /// The provider, filled with the wallet that signs writes
    provider: DynProvider,
    /// The wallet's account, if the provider can sign
    account: Option<Address>,
    /// How long to wait for a receipt before giving up
    confirmation_timeout: Duration,
}

impl RpcExchange {
    /// Wrap an existing provider
    pub fn new(
        provider: DynProvider,
        account: Option<Address>,
        confirmation_timeout: Duration,
    ) -> Self {
        Self { provider, account, confirmation_timeout }
    }

    /// Connect over HTTP, signing with `signer` if one is given
    pub fn connect(
        rpc_url: &str,
        signer: Option<PrivateKeySigner>,
        confirmation_timeout: Duration,
    ) -> Result<Self, SwapClientError> {
        let account = signer.as_ref().map(|s| s.address());
        let provider = build_provider(rpc_url, signer)?;
        Ok(Self::new(provider, account, confirmation_timeout))
    }

    /// Build a backend from the client configuration
    pub fn from_config(
        config: &SwapClientConfig,
        signer: Option<PrivateKeySigner>,
    ) -> Result<Self, SwapClientError> {
        let rpc_url =
            config.rpc_url.as_deref().ok_or_else(|| SwapClientError::config("RPC_URL is not set"))?;
        Self::connect(rpc_url, signer, config.confirmation_timeout)
    }

    /// The account the wallet signs for, if any
    pub fn account(&self) -> Option<Address> {
        self.account
    }

    /// The exchange contract at the given address
    fn exchange(&self, address: Address) -> ITokenSwap::ITokenSwapInstance<DynProvider> {
        ITokenSwap::new(address, self.provider.clone())
    }

    /// The token contract at the given address
    fn erc20(&self, address: Address) -> IERC20::IERC20Instance<DynProvider> {
        IERC20::new(address, self.provider.clone())
    }
}

#[async_trait]
impl ExchangeBackend for RpcExchange {
    async fn get_amount_out(
        &self,
        exchange: Address,
        params: QuoteParams,
    ) -> Result<U256, ExchangeError> {
        let amount_out = self
            .exchange(exchange)
            .getAmountOut(params.token_in, params.token_out, params.amount_in)
            .call()
            .await?;
        Ok(amount_out)
    }

    async fn get_reserve(&self, exchange: Address, token: Address) -> Result<U256, ExchangeError> {
        let reserve = self.exchange(exchange).getReserve(token).call().await?;
        Ok(reserve)
    }

    async fn balance_of(&self, token: Address, account: Address) -> Result<U256, ExchangeError> {
        let balance = self.erc20(token).balanceOf(account).call().await?;
        Ok(balance)
    }

    async fn token_symbol(&self, token: Address) -> Result<String, ExchangeError> {
        let symbol = self.erc20(token).symbol().call().await?;
        Ok(symbol)
    }

    async fn token_decimals(&self, token: Address) -> Result<u8, ExchangeError> {
        let decimals = self.erc20(token).decimals().call().await?;
        Ok(decimals)
    }

    #[instrument(skip(self))]
    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, ExchangeError> {
        let pending = self.erc20(token).approve(spender, amount).send().await?;
        let tx_hash = *pending.tx_hash();
        info!("submitted approval: {tx_hash:#x}");
        Ok(tx_hash)
    }

    #[instrument(skip_all)]
    async fn swap(&self, exchange: Address, intent: &SwapIntent) -> Result<TxHash, ExchangeError> {
        let pending = self
            .exchange(exchange)
            .swap(
                intent.token_in().address,
                intent.token_out().address,
                intent.amount_in(),
                intent.min_amount_out(),
            )
            .send()
            .await?;

        let tx_hash = *pending.tx_hash();
        info!("submitted swap of {}: {tx_hash:#x}", intent.describe());
        Ok(tx_hash)
    }

    #[instrument(skip_all)]
    async fn add_liquidity(
        &self,
        exchange: Address,
        intent: &LiquidityIntent,
    ) -> Result<TxHash, ExchangeError> {
        let pending = self
            .exchange(exchange)
            .addLiquidity(intent.token.address, intent.amount)
            .send()
            .await?;

        let tx_hash = *pending.tx_hash();
        info!("submitted deposit of {}: {tx_hash:#x}", intent.describe());
        Ok(tx_hash)
    }

    #[instrument(skip_all)]
    async fn remove_liquidity(
        &self,
        exchange: Address,
        intent: &LiquidityIntent,
    ) -> Result<TxHash, ExchangeError> {
        let pending = self
            .exchange(exchange)
            .removeLiquidity(intent.token.address, intent.amount)
            .send()
            .await?;

        let tx_hash = *pending.tx_hash();
        info!("submitted withdrawal of {}: {tx_hash:#x}", intent.describe());
        Ok(tx_hash)
    }

    #[instrument(skip(self))]
    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<(), ExchangeError> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx_hash)
            .with_required_confirmations(ONE_CONFIRMATION)
            .with_timeout(Some(self.confirmation_timeout))
            .get_receipt()
            .await?;

        if !receipt.status() {
            warn!("tx ({tx_hash:#x}) reverted");
            return Err(ExchangeError::call_reverted(format!("transaction {tx_hash:#x} reverted")));
        }

        Ok(())
    }
}
