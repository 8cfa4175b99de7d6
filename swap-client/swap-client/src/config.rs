//! Configuration for the swap client, read once from the process environment
//!
//! Scalar settings are declared with clap so each has a flag, an env var, and
//! a default in one place. Per-chain and per-token overrides have open-ended
//! names and are collected by scanning the environment:
//! - `TOKEN_SWAP_ADDRESS_<chainId>`: the exchange address on a chain
//! - `TOKEN_ADDRESS_<SYMBOL>_<chainId>`: a token's address on a chain

use std::{collections::HashMap, str::FromStr, time::Duration};

use alloy_primitives::Address;
use clap::{ArgAction, Parser};
use swap_client_api::{slippage::DEFAULT_SLIPPAGE_PERCENT, ChainId};

use crate::{catalog::DEFAULT_CHAIN_ID, error::SwapClientError};

// -------------
// | Constants |
// -------------

/// The program name clap reports in errors
const CONFIG_BIN_NAME: &str = "swap-client";
/// The prefix of per-chain exchange address overrides
const SWAP_ADDRESS_PREFIX: &str = "TOKEN_SWAP_ADDRESS_";
/// The prefix of per-token address overrides
const TOKEN_ADDRESS_PREFIX: &str = "TOKEN_ADDRESS_";
/// The default time to wait for a transaction receipt
const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 120;

// ---------
// | Types |
// ---------

/// The scalar settings
#[rustfmt::skip]
#[derive(Debug, Clone, Parser)]
#[clap(about = "Swap client configuration")]
pub struct Cli {
    // --- Network --- //

    /// The RPC url reads and writes go through
    #[clap(long, env = "RPC_URL")]
    pub rpc_url: Option<String>,
    /// The chain a session starts on
    #[clap(long, env = "CHAIN_ID", default_value_t = DEFAULT_CHAIN_ID)]
    pub chain_id: ChainId,

    // --- Contracts --- //

    /// The exchange address on chains without a chain-specific override
    #[clap(long, env = "TOKEN_SWAP_ADDRESS")]
    pub token_swap_address: Option<String>,
    /// Whether to show the default chain's tokens, read-only, when no token is
    /// deployed on the active chain
    #[clap(long, env = "ALLOW_PLACEHOLDER_CATALOG")]
    pub allow_placeholder_catalog: bool,

    // --- Submission --- //

    /// The slippage tolerance, in percent, a session starts with
    #[clap(long, env = "DEFAULT_SLIPPAGE", default_value = DEFAULT_SLIPPAGE_PERCENT)]
    pub default_slippage: String,
    /// Whether to wait for an approval to be included before submitting the
    /// call that spends it
    #[clap(long, env = "AWAIT_APPROVAL_RECEIPT", default_value = "true", action = ArgAction::Set)]
    pub await_approval_receipt: bool,
    /// How long to wait for a transaction receipt, in seconds
    #[clap(long, env = "CONFIRMATION_TIMEOUT_SECS", default_value_t = DEFAULT_CONFIRMATION_TIMEOUT_SECS)]
    pub confirmation_timeout_secs: u64,
}

/// The resolved client configuration
///
/// Built once at startup and shared by reference; nothing downstream reads the
/// environment
#[derive(Debug, Clone)]
pub struct SwapClientConfig {
    /// The RPC url reads and writes go through
    pub rpc_url: Option<String>,
    /// The chain a session starts on
    pub default_chain_id: ChainId,
    /// The slippage tolerance, in percent, a session starts with
    pub default_slippage: String,
    /// The exchange address on chains without a chain-specific override
    pub swap_address: Option<Address>,
    /// Exchange addresses by chain
    pub swap_addresses_by_chain: HashMap<ChainId, Address>,
    /// Token addresses by `(symbol, chain)`
    pub token_addresses: HashMap<(String, ChainId), Address>,
    /// Whether to fall back to the default chain's tokens when none is deployed
    /// on the active chain
    pub allow_placeholder_catalog: bool,
    /// Whether to wait for approvals to be included before spending them
    pub await_approval_receipt: bool,
    /// How long to wait for a transaction receipt
    pub confirmation_timeout: Duration,
}

impl Default for SwapClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            default_chain_id: DEFAULT_CHAIN_ID,
            default_slippage: DEFAULT_SLIPPAGE_PERCENT.to_string(),
            swap_address: None,
            swap_addresses_by_chain: HashMap::new(),
            token_addresses: HashMap::new(),
            allow_placeholder_catalog: false,
            await_approval_receipt: true,
            confirmation_timeout: Duration::from_secs(DEFAULT_CONFIRMATION_TIMEOUT_SECS),
        }
    }
}

// ------------------
// | Implementation |
// ------------------

impl SwapClientConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self, SwapClientError> {
        let cli = Cli::try_parse_from([CONFIG_BIN_NAME]).map_err(SwapClientError::config)?;
        Self::from_parts(cli, std::env::vars())
    }

    /// Build the configuration from parsed scalar settings and the environment
    /// variables to scan for overrides
    pub fn from_parts<I>(cli: Cli, vars: I) -> Result<Self, SwapClientError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let swap_address = cli
            .token_swap_address
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| parse_address("TOKEN_SWAP_ADDRESS", s))
            .transpose()?;

        let mut swap_addresses_by_chain = HashMap::new();
        let mut token_addresses = HashMap::new();
        for (name, value) in vars {
            if value.trim().is_empty() {
                continue;
            }

            if let Some(chain) = name.strip_prefix(SWAP_ADDRESS_PREFIX) {
                let Ok(chain_id) = chain.parse::<ChainId>() else { continue };
                swap_addresses_by_chain.insert(chain_id, parse_address(&name, &value)?);
            } else if let Some(rest) = name.strip_prefix(TOKEN_ADDRESS_PREFIX) {
                let Some((symbol, chain)) = rest.rsplit_once('_') else { continue };
                let Ok(chain_id) = chain.parse::<ChainId>() else { continue };
                if symbol.is_empty() {
                    continue;
                }
                token_addresses
                    .insert((symbol.to_uppercase(), chain_id), parse_address(&name, &value)?);
            }
        }

        Ok(Self {
            rpc_url: cli.rpc_url,
            default_chain_id: cli.chain_id,
            default_slippage: cli.default_slippage,
            swap_address,
            swap_addresses_by_chain,
            token_addresses,
            allow_placeholder_catalog: cli.allow_placeholder_catalog,
            await_approval_receipt: cli.await_approval_receipt,
            confirmation_timeout: Duration::from_secs(cli.confirmation_timeout_secs),
        })
    }

    /// The configured address of a token on a chain, if overridden
    pub fn token_address(&self, symbol: &str, chain_id: ChainId) -> Option<Address> {
        self.token_addresses.get(&(symbol.to_uppercase(), chain_id)).copied()
    }

    /// The configured exchange address for a chain, if overridden
    pub fn swap_address_for(&self, chain_id: ChainId) -> Option<Address> {
        self.swap_addresses_by_chain.get(&chain_id).copied()
    }
}

/// Parse an address from a configuration value
fn parse_address(name: &str, value: &str) -> Result<Address, SwapClientError> {
    Address::from_str(value.trim())
        .map_err(|e| SwapClientError::config(format!("invalid address in {name}: {e}")))
}
