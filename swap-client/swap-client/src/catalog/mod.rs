//! Resolves the tokens and the exchange contract available on a chain
//!
//! Resolution is a pure function of the chain id and the configuration built
//! at startup

mod static_tokens;

use std::sync::Arc;

use alloy_primitives::Address;
use swap_client_api::{token::Token, ChainId};
use tracing::{instrument, warn};

pub use self::static_tokens::{BASE_SEPOLIA_CHAIN_ID, DEFAULT_CHAIN_ID};
use self::static_tokens::{default_catalog, static_catalog, OPTIONAL_STABLES};
use crate::{config::SwapClientConfig, error::SwapClientError};

/// The token catalog for the configured deployment
#[derive(Clone, Debug)]
pub struct TokenCatalog {
    /// The client configuration
    config: Arc<SwapClientConfig>,
}

impl TokenCatalog {
    /// Constructor
    pub fn new(config: Arc<SwapClientConfig>) -> Self {
        Self { config }
    }

    /// The tokens a user may pick on the given chain
    ///
    /// Chains without a built-in catalog use the default chain's, with any
    /// configured addresses for the requested chain applied. Tokens not
    /// deployed on the chain are left out
    #[instrument(skip(self))]
    pub fn resolve_tokens(&self, chain_id: ChainId) -> Result<Vec<Token>, SwapClientError> {
        let base = static_catalog(chain_id).unwrap_or_else(default_catalog);
        let mut tokens: Vec<Token> = base
            .iter()
            .map(|entry| {
                let address =
                    self.config.token_address(entry.symbol, chain_id).unwrap_or(entry.address);
                entry.to_token(chain_id, address)
            })
            .collect();

        for stable in OPTIONAL_STABLES {
            if tokens.iter().any(|t| t.symbol == stable.symbol) {
                continue;
            }
            if let Some(address) = self.config.token_address(stable.symbol, chain_id) {
                tokens.push(stable.to_token(chain_id, address));
            }
        }

        tokens.retain(|t| !t.is_undeployed());
        if !tokens.is_empty() {
            return Ok(tokens);
        }

        if !self.config.allow_placeholder_catalog {
            return Err(SwapClientError::UnsupportedNetwork(chain_id));
        }

        warn!("no tokens deployed on chain {chain_id}, showing the default catalog read-only");
        Ok(default_catalog().iter().map(|e| e.to_token(DEFAULT_CHAIN_ID, e.address)).collect())
    }

    /// The exchange contract on the given chain
    ///
    /// The zero address means no exchange is deployed there
    pub fn resolve_swap_contract(&self, chain_id: ChainId) -> Address {
        self.config
            .swap_address_for(chain_id)
            .or(self.config.swap_address)
            .unwrap_or(Address::ZERO)
    }
}
