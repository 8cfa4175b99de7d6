//! Token descriptors resolved from the catalog

use std::hash::{Hash, Hasher};

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::{serialization::address_checksum_serialization, ChainId};

/// A swappable ERC-20 token on a given chain
///
/// Two tokens are the same token iff they share a chain and an address; the
/// descriptive fields do not take part in equality
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// The chain the token is deployed on
    pub chain_id: ChainId,
    /// The token contract address
    #[serde(with = "address_checksum_serialization")]
    pub address: Address,
    /// The ticker symbol, e.g. `USDC`
    pub symbol: String,
    /// The display name, e.g. `USD Coin`
    pub name: String,
    /// The number of decimals used by the token's scaled amounts
    pub decimals: u8,
    /// An optional reference to a logo asset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
}

impl Token {
    /// Whether the token's address is the zero address, i.e. the token is not
    /// deployed on its chain
    pub fn is_undeployed(&self) -> bool {
        self.address == Address::ZERO
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.chain_id == other.chain_id && self.address == other.address
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.chain_id.hash(state);
        self.address.hash(state);
    }
}
