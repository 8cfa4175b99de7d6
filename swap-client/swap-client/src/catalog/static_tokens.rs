//! The built-in token catalogs

use alloy_primitives::{address, Address};
use swap_client_api::{token::Token, ChainId};

/// The chain whose catalog is used for chains without one
pub const DEFAULT_CHAIN_ID: ChainId = 1;
/// Base Sepolia
pub const BASE_SEPOLIA_CHAIN_ID: ChainId = 84532;

/// A catalog entry known at compile time
#[derive(Clone, Copy, Debug)]
pub struct StaticToken {
    /// The ticker symbol
    pub symbol: &'static str,
    /// The display name
    pub name: &'static str,
    /// The token's decimals
    pub decimals: u8,
    /// The logo asset
    pub logo_uri: &'static str,
    /// The address on the catalog's chain
    pub address: Address,
}

impl StaticToken {
    /// Build a token on the given chain at the given address
    pub fn to_token(&self, chain_id: ChainId, address: Address) -> Token {
        Token {
            chain_id,
            address,
            symbol: self.symbol.to_string(),
            name: self.name.to_string(),
            decimals: self.decimals,
            logo_uri: Some(self.logo_uri.to_string()),
        }
    }
}

// --- Tokens --- //

/// USD Coin on mainnet
const USDC: StaticToken = StaticToken {
    symbol: "USDC",
    name: "USD Coin",
    decimals: 6,
    logo_uri: "/usdc-coin.png",
    address: address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
};

/// Tether on mainnet
const USDT: StaticToken = StaticToken {
    symbol: "USDT",
    name: "Tether USD",
    decimals: 6,
    logo_uri: "/usdt-coin.jpg",
    address: address!("0xdAC17F958D2ee523a2206206994597C13D831ec7"),
};

/// Dai on mainnet
const DAI: StaticToken = StaticToken {
    symbol: "DAI",
    name: "Dai Stablecoin",
    decimals: 18,
    logo_uri: "/dai-coin.jpg",
    address: address!("0x6B175474E89094C44Da98b954EedeAC495271d0F"),
};

/// Wrapped ether on mainnet
const WETH: StaticToken = StaticToken {
    symbol: "WETH",
    name: "Wrapped Ether",
    decimals: 18,
    logo_uri: "/eth-coin.jpg",
    address: address!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
};

/// Wrapped ether on OP stack chains
const OP_WETH: StaticToken =
    StaticToken { address: address!("0x4200000000000000000000000000000000000006"), ..WETH };

/// Circle's USD Coin on Base Sepolia
const BASE_SEPOLIA_USDC: StaticToken =
    StaticToken { address: address!("0x036CbD53842c5426634e7929541eC2318f3dCF7e"), ..USDC };

/// The STIM test token on Base Sepolia
const BASE_SEPOLIA_STIM: StaticToken = StaticToken {
    symbol: "STIM",
    name: "STIM Token",
    decimals: 18,
    logo_uri: "/stim-coin.png",
    address: address!("0x18Dc055ed8D98573D4518EE89EF50d6F4B74B528"),
};

// --- Catalogs --- //

/// The mainnet catalog
const MAINNET_TOKENS: &[StaticToken] = &[USDC, USDT, DAI, WETH];
/// The Base Sepolia catalog
const BASE_SEPOLIA_TOKENS: &[StaticToken] = &[OP_WETH, BASE_SEPOLIA_USDC, BASE_SEPOLIA_STIM];

/// Stablecoins appended to any chain's catalog when configured with an address
pub const OPTIONAL_STABLES: &[StaticToken] = &[USDC, USDT, DAI];

/// The built-in catalog for a chain, if it has one
pub fn static_catalog(chain_id: ChainId) -> Option<&'static [StaticToken]> {
    match chain_id {
        DEFAULT_CHAIN_ID => Some(MAINNET_TOKENS),
        BASE_SEPOLIA_CHAIN_ID => Some(BASE_SEPOLIA_TOKENS),
        _ => None,
    }
}

/// The built-in catalog of the default chain
pub fn default_catalog() -> &'static [StaticToken] {
    MAINNET_TOKENS
}
