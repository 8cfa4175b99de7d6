//! The arguments of a state-mutating exchange call, fixed at submission time

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use super::{amount::to_text, slippage::minimum_out, token::Token};
use crate::serialization::u256_decimal_serialization;

/// A swap ready for submission
///
/// The minimum output is always derived from the quoted output and the
/// tolerance, so it can never exceed the quote
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapIntent {
    /// The token being sold
    token_in: Token,
    /// The token being bought
    token_out: Token,
    /// The scaled input amount
    #[serde(with = "u256_decimal_serialization")]
    amount_in: U256,
    /// The scaled output amount of the quote the intent was built from
    #[serde(with = "u256_decimal_serialization")]
    quoted_amount_out: U256,
    /// The smallest output the swap may settle for
    #[serde(with = "u256_decimal_serialization")]
    min_amount_out: U256,
    /// The slippage tolerance in basis points
    slippage_bps: u32,
}

impl SwapIntent {
    /// Build an intent from a quote and a tolerance
    pub fn new(
        token_in: Token,
        token_out: Token,
        amount_in: U256,
        quoted_amount_out: U256,
        slippage_bps: u32,
    ) -> Self {
        let min_amount_out = minimum_out(quoted_amount_out, slippage_bps);
        Self { token_in, token_out, amount_in, quoted_amount_out, min_amount_out, slippage_bps }
    }

    /// The token being sold
    pub fn token_in(&self) -> &Token {
        &self.token_in
    }

    /// The token being bought
    pub fn token_out(&self) -> &Token {
        &self.token_out
    }

    /// The scaled input amount
    pub fn amount_in(&self) -> U256 {
        self.amount_in
    }

    /// The quoted scaled output amount
    pub fn quoted_amount_out(&self) -> U256 {
        self.quoted_amount_out
    }

    /// The minimum acceptable scaled output amount
    pub fn min_amount_out(&self) -> U256 {
        self.min_amount_out
    }

    /// The slippage tolerance in basis points
    pub fn slippage_bps(&self) -> u32 {
        self.slippage_bps
    }

    /// A one-line human description, e.g. `100 USDC for 99.8 USDT`
    pub fn describe(&self) -> String {
        format!(
            "{} {} for {} {}",
            to_text(self.amount_in, self.token_in.decimals),
            self.token_in.symbol,
            to_text(self.quoted_amount_out, self.token_out.decimals),
            self.token_out.symbol,
        )
    }
}

/// A liquidity deposit or withdrawal for a single token
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityIntent {
    /// The token whose reserve changes
    pub token: Token,
    /// The scaled amount deposited or withdrawn
    #[serde(with = "u256_decimal_serialization")]
    pub amount: U256,
}

impl LiquidityIntent {
    /// A one-line human description, e.g. `250 DAI`
    pub fn describe(&self) -> String {
        format!("{} {}", to_text(self.amount, self.token.decimals), self.token.symbol)
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;

    use super::*;

    /// Build a 6-decimal token with a distinct address
    fn token(symbol: &str, byte: u8) -> Token {
        Token {
            chain_id: 1,
            address: Address::repeat_byte(byte),
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            decimals: 6,
            logo_uri: None,
        }
    }

    /// The intent carries the slippage-adjusted bound
    #[test]
    fn test_intent_bounds() {
        let intent = SwapIntent::new(
            token("USDC", 1),
            token("USDT", 2),
            U256::from(100_000_000u64),
            U256::from(99_800_000u64),
            50,
        );

        assert_eq!(intent.min_amount_out(), U256::from(99_301_000u64));
        assert!(intent.min_amount_out() <= intent.quoted_amount_out());
        assert_eq!(intent.describe(), "100 USDC for 99.8 USDT");
    }

    /// Tolerances past 100% cannot produce a bound above the quote
    #[test]
    fn test_intent_bound_saturates() {
        let intent =
            SwapIntent::new(token("USDC", 1), token("USDT", 2), U256::from(5u8), U256::from(4u8), 20_000);
        assert_eq!(intent.min_amount_out(), U256::ZERO);
    }
}
