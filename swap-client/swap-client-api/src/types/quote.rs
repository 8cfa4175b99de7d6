//! Quotes obtained from the exchange's read-only pricing function

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use super::{amount::to_text, token::Token};
use crate::serialization::{address_checksum_serialization, u256_decimal_serialization};

/// The arguments of the exchange's pricing function
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct QuoteParams {
    /// The address of the token being sold
    pub token_in: Address,
    /// The address of the token being bought
    pub token_out: Address,
    /// The scaled amount of `token_in` being sold
    pub amount_in: U256,
}

/// An estimate of the output of a swap
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// The exchange contract that priced the swap
    #[serde(with = "address_checksum_serialization")]
    pub exchange: Address,
    /// The token being sold
    pub token_in: Token,
    /// The token being bought
    pub token_out: Token,
    /// The scaled input amount
    #[serde(with = "u256_decimal_serialization")]
    pub amount_in: U256,
    /// The scaled output amount estimated by the exchange
    #[serde(with = "u256_decimal_serialization")]
    pub amount_out: U256,
    /// Whether the quote reflects the current inputs; a stale quote is shown
    /// only while its replacement is being fetched
    pub fresh: bool,
}

impl Quote {
    /// Whether the quote is fresh and was resolved by the given exchange for
    /// exactly these inputs
    ///
    /// Tokens are compared by chain as well as address, so a quote never
    /// carries over to another chain that reuses the same addresses
    pub fn is_fresh_for(
        &self,
        exchange: Address,
        token_in: &Token,
        token_out: &Token,
        amount_in: U256,
    ) -> bool {
        self.fresh
            && self.exchange == exchange
            && self.token_in == *token_in
            && self.token_out == *token_out
            && self.amount_in == amount_in
    }

    /// The output amount formatted in the output token's decimals
    pub fn amount_out_text(&self) -> String {
        to_text(self.amount_out, self.token_out.decimals)
    }
}
