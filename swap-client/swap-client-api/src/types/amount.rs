//! Conversion between human-readable decimal text and scaled token amounts
//!
//! Amounts that feed contract calls never pass through a floating point
//! value; all arithmetic happens on the decimal digits and on `U256`

use alloy_primitives::U256;
use thiserror::Error;

/// The reason a decimal string could not be converted to a scaled amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountParseError {
    /// The input was empty or only whitespace
    #[error("empty amount")]
    Empty,
    /// The input is not a non-negative decimal numeral
    #[error("invalid numeral")]
    InvalidNumeral,
    /// The input carries more significant fraction digits than the token has
    /// decimals
    #[error("more than {0} fraction digits")]
    TooManyFractionDigits(u8),
    /// The scaled value does not fit in 256 bits
    #[error("amount overflows uint256")]
    Overflow,
}

/// How to treat significant fraction digits beyond the requested precision
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExcessDigits {
    /// Fail the conversion
    Reject,
    /// Drop the excess digits, rounding toward zero
    Truncate,
}

/// Convert decimal text to a scaled amount, failing closed to zero
///
/// Malformed, empty, negative, over-precise, or overflowing input yields
/// `U256::ZERO`; use [`try_to_scaled`] to learn why a conversion failed
pub fn to_scaled(text: &str, decimals: u8) -> U256 {
    try_to_scaled(text, decimals).unwrap_or(U256::ZERO)
}

/// Convert decimal text to a scaled amount
///
/// Accepts partial input as typed into a form, e.g. `"5."` or `".5"`. Trailing
/// zeros past the token's precision are not significant and are accepted
pub fn try_to_scaled(text: &str, decimals: u8) -> Result<U256, AmountParseError> {
    parse_fixed(text, decimals, ExcessDigits::Reject)
}

/// Format a scaled amount as decimal text
///
/// Trailing fraction zeros are trimmed and the decimal point is omitted for
/// whole amounts, so `to_text(100_000_000, 6) == "100"`
pub fn to_text(amount: U256, decimals: u8) -> String {
    let digits = amount.to_string();
    if decimals == 0 {
        return digits;
    }

    let width = decimals as usize;
    let padded = format!("{digits:0>w$}", w = width + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - width);
    let frac_part = frac_part.trim_end_matches('0');

    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac_part}")
    }
}

/// Parse a non-negative decimal numeral into an integer scaled by
/// `10^decimals`
pub(crate) fn parse_fixed(
    text: &str,
    decimals: u8,
    excess: ExcessDigits,
) -> Result<U256, AmountParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AmountParseError::Empty);
    }

    let (int_part, frac_part) = text.split_once('.').unwrap_or((text, ""));
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !is_digits(int_part) || !is_digits(frac_part)
    {
        return Err(AmountParseError::InvalidNumeral);
    }

    let width = decimals as usize;
    let mut frac_part = frac_part.trim_end_matches('0');
    if frac_part.len() > width {
        match excess {
            ExcessDigits::Reject => return Err(AmountParseError::TooManyFractionDigits(decimals)),
            ExcessDigits::Truncate => frac_part = &frac_part[..width],
        }
    }

    let digits = format!("{int_part}{frac_part:0<w$}", w = width);
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }

    U256::from_str_radix(&digits, 10).map_err(|_| AmountParseError::Overflow)
}
