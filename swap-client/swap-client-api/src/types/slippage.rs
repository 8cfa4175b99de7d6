//! Slippage tolerance parsing and minimum-output bounds

use alloy_primitives::U256;

use super::amount::{parse_fixed, ExcessDigits};

/// The number of basis points in one whole
pub const BPS_DENOMINATOR: u32 = 10_000;
/// The slippage tolerance used when the user has not chosen one
pub const DEFAULT_SLIPPAGE_PERCENT: &str = "0.5";

/// Convert a percentage string to basis points, rounding down
///
/// `"0.5"` becomes 50 bps; digits past the second decimal are dropped so the
/// tolerance is never more generous than what the user typed. Returns `None`
/// for malformed or negative input
pub fn tolerance_bps(percent_text: &str) -> Option<u32> {
    parse_fixed(percent_text, 2, ExcessDigits::Truncate).ok()?.try_into().ok()
}

/// The smallest output acceptable for a quoted output at the given tolerance
///
/// Computes `amount_out - floor(amount_out * bps / 10000)` without
/// overflowing, saturating at zero once the tolerance reaches 100%
pub fn minimum_out(amount_out: U256, tolerance_bps: u32) -> U256 {
    if tolerance_bps >= BPS_DENOMINATOR {
        return U256::ZERO;
    }

    // amount_out = q * 10000 + r, so floor(amount_out * bps / 10000) is
    // q * bps + floor(r * bps / 10000), and no product exceeds amount_out
    let denom = U256::from(BPS_DENOMINATOR);
    let bps = U256::from(tolerance_bps);
    let (q, r) = amount_out.div_rem(denom);
    let cut = q * bps + r * bps / denom;
    amount_out - cut
}
