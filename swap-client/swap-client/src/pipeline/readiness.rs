//! Checks a submission is complete before any contract call is made

use alloy_primitives::{Address, U256};
use swap_client_api::{
    intent::{LiquidityIntent, SwapIntent},
    notification::Notification,
    quote::Quote,
    token::Token,
};

use super::PipelineRequest;

/// A form as submitted by the user
#[derive(Clone, Debug)]
pub enum Submission {
    /// The swap form
    Swap {
        /// The token being sold
        token_in: Option<Token>,
        /// The token being bought
        token_out: Option<Token>,
        /// The scaled input amount
        amount_in: U256,
        /// The quote displayed at submission
        quote: Option<Quote>,
        /// The slippage tolerance in basis points, if the input parsed
        slippage_bps: Option<u32>,
    },
    /// The add liquidity form
    AddLiquidity {
        /// The token deposited
        token: Option<Token>,
        /// The scaled amount deposited
        amount: U256,
    },
    /// The remove liquidity form
    RemoveLiquidity {
        /// The token withdrawn
        token: Option<Token>,
        /// The scaled amount withdrawn
        amount: U256,
    },
}

/// The environment a submission is made in
#[derive(Clone, Copy, Debug)]
pub struct SubmitContext {
    /// The connected wallet account
    pub account: Option<Address>,
    /// The exchange contract on the active chain
    pub exchange: Address,
}

/// The reason a submission cannot be sent
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NotReady {
    /// No wallet account is connected
    #[error("wallet not connected")]
    WalletNotConnected,
    /// A token is not selected
    #[error("token not selected")]
    MissingToken,
    /// The amount is zero or did not parse
    #[error("amount must be positive")]
    NonPositiveAmount,
    /// No exchange is deployed on the active chain
    #[error("exchange not deployed")]
    ExchangeNotDeployed,
    /// The swap sells and buys the same token
    #[error("tokens must differ")]
    SameToken,
    /// No fresh quote matches the swap's inputs
    #[error("no quote for the current inputs")]
    MissingQuote,
    /// The slippage tolerance did not parse
    #[error("invalid slippage tolerance")]
    InvalidSlippage,
}

impl NotReady {
    /// The notification shown to the user
    pub fn notification(&self) -> Notification {
        let (title, description) = match self {
            NotReady::WalletNotConnected => {
                ("Wallet not connected", "Connect your wallet to proceed")
            },
            NotReady::MissingToken => ("Not ready", "Select a token"),
            NotReady::NonPositiveAmount => ("Not ready", "Enter an amount greater than zero"),
            NotReady::ExchangeNotDeployed => {
                ("Not ready", "The exchange is not deployed on this network")
            },
            NotReady::SameToken => ("Not ready", "Select two different tokens"),
            NotReady::MissingQuote => ("Not ready", "Wait for the quote to update"),
            NotReady::InvalidSlippage => ("Not ready", "Enter a valid slippage tolerance"),
        };

        Notification::destructive(title, Some(description.to_string()))
    }
}

impl Submission {
    /// Check the submission and build the request it describes
    pub fn validate(self, ctx: &SubmitContext) -> Result<PipelineRequest, NotReady> {
        if ctx.account.is_none() {
            return Err(NotReady::WalletNotConnected);
        }

        match self {
            Submission::Swap { token_in, token_out, amount_in, quote, slippage_bps } => {
                let (Some(token_in), Some(token_out)) = (token_in, token_out) else {
                    return Err(NotReady::MissingToken);
                };
                check_amount(amount_in)?;
                check_exchange(ctx)?;
                if token_in == token_out {
                    return Err(NotReady::SameToken);
                }

                let quote = quote
                    .filter(|q| q.is_fresh_for(ctx.exchange, &token_in, &token_out, amount_in))
                    .ok_or(NotReady::MissingQuote)?;
                let slippage_bps = slippage_bps.ok_or(NotReady::InvalidSlippage)?;

                let intent =
                    SwapIntent::new(token_in, token_out, amount_in, quote.amount_out, slippage_bps);
                Ok(PipelineRequest::Swap(intent))
            },
            Submission::AddLiquidity { token, amount } => {
                let intent = liquidity_intent(ctx, token, amount)?;
                Ok(PipelineRequest::AddLiquidity(intent))
            },
            Submission::RemoveLiquidity { token, amount } => {
                let intent = liquidity_intent(ctx, token, amount)?;
                Ok(PipelineRequest::RemoveLiquidity(intent))
            },
        }
    }
}

/// Check a liquidity form
fn liquidity_intent(
    ctx: &SubmitContext,
    token: Option<Token>,
    amount: U256,
) -> Result<LiquidityIntent, NotReady> {
    let token = token.ok_or(NotReady::MissingToken)?;
    check_amount(amount)?;
    check_exchange(ctx)?;
    Ok(LiquidityIntent { token, amount })
}

/// Amounts that failed to parse are zero
fn check_amount(amount: U256) -> Result<(), NotReady> {
    if amount.is_zero() {
        return Err(NotReady::NonPositiveAmount);
    }
    Ok(())
}

/// The exchange must be deployed
fn check_exchange(ctx: &SubmitContext) -> Result<(), NotReady> {
    if ctx.exchange == Address::ZERO {
        return Err(NotReady::ExchangeNotDeployed);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A connected context with a deployed exchange
    fn ctx() -> SubmitContext {
        SubmitContext { account: Some(Address::repeat_byte(0xac)), exchange: Address::repeat_byte(0xee) }
    }

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

    /// A complete swap form for 100 USDC quoted at 99.8 USDT
    fn swap_form() -> (Token, Token, U256, Quote) {
        let (usdc, usdt) = (token("USDC", 1), token("USDT", 2));
        let amount_in = U256::from(100_000_000u64);
        let quote = Quote {
            exchange: ctx().exchange,
            token_in: usdc.clone(),
            token_out: usdt.clone(),
            amount_in,
            amount_out: U256::from(99_800_000u64),
            fresh: true,
        };
        (usdc, usdt, amount_in, quote)
    }

    /// A complete swap becomes an intent with the slippage-adjusted bound
    #[test]
    fn test_ready_swap() {
        let (usdc, usdt, amount_in, quote) = swap_form();
        let submission = Submission::Swap {
            token_in: Some(usdc),
            token_out: Some(usdt),
            amount_in,
            quote: Some(quote),
            slippage_bps: Some(50),
        };

        let PipelineRequest::Swap(intent) = submission.validate(&ctx()).unwrap() else {
            panic!("expected a swap request");
        };
        assert_eq!(intent.min_amount_out(), U256::from(99_301_000u64));
    }

    /// Each missing piece is reported
    #[test]
    fn test_swap_not_ready() {
        let (usdc, usdt, amount_in, quote) = swap_form();
        let swap = |token_out: Option<Token>, amount_in, quote: Option<Quote>, slippage_bps| {
            Submission::Swap { token_in: Some(usdc.clone()), token_out, amount_in, quote, slippage_bps }
        };

        let disconnected = SubmitContext { account: None, ..ctx() };
        let check = swap(Some(usdt.clone()), amount_in, Some(quote.clone()), Some(50));
        assert_eq!(check.validate(&disconnected).unwrap_err(), NotReady::WalletNotConnected);

        let undeployed = SubmitContext { exchange: Address::ZERO, ..ctx() };
        let check = swap(Some(usdt.clone()), amount_in, Some(quote.clone()), Some(50));
        assert_eq!(check.validate(&undeployed).unwrap_err(), NotReady::ExchangeNotDeployed);

        let check = swap(None, amount_in, Some(quote.clone()), Some(50));
        assert_eq!(check.validate(&ctx()).unwrap_err(), NotReady::MissingToken);

        let check = swap(Some(usdt.clone()), U256::ZERO, Some(quote.clone()), Some(50));
        assert_eq!(check.validate(&ctx()).unwrap_err(), NotReady::NonPositiveAmount);

        let check = swap(Some(usdc.clone()), amount_in, Some(quote.clone()), Some(50));
        assert_eq!(check.validate(&ctx()).unwrap_err(), NotReady::SameToken);

        let check = swap(Some(usdt.clone()), amount_in, None, Some(50));
        assert_eq!(check.validate(&ctx()).unwrap_err(), NotReady::MissingQuote);

        let stale = Quote { fresh: false, ..quote.clone() };
        let check = swap(Some(usdt.clone()), amount_in, Some(stale), Some(50));
        assert_eq!(check.validate(&ctx()).unwrap_err(), NotReady::MissingQuote);

        let check = swap(Some(usdt.clone()), amount_in + U256::from(1u8), Some(quote.clone()), Some(50));
        assert_eq!(check.validate(&ctx()).unwrap_err(), NotReady::MissingQuote);

        let check = swap(Some(usdt), amount_in, Some(quote), None);
        assert_eq!(check.validate(&ctx()).unwrap_err(), NotReady::InvalidSlippage);
    }

    /// A quote from another exchange or chain does not price the swap
    #[test]
    fn test_quote_from_other_market_rejected() {
        let (usdc, usdt, amount_in, quote) = swap_form();
        let swap = |token_in: Token, token_out: Token, quote: Quote| Submission::Swap {
            token_in: Some(token_in),
            token_out: Some(token_out),
            amount_in,
            quote: Some(quote),
            slippage_bps: Some(50),
        };

        let moved = SubmitContext { exchange: Address::repeat_byte(0x99), ..ctx() };
        let check = swap(usdc.clone(), usdt.clone(), quote.clone());
        assert_eq!(check.validate(&moved).unwrap_err(), NotReady::MissingQuote);

        let usdc_l2 = Token { chain_id: 999, ..usdc };
        let usdt_l2 = Token { chain_id: 999, ..usdt };
        let check = swap(usdc_l2, usdt_l2, quote);
        assert_eq!(check.validate(&ctx()).unwrap_err(), NotReady::MissingQuote);
    }

    /// Liquidity forms need a token and a positive amount
    #[test]
    fn test_liquidity_readiness() {
        let dai = token("DAI", 3);
        let add = Submission::AddLiquidity { token: None, amount: U256::from(1u8) };
        assert_eq!(add.validate(&ctx()).unwrap_err(), NotReady::MissingToken);

        let remove = Submission::RemoveLiquidity { token: Some(dai.clone()), amount: U256::ZERO };
        assert_eq!(remove.validate(&ctx()).unwrap_err(), NotReady::NonPositiveAmount);

        let remove = Submission::RemoveLiquidity { token: Some(dai), amount: U256::from(1u8) };
        assert!(matches!(remove.validate(&ctx()), Ok(PipelineRequest::RemoveLiquidity(_))));
    }

    /// A disconnected wallet gets the connect prompt
    #[test]
    fn test_wallet_notification() {
        let notification = NotReady::WalletNotConnected.notification();
        assert_eq!(notification.title, "Wallet not connected");
        assert_eq!(notification.description.as_deref(), Some("Connect your wallet to proceed"));
        assert!(notification.is_destructive());
    }
}
