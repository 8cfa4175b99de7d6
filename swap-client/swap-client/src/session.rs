//! A user session: the forms, the chain and wallet they act on, and every
//! value derived from them
//!
//! Each setter updates the inputs and then recomputes what depends on them:
//! the scaled amount, the quote, and the set of balances and reserves on
//! display. The session lock guards the inputs only and is released before
//! any backend call

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use serde::Serialize;
use swap_client_api::{
    amount::{to_scaled, to_text},
    notification::Notification,
    quote::Quote,
    slippage::{minimum_out, tolerance_bps},
    token::Token,
    transaction::TransactionRecord,
    ChainId,
};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::{
    catalog::TokenCatalog,
    config::SwapClientConfig,
    error::{PipelineError, SwapClientError},
    exchange::ExchangeBackend,
    notifier::{NotificationReceiver, Notifier},
    pipeline::{
        readiness::{SubmitContext, Submission},
        PipelineStatus, TransactionPipeline,
    },
    quote::QuoteResolver,
    readers::{ReadKey, Readers},
};

// ---------
// | Views |
// ---------

/// A snapshot of the swap form for rendering
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapView {
    /// The active chain
    pub chain_id: ChainId,
    /// The tokens available on the active chain
    pub tokens: Vec<Token>,
    /// Whether any token is deployed on the active chain
    pub supported_network: bool,
    /// The connected account
    pub account: Option<Address>,
    /// The token being sold
    pub token_in: Option<Token>,
    /// The token being bought
    pub token_out: Option<Token>,
    /// The input amount as typed
    pub amount_in: String,
    /// The quoted output amount, empty without a quote
    pub amount_out: String,
    /// The latest quote
    pub quote: Option<Quote>,
    /// Whether a quote request is in flight
    pub fetching_quote: bool,
    /// The slippage tolerance, in percent, as typed
    pub slippage: String,
    /// The minimum output the swap would settle for
    pub min_amount_out: Option<String>,
    /// The account's balance of the token being sold
    pub balance_in: Option<String>,
    /// The account's balance of the token being bought
    pub balance_out: Option<String>,
    /// The exchange's reserve of the token being bought
    pub reserve_out: Option<String>,
    /// The pipeline status
    pub status: PipelineStatus,
    /// Whether a submission would be sent
    pub can_submit: bool,
}

/// A snapshot of the liquidity form for rendering
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityView {
    /// The active chain
    pub chain_id: ChainId,
    /// The tokens available on the active chain
    pub tokens: Vec<Token>,
    /// The connected account
    pub account: Option<Address>,
    /// The token deposited or withdrawn
    pub token: Option<Token>,
    /// The amount as typed
    pub amount: String,
    /// The account's balance of the token
    pub balance: Option<String>,
    /// The exchange's reserve of the token
    pub reserve: Option<String>,
    /// The pipeline status
    pub status: PipelineStatus,
    /// Whether a submission would be sent
    pub can_submit: bool,
}

// ---------
// | State |
// ---------

/// The swap form's inputs
#[derive(Clone, Debug, Default)]
struct SwapForm {
    /// The token being sold
    token_in: Option<Token>,
    /// The token being bought
    token_out: Option<Token>,
    /// The input amount as typed
    amount_in: String,
    /// The slippage tolerance, in percent, as typed
    slippage: String,
}

impl SwapForm {
    /// The input amount scaled to the input token's decimals
    fn scaled_amount_in(&self) -> U256 {
        self.token_in.as_ref().map(|t| to_scaled(&self.amount_in, t.decimals)).unwrap_or_default()
    }
}

/// The liquidity form's inputs
#[derive(Clone, Debug, Default)]
struct LiquidityForm {
    /// The token deposited or withdrawn
    token: Option<Token>,
    /// The amount as typed
    amount: String,
}

impl LiquidityForm {
    /// The amount scaled to the token's decimals
    fn scaled_amount(&self) -> U256 {
        self.token.as_ref().map(|t| to_scaled(&self.amount, t.decimals)).unwrap_or_default()
    }
}

/// The session's inputs
#[derive(Clone, Debug)]
struct SessionState {
    /// The active chain
    chain_id: ChainId,
    /// The tokens available on the active chain
    tokens: Vec<Token>,
    /// Whether any token is deployed on the active chain
    supported_network: bool,
    /// The exchange contract on the active chain
    exchange: Address,
    /// The connected account
    account: Option<Address>,
    /// The swap form
    swap: SwapForm,
    /// The liquidity form
    liquidity: LiquidityForm,
    /// Bumped on every change to the inputs
    revision: u64,
}

impl SessionState {
    /// The environment submissions are made in
    fn submit_context(&self) -> SubmitContext {
        SubmitContext { account: self.account, exchange: self.exchange }
    }

    /// The balances and reserves the forms display
    fn watched_keys(&self) -> Vec<ReadKey> {
        let selected =
            [&self.swap.token_in, &self.swap.token_out, &self.liquidity.token].map(Option::as_ref);
        selected
            .into_iter()
            .flat_map(|token| {
                [ReadKey::balance(self.account, token), ReadKey::reserve(self.exchange, token)]
            })
            .flatten()
            .collect()
    }

    /// The swap form as a submission, with the quote currently displayed
    fn swap_submission(&self, quote: Option<Quote>) -> Submission {
        let swap = &self.swap;
        Submission::Swap {
            token_in: swap.token_in.clone(),
            token_out: swap.token_out.clone(),
            amount_in: swap.scaled_amount_in(),
            quote,
            slippage_bps: tolerance_bps(&swap.slippage),
        }
    }

    /// Select the first tokens of the catalog
    fn select_defaults(&mut self) {
        let mut tokens = self.tokens.iter().cloned();
        self.swap.token_in = tokens.next();
        self.swap.token_out = tokens.next();
        self.liquidity.token = self.swap.token_in.clone();
    }
}

// -----------
// | Session |
// -----------

/// One user's session against the exchange
pub struct Session<B> {
    /// The client configuration
    config: Arc<SwapClientConfig>,
    /// The token catalog
    catalog: TokenCatalog,
    /// The quote resolver for the swap form
    quotes: QuoteResolver<B>,
    /// The balance and reserve readers
    readers: Readers<B>,
    /// The transaction pipeline
    pipeline: TransactionPipeline<B>,
    /// The channel notifications are sent on
    notifier: Notifier,
    /// The session's inputs
    state: Mutex<SessionState>,
}

impl<B: ExchangeBackend> Session<B> {
    /// Start a session on the configured default chain
    pub fn new(config: Arc<SwapClientConfig>, backend: Arc<B>) -> (Self, NotificationReceiver) {
        let (notifier, rx) = Notifier::new();
        let catalog = TokenCatalog::new(config.clone());

        let chain_id = config.default_chain_id;
        let (tokens, supported_network) = match catalog.resolve_tokens(chain_id) {
            Ok(tokens) => (tokens, true),
            Err(e) => {
                warn!("{e}");
                (Vec::new(), false)
            },
        };
        let mut state = SessionState {
            chain_id,
            tokens,
            supported_network,
            exchange: catalog.resolve_swap_contract(chain_id),
            account: None,
            swap: SwapForm { slippage: config.default_slippage.clone(), ..Default::default() },
            liquidity: LiquidityForm::default(),
            revision: 0,
        };
        state.select_defaults();

        let session = Self {
            quotes: QuoteResolver::new(backend.clone()),
            readers: Readers::new(backend.clone()),
            pipeline: TransactionPipeline::new(
                backend,
                notifier.clone(),
                config.await_approval_receipt,
            ),
            config,
            catalog,
            notifier,
            state: Mutex::new(state),
        };
        (session, rx)
    }

    /// The client configuration
    pub fn config(&self) -> &SwapClientConfig {
        &self.config
    }

    // --- Setters --- //

    /// Switch to another chain, rebuilding the catalog and the selections
    ///
    /// On an unsupported chain the catalog is emptied and the error returned
    #[instrument(skip(self))]
    pub async fn set_chain(&self, chain_id: ChainId) -> Result<(), SwapClientError> {
        let resolved = self.catalog.resolve_tokens(chain_id);
        let exchange = self.catalog.resolve_swap_contract(chain_id);
        self.update(|state| {
            state.chain_id = chain_id;
            state.exchange = exchange;
            match &resolved {
                Ok(tokens) => {
                    state.tokens = tokens.clone();
                    state.supported_network = true;
                },
                Err(_) => {
                    state.tokens.clear();
                    state.supported_network = false;
                },
            }
            state.select_defaults();
        })
        .await;

        if let Err(e) = &resolved {
            let description = Some(e.to_string());
            self.notifier.notify(Notification::destructive("Unsupported network", description));
        }
        self.recompute().await;
        resolved.map(|_| ())
    }

    /// Connect a wallet account
    pub async fn connect(&self, account: Address) {
        info!("connected {account:#x}");
        self.update(|state| state.account = Some(account)).await;
        self.recompute().await;
    }

    /// Disconnect the wallet
    pub async fn disconnect(&self) {
        self.update(|state| state.account = None).await;
        self.recompute().await;
    }

    /// Select the token to sell
    pub async fn select_token_in(&self, token: Token) {
        self.update(|state| state.swap.token_in = Some(token)).await;
        self.recompute().await;
    }

    /// Select the token to buy
    pub async fn select_token_out(&self, token: Token) {
        self.update(|state| state.swap.token_out = Some(token)).await;
        self.recompute().await;
    }

    /// Reverse the swap direction
    ///
    /// The quoted output becomes the new input if the quote is fresh for the
    /// current inputs; otherwise the input is cleared
    pub async fn flip_tokens(&self) {
        {
            let mut state = self.state.lock().await;
            let quoted = self
                .quotes
                .fresh_quote(
                    state.exchange,
                    state.swap.token_in.as_ref(),
                    state.swap.token_out.as_ref(),
                    state.swap.scaled_amount_in(),
                )
                .await
                .map(|q| q.amount_out_text());

            let swap = &mut state.swap;
            std::mem::swap(&mut swap.token_in, &mut swap.token_out);
            swap.amount_in = quoted.unwrap_or_default();
            state.revision += 1;
        }
        self.recompute().await;
    }

    /// Set the input amount text
    pub async fn set_amount_in(&self, text: &str) {
        self.update(|state| state.swap.amount_in = text.to_string()).await;
        self.recompute().await;
    }

    /// Set the slippage tolerance text, in percent
    pub async fn set_slippage(&self, text: &str) {
        self.update(|state| state.swap.slippage = text.to_string()).await;
    }

    /// Select the liquidity form's token
    pub async fn select_liquidity_token(&self, token: Token) {
        self.update(|state| state.liquidity.token = Some(token)).await;
        self.recompute().await;
    }

    /// Set the liquidity form's amount text
    pub async fn set_liquidity_amount(&self, text: &str) {
        self.update(|state| state.liquidity.amount = text.to_string()).await;
    }

    /// Add a token outside the catalog by its address
    ///
    /// The token's symbol and decimals are read from chain
    #[instrument(skip(self))]
    pub async fn import_token(&self, address: Address) -> Result<Token, SwapClientError> {
        let chain_id = self.state.lock().await.chain_id;
        let token = self.readers.describe_token(chain_id, address).await?;

        let mut state = self.state.lock().await;
        if state.chain_id != chain_id {
            debug!("chain changed while importing {address:#x}, not adding it");
            return Ok(token);
        }
        if !state.tokens.contains(&token) {
            info!("imported {} at {address:#x}", token.symbol);
            state.tokens.push(token.clone());
        }
        Ok(token)
    }

    // --- Views --- //

    /// Snapshot the swap form
    pub async fn swap_view(&self) -> SwapView {
        let state = self.state.lock().await.clone();
        let quote = self.quotes.view().await;
        let status = self.pipeline.status().await;
        let swap = &state.swap;

        let decimals_in = swap.token_in.as_ref().map(|t| t.decimals);
        let decimals_out = swap.token_out.as_ref().map(|t| t.decimals);
        let display = |value: Option<U256>, decimals: Option<u8>| Some(to_text(value?, decimals?));

        let balance_in = self.readers.balance_of(state.account, swap.token_in.as_ref()).await;
        let balance_out = self.readers.balance_of(state.account, swap.token_out.as_ref()).await;
        let reserve_out = self.readers.reserve_of(state.exchange, swap.token_out.as_ref()).await;

        let amount_out = quote.quote.as_ref().map(Quote::amount_out_text).unwrap_or_default();
        let min_amount_out = quote.quote.as_ref().filter(|q| q.fresh).and_then(|q| {
            let bps = tolerance_bps(&swap.slippage)?;
            Some(to_text(minimum_out(q.amount_out, bps), q.token_out.decimals))
        });
        let submission = state.swap_submission(quote.quote.clone());
        let can_submit =
            !status.is_in_flight() && submission.validate(&state.submit_context()).is_ok();

        SwapView {
            chain_id: state.chain_id,
            tokens: state.tokens.clone(),
            supported_network: state.supported_network,
            account: state.account,
            token_in: swap.token_in.clone(),
            token_out: swap.token_out.clone(),
            amount_in: swap.amount_in.clone(),
            amount_out,
            quote: quote.quote,
            fetching_quote: quote.fetching,
            slippage: swap.slippage.clone(),
            min_amount_out,
            balance_in: display(balance_in, decimals_in),
            balance_out: display(balance_out, decimals_out),
            reserve_out: display(reserve_out, decimals_out),
            status,
            can_submit,
        }
    }

    /// Snapshot the liquidity form
    pub async fn liquidity_view(&self) -> LiquidityView {
        let state = self.state.lock().await.clone();
        let status = self.pipeline.status().await;
        let form = &state.liquidity;

        let decimals = form.token.as_ref().map(|t| t.decimals);
        let display = |value: Option<U256>| Some(to_text(value?, decimals?));
        let balance = self.readers.balance_of(state.account, form.token.as_ref()).await;
        let reserve = self.readers.reserve_of(state.exchange, form.token.as_ref()).await;

        let submission =
            Submission::AddLiquidity { token: form.token.clone(), amount: form.scaled_amount() };
        let can_submit =
            !status.is_in_flight() && submission.validate(&state.submit_context()).is_ok();

        LiquidityView {
            chain_id: state.chain_id,
            tokens: state.tokens.clone(),
            account: state.account,
            token: form.token.clone(),
            amount: form.amount.clone(),
            balance: display(balance),
            reserve: display(reserve),
            status,
            can_submit,
        }
    }

    /// The transaction currently or last tracked by the pipeline
    pub async fn transaction(&self) -> Option<TransactionRecord> {
        self.pipeline.record().await
    }

    // --- Submission --- //

    /// Submit the swap form
    pub async fn submit_swap(&self) -> Result<TransactionRecord, PipelineError> {
        let state = self.state.lock().await.clone();
        let quote = self.quotes.view().await.quote;
        let submission = state.swap_submission(quote);

        let record = self.pipeline.submit(&state.submit_context(), submission).await?;
        self.update(|state| state.swap.amount_in.clear()).await;
        self.quotes.clear().await;
        self.after_confirmation().await;
        Ok(record)
    }

    /// Deposit the liquidity form's amount
    pub async fn add_liquidity(&self) -> Result<TransactionRecord, PipelineError> {
        self.submit_liquidity(|token, amount| Submission::AddLiquidity { token, amount }).await
    }

    /// Withdraw the liquidity form's amount
    pub async fn remove_liquidity(&self) -> Result<TransactionRecord, PipelineError> {
        self.submit_liquidity(|token, amount| Submission::RemoveLiquidity { token, amount }).await
    }

    // -----------
    // | Helpers |
    // -----------

    /// Apply a change to the inputs and bump their revision
    async fn update<F: FnOnce(&mut SessionState)>(&self, apply: F) {
        let mut state = self.state.lock().await;
        apply(&mut state);
        state.revision += 1;
    }

    /// Submit the liquidity form as built by `build`
    async fn submit_liquidity<F>(&self, build: F) -> Result<TransactionRecord, PipelineError>
    where
        F: FnOnce(Option<Token>, U256) -> Submission,
    {
        let state = self.state.lock().await.clone();
        let submission = build(state.liquidity.token.clone(), state.liquidity.scaled_amount());

        let record = self.pipeline.submit(&state.submit_context(), submission).await?;
        self.update(|state| state.liquidity.amount.clear()).await;
        self.after_confirmation().await;
        Ok(record)
    }

    /// Recompute derived values after the forms were reset by a confirmed
    /// transaction, then re-read every displayed balance and reserve once
    async fn after_confirmation(&self) {
        self.recompute().await;
        self.readers.refresh_watched().await;
    }

    /// Bring the quote and the displayed reads up to date with the inputs
    ///
    /// Each snapshot carries the revision it was taken at, so a slower
    /// recomputation of older inputs cannot overwrite a newer one
    async fn recompute(&self) {
        let state = self.state.lock().await.clone();

        let added = self.readers.watch(state.revision, state.watched_keys()).await;
        let swap = &state.swap;
        let quote = self.quotes.refresh(
            state.revision,
            state.exchange,
            swap.token_in.as_ref(),
            swap.token_out.as_ref(),
            swap.scaled_amount_in(),
        );
        futures::join!(self.readers.refresh(&added), quote);
    }
}
