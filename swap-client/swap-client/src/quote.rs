//! Resolves quotes for the swap form
//!
//! A quote is requested whenever the form's inputs change and is only ever
//! applied if no newer request was issued in the meantime

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use serde::Serialize;
use swap_client_api::{
    quote::{Quote, QuoteParams},
    token::Token,
};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::{exchange::ExchangeBackend, supersede::Supersession};

/// The inputs of a quote request
#[derive(Clone, Debug, PartialEq, Eq)]
struct QuoteRequest {
    /// The exchange asked to price the swap
    exchange: Address,
    /// The token being sold
    token_in: Token,
    /// The token being bought
    token_out: Token,
    /// The scaled amount sold
    amount_in: U256,
}

impl QuoteRequest {
    /// The arguments passed to the pricing function
    fn params(&self) -> QuoteParams {
        QuoteParams {
            token_in: self.token_in.address,
            token_out: self.token_out.address,
            amount_in: self.amount_in,
        }
    }

    /// Whether a quote is fresh and answers this request
    fn answered_by(&self, quote: &Quote) -> bool {
        quote.is_fresh_for(self.exchange, &self.token_in, &self.token_out, self.amount_in)
    }

    /// The quote answering this request
    fn into_quote(self, amount_out: U256) -> Quote {
        Quote {
            exchange: self.exchange,
            token_in: self.token_in,
            token_out: self.token_out,
            amount_in: self.amount_in,
            amount_out,
            fresh: true,
        }
    }
}

/// A snapshot of the resolver for rendering
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteView {
    /// The latest quote, possibly stale while its replacement is fetched
    pub quote: Option<Quote>,
    /// Whether a request is in flight
    pub fetching: bool,
}

/// The mutable state of the resolver
#[derive(Debug, Default)]
struct QuoteState {
    /// The outstanding request, if any
    requests: Supersession<QuoteRequest>,
    /// The latest applied quote
    quote: Option<Quote>,
    /// The revision of the newest inputs seen
    revision: u64,
}

impl QuoteState {
    /// Snapshot the state
    fn view(&self) -> QuoteView {
        QuoteView { quote: self.quote.clone(), fetching: self.requests.pending().is_some() }
    }

    /// Drop the quote and supersede any request in flight
    fn clear(&mut self) {
        self.requests.cancel();
        self.quote = None;
    }
}

/// Fetches quotes from the exchange's pricing function
pub struct QuoteResolver<B> {
    /// The exchange backend
    backend: Arc<B>,
    /// The resolver state; never held across a backend call
    state: Mutex<QuoteState>,
}

impl<B: ExchangeBackend> QuoteResolver<B> {
    /// Constructor
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend, state: Mutex::default() }
    }

    /// Bring the quote up to date with the form's inputs at `revision`
    ///
    /// Inputs older than the newest revision seen are ignored. Clears the
    /// quote when the inputs cannot be priced: a missing or repeated token, a
    /// zero amount, or no deployed exchange. Returns once the request issued
    /// for these inputs, if any, has been answered
    #[instrument(skip_all, fields(revision = revision, amount_in = %amount_in))]
    pub async fn refresh(
        &self,
        revision: u64,
        exchange: Address,
        token_in: Option<&Token>,
        token_out: Option<&Token>,
        amount_in: U256,
    ) -> QuoteView {
        let (request, ticket) = {
            let mut state = self.state.lock().await;
            if revision < state.revision {
                debug!("ignoring inputs older than revision {}", state.revision);
                return state.view();
            }
            state.revision = revision;

            let (Some(token_in), Some(token_out)) = (token_in, token_out) else {
                state.clear();
                return state.view();
            };
            if amount_in.is_zero() || token_in == token_out || exchange == Address::ZERO {
                state.clear();
                return state.view();
            }

            let request = QuoteRequest {
                exchange,
                token_in: token_in.clone(),
                token_out: token_out.clone(),
                amount_in,
            };
            if state.quote.as_ref().is_some_and(|q| request.answered_by(q)) {
                return state.view();
            }
            if state.requests.pending() == Some(&request) {
                return state.view();
            }

            if let Some(quote) = state.quote.as_mut() {
                quote.fresh = false;
            }
            let ticket = state.requests.begin(request.clone());
            (request, ticket)
        };

        let result = self.backend.get_amount_out(exchange, request.params()).await;

        let mut state = self.state.lock().await;
        if !state.requests.complete(&ticket) {
            debug!("discarding quote for superseded inputs");
            return state.view();
        }

        match result {
            Ok(amount_out) => state.quote = Some(request.into_quote(amount_out)),
            Err(e) => {
                warn!("error fetching quote: {e}");
                state.quote = None;
            },
        }

        state.view()
    }

    /// Snapshot the resolver
    pub async fn view(&self) -> QuoteView {
        self.state.lock().await.view()
    }

    /// The latest quote if it is fresh for the given inputs
    pub async fn fresh_quote(
        &self,
        exchange: Address,
        token_in: Option<&Token>,
        token_out: Option<&Token>,
        amount_in: U256,
    ) -> Option<Quote> {
        let (token_in, token_out) = (token_in?, token_out?);
        let state = self.state.lock().await;
        state
            .quote
            .as_ref()
            .filter(|q| q.is_fresh_for(exchange, token_in, token_out, amount_in))
            .cloned()
    }

    /// Drop the quote and supersede any request in flight
    pub async fn clear(&self) -> QuoteView {
        let mut state = self.state.lock().await;
        state.clear();
        state.view()
    }
}
