//! Error types for the swap client

use swap_client_api::{transaction::TransactionKind, ChainId};

use crate::{exchange::error::ExchangeError, pipeline::readiness::NotReady};

/// An error setting up or resolving client state
#[derive(Debug, Clone, thiserror::Error)]
pub enum SwapClientError {
    /// Invalid or missing configuration
    #[error("configuration error: {0}")]
    Config(String),
    /// No token in the catalog is deployed on the chain
    #[error("unsupported network: no tokens deployed on chain {0}")]
    UnsupportedNetwork(ChainId),
    /// An error from the exchange backend
    #[error("exchange error: {0}")]
    Exchange(#[from] ExchangeError),
}

impl SwapClientError {
    /// Create a new configuration error
    #[allow(clippy::needless_pass_by_value)]
    pub fn config<T: ToString>(e: T) -> Self {
        SwapClientError::Config(e.to_string())
    }
}

/// An error returned by a transaction pipeline invocation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// The submission was incomplete; nothing was sent
    #[error("not ready: {0}")]
    NotReady(NotReady),
    /// Another submission is still in flight; nothing was sent
    #[error("a transaction is already in flight")]
    InFlight,
    /// A contract call failed
    #[error("{kind} failed: {error}")]
    Exchange {
        /// The call that failed
        kind: TransactionKind,
        /// The underlying failure
        error: ExchangeError,
    },
}

impl PipelineError {
    /// Create an error for a failed contract call
    pub fn exchange(kind: TransactionKind, error: ExchangeError) -> Self {
        PipelineError::Exchange { kind, error }
    }
}
