//! The client core of a constant-exchange DEX: token catalog, quotes,
//! slippage bounds, and the approve-then-submit transaction pipeline
//!
//! A UI shell embeds a [`Session`] per user, drives it through its setters,
//! renders its views, and drains its notification channel
#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]
#![deny(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod exchange;
pub mod notifier;
pub mod pipeline;
pub mod quote;
pub mod readers;
pub mod session;
mod supersede;

pub use config::SwapClientConfig;
pub use error::{PipelineError, SwapClientError};
pub use exchange::{error::ExchangeError, rpc::RpcExchange, ExchangeBackend};
pub use session::{LiquidityView, Session, SwapView};
