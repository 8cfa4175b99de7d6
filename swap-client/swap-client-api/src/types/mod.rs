//! API types for the swap client

pub mod amount;
pub mod intent;
pub mod notification;
pub mod quote;
pub mod slippage;
pub mod token;
pub mod transaction;

/// A numeric EVM chain identifier
pub type ChainId = u64;
