//! Records of transactions submitted by the pipeline

use std::fmt::Display;

use alloy_primitives::TxHash;
use serde::{Deserialize, Serialize};

/// The contract call a transaction performs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionKind {
    /// An ERC-20 allowance approval for the exchange
    Approve,
    /// A swap on the exchange
    Swap,
    /// A liquidity deposit
    AddLiquidity,
    /// A liquidity withdrawal
    RemoveLiquidity,
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Approve => write!(f, "approve"),
            TransactionKind::Swap => write!(f, "swap"),
            TransactionKind::AddLiquidity => write!(f, "add-liquidity"),
            TransactionKind::RemoveLiquidity => write!(f, "remove-liquidity"),
        }
    }
}

/// The lifecycle of a submitted transaction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionStatus {
    /// Handed to the wallet, no hash yet
    Pending,
    /// Broadcast, waiting for a receipt
    Confirming,
    /// Included and successful
    Confirmed,
    /// Rejected, reverted, or lost to a network error
    Failed,
}

impl TransactionStatus {
    /// Whether the status can no longer change
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Confirmed | TransactionStatus::Failed)
    }
}

/// The transaction currently tracked by a pipeline invocation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// The call the transaction performs
    pub kind: TransactionKind,
    /// The hash, once the wallet has broadcast the transaction
    pub hash: Option<TxHash>,
    /// The current status
    pub status: TransactionStatus,
}

impl TransactionRecord {
    /// A record for a call handed to the wallet
    pub fn pending(kind: TransactionKind) -> Self {
        Self { kind, hash: None, status: TransactionStatus::Pending }
    }
}
