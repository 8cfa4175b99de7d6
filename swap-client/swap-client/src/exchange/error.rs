//! Error types for the exchange backend

use alloy::{
    contract::Error as ContractError,
    providers::PendingTransactionError,
    transports::{RpcError, TransportError},
};
use alloy_primitives::Bytes;
use alloy_sol_types::{decode_revert_reason, Revert, SolError};

/// The JSON-RPC error code wallets use when the user declines a request
/// (EIP-1193)
const USER_REJECTED_CODE: i64 = 4001;
/// The JSON-RPC error code nodes use for a reverted call
const EXECUTION_REVERTED_CODE: i64 = 3;
/// The message shown when a failure carries no usable detail
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred";
/// The message shown when the wallet declines without detail
const GENERIC_REJECTION_MESSAGE: &str = "User rejected the request";

/// An error returned by the exchange backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExchangeError {
    /// The user declined to sign in their wallet
    #[error("wallet rejected: {0}")]
    WalletRejected(String),
    /// The contract rejected the call, e.g. insufficient reserve or a
    /// violated minimum output
    #[error("call reverted: {0}")]
    CallReverted(String),
    /// The node or the network failed
    #[error("rpc error: {0}")]
    Rpc(String),
    /// A response could not be decoded
    #[error("parse error: {0}")]
    Parse(String),
}

#[allow(clippy::needless_pass_by_value)]
impl ExchangeError {
    /// Create a new wallet rejection error
    pub fn wallet_rejected<T: ToString>(e: T) -> Self {
        ExchangeError::WalletRejected(e.to_string())
    }

    /// Create a new revert error
    pub fn call_reverted<T: ToString>(e: T) -> Self {
        ExchangeError::CallReverted(e.to_string())
    }

    /// Create a new rpc error
    pub fn rpc<T: ToString>(e: T) -> Self {
        ExchangeError::Rpc(e.to_string())
    }

    /// Create a new parse error
    pub fn parse<T: ToString>(e: T) -> Self {
        ExchangeError::Parse(e.to_string())
    }

    /// The most specific message available, suitable for showing to the user
    pub fn short_message(&self) -> String {
        let (msg, fallback) = match self {
            ExchangeError::WalletRejected(msg) => (msg, GENERIC_REJECTION_MESSAGE),
            ExchangeError::CallReverted(msg)
            | ExchangeError::Rpc(msg)
            | ExchangeError::Parse(msg) => (msg, GENERIC_FAILURE_MESSAGE),
        };

        if msg.trim().is_empty() {
            fallback.to_string()
        } else {
            msg.clone()
        }
    }

    /// Classify a JSON-RPC error response
    ///
    /// Wallets signal a declined signature with code 4001, though some only
    /// say so in the message. Reverts carry code 3 and, usually, the ABI
    /// encoded revert data
    pub fn from_error_response(code: i64, message: &str, revert_data: Option<&Bytes>) -> Self {
        let lowered = message.to_lowercase();
        if code == USER_REJECTED_CODE
            || lowered.contains("user rejected")
            || lowered.contains("user denied")
        {
            return ExchangeError::wallet_rejected(message);
        }

        if code == EXECUTION_REVERTED_CODE || lowered.contains("execution reverted") {
            let reason = revert_data.and_then(|data| revert_reason(data));
            return ExchangeError::call_reverted(reason.unwrap_or_else(|| message.to_string()));
        }

        ExchangeError::rpc(message)
    }

    /// Classify a transport error
    pub fn from_transport(e: TransportError) -> Self {
        match e {
            RpcError::ErrorResp(payload) => {
                let revert_data = payload.as_revert_data();
                Self::from_error_response(payload.code, &payload.message, revert_data.as_ref())
            },
            other => ExchangeError::rpc(other),
        }
    }
}

/// The message of an `Error(string)` revert, or the rendered form of a panic
/// or custom error
fn revert_reason(data: &[u8]) -> Option<String> {
    match Revert::abi_decode(data) {
        Ok(revert) => Some(revert.reason),
        Err(_) => decode_revert_reason(data),
    }
}

impl From<ContractError> for ExchangeError {
    fn from(e: ContractError) -> Self {
        match e {
            ContractError::TransportError(e) => ExchangeError::from_transport(e),
            ContractError::ZeroData(..) => {
                ExchangeError::call_reverted("contract returned no data; is it deployed?")
            },
            other => ExchangeError::parse(other),
        }
    }
}

impl From<PendingTransactionError> for ExchangeError {
    fn from(e: PendingTransactionError) -> Self {
        match e {
            PendingTransactionError::TransportError(e) => ExchangeError::from_transport(e),
            other => ExchangeError::rpc(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::hex;

    use super::*;

    /// A declined signature is recognized by code or by message
    #[test]
    fn test_wallet_rejection() {
        let err = ExchangeError::from_error_response(4001, "User rejected the request.", None);
        assert_eq!(err, ExchangeError::WalletRejected("User rejected the request.".to_string()));

        let err = ExchangeError::from_error_response(-32000, "MetaMask: User denied signature", None);
        assert!(matches!(err, ExchangeError::WalletRejected(_)));
    }

    /// The revert reason is decoded from `Error(string)` data when present
    #[test]
    fn test_revert_reason_decoding() {
        // Error("Insufficient output amount")
        let data = Bytes::from(hex!(
            "08c379a0"
            "0000000000000000000000000000000000000000000000000000000000000020"
            "000000000000000000000000000000000000000000000000000000000000001a"
            "496e73756666696369656e74206f757470757420616d6f756e74000000000000"
        ));
        let err = ExchangeError::from_error_response(3, "execution reverted", Some(&data));
        assert_eq!(err.short_message(), "Insufficient output amount");
    }

    /// Panics have no message of their own and are rendered with their code
    #[test]
    fn test_panic_reason_decoding() {
        // Panic(0x11), an arithmetic overflow
        let data = Bytes::from(hex!(
            "4e487b71"
            "0000000000000000000000000000000000000000000000000000000000000011"
        ));
        let err = ExchangeError::from_error_response(3, "execution reverted", Some(&data));
        let ExchangeError::CallReverted(msg) = err else { panic!("expected a revert") };
        assert!(msg.contains("panic"), "{msg}");
    }

    /// Without revert data the node's message is kept
    #[test]
    fn test_revert_without_data() {
        let err = ExchangeError::from_error_response(-32000, "execution reverted", None);
        assert_eq!(err, ExchangeError::CallReverted("execution reverted".to_string()));
    }

    /// Everything else is a network failure
    #[test]
    fn test_rpc_failure() {
        let err = ExchangeError::from_error_response(-32603, "header not found", None);
        assert_eq!(err, ExchangeError::Rpc("header not found".to_string()));
    }

    /// Empty messages fall back to generic text
    #[test]
    fn test_short_message_fallbacks() {
        assert_eq!(ExchangeError::rpc("").short_message(), GENERIC_FAILURE_MESSAGE);
        assert_eq!(ExchangeError::wallet_rejected(" ").short_message(), GENERIC_REJECTION_MESSAGE);
    }
}
