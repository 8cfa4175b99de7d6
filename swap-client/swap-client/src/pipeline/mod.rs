//! The transaction pipeline: approve, submit, and confirm a state-mutating
//! exchange call
//!
//! One invocation runs at a time. Progress is exposed through the pipeline
//! status and user-facing outcomes through the notifier

pub mod readiness;

use std::sync::Arc;

use alloy_primitives::{Address, TxHash, U256};
use serde::Serialize;
use swap_client_api::{
    intent::{LiquidityIntent, SwapIntent},
    notification::Notification,
    token::Token,
    transaction::{TransactionKind, TransactionRecord, TransactionStatus},
};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use self::readiness::{SubmitContext, Submission};
use crate::{
    error::PipelineError,
    exchange::{error::ExchangeError, ExchangeBackend},
    notifier::Notifier,
};

/// The title of the notification sent once the primary call is broadcast
const SUBMITTED_TITLE: &str = "Transaction submitted";
/// The description of the notification sent once the primary call is broadcast
const SUBMITTED_DESCRIPTION: &str = "Waiting for confirmation...";

// ---------
// | Types |
// ---------

/// The progress of the pipeline
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineStatus {
    /// Nothing submitted yet
    #[default]
    Idle,
    /// Waiting for the allowance approval
    Approving,
    /// Waiting for the wallet to accept the primary call
    AwaitingSubmit,
    /// Waiting for the primary call's receipt
    Confirming,
    /// The primary call succeeded
    Confirmed,
    /// A step failed
    Failed,
}

impl PipelineStatus {
    /// Whether a submission is in progress
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            PipelineStatus::Approving | PipelineStatus::AwaitingSubmit | PipelineStatus::Confirming
        )
    }
}

/// A validated exchange call
#[derive(Clone, Debug)]
pub enum PipelineRequest {
    /// A swap
    Swap(SwapIntent),
    /// A liquidity deposit
    AddLiquidity(LiquidityIntent),
    /// A liquidity withdrawal
    RemoveLiquidity(LiquidityIntent),
}

impl PipelineRequest {
    /// The kind of the primary call
    pub fn kind(&self) -> TransactionKind {
        match self {
            PipelineRequest::Swap(_) => TransactionKind::Swap,
            PipelineRequest::AddLiquidity(_) => TransactionKind::AddLiquidity,
            PipelineRequest::RemoveLiquidity(_) => TransactionKind::RemoveLiquidity,
        }
    }

    /// The token and amount the exchange must be approved to move, if any
    pub fn allowance(&self) -> Option<(&Token, U256)> {
        match self {
            PipelineRequest::Swap(intent) => Some((intent.token_in(), intent.amount_in())),
            PipelineRequest::AddLiquidity(intent) => Some((&intent.token, intent.amount)),
            PipelineRequest::RemoveLiquidity(_) => None,
        }
    }

    /// The notification sent when the call is confirmed
    fn success_notification(&self) -> Notification {
        match self {
            PipelineRequest::Swap(intent) => Notification::info(
                "Swap successful!",
                Some(format!("Swapped {}", intent.describe())),
            ),
            PipelineRequest::AddLiquidity(_) => Notification::info("Liquidity added", None),
            PipelineRequest::RemoveLiquidity(_) => Notification::info("Liquidity removed", None),
        }
    }

    /// The title of the notification sent when a step fails
    fn failure_title(&self) -> &'static str {
        match self {
            PipelineRequest::Swap(_) => "Swap failed",
            PipelineRequest::AddLiquidity(_) => "Add liquidity failed",
            PipelineRequest::RemoveLiquidity(_) => "Remove liquidity failed",
        }
    }
}

/// The mutable state of the pipeline
#[derive(Debug, Default)]
struct PipelineState {
    /// The current status
    status: PipelineStatus,
    /// The transaction currently or last tracked
    record: Option<TransactionRecord>,
}

// ------------
// | Pipeline |
// ------------

/// Runs state-mutating exchange calls
pub struct TransactionPipeline<B> {
    /// The exchange backend
    backend: Arc<B>,
    /// The channel outcomes are reported on
    notifier: Notifier,
    /// Whether to wait for an approval's receipt before the primary call
    await_approval_receipt: bool,
    /// The pipeline state; never held across a backend call
    state: Mutex<PipelineState>,
}

impl<B: ExchangeBackend> TransactionPipeline<B> {
    /// Constructor
    pub fn new(backend: Arc<B>, notifier: Notifier, await_approval_receipt: bool) -> Self {
        Self { backend, notifier, await_approval_receipt, state: Mutex::default() }
    }

    /// The current status
    pub async fn status(&self) -> PipelineStatus {
        self.state.lock().await.status
    }

    /// The transaction currently or last tracked
    pub async fn record(&self) -> Option<TransactionRecord> {
        self.state.lock().await.record.clone()
    }

    /// Validate a submission and run it to completion
    ///
    /// Returns the confirmed record of the primary call. Nothing is sent if
    /// the submission is incomplete or another one is in flight
    #[instrument(skip_all)]
    pub async fn submit(
        &self,
        ctx: &SubmitContext,
        submission: Submission,
    ) -> Result<TransactionRecord, PipelineError> {
        let request = {
            let mut state = self.state.lock().await;
            if state.status.is_in_flight() {
                info!("rejecting submission, status is {:?}", state.status);
                self.notifier.notify(Notification::info(
                    "Transaction in progress",
                    Some("Wait for the current transaction to finish".to_string()),
                ));
                return Err(PipelineError::InFlight);
            }

            let request = match submission.validate(ctx) {
                Ok(request) => request,
                Err(reason) => {
                    self.notifier.notify(reason.notification());
                    return Err(PipelineError::NotReady(reason));
                },
            };

            // Claim the pipeline before releasing the lock
            state.status = match request.allowance() {
                Some(_) => PipelineStatus::Approving,
                None => PipelineStatus::AwaitingSubmit,
            };
            state.record = None;
            request
        };

        match self.run(ctx.exchange, &request).await {
            Ok(record) => {
                self.set_status(PipelineStatus::Confirmed).await;
                self.notifier.notify(request.success_notification());
                Ok(record)
            },
            Err(e) => {
                warn!("{e}");
                let description = match &e {
                    PipelineError::Exchange { error, .. } => error.short_message(),
                    other => other.to_string(),
                };
                self.set_status(PipelineStatus::Failed).await;
                self.notifier
                    .notify(Notification::destructive(request.failure_title(), Some(description)));
                Err(e)
            },
        }
    }

    /// Approve if needed, then submit and confirm the primary call
    async fn run(
        &self,
        exchange: Address,
        request: &PipelineRequest,
    ) -> Result<TransactionRecord, PipelineError> {
        if let Some((token, amount)) = request.allowance() {
            self.approve(exchange, token.address, amount).await?;
            self.set_status(PipelineStatus::AwaitingSubmit).await;
        }

        let kind = request.kind();
        self.track(TransactionRecord::pending(kind)).await;
        let submitted = match request {
            PipelineRequest::Swap(intent) => self.backend.swap(exchange, intent).await,
            PipelineRequest::AddLiquidity(intent) => {
                self.backend.add_liquidity(exchange, intent).await
            },
            PipelineRequest::RemoveLiquidity(intent) => {
                self.backend.remove_liquidity(exchange, intent).await
            },
        };
        let tx_hash = self.check(kind, submitted).await?;

        info!("{kind} submitted: {tx_hash:#x}");
        self.set_status(PipelineStatus::Confirming).await;
        self.track_hash(kind, tx_hash, TransactionStatus::Confirming).await;
        self.notifier.notify(Notification::info(
            SUBMITTED_TITLE,
            Some(SUBMITTED_DESCRIPTION.to_string()),
        ));

        let confirmed = self.backend.wait_for_confirmation(tx_hash).await;
        self.check(kind, confirmed).await?;

        info!("{kind} confirmed: {tx_hash:#x}");
        let record = TransactionRecord {
            kind,
            hash: Some(tx_hash),
            status: TransactionStatus::Confirmed,
        };
        self.track(record.clone()).await;
        Ok(record)
    }

    /// Approve the exchange to move exactly `amount` of `token`
    async fn approve(
        &self,
        exchange: Address,
        token: Address,
        amount: U256,
    ) -> Result<(), PipelineError> {
        let kind = TransactionKind::Approve;
        self.track(TransactionRecord::pending(kind)).await;

        let approved = self.backend.approve(token, exchange, amount).await;
        let tx_hash = self.check(kind, approved).await?;
        info!("approval submitted: {tx_hash:#x}");

        if !self.await_approval_receipt {
            self.track_hash(kind, tx_hash, TransactionStatus::Confirmed).await;
            return Ok(());
        }

        self.track_hash(kind, tx_hash, TransactionStatus::Confirming).await;
        let confirmed = self.backend.wait_for_confirmation(tx_hash).await;
        self.check(kind, confirmed).await?;
        self.track_hash(kind, tx_hash, TransactionStatus::Confirmed).await;
        Ok(())
    }

    // -----------
    // | Helpers |
    // -----------

    /// Mark the tracked record failed if a call failed
    async fn check<T>(
        &self,
        kind: TransactionKind,
        result: Result<T, ExchangeError>,
    ) -> Result<T, PipelineError> {
        match result {
            Ok(value) => Ok(value),
            Err(error) => {
                if let Some(record) = self.state.lock().await.record.as_mut() {
                    record.status = TransactionStatus::Failed;
                }
                Err(PipelineError::exchange(kind, error))
            },
        }
    }

    /// Update the status
    async fn set_status(&self, status: PipelineStatus) {
        self.state.lock().await.status = status;
    }

    /// Replace the tracked record
    async fn track(&self, record: TransactionRecord) {
        self.state.lock().await.record = Some(record);
    }

    /// Record a hash and status on the tracked record
    async fn track_hash(&self, kind: TransactionKind, hash: TxHash, status: TransactionStatus) {
        self.track(TransactionRecord { kind, hash: Some(hash), status }).await;
    }
}
