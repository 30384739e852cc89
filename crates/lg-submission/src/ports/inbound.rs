//! Driving Ports (API - Inbound)

use crate::domain::{SubmissionResult, TransactionRequest};
use crate::error::GatewayResult;
use async_trait::async_trait;

/// Primary submission API.
///
/// ## Outcomes
///
/// | Path | Returned |
/// |------|----------|
/// | Unknown target, scope violation, identity failure | `Err` |
/// | Bad endorsement verdict | `Err(ProposalRejected)` |
/// | Ordered (any order/commit outcome) | `Ok(SubmissionResult)` |
#[async_trait]
pub trait SubmissionApi: Send + Sync {
    /// Endorse, order and confirm one transaction with the configured
    /// commit timeout.
    async fn submit_transaction(
        &self,
        request: TransactionRequest,
    ) -> GatewayResult<SubmissionResult>;

    /// Evaluate a read-only operation and return the first successful
    /// payload. Nothing is ordered.
    async fn query(&self, request: TransactionRequest) -> GatewayResult<Vec<u8>>;

    /// Submit many transactions concurrently with the batch commit timeout.
    ///
    /// Results are returned in request order.
    async fn submit_batch(
        &self,
        requests: Vec<TransactionRequest>,
    ) -> Vec<GatewayResult<SubmissionResult>>;
}
