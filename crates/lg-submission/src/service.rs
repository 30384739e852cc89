//! # Submission Service
//!
//! Top-level state machine of one submission:
//!
//! ```text
//! BUILDING ──resolve/issue──→ PROPOSING ──bad verdict──→ REJECTED (Err)
//!                                 │
//!                            good verdict
//!                                 ↓
//!                 subscribe commit watch (before ordering)
//!                                 ↓
//!         ORDERING: submit_to_order ∥ watch.wait(timeout)   (joined)
//!                                 ↓
//!               SubmissionResult { order_outcome, commit_outcome }
//! ```
//!
//! Once the envelope is handed to ordering the submission always resolves
//! with a result: ordering transport errors and watcher task failures are
//! folded into the outcomes.

use crate::config::SubmissionConfig;
use crate::domain::{
    CommitOutcome, OrderOutcome, Proposal, SubmissionResult, TargetPurpose, TransactionRequest,
};
use crate::error::{GatewayResult, SubmissionError};
use crate::identity::TransactionIdIssuer;
use crate::metrics;
use crate::ports::inbound::SubmissionApi;
use crate::ports::outbound::{LedgerChannel, NetworkConfig};
use crate::proposal::ProposalCoordinator;
use crate::resolver::TargetResolver;
use crate::watcher::CommitWatcher;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use shared_bus::EventHub;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, field, info, info_span, warn, Instrument, Span};

/// Submission pipeline over a ledger transport, an event hub and a network
/// directory.
pub struct SubmissionService<L, H, N>
where
    L: LedgerChannel + 'static,
    H: EventHub + 'static,
    N: NetworkConfig,
{
    config: SubmissionConfig,
    ledger: Arc<L>,
    resolver: TargetResolver<N>,
    issuer: TransactionIdIssuer,
    coordinator: ProposalCoordinator<L>,
    watcher: CommitWatcher<H>,
}

impl<L, H, N> SubmissionService<L, H, N>
where
    L: LedgerChannel + 'static,
    H: EventHub + 'static,
    N: NetworkConfig,
{
    /// Create a new submission service
    pub fn new(config: SubmissionConfig, ledger: Arc<L>, hub: Arc<H>, network: Arc<N>) -> Self {
        let coordinator = ProposalCoordinator::new(
            Arc::clone(&ledger),
            config.endorsement_policy,
            config.proposal_timeout,
        );
        Self {
            config,
            ledger,
            resolver: TargetResolver::new(network),
            issuer: TransactionIdIssuer::new(),
            coordinator,
            watcher: CommitWatcher::new(hub),
        }
    }

    pub fn config(&self) -> &SubmissionConfig {
        &self.config
    }

    /// Transaction ids issued so far, including rejected attempts.
    pub fn transactions_issued(&self) -> u64 {
        self.issuer.issued()
    }

    /// Submit with an explicit commit timeout.
    pub async fn submit_with_timeout(
        &self,
        request: TransactionRequest,
        commit_timeout: Duration,
    ) -> GatewayResult<SubmissionResult> {
        let started = Instant::now();
        let span = info_span!(
            "submit",
            tx_id = field::Empty,
            channel = %request.channel(),
            operation = %request.operation()
        );

        let result = self
            .drive(request, commit_timeout, &span)
            .instrument(span.clone())
            .await;

        let elapsed = started.elapsed().as_secs_f64();
        match &result {
            Ok(submission) => metrics::record_submission(submission.label(), elapsed),
            Err(error) => metrics::record_submission(error.label(), elapsed),
        }
        result
    }

    async fn drive(
        &self,
        request: TransactionRequest,
        commit_timeout: Duration,
        span: &Span,
    ) -> GatewayResult<SubmissionResult> {
        let caller = request.identity().org.clone();

        // BUILDING: everything that can fail without touching the network
        let targets = self
            .resolver
            .resolve(&caller, request.targets(), TargetPurpose::Proposal)?;
        let event_target = self.resolver.event_target(&caller, &targets)?;
        let orderer = self.resolver.orderer(&caller)?;
        let tx_id = self.issuer.issue(request.identity())?;
        span.record("tx_id", tx_id.short());
        debug!(
            targets = targets.len(),
            event_peer = %event_target.peer,
            orderer = %orderer,
            "Assigned transaction {}",
            tx_id
        );

        // PROPOSING
        let proposal = Proposal::for_request(&request, tx_id.clone());
        let outcome = match self.coordinator.propose(proposal, &targets).await {
            Ok(outcome) => outcome,
            Err(error) => {
                if matches!(error, SubmissionError::ProposalRejected { .. }) {
                    metrics::record_proposal_rejected();
                }
                return Err(error);
            }
        };

        // ORDERING ∥ WATCHING
        let watch = self
            .watcher
            .subscribe(tx_id.clone(), &event_target.endpoint)
            .await;
        let watch_task = tokio::spawn(watch.wait(commit_timeout).in_current_span());

        let (ordered, watched) = tokio::join!(
            self.ledger.submit_to_order(&orderer, &outcome.envelope),
            watch_task
        );

        let order_outcome = match ordered {
            Ok(outcome) => outcome,
            Err(error) => {
                error!(%orderer, %error, "Failed to send transaction to the orderer");
                OrderOutcome::Failure {
                    reason: error.to_string(),
                }
            }
        };
        if let OrderOutcome::Failure { reason } = &order_outcome {
            warn!(%reason, "Ordering service did not accept the transaction");
            metrics::record_order_failure();
        }

        let commit_outcome = match watched {
            Ok(outcome) => outcome,
            Err(join_error) => {
                error!(error = %join_error, "Commit watcher task failed");
                CommitOutcome::Unreachable(format!("commit watcher failed: {join_error}"))
            }
        };
        metrics::record_commit_outcome(commit_outcome.label());

        info!(
            order = %order_outcome,
            commit = %commit_outcome,
            "Submission finished"
        );

        Ok(SubmissionResult {
            tx_id,
            order_outcome,
            commit_outcome,
        })
    }

    async fn evaluate(&self, request: TransactionRequest) -> GatewayResult<Vec<u8>> {
        let caller = request.identity().org.clone();
        let targets = self
            .resolver
            .resolve(&caller, request.targets(), TargetPurpose::Proposal)?;
        let tx_id = self.issuer.issue(request.identity())?;
        let proposal = Proposal::for_request(&request, tx_id.clone());

        let responses = self.coordinator.collect(&proposal, &targets).await;
        let payload = responses
            .iter()
            .filter_map(|endorsement| endorsement.response())
            .find(|response| response.is_success())
            .map(|response| response.payload.clone());

        match payload {
            Some(payload) => {
                debug!(
                    tx_id = %tx_id.short(),
                    operation = %request.operation(),
                    bytes = payload.len(),
                    "Query answered"
                );
                Ok(payload)
            }
            None => {
                warn!(tx_id = %tx_id.short(), operation = %request.operation(), "Query failed");
                Err(SubmissionError::QueryFailed { tx_id, responses })
            }
        }
    }
}

#[async_trait]
impl<L, H, N> SubmissionApi for SubmissionService<L, H, N>
where
    L: LedgerChannel + 'static,
    H: EventHub + 'static,
    N: NetworkConfig,
{
    async fn submit_transaction(
        &self,
        request: TransactionRequest,
    ) -> GatewayResult<SubmissionResult> {
        self.submit_with_timeout(request, self.config.commit_timeout)
            .await
    }

    async fn query(&self, request: TransactionRequest) -> GatewayResult<Vec<u8>> {
        self.evaluate(request).await
    }

    async fn submit_batch(
        &self,
        requests: Vec<TransactionRequest>,
    ) -> Vec<GatewayResult<SubmissionResult>> {
        let total = requests.len();
        let timeout = self.config.batch_commit_timeout;

        let results: Vec<_> = stream::iter(requests)
            .map(|request| self.submit_with_timeout(request, timeout))
            .buffered(self.config.max_in_flight)
            .collect()
            .await;

        let committed = results
            .iter()
            .filter(|result| matches!(result, Ok(submission) if submission.is_committed()))
            .count();
        info!(total, committed, "Batch finished");
        results
    }
}
