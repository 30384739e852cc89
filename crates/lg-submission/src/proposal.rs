//! # Proposal Coordinator
//!
//! Sends one proposal to every endorsing target in parallel, waits for all
//! of them, then applies the endorsement policy.
//!
//! ```text
//! targets ──→ [send_proposal ∥ send_proposal ∥ ...] ──→ Vec<Endorsement>
//!                 (each bounded by proposal_timeout)          │
//!                                                    EndorsementPolicy
//!                                                   ┌─────────┴─────────┐
//!                                                 Good                 Bad
//!                                            ProposalEnvelope   ProposalRejected
//! ```

use crate::domain::{
    Endorsement, EndorsementPolicy, Proposal, ProposalEnvelope, ProposalOutcome, ResolvedTarget,
    Verdict,
};
use crate::error::{GatewayResult, SubmissionError};
use crate::ports::outbound::LedgerChannel;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Drives the endorsement phase over a [`LedgerChannel`].
pub struct ProposalCoordinator<L: LedgerChannel + ?Sized> {
    ledger: Arc<L>,
    policy: EndorsementPolicy,
    proposal_timeout: Duration,
}

impl<L: LedgerChannel + ?Sized> ProposalCoordinator<L> {
    pub fn new(ledger: Arc<L>, policy: EndorsementPolicy, proposal_timeout: Duration) -> Self {
        Self {
            ledger,
            policy,
            proposal_timeout,
        }
    }

    pub fn policy(&self) -> EndorsementPolicy {
        self.policy
    }

    /// Collect every target's answer, in target order.
    ///
    /// Never fails: transport errors and timeouts become
    /// [`Endorsement::Failed`].
    pub async fn collect(&self, proposal: &Proposal, targets: &[ResolvedTarget]) -> Vec<Endorsement> {
        let calls = targets.iter().map(|target| async move {
            let peer = target.peer.clone();
            match tokio::time::timeout(
                self.proposal_timeout,
                self.ledger.send_proposal(target, proposal),
            )
            .await
            {
                Ok(Ok(response)) => {
                    debug!(
                        tx_id = %proposal.tx_id.short(),
                        %peer,
                        status = response.status,
                        "Proposal response"
                    );
                    Endorsement::Responded { peer, response }
                }
                Ok(Err(error)) => {
                    warn!(tx_id = %proposal.tx_id.short(), %peer, %error, "Proposal failed");
                    Endorsement::Failed {
                        peer,
                        reason: error.to_string(),
                    }
                }
                Err(_) => {
                    warn!(
                        tx_id = %proposal.tx_id.short(),
                        %peer,
                        timeout_ms = self.proposal_timeout.as_millis() as u64,
                        "Proposal timed out"
                    );
                    Endorsement::Failed {
                        peer,
                        reason: format!(
                            "no response within {} ms",
                            self.proposal_timeout.as_millis()
                        ),
                    }
                }
            }
        });

        join_all(calls).await
    }

    /// Run the endorsement phase.
    ///
    /// Returns the envelope to order on a good verdict, otherwise
    /// [`SubmissionError::ProposalRejected`] carrying every response.
    pub async fn propose(
        &self,
        proposal: Proposal,
        targets: &[ResolvedTarget],
    ) -> GatewayResult<ProposalOutcome> {
        let responses = self.collect(&proposal, targets).await;

        match self.policy.evaluate(&responses) {
            Verdict::Good => {
                info!(
                    tx_id = %proposal.tx_id.short(),
                    policy = %self.policy,
                    endorsements = responses.len(),
                    "Transaction proposal was good"
                );
                let endorsements = responses
                    .iter()
                    .filter_map(|endorsement| match endorsement {
                        Endorsement::Responded { peer, response } if response.is_success() => {
                            Some((peer.clone(), response.clone()))
                        }
                        _ => None,
                    })
                    .collect();
                Ok(ProposalOutcome {
                    responses,
                    envelope: ProposalEnvelope {
                        proposal,
                        endorsements,
                    },
                })
            }
            Verdict::Bad { reason } => {
                warn!(
                    tx_id = %proposal.tx_id.short(),
                    policy = %self.policy,
                    %reason,
                    "Transaction proposal was bad"
                );
                Err(SubmissionError::ProposalRejected {
                    tx_id: proposal.tx_id,
                    reason,
                    responses,
                })
            }
        }
    }
}
