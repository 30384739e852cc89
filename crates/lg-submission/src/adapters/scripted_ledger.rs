//! Scripted Ledger Adapter
//!
//! `LedgerChannel` double whose endorser answers, ordering result and commit
//! verdict are scripted up front. Counts every call so tests can assert
//! that nothing was ordered after a bad proposal.

use crate::domain::{
    OrderOutcome, Proposal, ProposalEnvelope, ProposalResponse, ResolvedTarget,
};
use crate::error::LedgerError;
use crate::ports::outbound::LedgerChannel;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_bus::{CommitNotification, CommitPublisher, InMemoryEventHub};
use shared_types::{Endpoint, PeerName, ValidationCode};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Scripted behaviour of one endorser.
#[derive(Debug, Clone)]
pub enum PeerScript {
    Respond(ProposalResponse),
    /// Transport failure with the given text
    Fail(String),
    /// Answer after a delay
    Delayed(Duration, ProposalResponse),
}

#[derive(Debug, Clone)]
enum OrderScript {
    Outcome(OrderOutcome),
    Error(LedgerError),
}

#[derive(Clone)]
struct CommitScript {
    hub: InMemoryEventHub,
    endpoint: Endpoint,
    code: ValidationCode,
    delay: Duration,
}

/// In-memory scripted ledger.
pub struct ScriptedLedger {
    peers: RwLock<HashMap<PeerName, PeerScript>>,
    default_response: RwLock<ProposalResponse>,
    order: RwLock<OrderScript>,
    commit: RwLock<Option<CommitScript>>,
    proposal_calls: AtomicUsize,
    order_calls: AtomicUsize,
    ordered: RwLock<Vec<ProposalEnvelope>>,
    next_block: Arc<AtomicU64>,
}

impl Default for ScriptedLedger {
    fn default() -> Self {
        Self {
            peers: RwLock::new(HashMap::new()),
            default_response: RwLock::new(ProposalResponse::success(Vec::new())),
            order: RwLock::new(OrderScript::Outcome(OrderOutcome::Success)),
            commit: RwLock::new(None),
            proposal_calls: AtomicUsize::new(0),
            order_calls: AtomicUsize::new(0),
            ordered: RwLock::new(Vec::new()),
            next_block: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl ScriptedLedger {
    /// Every endorser answers 200, ordering succeeds, no commit is published.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer used by peers without their own script.
    pub fn script_default(&self, response: ProposalResponse) {
        *self.default_response.write() = response;
    }

    pub fn script_peer(&self, peer: impl Into<PeerName>, script: PeerScript) {
        self.peers.write().insert(peer.into(), script);
    }

    pub fn script_order(&self, outcome: OrderOutcome) {
        *self.order.write() = OrderScript::Outcome(outcome);
    }

    pub fn script_order_error(&self, error: LedgerError) {
        *self.order.write() = OrderScript::Error(error);
    }

    /// After a successful order, publish `code` for the transaction on
    /// `endpoint` once `delay` has passed.
    pub fn commit_through(
        &self,
        hub: InMemoryEventHub,
        endpoint: Endpoint,
        code: ValidationCode,
        delay: Duration,
    ) {
        *self.commit.write() = Some(CommitScript {
            hub,
            endpoint,
            code,
            delay,
        });
    }

    /// Stop publishing commit verdicts.
    pub fn withhold_commits(&self) {
        *self.commit.write() = None;
    }

    pub fn proposal_calls(&self) -> usize {
        self.proposal_calls.load(Ordering::SeqCst)
    }

    pub fn order_calls(&self) -> usize {
        self.order_calls.load(Ordering::SeqCst)
    }

    /// Envelopes received by the ordering side, in arrival order.
    pub fn ordered_envelopes(&self) -> Vec<ProposalEnvelope> {
        self.ordered.read().clone()
    }
}

#[async_trait]
impl LedgerChannel for ScriptedLedger {
    async fn send_proposal(
        &self,
        target: &ResolvedTarget,
        proposal: &Proposal,
    ) -> Result<ProposalResponse, LedgerError> {
        self.proposal_calls.fetch_add(1, Ordering::SeqCst);
        let script = self.peers.read().get(&target.peer).cloned();
        debug!(peer = %target.peer, tx_id = %proposal.tx_id.short(), "Scripted proposal");

        match script {
            None => Ok(self.default_response.read().clone()),
            Some(PeerScript::Respond(response)) => Ok(response),
            Some(PeerScript::Fail(reason)) => Err(LedgerError::Unavailable {
                endpoint: target.endpoint.url(),
                reason,
            }),
            Some(PeerScript::Delayed(delay, response)) => {
                tokio::time::sleep(delay).await;
                Ok(response)
            }
        }
    }

    async fn submit_to_order(
        &self,
        _orderer: &Endpoint,
        envelope: &ProposalEnvelope,
    ) -> Result<OrderOutcome, LedgerError> {
        self.order_calls.fetch_add(1, Ordering::SeqCst);
        self.ordered.write().push(envelope.clone());

        let outcome = match self.order.read().clone() {
            OrderScript::Outcome(outcome) => outcome,
            OrderScript::Error(error) => return Err(error),
        };

        let commit = self.commit.read().clone();
        if let (OrderOutcome::Success, Some(commit)) = (&outcome, commit) {
            let notification = CommitNotification {
                tx_id: envelope.tx_id().clone(),
                code: commit.code,
                block_number: self.next_block.fetch_add(1, Ordering::SeqCst),
            };
            tokio::spawn(async move {
                tokio::time::sleep(commit.delay).await;
                commit.hub.publish(&commit.endpoint, notification).await;
            });
        }

        Ok(outcome)
    }
}
