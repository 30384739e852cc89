//! # Devnet Ledger
//!
//! In-process `LedgerChannel`: endorsers simulate the tuna chaincode, the
//! ordering side cuts one block per envelope and publishes the validation
//! code on every event endpoint once the block interval has passed.
//!
//! ```text
//! send_proposal ──simulate(snapshot)──→ rw-set kept under tx_id (until ordered
//!                                        or PENDING_WRITE_TTL passes)
//! submit_to_order ──→ block N: reads still current?
//!                        yes → apply writes @N, VALID
//!                        no  → MVCC_READ_CONFLICT
//!                     ──(block interval)──→ CommitNotification on every event endpoint
//! ```

use super::chaincode::{ReadWriteSet, TunaChaincode, VersionedValue, WorldState};
use async_trait::async_trait;
use lg_submission::{
    LedgerChannel, LedgerError, OrderOutcome, Proposal, ProposalEnvelope, ProposalResponse,
    ResolvedTarget,
};
use parking_lot::{Mutex, RwLock};
use shared_bus::{CommitNotification, CommitPublisher, InMemoryEventHub};
use shared_types::{ChaincodeId, ChannelId, Endpoint, TransactionId, ValidationCode};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Status endorsers use for chaincode errors.
const CHAINCODE_ERROR_STATUS: i32 = 500;

/// How long an endorsed write set waits for its envelope. Proposals that
/// are rejected, abandoned or only evaluated are dropped after this.
pub const PENDING_WRITE_TTL: Duration = Duration::from_secs(60);

/// Write set of an endorsed, not yet ordered transaction.
struct PendingWrites {
    rw_set: ReadWriteSet,
    endorsed_at: Instant,
}

/// Single-channel, single-chaincode ledger living in the gateway process.
pub struct DevnetLedger {
    instance: Uuid,
    channel: ChannelId,
    chaincode_id: ChaincodeId,
    chaincode: TunaChaincode,
    state: RwLock<WorldState>,
    /// Write sets awaiting ordering, keyed by transaction
    endorsed: Mutex<HashMap<TransactionId, PendingWrites>>,
    committed: Mutex<HashSet<TransactionId>>,
    hub: InMemoryEventHub,
    event_endpoints: Vec<Endpoint>,
    block_interval: Duration,
    height: AtomicU64,
}

impl DevnetLedger {
    pub fn new(
        channel: ChannelId,
        chaincode_id: ChaincodeId,
        hub: InMemoryEventHub,
        event_endpoints: Vec<Endpoint>,
        block_interval: Duration,
    ) -> Self {
        let instance = Uuid::new_v4();
        info!(
            %instance,
            %channel,
            chaincode = %chaincode_id,
            event_endpoints = event_endpoints.len(),
            "Devnet ledger started"
        );
        Self {
            instance,
            channel,
            chaincode_id,
            chaincode: TunaChaincode,
            state: RwLock::new(WorldState::new()),
            endorsed: Mutex::new(HashMap::new()),
            committed: Mutex::new(HashSet::new()),
            hub,
            event_endpoints,
            block_interval,
            height: AtomicU64::new(0),
        }
    }

    /// Blocks cut so far.
    pub fn height(&self) -> u64 {
        self.height.load(Ordering::SeqCst)
    }

    /// Endorsed write sets not yet ordered.
    pub fn pending_endorsements(&self) -> usize {
        self.endorsed.lock().len()
    }

    /// Committed value of `key`.
    pub fn get_state(&self, key: &str) -> Option<Vec<u8>> {
        self.state.read().get(key).map(|entry| entry.value.clone())
    }

    /// Drop write sets whose envelope never arrived.
    fn expire_pending(&self) {
        let mut endorsed = self.endorsed.lock();
        let before = endorsed.len();
        endorsed.retain(|_, pending| pending.endorsed_at.elapsed() < PENDING_WRITE_TTL);
        let expired = before - endorsed.len();
        if expired > 0 {
            debug!(instance = %self.instance, expired, "Expired unordered write sets");
        }
    }

    /// Validate `rw_set` against the committed state and apply it at
    /// `block`.
    fn validate_and_apply(
        &self,
        tx_id: &TransactionId,
        rw_set: ReadWriteSet,
        block: u64,
    ) -> ValidationCode {
        if !self.committed.lock().insert(tx_id.clone()) {
            return ValidationCode::Invalid("DUPLICATE_TXID".to_string());
        }

        let mut state = self.state.write();
        let stale = rw_set.reads.iter().find(|(key, seen)| {
            state.get(key.as_str()).map(|entry| entry.version) != *seen
        });
        if let Some((key, _)) = stale {
            debug!(tx_id = %tx_id.short(), %key, "Read version changed since endorsement");
            return ValidationCode::Invalid("MVCC_READ_CONFLICT".to_string());
        }

        for (key, value) in rw_set.writes {
            state.insert(
                key,
                VersionedValue {
                    value,
                    version: block,
                },
            );
        }
        ValidationCode::Valid
    }
}

#[async_trait]
impl LedgerChannel for DevnetLedger {
    async fn send_proposal(
        &self,
        target: &ResolvedTarget,
        proposal: &Proposal,
    ) -> Result<ProposalResponse, LedgerError> {
        if proposal.channel != self.channel {
            return Ok(ProposalResponse::failure(
                CHAINCODE_ERROR_STATUS,
                format!("channel {} is not joined by {}", proposal.channel, target.peer),
            ));
        }
        if proposal.chaincode != self.chaincode_id {
            return Ok(ProposalResponse::failure(
                CHAINCODE_ERROR_STATUS,
                format!("chaincode {} is not installed", proposal.chaincode),
            ));
        }

        self.expire_pending();
        let simulated = {
            let state = self.state.read();
            self.chaincode
                .simulate(&state, &proposal.operation, &proposal.arguments)
        };

        match simulated {
            Ok(simulation) => {
                debug!(
                    tx_id = %proposal.tx_id.short(),
                    peer = %target.peer,
                    reads = simulation.rw_set.reads.len(),
                    writes = simulation.rw_set.writes.len(),
                    "Proposal simulated"
                );
                if !simulation.rw_set.writes.is_empty() {
                    self.endorsed
                        .lock()
                        .entry(proposal.tx_id.clone())
                        .or_insert(PendingWrites {
                            rw_set: simulation.rw_set,
                            endorsed_at: Instant::now(),
                        });
                }
                Ok(ProposalResponse::success(simulation.payload))
            }
            Err(error) => {
                debug!(
                    tx_id = %proposal.tx_id.short(),
                    peer = %target.peer,
                    %error,
                    "Chaincode returned an error"
                );
                Ok(ProposalResponse::failure(
                    CHAINCODE_ERROR_STATUS,
                    error.to_string(),
                ))
            }
        }
    }

    async fn submit_to_order(
        &self,
        orderer: &Endpoint,
        envelope: &ProposalEnvelope,
    ) -> Result<OrderOutcome, LedgerError> {
        if envelope.endorsements.is_empty() {
            warn!(%orderer, tx_id = %envelope.tx_id().short(), "Envelope without endorsements");
            return Ok(OrderOutcome::Failure {
                reason: "BAD_REQUEST: envelope carries no endorsements".to_string(),
            });
        }

        // Read-only transactions leave no write set behind.
        let rw_set = self
            .endorsed
            .lock()
            .remove(envelope.tx_id())
            .map(|pending| pending.rw_set)
            .unwrap_or_default();
        self.expire_pending();

        let block = self.height.fetch_add(1, Ordering::SeqCst) + 1;
        let code = self.validate_and_apply(envelope.tx_id(), rw_set, block);
        info!(
            instance = %self.instance,
            block,
            tx_id = %envelope.tx_id().short(),
            %code,
            "Block cut"
        );

        let notification = CommitNotification {
            tx_id: envelope.tx_id().clone(),
            code,
            block_number: block,
        };
        let hub = self.hub.clone();
        let endpoints = self.event_endpoints.clone();
        let delay = self.block_interval;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            for endpoint in &endpoints {
                hub.publish(endpoint, notification.clone()).await;
            }
        });

        Ok(OrderOutcome::Success)
    }
}
