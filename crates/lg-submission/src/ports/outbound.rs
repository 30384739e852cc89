//! Driven Ports (SPI - Outbound Dependencies)
//!
//! Capabilities the pipeline calls but does not implement: identities,
//! the network directory and the ledger transport. Commit events come
//! through `shared_bus::EventHub`.

use crate::domain::{
    OrderOutcome, PeerRecord, Proposal, ProposalEnvelope, ProposalResponse, ResolvedTarget,
};
use crate::error::LedgerError;
use async_trait::async_trait;
use shared_types::{Endpoint, IdentityError, OrgId, PeerName, SigningIdentity};

/// Source of enrolled signing identities.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Identity the gateway acts as for `org`.
    async fn signing_identity(&self, org: &OrgId) -> Result<SigningIdentity, IdentityError>;
}

/// Static, read-only view of the network.
///
/// Loaded once; lookups are pure.
pub trait NetworkConfig: Send + Sync {
    /// Peer `peer` of organization `org`.
    fn lookup_peer(&self, org: &OrgId, peer: &PeerName) -> Option<PeerRecord>;

    /// Ordering service endpoint used by `org`.
    fn lookup_orderer(&self, org: &OrgId) -> Option<Endpoint>;

    /// Organizations in directory order.
    fn organizations(&self) -> Vec<OrgId>;

    /// Peers of `org` in directory order. Empty for unknown organizations.
    fn peers_of(&self, org: &OrgId) -> Vec<PeerName>;
}

/// Request/response transport to endorsers and the ordering service.
#[async_trait]
pub trait LedgerChannel: Send + Sync {
    /// Ask one endorser to simulate and sign `proposal`.
    async fn send_proposal(
        &self,
        target: &ResolvedTarget,
        proposal: &Proposal,
    ) -> Result<ProposalResponse, LedgerError>;

    /// Hand an endorsed envelope to the ordering service.
    ///
    /// A refusal by the orderer is `Ok(OrderOutcome::Failure)`; `Err` is
    /// reserved for transport failures.
    async fn submit_to_order(
        &self,
        orderer: &Endpoint,
        envelope: &ProposalEnvelope,
    ) -> Result<OrderOutcome, LedgerError>;
}
