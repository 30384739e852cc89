//! Resolved network targets

use shared_types::{Endpoint, OrgId, PeerName};
use std::fmt;

/// What a target is resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPurpose {
    /// Endorsement requests; any organization
    Proposal,
    /// Commit event subscription; caller's organization only
    Event,
}

impl fmt::Display for TargetPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Proposal => f.write_str("proposal"),
            Self::Event => f.write_str("event"),
        }
    }
}

/// Directory entry for one peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerRecord {
    pub name: PeerName,
    pub org: OrgId,
    /// Endorsement service
    pub requests: Endpoint,
    /// Commit event service, if the peer exposes one
    pub events: Option<Endpoint>,
}

/// A peer name mapped to the endpoint used for one purpose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub peer: PeerName,
    pub org: OrgId,
    pub endpoint: Endpoint,
}

impl fmt::Display for ResolvedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} ({})", self.peer, self.org, self.endpoint)
    }
}
