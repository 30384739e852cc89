//! # Target Resolver
//!
//! Maps logical peer names to endpoints.
//!
//! ```text
//! PROPOSAL: caller org ──→ other orgs (directory order) ──→ UnknownTarget
//! EVENT:    caller org only; found elsewhere ──→ ScopeViolation
//! ```
//!
//! Resolution is a pure lookup against the static directory and happens
//! before any network call.

use crate::domain::{ResolvedTarget, TargetPurpose};
use crate::error::{GatewayResult, SubmissionError};
use crate::ports::outbound::NetworkConfig;
use shared_types::{Endpoint, OrgId, PeerName};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Name used in errors for a missing ordering service.
const ORDERER_NAME: &str = "orderer";

/// Resolves peer names against a [`NetworkConfig`].
pub struct TargetResolver<N: NetworkConfig + ?Sized> {
    network: Arc<N>,
}

impl<N: NetworkConfig + ?Sized> TargetResolver<N> {
    pub fn new(network: Arc<N>) -> Self {
        Self { network }
    }

    /// Resolve `names` for `purpose` on behalf of `caller`.
    ///
    /// Duplicates resolve once, in first-seen order. An empty list resolves
    /// to every peer of the caller's organization.
    pub fn resolve(
        &self,
        caller: &OrgId,
        names: &[PeerName],
        purpose: TargetPurpose,
    ) -> GatewayResult<Vec<ResolvedTarget>> {
        let defaulted;
        let names = if names.is_empty() {
            defaulted = self.network.peers_of(caller);
            if defaulted.is_empty() {
                return Err(SubmissionError::UnknownTarget {
                    name: format!("<peers of {caller}>"),
                    org: caller.clone(),
                });
            }
            &defaulted[..]
        } else {
            names
        };

        let mut seen = HashSet::new();
        let mut targets = Vec::with_capacity(names.len());
        for name in names {
            if !seen.insert(name) {
                continue;
            }
            let target = match purpose {
                TargetPurpose::Proposal => self.resolve_proposal(caller, name)?,
                TargetPurpose::Event => self.resolve_event(caller, name)?,
            };
            debug!(peer = %name, %purpose, endpoint = %target.endpoint, "Resolved target");
            targets.push(target);
        }
        Ok(targets)
    }

    /// Event target for a submission: the first proposal target inside the
    /// caller's organization that exposes events, else the first such peer
    /// of the caller's organization. Candidates go through EVENT resolution.
    pub fn event_target(
        &self,
        caller: &OrgId,
        proposal_targets: &[ResolvedTarget],
    ) -> GatewayResult<ResolvedTarget> {
        let from_targets = proposal_targets
            .iter()
            .filter(|target| &target.org == caller)
            .map(|target| target.peer.clone());
        let from_org = self.network.peers_of(caller).into_iter();

        for peer in from_targets.chain(from_org) {
            if let Some(target) = self.lookup_event(caller, &peer)? {
                debug!(%peer, endpoint = %target.endpoint, "Selected event target");
                return Ok(target);
            }
        }

        Err(SubmissionError::ScopeViolation {
            org: caller.clone(),
            reason: "no peer of the caller organization exposes an event service".to_string(),
        })
    }

    /// Ordering service used by the caller's organization.
    pub fn orderer(&self, caller: &OrgId) -> GatewayResult<Endpoint> {
        self.network
            .lookup_orderer(caller)
            .ok_or_else(|| SubmissionError::UnknownTarget {
                name: ORDERER_NAME.to_string(),
                org: caller.clone(),
            })
    }

    fn resolve_proposal(&self, caller: &OrgId, name: &PeerName) -> GatewayResult<ResolvedTarget> {
        let others = self
            .network
            .organizations()
            .into_iter()
            .filter(|org| org != caller);

        for org in std::iter::once(caller.clone()).chain(others) {
            if let Some(record) = self.network.lookup_peer(&org, name) {
                return Ok(ResolvedTarget {
                    peer: record.name,
                    org: record.org,
                    endpoint: record.requests,
                });
            }
        }

        Err(SubmissionError::UnknownTarget {
            name: name.to_string(),
            org: caller.clone(),
        })
    }

    fn resolve_event(&self, caller: &OrgId, name: &PeerName) -> GatewayResult<ResolvedTarget> {
        self.lookup_event(caller, name)?
            .ok_or_else(|| SubmissionError::UnknownTarget {
                name: format!("{name} (event service)"),
                org: caller.clone(),
            })
    }

    /// Event endpoint of `name` inside the caller's organization. `None`
    /// when the peer exists but runs no event service.
    fn lookup_event(
        &self,
        caller: &OrgId,
        name: &PeerName,
    ) -> GatewayResult<Option<ResolvedTarget>> {
        if let Some(record) = self.network.lookup_peer(caller, name) {
            return Ok(record.events.map(|events| ResolvedTarget {
                peer: record.name,
                org: record.org,
                endpoint: events,
            }));
        }

        let owner = self
            .network
            .organizations()
            .into_iter()
            .find(|org| org != caller && self.network.lookup_peer(org, name).is_some());

        match owner {
            Some(owner) => Err(SubmissionError::ScopeViolation {
                org: caller.clone(),
                reason: format!("event target {name} belongs to {owner}"),
            }),
            None => Err(SubmissionError::UnknownTarget {
                name: name.to_string(),
                org: caller.clone(),
            }),
        }
    }
}
