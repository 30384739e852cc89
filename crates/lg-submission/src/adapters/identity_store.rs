//! Static Identity Store
//!
//! In-memory `org -> SigningIdentity` map. Enrollment happens elsewhere;
//! this adapter only hands out identities it was given.

use crate::ports::outbound::IdentityProvider;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{IdentityError, OrgId, SigningIdentity};
use std::collections::HashMap;

/// Identity provider backed by a fixed map.
#[derive(Default)]
pub struct StaticIdentityProvider {
    identities: RwLock<HashMap<OrgId, SigningIdentity>>,
}

impl StaticIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Self::insert`].
    pub fn with_identity(self, identity: SigningIdentity) -> Self {
        self.insert(identity);
        self
    }

    /// Register `identity` for its organization, replacing any previous one.
    pub fn insert(&self, identity: SigningIdentity) {
        self.identities.write().insert(identity.org.clone(), identity);
    }

    /// Forget the identity of `org`.
    pub fn revoke(&self, org: &OrgId) -> Option<SigningIdentity> {
        self.identities.write().remove(org)
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn signing_identity(&self, org: &OrgId) -> Result<SigningIdentity, IdentityError> {
        let identity = self
            .identities
            .read()
            .get(org)
            .cloned()
            .ok_or_else(|| IdentityError::UnknownOrganization { org: org.clone() })?;

        if !identity.is_enrolled() {
            return Err(IdentityError::NotEnrolled {
                enrollment_id: identity.enrollment_id,
            });
        }
        Ok(identity)
    }
}
