//! # Error Types
//!
//! Defines error types shared between the pipeline and its collaborators.

use crate::entities::OrgId;
use thiserror::Error;

/// Errors raised while obtaining or using a signing identity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// No identity is registered for the organization.
    #[error("No signing identity registered for organization {org}")]
    UnknownOrganization { org: OrgId },

    /// The identity exists but enrollment never completed.
    #[error("Identity {enrollment_id} is not enrolled")]
    NotEnrolled { enrollment_id: String },

    /// The identity provider backend failed.
    #[error("Identity provider error: {0}")]
    Backend(String),
}
