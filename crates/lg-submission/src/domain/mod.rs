//! Domain module for the submission pipeline
//!
//! ## Core Modules
//! - request: immutable transaction requests and their builder
//! - proposal: proposals, endorser responses, envelopes
//! - policy: endorsement verdict rules
//! - outcome: order and commit outcomes, the combined result
//! - target: resolved peers and endpoints

pub mod outcome;
pub mod policy;
pub mod proposal;
pub mod request;
pub mod target;

pub use outcome::{CommitOutcome, OrderOutcome, SubmissionResult};
pub use policy::{EndorsementPolicy, Verdict};
pub use proposal::{
    Endorsement, Proposal, ProposalEnvelope, ProposalOutcome, ProposalResponse, SUCCESS_STATUS,
};
pub use request::{TransactionRequest, TransactionRequestBuilder};
pub use target::{PeerRecord, ResolvedTarget, TargetPurpose};
