//! # Integration Tests
//!
//! Drive `SubmissionService` end to end over the scripted ledger and the
//! in-memory event hub, and the gateway runtime over the devnet ledger.

pub mod fixtures;

mod devnet_flow;
mod properties;
mod scenarios;
