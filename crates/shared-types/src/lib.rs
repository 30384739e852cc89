//! # Shared Types Crate
//!
//! This crate contains the ledger entities shared by every crate in the
//! gateway workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Identifiers, endpoints and validation codes
//!   used on both sides of the commit event hub are defined here.
//! - **Opaque Identity**: A `SigningIdentity` is a capability token. Crates
//!   pass it around and hand it to collaborators, they never inspect the
//!   certificate bytes themselves.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
