//! # Ledger Gateway Runtime
//!
//! Wires the submission pipeline of `lg-submission` to a network directory
//! and an in-process devnet ledger, and runs the gateway flows.
//!
//! ## Modular Structure
//!
//! - `config` - runtime configuration from the environment
//! - `devnet/` - built-in directory, development identities, tuna chaincode
//!   and the devnet ledger
//! - `runtime` - the wired gateway and its interactive and batch flows
//!
//! ## Flow
//!
//! ```text
//! GatewayRuntime ──request──→ SubmissionService ──proposal──→ DevnetLedger (simulate)
//!                                     │                            │
//!                                     ├──envelope──→ DevnetLedger (cut block, validate)
//!                                     │                            │ block interval
//!                                     └──commit watch←── InMemoryEventHub ←──┘
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (`ledger-telemetry`)
//! 2. Load configuration from the environment
//! 3. Load the network directory and start the devnet ledger
//! 4. Run the interactive flow, or the batch ingest when `LG_BATCH_FILE` is set

pub mod config;
pub mod devnet;
pub mod runtime;

pub use config::RuntimeConfig;
pub use runtime::{BatchSummary, CatchRecord, GatewayRuntime};
