//! # Test Fixtures
//!
//! A two-organization directory, enrolled identities and a harness wiring
//! `SubmissionService` to a `ScriptedLedger` and an `InMemoryEventHub`.

use lg_submission::{
    NetworkDirectory, ScriptedLedger, SubmissionConfig, SubmissionService, TransactionRequest,
};
use shared_bus::InMemoryEventHub;
use shared_types::{Endpoint, OrgId, SigningIdentity, ValidationCode};
use std::sync::Arc;
use std::time::Duration;

/// org1 has two event-capable peers, org2 one endorser without events.
pub const DIRECTORY: &str = r#"{
    "orderer": { "url": "grpc://orderer.example.com:7050" },
    "organizations": {
        "org1": {
            "msp_id": "Org1MSP",
            "peers": {
                "peer0": { "requests": "grpc://peer0.org1:7051", "events": "grpc://peer0.org1:7053" },
                "peer1": { "requests": "grpc://peer1.org1:7056", "events": "grpc://peer1.org1:7058" }
            }
        },
        "org2": {
            "msp_id": "Org2MSP",
            "peers": {
                "peer2": { "requests": "grpc://peer2.org2:8051" }
            }
        }
    }
}"#;

pub type TestService = SubmissionService<ScriptedLedger, InMemoryEventHub, NetworkDirectory>;

/// Event endpoint the orchestrator watches for org1 callers.
pub fn org1_events() -> Endpoint {
    Endpoint::plain("grpc://peer0.org1:7053")
}

pub fn identity(org: &str, msp_id: &str) -> SigningIdentity {
    SigningIdentity {
        org: OrgId::new(org),
        msp_id: msp_id.to_string(),
        enrollment_id: "user1".to_string(),
        certificate: format!("-----BEGIN CERTIFICATE-----\n{org}\n-----END CERTIFICATE-----\n")
            .into_bytes(),
        enrolled: true,
    }
}

pub fn org1_identity() -> SigningIdentity {
    identity("org1", "Org1MSP")
}

/// `changeTunaHolder` for org1 addressed to `targets`.
pub fn change_holder(targets: &[&str], key: &str, holder: &str) -> TransactionRequest {
    TransactionRequest::builder("mychannel", "tuna-app", "changeTunaHolder")
        .targets(targets.iter().copied())
        .args([key, holder])
        .identity(org1_identity())
        .build()
        .expect("valid request")
}

/// Service, scripted ledger and event hub wired together.
pub struct Harness {
    pub ledger: Arc<ScriptedLedger>,
    pub hub: InMemoryEventHub,
    pub service: TestService,
}

impl Harness {
    pub fn new(config: SubmissionConfig) -> Self {
        let ledger = Arc::new(ScriptedLedger::new());
        let hub = InMemoryEventHub::new();
        let network =
            Arc::new(NetworkDirectory::from_json_str(DIRECTORY).expect("valid directory"));
        let service = SubmissionService::new(
            config,
            Arc::clone(&ledger),
            Arc::new(hub.clone()),
            network,
        );
        Self {
            ledger,
            hub,
            service,
        }
    }

    /// Publish `code` on the org1 event endpoint `delay` after each
    /// successful order.
    pub fn commit_with(&self, code: ValidationCode, delay: Duration) {
        self.ledger
            .commit_through(self.hub.clone(), org1_events(), code, delay);
    }
}
