//! Proposals and endorsement responses

use super::request::TransactionRequest;
use serde::{Deserialize, Serialize};
use shared_types::{ChaincodeId, ChannelId, PeerName, TransactionId};

/// Status an endorser returns for a successful simulation.
pub const SUCCESS_STATUS: i32 = 200;

/// What is sent to every endorsing target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub tx_id: TransactionId,
    pub channel: ChannelId,
    pub chaincode: ChaincodeId,
    pub operation: String,
    pub arguments: Vec<String>,
    /// MSP id of the submitting identity
    pub creator_msp: String,
}

impl Proposal {
    /// Proposal for `request` under a freshly issued `tx_id`.
    pub fn for_request(request: &TransactionRequest, tx_id: TransactionId) -> Self {
        Self {
            tx_id,
            channel: request.channel().clone(),
            chaincode: request.chaincode().clone(),
            operation: request.operation().to_string(),
            arguments: request.arguments().to_vec(),
            creator_msp: request.identity().msp_id.clone(),
        }
    }
}

/// Answer of one endorser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalResponse {
    pub status: i32,
    pub payload: Vec<u8>,
    pub message: String,
}

impl ProposalResponse {
    pub fn success(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            status: SUCCESS_STATUS,
            payload: payload.into(),
            message: String::new(),
        }
    }

    pub fn failure(status: i32, message: impl Into<String>) -> Self {
        Self {
            status,
            payload: Vec::new(),
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }
}

/// Result of asking one target to endorse, tagged with the target.
///
/// Transport failures and per-target timeouts are captured here instead of
/// aborting the whole proposal round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Endorsement {
    Responded {
        peer: PeerName,
        response: ProposalResponse,
    },
    Failed {
        peer: PeerName,
        reason: String,
    },
}

impl Endorsement {
    pub fn peer(&self) -> &PeerName {
        match self {
            Self::Responded { peer, .. } | Self::Failed { peer, .. } => peer,
        }
    }

    pub fn response(&self) -> Option<&ProposalResponse> {
        match self {
            Self::Responded { response, .. } => Some(response),
            Self::Failed { .. } => None,
        }
    }

    pub fn status(&self) -> Option<i32> {
        self.response().map(|response| response.status)
    }

    pub fn is_success(&self) -> bool {
        self.response().is_some_and(ProposalResponse::is_success)
    }
}

/// Signed proposal plus the endorsements that passed the policy, ready for
/// the ordering service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalEnvelope {
    pub proposal: Proposal,
    pub endorsements: Vec<(PeerName, ProposalResponse)>,
}

impl ProposalEnvelope {
    pub fn tx_id(&self) -> &TransactionId {
        &self.proposal.tx_id
    }
}

/// Output of a good proposal round.
#[derive(Debug, Clone)]
pub struct ProposalOutcome {
    /// Every target's answer, in target order
    pub responses: Vec<Endorsement>,
    pub envelope: ProposalEnvelope,
}
