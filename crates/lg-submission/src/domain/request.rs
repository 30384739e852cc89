//! Transaction requests
//!
//! A request is immutable once built. Every submission attempt gets its own
//! request value, there is no shared client or channel handle.

use crate::error::{GatewayResult, SubmissionError};
use shared_types::{ChaincodeId, ChannelId, PeerName, SigningIdentity};

/// One ledger invocation: chaincode operation, arguments, channel, the
/// endorsing targets and the identity the caller acts as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    targets: Vec<PeerName>,
    operation: String,
    arguments: Vec<String>,
    channel: ChannelId,
    chaincode: ChaincodeId,
    identity: SigningIdentity,
}

impl TransactionRequest {
    /// Start building a request for `operation` on `channel`/`chaincode`.
    pub fn builder(
        channel: impl Into<ChannelId>,
        chaincode: impl Into<ChaincodeId>,
        operation: impl Into<String>,
    ) -> TransactionRequestBuilder {
        TransactionRequestBuilder {
            targets: Vec::new(),
            operation: operation.into(),
            arguments: Vec::new(),
            channel: channel.into(),
            chaincode: chaincode.into(),
            identity: None,
        }
    }

    /// Endorsing targets by logical peer name. Empty means every peer of the
    /// caller's organization.
    pub fn targets(&self) -> &[PeerName] {
        &self.targets
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    pub fn chaincode(&self) -> &ChaincodeId {
        &self.chaincode
    }

    pub fn identity(&self) -> &SigningIdentity {
        &self.identity
    }
}

/// Builder for [`TransactionRequest`].
#[derive(Debug, Clone)]
pub struct TransactionRequestBuilder {
    targets: Vec<PeerName>,
    operation: String,
    arguments: Vec<String>,
    channel: ChannelId,
    chaincode: ChaincodeId,
    identity: Option<SigningIdentity>,
}

impl TransactionRequestBuilder {
    pub fn target(mut self, peer: impl Into<PeerName>) -> Self {
        self.targets.push(peer.into());
        self
    }

    pub fn targets<P: Into<PeerName>>(mut self, peers: impl IntoIterator<Item = P>) -> Self {
        self.targets.extend(peers.into_iter().map(Into::into));
        self
    }

    pub fn arg(mut self, argument: impl Into<String>) -> Self {
        self.arguments.push(argument.into());
        self
    }

    pub fn args<A: Into<String>>(mut self, arguments: impl IntoIterator<Item = A>) -> Self {
        self.arguments.extend(arguments.into_iter().map(Into::into));
        self
    }

    pub fn identity(mut self, identity: SigningIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Finish the request.
    ///
    /// Fails when no identity was given or a name field is empty.
    pub fn build(self) -> GatewayResult<TransactionRequest> {
        if self.operation.trim().is_empty() {
            return Err(SubmissionError::InvalidRequest(
                "operation must not be empty".to_string(),
            ));
        }
        if self.channel.as_str().is_empty() {
            return Err(SubmissionError::InvalidRequest(
                "channel must not be empty".to_string(),
            ));
        }
        if self.chaincode.as_str().is_empty() {
            return Err(SubmissionError::InvalidRequest(
                "chaincode must not be empty".to_string(),
            ));
        }
        let identity = self.identity.ok_or_else(|| {
            SubmissionError::InvalidRequest("request has no signing identity".to_string())
        })?;

        Ok(TransactionRequest {
            targets: self.targets,
            operation: self.operation,
            arguments: self.arguments,
            channel: self.channel,
            chaincode: self.chaincode,
            identity,
        })
    }
}
