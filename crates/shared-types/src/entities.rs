//! # Core Ledger Entities
//!
//! Defines the entities exchanged between the submission pipeline and the
//! ledger network.
//!
//! ## Clusters
//!
//! - **Naming**: `OrgId`, `PeerName`, `ChannelId`, `ChaincodeId`
//! - **Addressing**: `Endpoint`, `TlsMaterial`
//! - **Transactions**: `TransactionId`, `ValidationCode`
//! - **Identity**: `SigningIdentity`

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::PathBuf;

// =============================================================================
// CLUSTER A: NAMING
// =============================================================================

/// Organization key as it appears in the network directory (e.g. `org1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrgId(String);

impl OrgId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrgId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Logical peer name (e.g. `peer1`), unique within its organization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerName(String);

impl PeerName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Channel the transaction is submitted on (e.g. `mychannel`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Deployed contract the operation is invoked on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChaincodeId(String);

impl ChaincodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChaincodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChaincodeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// =============================================================================
// CLUSTER B: ADDRESSING
// =============================================================================

const PLAIN_SCHEME: &str = "grpc://";
const SECURE_SCHEME: &str = "grpcs://";

/// TLS material needed to dial a peer or orderer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TlsMaterial {
    /// Path to the PEM encoded CA certificate bundle.
    pub ca_cert_path: PathBuf,
    /// Overrides the hostname checked against the server certificate.
    pub server_hostname: Option<String>,
}

/// A dialable network endpoint.
///
/// The address is stored without scheme; the scheme is derived from the
/// presence of TLS material so a directory cannot mix `grpcs://` URLs with
/// plaintext connections by accident.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    authority: String,
    tls: Option<TlsMaterial>,
}

impl Endpoint {
    /// Plaintext endpoint. Any scheme prefix on `address` is dropped.
    pub fn plain(address: &str) -> Self {
        Self {
            authority: strip_scheme(address).to_string(),
            tls: None,
        }
    }

    /// TLS endpoint. Any scheme prefix on `address` is dropped.
    pub fn secure(address: &str, tls: TlsMaterial) -> Self {
        Self {
            authority: strip_scheme(address).to_string(),
            tls: Some(tls),
        }
    }

    /// `host:port` part of the endpoint.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn tls(&self) -> Option<&TlsMaterial> {
        self.tls.as_ref()
    }

    pub fn is_secure(&self) -> bool {
        self.tls.is_some()
    }

    /// Full URL including the scheme.
    pub fn url(&self) -> String {
        let scheme = if self.is_secure() {
            SECURE_SCHEME
        } else {
            PLAIN_SCHEME
        };
        format!("{}{}", scheme, self.authority)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

fn strip_scheme(address: &str) -> &str {
    address
        .strip_prefix(SECURE_SCHEME)
        .or_else(|| address.strip_prefix(PLAIN_SCHEME))
        .unwrap_or(address)
}

// =============================================================================
// CLUSTER C: TRANSACTIONS
// =============================================================================

/// Transaction identifier correlating proposal, order submission and commit
/// notification.
///
/// Derived as `hex(SHA-256(nonce || creator))`, so it is bound to the
/// submitting identity and unguessable without the nonce.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Derive the id from a nonce and the serialized creator identity.
    pub fn derive(nonce: &[u8], creator: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(nonce);
        hasher.update(creator);
        Self(hex::encode(hasher.finalize()))
    }

    /// Wrap an id received from the network (e.g. in a commit notification).
    pub fn from_hex(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 8 hex characters, for log lines.
    pub fn short(&self) -> &str {
        let end = self.0.len().min(8);
        &self.0[..end]
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validation code reported by a peer once a transaction is committed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ValidationCode {
    /// The transaction was committed and its writes applied.
    Valid,
    /// The transaction was committed as invalid (e.g. `MVCC_READ_CONFLICT`).
    Invalid(String),
}

impl ValidationCode {
    /// Sentinel string peers use for a valid transaction.
    pub const VALID_SENTINEL: &'static str = "VALID";

    pub fn from_code(code: &str) -> Self {
        if code == Self::VALID_SENTINEL {
            Self::Valid
        } else {
            Self::Invalid(code.to_string())
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Valid => Self::VALID_SENTINEL,
            Self::Invalid(code) => code,
        }
    }
}

impl From<String> for ValidationCode {
    fn from(code: String) -> Self {
        Self::from_code(&code)
    }
}

impl From<ValidationCode> for String {
    fn from(code: ValidationCode) -> Self {
        code.as_str().to_string()
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// CLUSTER D: IDENTITY
// =============================================================================

/// Enrolled signing identity of an organization member.
///
/// Treated as an opaque capability token by the pipeline.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningIdentity {
    /// Organization the identity belongs to.
    pub org: OrgId,
    /// Membership service provider id (e.g. `Org1MSP`).
    pub msp_id: String,
    /// Enrollment name (e.g. `user1`).
    pub enrollment_id: String,
    /// PEM encoded enrollment certificate.
    pub certificate: Vec<u8>,
    /// Whether enrollment completed.
    pub enrolled: bool,
}

impl SigningIdentity {
    pub fn is_enrolled(&self) -> bool {
        self.enrolled && !self.certificate.is_empty()
    }

    /// Serialized creator (`msp_id || certificate`) bound into transaction ids.
    pub fn creator_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.msp_id.len() + self.certificate.len());
        bytes.extend_from_slice(self.msp_id.as_bytes());
        bytes.extend_from_slice(&self.certificate);
        bytes
    }
}

// Keeps certificate bytes out of logs.
impl fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("org", &self.org)
            .field("msp_id", &self.msp_id)
            .field("enrollment_id", &self.enrollment_id)
            .field("enrolled", &self.enrolled)
            .finish_non_exhaustive()
    }
}
