//! # Transaction Identity Issuer
//!
//! `tx_id = hex(SHA-256(nonce || counter || creator))`
//!
//! - `nonce`: 24 bytes from the OS CSPRNG, fresh per call
//! - `counter`: per-issuer atomic sequence, big endian
//! - `creator`: serialized signing identity
//!
//! The counter keeps ids distinct even if the RNG were to repeat.

use rand::rngs::OsRng;
use rand::RngCore;
use shared_types::{IdentityError, SigningIdentity, TransactionId};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// Nonce length in bytes.
pub const NONCE_LEN: usize = 24;

/// Issues transaction ids bound to the calling identity.
///
/// Safe to share across tasks; ids never repeat for one issuer.
#[derive(Debug, Default)]
pub struct TransactionIdIssuer {
    counter: AtomicU64,
}

impl TransactionIdIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh id for `identity`.
    ///
    /// Fails if the identity is not enrolled or has no certificate.
    pub fn issue(&self, identity: &SigningIdentity) -> Result<TransactionId, IdentityError> {
        if !identity.is_enrolled() {
            return Err(IdentityError::NotEnrolled {
                enrollment_id: identity.enrollment_id.clone(),
            });
        }

        let sequence = self.counter.fetch_add(1, Ordering::Relaxed);
        let mut material = [0u8; NONCE_LEN + 8];
        OsRng.fill_bytes(&mut material[..NONCE_LEN]);
        material[NONCE_LEN..].copy_from_slice(&sequence.to_be_bytes());

        let tx_id = TransactionId::derive(&material, &identity.creator_bytes());
        trace!(tx_id = %tx_id.short(), sequence, "Issued transaction id");
        Ok(tx_id)
    }

    /// Number of ids issued so far.
    pub fn issued(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}
