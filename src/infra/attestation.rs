//! Cross-chain attestation verification
//!
//! Each message is checked on its own: its signer must be trusted and its
//! timestamp must fall inside the freshness window. Superseded facts are kept;
//! the engine decides what they are good for.

use std::collections::HashSet;

use alloy::primitives::Address;
use tracing::debug;

use crate::codec::unpack_cross_chain_proofs;
use crate::crypto::{recover_message_signer, AttestationDomain};
use crate::domain::{AttestedState, SignedMessage, VerifiedFact};

use super::{Result, VerifierError};

/// Default attestation freshness window and clock skew (1 hour).
pub const DEFAULT_ATTESTATION_WINDOW_SECS: u64 = 3600;

/// Trust and freshness rules for attestations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationPolicy {
    pub domain: AttestationDomain,
    pub trusted_signers: HashSet<Address>,
    /// Maximum age of an attestation, in seconds.
    pub freshness_window: u64,
    /// How far an attestation may be ahead of the verifying chain, in seconds.
    pub max_clock_skew: u64,
}

impl AttestationPolicy {
    pub fn new(domain: AttestationDomain, trusted_signers: impl IntoIterator<Item = Address>) -> Self {
        Self {
            domain,
            trusted_signers: trusted_signers.into_iter().collect(),
            freshness_window: DEFAULT_ATTESTATION_WINDOW_SECS,
            max_clock_skew: DEFAULT_ATTESTATION_WINDOW_SECS,
        }
    }

    pub fn with_freshness_window(mut self, secs: u64) -> Self {
        self.freshness_window = secs;
        self
    }

    pub fn with_max_clock_skew(mut self, secs: u64) -> Self {
        self.max_clock_skew = secs;
        self
    }
}

/// Verifies signed cross-chain messages against an [`AttestationPolicy`].
#[derive(Debug, Clone)]
pub struct AttestationVerifier {
    policy: AttestationPolicy,
}

impl AttestationVerifier {
    pub fn new(policy: AttestationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &AttestationPolicy {
        &self.policy
    }

    /// Verify every message; output order matches input order.
    pub fn verify_all(&self, messages: &[SignedMessage], now: u64) -> Result<Vec<VerifiedFact>> {
        messages
            .iter()
            .enumerate()
            .map(|(index, signed)| self.verify_one(index, signed, now))
            .collect()
    }

    /// Decode a packed attestation list and verify it.
    pub fn verify_blob(&self, blob: &[u8], now: u64) -> Result<AttestedState> {
        let messages = unpack_cross_chain_proofs(blob)?;
        Ok(AttestedState::new(self.verify_all(&messages, now)?))
    }

    fn verify_one(&self, index: usize, signed: &SignedMessage, now: u64) -> Result<VerifiedFact> {
        let signer = recover_message_signer(&self.policy.domain, signed)
            .map_err(|_| VerifierError::UntrustedSigner {
                index,
                signer: None,
            })?;
        if !self.policy.trusted_signers.contains(&signer) {
            return Err(VerifierError::UntrustedSigner {
                index,
                signer: Some(signer),
            });
        }

        let timestamp = signed.message.timestamp();
        if timestamp > now.saturating_add(self.policy.max_clock_skew) {
            return Err(VerifierError::FutureTimestamp { timestamp, now });
        }
        if now.saturating_sub(timestamp) > self.policy.freshness_window {
            return Err(VerifierError::StaleAttestation {
                index,
                timestamp,
                now,
            });
        }

        debug!(
            index,
            %signer,
            tag = signed.message.tag(),
            timestamp,
            superseded = signed.message.is_superseded(),
            "Attestation verified"
        );

        Ok(VerifiedFact {
            message: signed.message,
            signer,
        })
    }
}
