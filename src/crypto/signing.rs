//! Oracle signing and signer recovery for cross-chain attestations
//!
//! Attestations are ECDSA (secp256k1) signatures over
//! [`message_signing_hash`]. Verification recovers the signer address and
//! leaves the trust decision to the caller.

use alloy::primitives::{Address, Bytes, Signature, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;

use crate::crypto::hash::{message_signing_hash, AttestationDomain};
use crate::domain::{CrossChainMessage, SignedMessage};

/// Length of a recoverable `r || s || v` signature.
pub const RECOVERABLE_SIGNATURE_LEN: usize = 65;

/// Error type for signing operations
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("invalid signature format")]
    InvalidSignatureFormat,

    #[error("invalid secret key format")]
    InvalidSecretKeyFormat,

    #[error("signer recovery failed")]
    RecoveryFailed,

    #[error("signing failed: {0}")]
    SigningFailed(String),
}

// ============================================================================
// State Attestor
// ============================================================================

/// Oracle key that signs cross-chain state messages.
#[derive(Clone)]
pub struct StateAttestor {
    signer: PrivateKeySigner,
    domain: AttestationDomain,
}

impl StateAttestor {
    /// Generate a new random attestor key
    pub fn random(domain: AttestationDomain) -> Self {
        Self {
            signer: PrivateKeySigner::random(),
            domain,
        }
    }

    /// Create from a hex-encoded secret key (with or without `0x`)
    pub fn from_hex(secret: &str, domain: AttestationDomain) -> Result<Self, SigningError> {
        let signer: PrivateKeySigner = secret
            .parse()
            .map_err(|_| SigningError::InvalidSecretKeyFormat)?;
        Ok(Self { signer, domain })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn domain(&self) -> &AttestationDomain {
        &self.domain
    }

    /// Sign a prehashed digest
    pub fn sign_hash(&self, hash: &B256) -> Result<Bytes, SigningError> {
        let signature = self
            .signer
            .sign_hash_sync(hash)
            .map_err(|e| SigningError::SigningFailed(e.to_string()))?;
        Ok(Bytes::copy_from_slice(&signature.as_bytes()))
    }

    /// Compute the message signing hash and sign it
    pub fn sign_message(
        &self,
        message: impl Into<CrossChainMessage>,
    ) -> Result<SignedMessage, SigningError> {
        let message = message.into();
        let signature = self.sign_hash(&message_signing_hash(&self.domain, &message))?;
        Ok(SignedMessage { message, signature })
    }
}

impl std::fmt::Debug for StateAttestor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateAttestor")
            .field("address", &self.address())
            .field("domain", &self.domain)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Signer Recovery
// ============================================================================

/// Recover the address that produced `signature` over `hash`.
///
/// Only exact 65-byte signatures are recoverable.
pub fn recover_signer(hash: &B256, signature: &[u8]) -> Result<Address, SigningError> {
    if signature.len() != RECOVERABLE_SIGNATURE_LEN {
        return Err(SigningError::InvalidSignatureFormat);
    }
    let signature =
        Signature::from_raw(signature).map_err(|_| SigningError::InvalidSignatureFormat)?;
    signature
        .recover_address_from_prehash(hash)
        .map_err(|_| SigningError::RecoveryFailed)
}

/// Recover the signer of a signed message under `domain`.
pub fn recover_message_signer(
    domain: &AttestationDomain,
    signed: &SignedMessage,
) -> Result<Address, SigningError> {
    recover_signer(&message_signing_hash(domain, &signed.message), &signed.signature)
}
