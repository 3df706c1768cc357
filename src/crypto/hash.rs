//! Domain-separated hashing for cross-chain state attestations
//!
//! Every signed message commits to the verifying deployment (chain id and
//! contract address) so an attestation produced for one verifier cannot be
//! replayed against another.

use alloy::primitives::{keccak256, Address, B256};
use serde::{Deserialize, Serialize};

use crate::codec::encode_message_fields;
use crate::domain::CrossChainMessage;

// ============================================================================
// Domain Separation Constants
// ============================================================================

/// Domain prefix for cross-chain state message signing
pub const DOMAIN_CROSS_CHAIN_STATE: &[u8] = b"UNIVERSAL_VERIFIER_CROSS_CHAIN_STATE_V1";

// ============================================================================
// Binary Encoding Helpers
// ============================================================================

/// Encode a u64 as 8 bytes big-endian
#[inline]
pub fn u64_be(n: u64) -> [u8; 8] {
    n.to_be_bytes()
}

// ============================================================================
// Message Signing Hash
// ============================================================================

/// Deployment a signed message is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationDomain {
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl AttestationDomain {
    pub fn new(chain_id: u64, verifying_contract: Address) -> Self {
        Self {
            chain_id,
            verifying_contract,
        }
    }
}

/// Compute the hash an oracle signs for `message`.
///
/// ```text
/// preimage =
///   b"UNIVERSAL_VERIFIER_CROSS_CHAIN_STATE_V1" ||
///   U64_BE(chain_id) ||
///   verifying_contract(20) ||
///   tag(1) || message fields
///
/// signing_hash = KECCAK256(preimage)
/// ```
pub fn message_signing_hash(domain: &AttestationDomain, message: &CrossChainMessage) -> B256 {
    let fields = encode_message_fields(message);
    let mut preimage = Vec::with_capacity(DOMAIN_CROSS_CHAIN_STATE.len() + 8 + 20 + fields.len());
    preimage.extend_from_slice(DOMAIN_CROSS_CHAIN_STATE);
    preimage.extend_from_slice(&u64_be(domain.chain_id));
    preimage.extend_from_slice(domain.verifying_contract.as_slice());
    preimage.extend_from_slice(&fields);
    keccak256(&preimage)
}
