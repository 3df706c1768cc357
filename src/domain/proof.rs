//! Groth16 proof material and response submissions.

use alloy::primitives::{Bytes, U256};
use serde::{Deserialize, Serialize};

use super::RequestId;

/// Affine point on the BN254 G1 curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct G1Point {
    pub x: U256,
    pub y: U256,
}

/// Affine point on the BN254 G2 twist; each coordinate is an Fp2 pair in the
/// order the on-chain verifier expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct G2Point {
    pub x: [U256; 2],
    pub y: [U256; 2],
}

/// zk-SNARK proof points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ZkProof {
    pub a: G1Point,
    pub b: G2Point,
    pub c: G1Point,
}

/// A response to a registered request. Constructed per call and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofSubmission {
    pub request_id: RequestId,
    /// Packed public signals and proof points.
    pub zk_proof: Bytes,
    /// Opaque caller data; not interpreted.
    #[serde(default)]
    pub data: Bytes,
}

impl ProofSubmission {
    pub fn new(request_id: RequestId, zk_proof: Bytes) -> Self {
        Self {
            request_id,
            zk_proof,
            data: Bytes::new(),
        }
    }
}
