//! Proof status records.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Verification status of a `(subject, request_id)` pair.
///
/// The default value is the unverified state. Once `is_verified` is set it is
/// never cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofStatus {
    pub is_verified: bool,
    /// Verifying-chain time of the first successful verification.
    pub verified_at: u64,
    pub validator: Address,
    /// `userID` public signal of the accepted proof.
    pub user_id: U256,
}

impl ProofStatus {
    pub fn verified(verified_at: u64, validator: Address, user_id: U256) -> Self {
        Self {
            is_verified: true,
            verified_at,
            validator,
            user_id,
        }
    }
}

/// Result of a successful response submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmitOutcome {
    /// First successful verification; status written and listeners notified.
    Verified,
    /// Status was already verified; nothing written, nobody notified.
    AlreadyVerified,
}

impl SubmitOutcome {
    pub fn is_new(&self) -> bool {
        matches!(self, SubmitOutcome::Verified)
    }
}
