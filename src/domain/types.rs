//! Shared identifiers

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Caller-chosen request identifier; primary key of the request registry.
pub type RequestId = u64;

/// Key of a proof status entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StatusKey {
    pub subject: Address,
    pub request_id: RequestId,
}

impl StatusKey {
    pub fn new(subject: Address, request_id: RequestId) -> Self {
        Self {
            subject,
            request_id,
        }
    }
}

/// Interprets an address as the unsigned integer circuits use for the
/// `challenge` signal.
pub fn address_to_u256(address: &Address) -> U256 {
    U256::from_be_slice(address.as_slice())
}
