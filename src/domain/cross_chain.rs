//! Cross-chain state attestations.
//!
//! A foreign chain's oracle signs [`CrossChainMessage`]s stating that a global
//! identity-state (GIST) root or an identity's state existed as of a timestamp.
//! Messages are verified and discarded; the [`AttestedState`] built from them
//! lives only for the duration of one verification call.

use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// Wire tag of [`GlobalStateUpdate`].
pub const TAG_GLOBAL_STATE: u8 = 0;

/// Wire tag of [`IdentityStateUpdate`].
pub const TAG_IDENTITY_STATE: u8 = 1;

/// Minimum signature length accepted on the wire (`r || s || v`).
pub const MIN_SIGNATURE_LEN: usize = 65;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStateUpdate {
    pub id_type: u16,
    pub root: U256,
    pub timestamp: u64,
    /// Zero while the root is current.
    pub replaced_at_timestamp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityStateUpdate {
    pub id: U256,
    pub state: U256,
    pub timestamp: u64,
    /// Zero while the state is current.
    pub replaced_at_timestamp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CrossChainMessage {
    GlobalState(GlobalStateUpdate),
    IdentityState(IdentityStateUpdate),
}

impl CrossChainMessage {
    pub fn tag(&self) -> u8 {
        match self {
            CrossChainMessage::GlobalState(_) => TAG_GLOBAL_STATE,
            CrossChainMessage::IdentityState(_) => TAG_IDENTITY_STATE,
        }
    }

    pub fn timestamp(&self) -> u64 {
        match self {
            CrossChainMessage::GlobalState(update) => update.timestamp,
            CrossChainMessage::IdentityState(update) => update.timestamp,
        }
    }

    pub fn replaced_at_timestamp(&self) -> u64 {
        match self {
            CrossChainMessage::GlobalState(update) => update.replaced_at_timestamp,
            CrossChainMessage::IdentityState(update) => update.replaced_at_timestamp,
        }
    }

    /// A superseded fact is historical context, not proof of current state.
    pub fn is_superseded(&self) -> bool {
        self.replaced_at_timestamp() != 0
    }
}

impl From<GlobalStateUpdate> for CrossChainMessage {
    fn from(update: GlobalStateUpdate) -> Self {
        CrossChainMessage::GlobalState(update)
    }
}

impl From<IdentityStateUpdate> for CrossChainMessage {
    fn from(update: IdentityStateUpdate) -> Self {
        CrossChainMessage::IdentityState(update)
    }
}

/// A message together with the oracle signature over its signing hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedMessage {
    pub message: CrossChainMessage,
    pub signature: Bytes,
}

/// A message whose signature and freshness have been checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedFact {
    pub message: CrossChainMessage,
    pub signer: Address,
}

/// Trust facts derived from one packed attestation list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttestedState {
    facts: Vec<VerifiedFact>,
}

impl AttestedState {
    pub fn new(facts: Vec<VerifiedFact>) -> Self {
        Self { facts }
    }

    pub fn facts(&self) -> &[VerifiedFact] {
        &self.facts
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Finds the attestation for `root`. A current attestation wins over
    /// superseded ones; among superseded ones the most recently replaced wins.
    pub fn find_gist_root(&self, root: U256) -> Option<&GlobalStateUpdate> {
        self.facts
            .iter()
            .filter_map(|fact| match &fact.message {
                CrossChainMessage::GlobalState(update) if update.root == root => Some(update),
                _ => None,
            })
            .max_by_key(|update| freshness_rank(update.replaced_at_timestamp))
    }

    /// Finds the attestation that `id` had `state`, with the same preference
    /// order as [`AttestedState::find_gist_root`].
    pub fn find_identity_state(&self, id: U256, state: U256) -> Option<&IdentityStateUpdate> {
        self.facts
            .iter()
            .filter_map(|fact| match &fact.message {
                CrossChainMessage::IdentityState(update)
                    if update.id == id && update.state == state =>
                {
                    Some(update)
                }
                _ => None,
            })
            .max_by_key(|update| freshness_rank(update.replaced_at_timestamp))
    }
}

fn freshness_rank(replaced_at: u64) -> (bool, u64) {
    (replaced_at == 0, replaced_at)
}
