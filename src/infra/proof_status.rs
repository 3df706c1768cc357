//! In-memory proof status store

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::{ProofStatus, RequestId, StatusKey};

use super::{ProofStatusStore, Result, VerifierError};

/// In-memory proof status store for development and testing
pub struct InMemoryProofStatusStore {
    statuses: RwLock<HashMap<StatusKey, ProofStatus>>,
}

impl InMemoryProofStatusStore {
    pub fn new() -> Self {
        Self {
            statuses: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryProofStatusStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProofStatusStore for InMemoryProofStatusStore {
    async fn get(&self, key: &StatusKey) -> Result<ProofStatus> {
        let statuses = self
            .statuses
            .read()
            .map_err(|_| VerifierError::lock_poisoned("proof status"))?;
        Ok(statuses.get(key).copied().unwrap_or_default())
    }

    async fn insert_if_absent(&self, key: StatusKey, status: ProofStatus) -> Result<bool> {
        let mut statuses = self
            .statuses
            .write()
            .map_err(|_| VerifierError::lock_poisoned("proof status"))?;
        match statuses.entry(key) {
            Entry::Occupied(mut existing) => {
                if existing.get().is_verified {
                    return Ok(false);
                }
                existing.insert(status);
                Ok(true)
            }
            Entry::Vacant(slot) => {
                slot.insert(status);
                Ok(true)
            }
        }
    }

    async fn verified_count(&self, request_id: RequestId) -> Result<usize> {
        let statuses = self
            .statuses
            .read()
            .map_err(|_| VerifierError::lock_poisoned("proof status"))?;
        Ok(statuses
            .iter()
            .filter(|(key, status)| key.request_id == request_id && status.is_verified)
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, U256};

    fn subject(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[tokio::test]
    async fn test_unknown_key_is_unverified() {
        let store = InMemoryProofStatusStore::new();
        let status = store.get(&StatusKey::new(subject(1), 7)).await.unwrap();
        assert_eq!(status, ProofStatus::default());
        assert!(!status.is_verified);
    }

    #[tokio::test]
    async fn test_first_write_wins() {
        let store = InMemoryProofStatusStore::new();
        let key = StatusKey::new(subject(1), 7);
        let first = ProofStatus::verified(100, subject(9), U256::from(1u64));
        let second = ProofStatus::verified(200, subject(9), U256::from(2u64));

        assert!(store.insert_if_absent(key, first).await.unwrap());
        assert!(!store.insert_if_absent(key, second).await.unwrap());
        assert_eq!(store.get(&key).await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_verified_count_is_per_request() {
        let store = InMemoryProofStatusStore::new();
        let status = ProofStatus::verified(1, subject(9), U256::ZERO);
        store
            .insert_if_absent(StatusKey::new(subject(1), 7), status)
            .await
            .unwrap();
        store
            .insert_if_absent(StatusKey::new(subject(2), 7), status)
            .await
            .unwrap();
        store
            .insert_if_absent(StatusKey::new(subject(1), 8), status)
            .await
            .unwrap();

        assert_eq!(store.verified_count(7).await.unwrap(), 2);
        assert_eq!(store.verified_count(8).await.unwrap(), 1);
        assert_eq!(store.verified_count(9).await.unwrap(), 0);
    }
}
