//! In-memory request registry

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::{RequestId, ZkRequest};

use super::{RequestRegistry, Result, VerifierError};

/// In-memory request registry for development and testing
pub struct InMemoryRequestRegistry {
    requests: RwLock<BTreeMap<RequestId, ZkRequest>>,
}

impl InMemoryRequestRegistry {
    pub fn new() -> Self {
        Self {
            requests: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.requests.read().map(|requests| requests.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryRequestRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RequestRegistry for InMemoryRequestRegistry {
    async fn get(&self, request_id: RequestId) -> Result<Option<ZkRequest>> {
        let requests = self
            .requests
            .read()
            .map_err(|_| VerifierError::lock_poisoned("request registry"))?;
        Ok(requests.get(&request_id).cloned())
    }

    async fn put(&self, request: ZkRequest) -> Result<Option<ZkRequest>> {
        let mut requests = self
            .requests
            .write()
            .map_err(|_| VerifierError::lock_poisoned("request registry"))?;
        Ok(requests.insert(request.request_id, request))
    }

    async fn request_ids(&self) -> Result<Vec<RequestId>> {
        let requests = self
            .requests
            .read()
            .map_err(|_| VerifierError::lock_poisoned("request registry"))?;
        Ok(requests.keys().copied().collect())
    }
}
