//! Trait definitions for the verifier's collaborators

use std::sync::atomic::{AtomicU64, Ordering};

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use chrono::Utc;
#[cfg(test)]
use mockall::automock;

use crate::domain::{ProofStatus, RequestId, StatusKey, ZkProof, ZkRequest};

use super::Result;

/// Storage for registered requests.
///
/// Invariant: requests are never deleted, only replaced by re-registration.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RequestRegistry: Send + Sync {
    /// Get a request by id
    async fn get(&self, request_id: RequestId) -> Result<Option<ZkRequest>>;

    /// Insert or replace a request, returning the previous one
    async fn put(&self, request: ZkRequest) -> Result<Option<ZkRequest>>;

    /// All registered request ids, ascending
    async fn request_ids(&self) -> Result<Vec<RequestId>>;
}

/// Storage for per-subject proof status.
///
/// Invariant: a verified status is never overwritten or cleared.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProofStatusStore: Send + Sync {
    /// Get the status for a key; unknown keys are unverified
    async fn get(&self, key: &StatusKey) -> Result<ProofStatus>;

    /// Store `status` unless a verified status already exists.
    ///
    /// Returns `true` when the status was written.
    async fn insert_if_absent(&self, key: StatusKey, status: ProofStatus) -> Result<bool>;

    /// Number of subjects verified for a request
    async fn verified_count(&self, request_id: RequestId) -> Result<usize>;
}

/// Groth16 verifier for one circuit.
///
/// Errors are treated the same as a `false` result.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CircuitVerifier: Send + Sync {
    async fn verify(&self, proof: &ZkProof, public_signals: &[U256]) -> anyhow::Result<bool>;
}

/// Receives new verifications after the status has been recorded.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VerificationListener: Send + Sync {
    async fn on_verified(&self, subject: Address, request_id: RequestId, status: &ProofStatus);
}

/// Time source of the verifying chain, in unix seconds.
#[cfg_attr(test, automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        u64::try_from(Utc::now().timestamp()).unwrap_or(0)
    }
}

/// Manually driven clock for tests and replay tooling.
#[derive(Debug, Default)]
pub struct FixedClock {
    now: AtomicU64,
}

impl FixedClock {
    pub fn new(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
