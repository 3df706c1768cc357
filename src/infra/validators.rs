//! Circuit validators and the validator whitelist
//!
//! A validator pairs a circuit's public-signal layout with the Groth16
//! verifier for that circuit and its per-validator freshness timeouts.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use super::{CircuitVerifier, Result, VerifierError};

/// Default proof and GIST root expiration timeout (1 hour).
pub const DEFAULT_EXPIRATION_TIMEOUT_SECS: u64 = 3600;

// ============================================================================
// Circuits
// ============================================================================

/// Supported on-chain query circuits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CircuitKind {
    /// `credentialAtomicQuerySigV2OnChain`
    SigV2OnChain,
    /// `credentialAtomicQueryMTPV2OnChain`
    MtpV2OnChain,
}

impl CircuitKind {
    pub fn circuit_id(&self) -> &'static str {
        match self {
            CircuitKind::SigV2OnChain => "credentialAtomicQuerySigV2OnChain",
            CircuitKind::MtpV2OnChain => "credentialAtomicQueryMTPV2OnChain",
        }
    }

    pub fn from_circuit_id(circuit_id: &str) -> Option<Self> {
        [CircuitKind::SigV2OnChain, CircuitKind::MtpV2OnChain]
            .into_iter()
            .find(|kind| kind.circuit_id() == circuit_id)
    }

    pub fn layout(&self) -> SignalLayout {
        match self {
            CircuitKind::SigV2OnChain => SignalLayout {
                merklized: 0,
                user_id: 1,
                circuit_query_hash: 2,
                issuer_state: 3,
                request_id: 4,
                challenge: 5,
                gist_root: 6,
                issuer_id: 7,
                is_revocation_checked: 8,
                issuer_claim_non_rev_state: 9,
                timestamp: 10,
                len: 11,
            },
            CircuitKind::MtpV2OnChain => SignalLayout {
                merklized: 0,
                user_id: 1,
                circuit_query_hash: 2,
                request_id: 3,
                challenge: 4,
                gist_root: 5,
                issuer_id: 6,
                issuer_state: 7,
                is_revocation_checked: 8,
                issuer_claim_non_rev_state: 9,
                timestamp: 10,
                len: 11,
            },
        }
    }
}

impl fmt::Display for CircuitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.circuit_id())
    }
}

/// Public-signal indices of a circuit.
///
/// `issuer_state` is `issuerAuthState` for the signature circuit and
/// `issuerClaimIdenState` for the MTP circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalLayout {
    pub merklized: usize,
    pub user_id: usize,
    pub circuit_query_hash: usize,
    pub issuer_state: usize,
    pub request_id: usize,
    pub challenge: usize,
    pub gist_root: usize,
    pub issuer_id: usize,
    pub is_revocation_checked: usize,
    pub issuer_claim_non_rev_state: usize,
    pub timestamp: usize,
    pub len: usize,
}

/// Named view of a circuit's public signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedSignals {
    pub merklized: U256,
    pub user_id: U256,
    pub circuit_query_hash: U256,
    pub issuer_state: U256,
    pub request_id: U256,
    pub challenge: U256,
    pub gist_root: U256,
    pub issuer_id: U256,
    pub is_revocation_checked: U256,
    pub issuer_claim_non_rev_state: U256,
    pub timestamp: u64,
}

impl DecodedSignals {
    pub fn revocation_checked(&self) -> bool {
        !self.is_revocation_checked.is_zero()
    }
}

impl SignalLayout {
    /// Maps raw signals onto named fields. The count must match exactly.
    pub fn decode(&self, signals: &[U256]) -> Result<DecodedSignals> {
        if signals.len() != self.len {
            return Err(VerifierError::ProofRejected(format!(
                "expected {} public signals, got {}",
                self.len,
                signals.len()
            )));
        }
        let timestamp = u64::try_from(signals[self.timestamp])
            .map_err(|_| VerifierError::ProofRejected("timestamp signal out of range".into()))?;

        Ok(DecodedSignals {
            merklized: signals[self.merklized],
            user_id: signals[self.user_id],
            circuit_query_hash: signals[self.circuit_query_hash],
            issuer_state: signals[self.issuer_state],
            request_id: signals[self.request_id],
            challenge: signals[self.challenge],
            gist_root: signals[self.gist_root],
            issuer_id: signals[self.issuer_id],
            is_revocation_checked: signals[self.is_revocation_checked],
            issuer_claim_non_rev_state: signals[self.issuer_claim_non_rev_state],
            timestamp,
        })
    }

    /// Inverse of [`SignalLayout::decode`], used to build signal vectors.
    pub fn encode(&self, decoded: &DecodedSignals) -> Vec<U256> {
        let mut signals = vec![U256::ZERO; self.len];
        signals[self.merklized] = decoded.merklized;
        signals[self.user_id] = decoded.user_id;
        signals[self.circuit_query_hash] = decoded.circuit_query_hash;
        signals[self.issuer_state] = decoded.issuer_state;
        signals[self.request_id] = decoded.request_id;
        signals[self.challenge] = decoded.challenge;
        signals[self.gist_root] = decoded.gist_root;
        signals[self.issuer_id] = decoded.issuer_id;
        signals[self.is_revocation_checked] = decoded.is_revocation_checked;
        signals[self.issuer_claim_non_rev_state] = decoded.issuer_claim_non_rev_state;
        signals[self.timestamp] = U256::from(decoded.timestamp);
        signals
    }
}

// ============================================================================
// Validators
// ============================================================================

/// Per-validator freshness timeouts, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorConfig {
    pub proof_expiration_timeout: u64,
    pub state_root_expiration_timeout: u64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            proof_expiration_timeout: DEFAULT_EXPIRATION_TIMEOUT_SECS,
            state_root_expiration_timeout: DEFAULT_EXPIRATION_TIMEOUT_SECS,
        }
    }
}

/// A whitelisted circuit validator.
#[derive(Clone)]
pub struct Validator {
    pub address: Address,
    pub circuit: CircuitKind,
    pub verifier: Arc<dyn CircuitVerifier>,
    pub config: ValidatorConfig,
}

impl Validator {
    pub fn new(address: Address, circuit: CircuitKind, verifier: Arc<dyn CircuitVerifier>) -> Self {
        Self {
            address,
            circuit,
            verifier,
            config: ValidatorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("address", &self.address)
            .field("circuit", &self.circuit)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Whitelisted validators keyed by address.
pub struct ValidatorWhitelist {
    validators: RwLock<HashMap<Address, Validator>>,
}

impl ValidatorWhitelist {
    pub fn new() -> Self {
        Self {
            validators: RwLock::new(HashMap::new()),
        }
    }

    /// Add or replace a validator. Returns the replaced validator, if any.
    pub fn insert(&self, validator: Validator) -> Result<Option<Validator>> {
        let mut validators = self
            .validators
            .write()
            .map_err(|_| VerifierError::lock_poisoned("validator whitelist"))?;
        Ok(validators.insert(validator.address, validator))
    }

    pub fn remove(&self, address: &Address) -> Result<Option<Validator>> {
        let mut validators = self
            .validators
            .write()
            .map_err(|_| VerifierError::lock_poisoned("validator whitelist"))?;
        Ok(validators.remove(address))
    }

    /// Get a whitelisted validator
    pub fn get(&self, address: &Address) -> Result<Validator> {
        let validators = self
            .validators
            .read()
            .map_err(|_| VerifierError::lock_poisoned("validator whitelist"))?;
        validators
            .get(address)
            .cloned()
            .ok_or(VerifierError::ValidatorNotWhitelisted(*address))
    }

    pub fn is_whitelisted(&self, address: &Address) -> bool {
        self.validators
            .read()
            .map(|validators| validators.contains_key(address))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.validators.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Update a validator's timeouts in place
    pub fn update_config(
        &self,
        address: &Address,
        update: impl FnOnce(&mut ValidatorConfig),
    ) -> Result<ValidatorConfig> {
        let mut validators = self
            .validators
            .write()
            .map_err(|_| VerifierError::lock_poisoned("validator whitelist"))?;
        let validator = validators
            .get_mut(address)
            .ok_or(VerifierError::ValidatorNotWhitelisted(*address))?;
        update(&mut validator.config);
        Ok(validator.config)
    }
}

impl Default for ValidatorWhitelist {
    fn default() -> Self {
        Self::new()
    }
}
