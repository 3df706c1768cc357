//! Common test utilities and fixtures for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use alloy::primitives::{address, Address, Bytes, U256};
use async_trait::async_trait;

use universal_verifier::codec::{encode_query_params, pack_cross_chain_proofs, pack_zk_proof};
use universal_verifier::crypto::{AttestationDomain, StateAttestor};
use universal_verifier::domain::{
    address_to_u256, G1Point, G2Point, GlobalStateUpdate, IdentityStateUpdate, ProofStatus,
    ProofSubmission, QueryParams, RequestId, SignedMessage, ValueVector, ZkProof,
};
use universal_verifier::infra::{
    AttestationPolicy, AttestationVerifier, CircuitKind, CircuitVerifier, DecodedSignals,
    FixedClock, InMemoryProofStatusStore, InMemoryRequestRegistry, Validator,
    VerificationListener,
};
use universal_verifier::UniversalVerifier;

pub const CHAIN_ID: u64 = 80002;
pub const VERIFIER_CONTRACT: Address = address!("3c9acb2205aa72a05f6d77d708b5cf85fca3a896");
pub const ADMIN: Address = address!("00000000000000000000000000000000000000ad");
pub const SIG_VALIDATOR: Address = address!("0000000000000000000000000000000000005160");
pub const MTP_VALIDATOR: Address = address!("000000000000000000000000000000000000a7b0");
pub const SUBJECT: Address = address!("6622b9ffcf797282b86acef4f688ad1ae5d69ff3");

/// Chain time of the test fixtures (2023-11-14T22:13:20Z).
pub const NOW: u64 = 1_700_000_000;

pub const ISSUER_ID: U256 = U256::from_limbs([0x1d, 0, 0, 0]);
pub const ISSUER_STATE: U256 = U256::from_limbs([0x15, 0, 0, 0]);
pub const NON_REV_STATE: U256 = U256::from_limbs([0x16, 0, 0, 0]);
pub const GIST_ROOT: U256 = U256::from_limbs([0x6157, 0, 0, 0]);
pub const USER_ID: U256 = U256::from_limbs([0x0be5, 0, 0, 0]);

fn decimal(value: &str) -> U256 {
    U256::from_str_radix(value, 10).unwrap()
}

/// Query hash of the KYC age query.
pub fn kyc_query_hash() -> U256 {
    decimal("7854321536597559201098551954568590097739874725708651207094499063296207596002")
}

/// Born before 2015-01-01, checked with the signature circuit.
pub fn kyc_query() -> QueryParams {
    QueryParams {
        schema: decimal("180410020913331409885634153623124536270"),
        claim_path_key: decimal(
            "8566939875427719562376598811066985304309117528846759529734201066483458512800",
        ),
        operator: 1,
        slot_index: 0,
        value: ValueVector::new(vec![decimal("1420070400000000000")]).unwrap(),
        circuit_ids: vec![CircuitKind::SigV2OnChain.circuit_id().to_string()],
        query_hash: kyc_query_hash(),
        claim_path_not_exists: false,
        skip_claim_revocation_check: false,
    }
}

pub fn kyc_params() -> Bytes {
    encode_query_params(&kyc_query()).unwrap()
}

// ============================================================================
// Fakes
// ============================================================================

/// Circuit verifier with a fixed answer.
pub struct StaticVerifier(pub bool);

#[async_trait]
impl CircuitVerifier for StaticVerifier {
    async fn verify(&self, _proof: &ZkProof, _public_signals: &[U256]) -> anyhow::Result<bool> {
        Ok(self.0)
    }
}

/// Records every verification it is told about.
#[derive(Default)]
pub struct RecordingListener {
    pub events: Mutex<Vec<(Address, RequestId, ProofStatus)>>,
}

impl RecordingListener {
    pub fn count(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

#[async_trait]
impl VerificationListener for RecordingListener {
    async fn on_verified(&self, subject: Address, request_id: RequestId, status: &ProofStatus) {
        self.events
            .lock()
            .unwrap()
            .push((subject, request_id, *status));
    }
}

// ============================================================================
// Builders
// ============================================================================

pub fn domain() -> AttestationDomain {
    AttestationDomain::new(CHAIN_ID, VERIFIER_CONTRACT)
}

/// Public signals of a response by `subject` that satisfy `query`.
pub fn valid_signals(subject: Address, request_id: RequestId, timestamp: u64) -> DecodedSignals {
    DecodedSignals {
        merklized: U256::from(1u64),
        user_id: USER_ID,
        circuit_query_hash: kyc_query_hash(),
        issuer_state: ISSUER_STATE,
        request_id: U256::from(request_id),
        challenge: address_to_u256(&subject),
        gist_root: GIST_ROOT,
        issuer_id: ISSUER_ID,
        is_revocation_checked: U256::from(1u64),
        issuer_claim_non_rev_state: NON_REV_STATE,
        timestamp,
    }
}

pub fn submission(circuit: CircuitKind, signals: &DecodedSignals) -> ProofSubmission {
    let g1 = G1Point {
        x: U256::from(1u64),
        y: U256::from(2u64),
    };
    let g2 = G2Point {
        x: [U256::from(3u64), U256::from(4u64)],
        y: [U256::from(5u64), U256::from(6u64)],
    };
    let proof = pack_zk_proof(&circuit.layout().encode(signals), &g1, &g2, &g1).unwrap();
    ProofSubmission::new(signals.request_id.to::<u64>(), proof)
}

pub fn gist(timestamp: u64, replaced_at_timestamp: u64) -> GlobalStateUpdate {
    GlobalStateUpdate {
        id_type: 0x0212,
        root: GIST_ROOT,
        timestamp,
        replaced_at_timestamp,
    }
}

pub fn identity(state: U256, timestamp: u64, replaced_at_timestamp: u64) -> IdentityStateUpdate {
    IdentityStateUpdate {
        id: ISSUER_ID,
        state,
        timestamp,
        replaced_at_timestamp,
    }
}

/// A verifier with one whitelisted validator per circuit.
pub struct Fixture {
    pub verifier: UniversalVerifier,
    pub clock: Arc<FixedClock>,
    pub oracle: StateAttestor,
    pub listener: Arc<RecordingListener>,
    pub statuses: Arc<InMemoryProofStatusStore>,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_circuit_verifier(Arc::new(StaticVerifier(true))).await
    }

    pub async fn with_circuit_verifier(circuit_verifier: Arc<dyn CircuitVerifier>) -> Self {
        let oracle = StateAttestor::random(domain());
        let clock = Arc::new(FixedClock::new(NOW));
        let statuses = Arc::new(InMemoryProofStatusStore::new());
        let listener = Arc::new(RecordingListener::default());

        let policy = AttestationPolicy::new(domain(), [oracle.address()])
            .with_freshness_window(7 * 24 * 3600)
            .with_max_clock_skew(60);
        let verifier = UniversalVerifier::new(
            ADMIN,
            Arc::new(InMemoryRequestRegistry::new()),
            statuses.clone(),
            AttestationVerifier::new(policy),
            clock.clone(),
        );
        verifier.add_listener(listener.clone()).unwrap();

        for (address, circuit) in [
            (SIG_VALIDATOR, CircuitKind::SigV2OnChain),
            (MTP_VALIDATOR, CircuitKind::MtpV2OnChain),
        ] {
            verifier
                .register_validator(
                    ADMIN,
                    Validator::new(address, circuit, circuit_verifier.clone()),
                )
                .await
                .unwrap();
        }

        Self {
            verifier,
            clock,
            oracle,
            listener,
            statuses,
        }
    }

    pub async fn register_kyc_request(&self, request_id: RequestId) {
        self.verifier
            .register_request(ADMIN, request_id, SIG_VALIDATOR, "kyc-age", kyc_params())
            .await
            .unwrap();
    }

    pub fn sign(&self, messages: Vec<universal_verifier::CrossChainMessage>) -> Vec<SignedMessage> {
        messages
            .into_iter()
            .map(|message| self.oracle.sign_message(message).unwrap())
            .collect()
    }

    /// Current GIST root, issuer state and non-revocation state, signed at `at`.
    pub fn fresh_attestations(&self, at: u64) -> Bytes {
        let signed = self.sign(vec![
            gist(at, 0).into(),
            identity(ISSUER_STATE, at, 0).into(),
            identity(NON_REV_STATE, at, 0).into(),
        ]);
        pack_cross_chain_proofs(&signed).unwrap()
    }
}
