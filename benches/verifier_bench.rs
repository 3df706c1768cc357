//! Performance benchmarks for the universal verifier.
//!
//! Run with: cargo bench

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use universal_verifier::codec::{
    decode_query_params, encode_query_params, pack_cross_chain_proofs, pack_zk_proof,
    unpack_zk_proof,
};
use universal_verifier::crypto::{AttestationDomain, StateAttestor};
use universal_verifier::domain::{
    address_to_u256, G1Point, G2Point, GlobalStateUpdate, IdentityStateUpdate, ProofSubmission,
    QueryParams, ValueVector, ZkProof,
};
use universal_verifier::infra::{
    AttestationPolicy, AttestationVerifier, CircuitKind, CircuitVerifier, DecodedSignals,
    FixedClock, InMemoryProofStatusStore, InMemoryRequestRegistry, Validator,
};
use universal_verifier::UniversalVerifier;

const NOW: u64 = 1_700_000_000;
const ADMIN: Address = Address::ZERO;

struct AcceptAll;

#[async_trait]
impl CircuitVerifier for AcceptAll {
    async fn verify(&self, _proof: &ZkProof, _signals: &[U256]) -> anyhow::Result<bool> {
        Ok(true)
    }
}

fn domain() -> AttestationDomain {
    AttestationDomain::new(80002, Address::repeat_byte(0x3c))
}

fn query() -> QueryParams {
    QueryParams {
        schema: U256::from(1u64),
        claim_path_key: U256::from(2u64),
        operator: 2,
        slot_index: 0,
        value: ValueVector::new(vec![U256::from(20_050_101u64)]).unwrap(),
        circuit_ids: vec![CircuitKind::SigV2OnChain.circuit_id().to_string()],
        query_hash: U256::from(3u64),
        claim_path_not_exists: false,
        skip_claim_revocation_check: false,
    }
}

fn signals(subject: Address) -> DecodedSignals {
    DecodedSignals {
        merklized: U256::from(1u64),
        user_id: U256::from(10u64),
        circuit_query_hash: U256::from(3u64),
        issuer_state: U256::from(11u64),
        request_id: U256::ZERO,
        challenge: address_to_u256(&subject),
        gist_root: U256::from(12u64),
        issuer_id: U256::from(13u64),
        is_revocation_checked: U256::from(1u64),
        issuer_claim_non_rev_state: U256::from(14u64),
        timestamp: NOW,
    }
}

fn packed_proof(subject: Address) -> ProofSubmission {
    let g1 = G1Point {
        x: U256::from(1u64),
        y: U256::from(2u64),
    };
    let layout = CircuitKind::SigV2OnChain.layout();
    let proof = pack_zk_proof(&layout.encode(&signals(subject)), &g1, &G2Point::default(), &g1)
        .unwrap();
    ProofSubmission::new(0, proof)
}

/// Attestations covering the GIST root plus `identities` identity states.
fn attestations(attestor: &StateAttestor, identities: u64) -> alloy::primitives::Bytes {
    let mut signed = vec![attestor
        .sign_message(GlobalStateUpdate {
            id_type: 0x0212,
            root: U256::from(12u64),
            timestamp: NOW,
            replaced_at_timestamp: 0,
        })
        .unwrap()];
    for i in 0..identities {
        let state = if i == 0 { 11 } else { 14 + i - 1 };
        signed.push(
            attestor
                .sign_message(IdentityStateUpdate {
                    id: U256::from(13u64),
                    state: U256::from(state),
                    timestamp: NOW,
                    replaced_at_timestamp: 0,
                })
                .unwrap(),
        );
    }
    pack_cross_chain_proofs(&signed).unwrap()
}

/// Benchmark query params decoding
fn bench_query_codec(c: &mut Criterion) {
    let encoded = encode_query_params(&query()).unwrap();

    c.bench_function("decode_query_params", |b| {
        b.iter(|| decode_query_params(black_box(&encoded)).unwrap())
    });
}

/// Benchmark proof unpacking
fn bench_proof_codec(c: &mut Criterion) {
    let submission = packed_proof(Address::repeat_byte(0x11));

    c.bench_function("unpack_zk_proof", |b| {
        b.iter(|| unpack_zk_proof(black_box(&submission.zk_proof)).unwrap())
    });
}

/// Benchmark attestation list verification (one signer recovery per message)
fn bench_attestations(c: &mut Criterion) {
    let attestor = StateAttestor::random(domain());
    let verifier = AttestationVerifier::new(AttestationPolicy::new(domain(), [attestor.address()]));
    let mut group = c.benchmark_group("verify_attestations");

    for count in [2u64, 8, 32].iter() {
        let blob = attestations(&attestor, *count);
        group.throughput(Throughput::Elements(*count + 1));
        group.bench_with_input(BenchmarkId::new("verify_blob", count), &blob, |b, blob| {
            b.iter(|| verifier.verify_blob(black_box(blob), NOW).unwrap())
        });
    }

    group.finish();
}

/// Benchmark the full submission path
fn bench_submit_response(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let attestor = StateAttestor::random(domain());
    let verifier = rt.block_on(async {
        let verifier = UniversalVerifier::new(
            ADMIN,
            Arc::new(InMemoryRequestRegistry::new()),
            Arc::new(InMemoryProofStatusStore::new()),
            AttestationVerifier::new(AttestationPolicy::new(domain(), [attestor.address()])),
            Arc::new(FixedClock::new(NOW)),
        );
        let validator = Address::repeat_byte(0x5a);
        verifier
            .register_validator(
                ADMIN,
                Validator::new(validator, CircuitKind::SigV2OnChain, Arc::new(AcceptAll)),
            )
            .await
            .unwrap();
        verifier
            .register_request(ADMIN, 0, validator, "", encode_query_params(&query()).unwrap())
            .await
            .unwrap();
        verifier
    });

    let blob = attestations(&attestor, 2);
    let subject = Address::repeat_byte(0x11);
    let submission = packed_proof(subject);

    // After the first iteration every call takes the already-verified path,
    // which still runs every check before the status lookup.
    c.bench_function("submit_response", |b| {
        b.to_async(&rt).iter(|| async {
            verifier
                .submit_response(subject, black_box(&submission), black_box(&blob))
                .await
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_query_codec,
    bench_proof_codec,
    bench_attestations,
    bench_submit_response
);
criterion_main!(benches);
