//! Proof submission blob.
//!
//! ```text
//! publicSignalCount:u32 | [u256]* | a:(x, y) | b:((x0, x1), (y0, y1)) | c:(x, y)
//! ```
//!
//! Coordinates are 32-byte big-endian words in the order the BN254 Groth16
//! verifier consumes them.

use alloy::primitives::{Bytes, U256};

use crate::domain::{G1Point, G2Point, ZkProof};

use super::cursor::{write_u256, write_u32, ByteReader, WORD_LEN};
use super::error::{CodecError, CodecResult, Malformed, Section};
use super::BN254_BASE_FIELD_MODULUS;

/// Encoded size of the `a`, `b` and `c` points.
pub const PROOF_POINTS_LEN: usize = WORD_LEN * 8;

pub fn pack_zk_proof(
    public_signals: &[U256],
    a: &G1Point,
    b: &G2Point,
    c: &G1Point,
) -> CodecResult<Bytes> {
    let proof = ZkProof { a: *a, b: *b, c: *c };
    check_proof_points(&proof)?;

    let count = u32::try_from(public_signals.len()).map_err(|_| {
        CodecError::malformed(Section::Proof, "publicSignalCount", Malformed::InvalidLength)
    })?;

    let mut out = Vec::with_capacity(4 + public_signals.len() * WORD_LEN + PROOF_POINTS_LEN);
    write_u32(&mut out, count);
    for signal in public_signals {
        write_u256(&mut out, signal);
    }
    for word in proof_words(&proof) {
        write_u256(&mut out, &word);
    }
    Ok(Bytes::from(out))
}

pub fn unpack_zk_proof(bytes: &[u8]) -> CodecResult<(Vec<U256>, ZkProof)> {
    let mut reader = ByteReader::new(bytes, Section::Proof);

    let count = reader.read_u32("publicSignalCount")? as usize;
    let expected = count
        .checked_mul(WORD_LEN)
        .and_then(|len| len.checked_add(PROOF_POINTS_LEN));
    if expected != Some(reader.remaining()) {
        return Err(reader.error("publicSignalCount", Malformed::InvalidLength));
    }

    let mut public_signals = Vec::with_capacity(count);
    for _ in 0..count {
        public_signals.push(reader.read_u256("publicSignals")?);
    }

    let a = G1Point {
        x: reader.read_u256("a")?,
        y: reader.read_u256("a")?,
    };
    let b = G2Point {
        x: [reader.read_u256("b")?, reader.read_u256("b")?],
        y: [reader.read_u256("b")?, reader.read_u256("b")?],
    };
    let c = G1Point {
        x: reader.read_u256("c")?,
        y: reader.read_u256("c")?,
    };
    reader.finish()?;

    let proof = ZkProof { a, b, c };
    check_proof_points(&proof)?;
    Ok((public_signals, proof))
}

/// Rejects any coordinate that is not a canonical BN254 base field element.
pub fn check_proof_points(proof: &ZkProof) -> CodecResult<()> {
    check_coordinate("a", "x", &proof.a.x)?;
    check_coordinate("a", "y", &proof.a.y)?;
    check_coordinate("b", "x0", &proof.b.x[0])?;
    check_coordinate("b", "x1", &proof.b.x[1])?;
    check_coordinate("b", "y0", &proof.b.y[0])?;
    check_coordinate("b", "y1", &proof.b.y[1])?;
    check_coordinate("c", "x", &proof.c.x)?;
    check_coordinate("c", "y", &proof.c.y)
}

fn check_coordinate(point: &'static str, coordinate: &'static str, value: &U256) -> CodecResult<()> {
    if *value >= BN254_BASE_FIELD_MODULUS {
        return Err(CodecError::InvalidCurvePoint { point, coordinate });
    }
    Ok(())
}

fn proof_words(proof: &ZkProof) -> [U256; 8] {
    [
        proof.a.x,
        proof.a.y,
        proof.b.x[0],
        proof.b.x[1],
        proof.b.y[0],
        proof.b.y[1],
        proof.c.x,
        proof.c.y,
    ]
}
