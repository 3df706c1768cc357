//! Cryptographic utilities for the universal verifier
//!
//! Provides:
//! - Domain-separated Keccak-256 signing hashes for cross-chain messages
//! - ECDSA (secp256k1) attestation signing and signer recovery

mod hash;
mod signing;

pub use hash::*;
pub use signing::*;
