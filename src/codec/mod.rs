//! Binary codecs for query parameters, proofs and cross-chain attestations
//!
//! All layouts are big-endian and decode strictly: truncated input, trailing
//! bytes and out-of-range discriminants are errors.

mod cross_chain;
mod cursor;
mod error;
mod proof;
mod query;

use alloy::primitives::{uint, U256};

pub use cross_chain::*;
pub use cursor::*;
pub use error::*;
pub use proof::*;
pub use query::*;

/// Modulus of the BN254 base field. Proof coordinates must be strictly below it.
pub const BN254_BASE_FIELD_MODULUS: U256 =
    uint!(0x30644e72e131a029b85045b68181585d97816a916871ca8d3c208c16d87cfd47_U256);
