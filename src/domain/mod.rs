//! Domain models for the universal verifier
//!
//! Requests, proofs, cross-chain attestations and proof status records.

mod cross_chain;
mod proof;
mod query;
mod status;
mod types;

pub use cross_chain::*;
pub use proof::*;
pub use query::*;
pub use status::*;
pub use types::*;
