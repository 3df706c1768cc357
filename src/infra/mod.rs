//! Infrastructure layer for the universal verifier
//!
//! Contains trait definitions and implementations for:
//! - Request registry and proof status storage (in-memory)
//! - Validator whitelist and circuit signal layouts
//! - Cross-chain attestation verification
//! - Response verification engine

mod attestation;
mod engine;
mod error;
mod proof_status;
mod requests;
mod traits;
mod validators;

pub use attestation::*;
pub use engine::VerificationEngine;
pub use error::*;
pub use proof_status::InMemoryProofStatusStore;
pub use requests::InMemoryRequestRegistry;
pub use traits::*;
pub use validators::*;
