//! Universal Verifier Library
//!
//! Registry-driven verification of zero-knowledge identity proofs against
//! cross-chain attested identity state, with per-subject proof status and a
//! proof-gated token adapter.
//!
//! ## Modules
//!
//! - [`domain`] - Core domain types (requests, proofs, attestations, status)
//! - [`codec`] - Binary layouts for query params, proofs and attestation lists
//! - [`crypto`] - Signing hashes and ECDSA attestation signing/recovery
//! - [`infra`] - Stores, validator whitelist, attestation checks, engine
//! - [`auth`] - Administrator gate
//! - [`service`] - Administrative and public verifier surface
//! - [`gating`] - Proof-gated token balances
//! - [`config`] - Environment configuration
//! - [`metrics`] - In-process counters, gauges and histograms
//! - [`telemetry`] - Structured logging setup

pub mod auth;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod domain;
pub mod gating;
pub mod infra;
pub mod metrics;
pub mod service;
pub mod telemetry;

// Re-export commonly used types
pub use domain::{
    AttestedState, CrossChainMessage, GlobalStateUpdate, IdentityStateUpdate, ProofStatus,
    ProofSubmission, QueryParams, RequestId, SignedMessage, StatusKey, SubmitOutcome, ZkProof,
    ZkRequest,
};

pub use config::VerifierConfig;
pub use gating::{GatedToken, GatingError, MintOutcome};
pub use infra::{
    AttestationVerifier, CircuitKind, CircuitVerifier, Result, Validator, ValidatorConfig,
    VerificationEngine, VerifierError,
};
pub use service::UniversalVerifier;
