//! Error types for the universal verifier infrastructure

use alloy::primitives::{Address, U256};
use thiserror::Error;

use crate::codec::{CodecError, Malformed, Section};
use crate::domain::RequestId;

/// Errors that can occur while registering requests or verifying responses
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifierError {
    /// A query-params or cross-chain blob failed to decode
    #[error("malformed {section} encoding at `{field}`: {reason}")]
    MalformedEncoding {
        section: Section,
        field: &'static str,
        reason: Malformed,
    },

    /// Query value vector exceeds its fixed capacity
    #[error("value vector has a non-zero entry at index {index} (of {len}); capacity is 64")]
    OversizedValueVector { len: usize, index: usize },

    /// Proof coordinate outside the BN254 base field
    #[error("curve point `{point}` coordinate `{coordinate}` is out of field")]
    InvalidCurvePoint {
        point: &'static str,
        coordinate: &'static str,
    },

    /// Proof blob failed to decode
    #[error("malformed proof: {0}")]
    MalformedProof(CodecError),

    /// Validator is not (or no longer) whitelisted
    #[error("validator not whitelisted: {0}")]
    ValidatorNotWhitelisted(Address),

    /// Attestation signature is unrecoverable or from an untrusted signer
    #[error("untrusted signer for attestation #{index}{}", signer_suffix(.signer))]
    UntrustedSigner {
        index: usize,
        signer: Option<Address>,
    },

    /// Caller is not the administrator
    #[error("unauthorized caller: {0}")]
    Unauthorized(Address),

    /// Attestation is older than the freshness window
    #[error("stale attestation #{index}: timestamp {timestamp}, now {now}")]
    StaleAttestation { index: usize, timestamp: u64, now: u64 },

    /// Timestamp is ahead of the verifying chain beyond the allowed skew
    #[error("timestamp {timestamp} is in the future (now {now})")]
    FutureTimestamp { timestamp: u64, now: u64 },

    /// Proof timestamp older than the validator's proof expiration timeout
    #[error("proof expired: timestamp {timestamp}, now {now}, timeout {timeout}s")]
    ProofExpired { timestamp: u64, now: u64, timeout: u64 },

    /// GIST root older than the validator's state root expiration timeout
    #[error("state root {root} expired: reference {reference}, now {now}, timeout {timeout}s")]
    StateRootExpired {
        root: U256,
        reference: u64,
        now: u64,
        timeout: u64,
    },

    /// Only superseded attestations exist for a state that must be current
    #[error("state {state} of identity {id} has been superseded")]
    SupersededState { id: U256, state: U256 },

    /// No attestation covers a state the proof relies on
    #[error("{signal} {value} is not attested")]
    StateNotAttested { signal: &'static str, value: U256 },

    /// A public signal disagrees with the stored query or the submission
    #[error("public signal `{field}` does not match the request")]
    QueryMismatch { field: &'static str },

    /// Circuit verifier returned false or failed, or signals have the wrong shape
    #[error("proof rejected: {0}")]
    ProofRejected(String),

    /// No request registered under this id
    #[error("request not found: {0}")]
    RequestNotFound(RequestId),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl VerifierError {
    /// Short label used for metrics and structured logs.
    pub fn kind_label(&self) -> &'static str {
        match self {
            VerifierError::MalformedEncoding { .. } => "malformed_encoding",
            VerifierError::OversizedValueVector { .. } => "oversized_value_vector",
            VerifierError::InvalidCurvePoint { .. } => "invalid_curve_point",
            VerifierError::MalformedProof(_) => "malformed_proof",
            VerifierError::ValidatorNotWhitelisted(_) => "validator_not_whitelisted",
            VerifierError::UntrustedSigner { .. } => "untrusted_signer",
            VerifierError::Unauthorized(_) => "unauthorized",
            VerifierError::StaleAttestation { .. } => "stale_attestation",
            VerifierError::FutureTimestamp { .. } => "future_timestamp",
            VerifierError::ProofExpired { .. } => "proof_expired",
            VerifierError::StateRootExpired { .. } => "state_root_expired",
            VerifierError::SupersededState { .. } => "superseded_state",
            VerifierError::StateNotAttested { .. } => "state_not_attested",
            VerifierError::QueryMismatch { .. } => "query_mismatch",
            VerifierError::ProofRejected(_) => "proof_rejected",
            VerifierError::RequestNotFound(_) => "request_not_found",
            VerifierError::Configuration(_) => "configuration",
            VerifierError::Internal(_) => "internal",
        }
    }

    /// Data-age failures; resubmitting with fresher data may succeed.
    pub fn is_freshness(&self) -> bool {
        matches!(
            self,
            VerifierError::StaleAttestation { .. }
                | VerifierError::FutureTimestamp { .. }
                | VerifierError::ProofExpired { .. }
                | VerifierError::StateRootExpired { .. }
                | VerifierError::SupersededState { .. }
        )
    }

    /// Caller or signer lacks the required standing; no effect was applied.
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            VerifierError::ValidatorNotWhitelisted(_)
                | VerifierError::UntrustedSigner { .. }
                | VerifierError::Unauthorized(_)
        )
    }

    /// Well-formed submissions whose content contradicts the request, or that
    /// rely on a state no trusted attestation covers.
    pub fn is_semantic_mismatch(&self) -> bool {
        matches!(
            self,
            VerifierError::QueryMismatch { .. }
                | VerifierError::StateNotAttested { .. }
                | VerifierError::ProofRejected(_)
        )
    }

    /// Rejections logged to the `audit` target: semantic mismatches and
    /// authorization failures.
    pub fn is_audit_worthy(&self) -> bool {
        self.is_semantic_mismatch() || self.is_authorization()
    }

    /// Wraps a proof decoding failure. Curve point errors keep their own kind.
    pub fn from_proof_codec(err: CodecError) -> Self {
        match err {
            CodecError::InvalidCurvePoint { point, coordinate } => {
                VerifierError::InvalidCurvePoint { point, coordinate }
            }
            other => VerifierError::MalformedProof(other),
        }
    }

    pub(crate) fn lock_poisoned(what: &str) -> Self {
        VerifierError::Internal(format!("{what} lock poisoned"))
    }
}

impl From<CodecError> for VerifierError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::MalformedEncoding {
                section,
                field,
                reason,
            } => VerifierError::MalformedEncoding {
                section,
                field,
                reason,
            },
            CodecError::OversizedValueVector { len, index } => {
                VerifierError::OversizedValueVector { len, index }
            }
            CodecError::InvalidCurvePoint { point, coordinate } => {
                VerifierError::InvalidCurvePoint { point, coordinate }
            }
        }
    }
}

fn signer_suffix(signer: &Option<Address>) -> String {
    signer.map(|s| format!(": {s}")).unwrap_or_default()
}

/// Result type for verifier operations
pub type Result<T> = std::result::Result<T, VerifierError>;
