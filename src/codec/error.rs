//! Error types for the binary codecs

use std::fmt;

use serde::{Deserialize, Serialize};

/// Blob being encoded or decoded when a failure was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Section {
    /// Query parameter blob attached to a request.
    QueryParams,
    /// zk-SNARK proof submission blob.
    Proof,
    /// Packed list of signed cross-chain messages.
    CrossChain,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::QueryParams => write!(f, "query params"),
            Section::Proof => write!(f, "proof"),
            Section::CrossChain => write!(f, "cross-chain proofs"),
        }
    }
}

/// What exactly was wrong with a malformed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Malformed {
    /// Input ended before the field was complete.
    UnexpectedEnd,
    /// A length or count is out of bounds.
    InvalidLength,
    /// Discriminant, flag or string content is not allowed.
    InvalidValue,
    /// Bytes remained after the last field.
    TrailingBytes { remaining: usize },
}

impl fmt::Display for Malformed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Malformed::UnexpectedEnd => write!(f, "unexpected end of input"),
            Malformed::InvalidLength => write!(f, "invalid length"),
            Malformed::InvalidValue => write!(f, "invalid value"),
            Malformed::TrailingBytes { remaining } => write!(f, "{remaining} trailing bytes"),
        }
    }
}

/// Encoding errors. Always caller-side and never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("malformed {section} encoding at `{field}`: {reason}")]
    MalformedEncoding {
        section: Section,
        field: &'static str,
        reason: Malformed,
    },

    #[error("value vector has a non-zero entry at index {index} (of {len}); capacity is 64")]
    OversizedValueVector { len: usize, index: usize },

    #[error("curve point `{point}` coordinate `{coordinate}` is not below the BN254 base field modulus")]
    InvalidCurvePoint {
        point: &'static str,
        coordinate: &'static str,
    },
}

impl CodecError {
    pub fn malformed(section: Section, field: &'static str, reason: Malformed) -> Self {
        CodecError::MalformedEncoding {
            section,
            field,
            reason,
        }
    }

    /// Field that failed, when the error identifies one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            CodecError::MalformedEncoding { field, .. } => Some(field),
            CodecError::OversizedValueVector { .. } => Some("value"),
            CodecError::InvalidCurvePoint { point, .. } => Some(point),
        }
    }
}

/// Result type for codec operations
pub type CodecResult<T> = std::result::Result<T, CodecError>;
