//! Atomic-query parameters and registered requests.

use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use crate::codec::CodecError;

use super::RequestId;

/// Fixed capacity of the query value vector.
pub const VALUE_VECTOR_LEN: usize = 64;

/// Query value vector. Always holds exactly [`VALUE_VECTOR_LEN`] entries;
/// unused slots are zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<U256>", into = "Vec<U256>")]
pub struct ValueVector(Vec<U256>);

impl ValueVector {
    /// Pads `values` to full capacity. Entries beyond capacity are dropped
    /// when zero and rejected otherwise.
    pub fn new(mut values: Vec<U256>) -> Result<Self, CodecError> {
        if let Some(extra) = values
            .iter()
            .skip(VALUE_VECTOR_LEN)
            .position(|value| !value.is_zero())
        {
            return Err(CodecError::OversizedValueVector {
                len: values.len(),
                index: VALUE_VECTOR_LEN + extra,
            });
        }
        values.resize(VALUE_VECTOR_LEN, U256::ZERO);
        Ok(Self(values))
    }

    pub fn zero() -> Self {
        Self(vec![U256::ZERO; VALUE_VECTOR_LEN])
    }

    pub fn as_slice(&self) -> &[U256] {
        &self.0
    }

    /// Number of slots up to and including the last non-zero one.
    pub fn used_len(&self) -> usize {
        self.0
            .iter()
            .rposition(|value| !value.is_zero())
            .map_or(0, |index| index + 1)
    }
}

impl Default for ValueVector {
    fn default() -> Self {
        Self::zero()
    }
}

impl TryFrom<Vec<U256>> for ValueVector {
    type Error = CodecError;

    fn try_from(values: Vec<U256>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<ValueVector> for Vec<U256> {
    fn from(values: ValueVector) -> Self {
        values.0
    }
}

/// Parameters of an atomic credential query.
///
/// `query_hash` is a commitment over the other fields computed by the query
/// author. It is never trusted on its own: the circuit recomputes it and the
/// verification engine compares it against the `circuitQueryHash` signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    pub schema: U256,
    pub claim_path_key: U256,
    /// Comparison kind (1 = equal, 2 = less-than, ...).
    pub operator: u8,
    pub slot_index: u16,
    pub value: ValueVector,
    /// Accepted circuits, in priority order.
    pub circuit_ids: Vec<String>,
    pub query_hash: U256,
    pub claim_path_not_exists: bool,
    pub skip_claim_revocation_check: bool,
}

impl QueryParams {
    pub fn accepts_circuit(&self, circuit_id: &str) -> bool {
        self.circuit_ids.iter().any(|id| id == circuit_id)
    }
}

/// A registered verification request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZkRequest {
    pub request_id: RequestId,
    /// Whitelisted validator that must verify responses.
    pub validator: Address,
    pub metadata: String,
    /// Encoded [`QueryParams`].
    pub params: Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_vector_pads_to_capacity() {
        let values = ValueVector::new(vec![U256::from(7u64)]).unwrap();
        assert_eq!(values.as_slice().len(), VALUE_VECTOR_LEN);
        assert_eq!(values.as_slice()[0], U256::from(7u64));
        assert_eq!(values.used_len(), 1);
    }

    #[test]
    fn test_value_vector_drops_trailing_zeros() {
        let mut raw = vec![U256::ZERO; 100];
        raw[63] = U256::from(1u64);
        let values = ValueVector::new(raw).unwrap();
        assert_eq!(values.as_slice().len(), VALUE_VECTOR_LEN);
        assert_eq!(values.used_len(), 64);
    }

    #[test]
    fn test_value_vector_rejects_oversized() {
        let mut raw = vec![U256::ZERO; 70];
        raw[66] = U256::from(1u64);
        let err = ValueVector::new(raw).unwrap_err();
        assert_eq!(err, CodecError::OversizedValueVector { len: 70, index: 66 });
    }

    #[test]
    fn test_accepts_circuit() {
        let params = QueryParams {
            schema: U256::ZERO,
            claim_path_key: U256::ZERO,
            operator: 1,
            slot_index: 0,
            value: ValueVector::zero(),
            circuit_ids: vec!["a".to_string(), "b".to_string()],
            query_hash: U256::ZERO,
            claim_path_not_exists: false,
            skip_claim_revocation_check: false,
        };
        assert!(params.accepts_circuit("b"));
        assert!(!params.accepts_circuit("c"));
    }
}
