//! Query parameter blob.
//!
//! ```text
//! schema:u256 | claimPathKey:u256 | operator:u8 | slotIndex:u16 |
//! value:[u256; 64] | circuitIdCount:u16 | (len:u16, utf8)* |
//! queryHash:u256 | claimPathNotExists:u8 | skipClaimRevocationCheck:u8
//! ```

use alloy::primitives::{Bytes, U256};

use crate::domain::{QueryParams, ValueVector, VALUE_VECTOR_LEN};

use super::cursor::{
    write_bool, write_prefixed_u16, write_u16, write_u256, write_u8, ByteReader, WORD_LEN,
};
use super::error::{CodecError, CodecResult, Malformed, Section};

/// Encoded size of every field except the circuit id strings.
pub const QUERY_PARAMS_FIXED_LEN: usize =
    WORD_LEN * 2 + 1 + 2 + WORD_LEN * VALUE_VECTOR_LEN + 2 + WORD_LEN + 2;

pub fn encode_query_params(params: &QueryParams) -> CodecResult<Bytes> {
    let ids_len: usize = params.circuit_ids.iter().map(|id| 2 + id.len()).sum();
    let mut out = Vec::with_capacity(QUERY_PARAMS_FIXED_LEN + ids_len);

    write_u256(&mut out, &params.schema);
    write_u256(&mut out, &params.claim_path_key);
    write_u8(&mut out, params.operator);
    write_u16(&mut out, params.slot_index);
    for value in params.value.as_slice() {
        write_u256(&mut out, value);
    }

    let count = u16::try_from(params.circuit_ids.len()).map_err(|_| {
        CodecError::malformed(Section::QueryParams, "circuitIds", Malformed::InvalidLength)
    })?;
    write_u16(&mut out, count);
    for circuit_id in &params.circuit_ids {
        write_prefixed_u16(&mut out, circuit_id.as_bytes(), Section::QueryParams, "circuitIds")?;
    }

    write_u256(&mut out, &params.query_hash);
    write_bool(&mut out, params.claim_path_not_exists);
    write_bool(&mut out, params.skip_claim_revocation_check);

    Ok(Bytes::from(out))
}

pub fn decode_query_params(bytes: &[u8]) -> CodecResult<QueryParams> {
    let mut reader = ByteReader::new(bytes, Section::QueryParams);

    let schema = reader.read_u256("schema")?;
    let claim_path_key = reader.read_u256("claimPathKey")?;
    let operator = reader.read_u8("operator")?;
    let slot_index = reader.read_u16("slotIndex")?;

    let mut values: Vec<U256> = Vec::with_capacity(VALUE_VECTOR_LEN);
    for _ in 0..VALUE_VECTOR_LEN {
        values.push(reader.read_u256("value")?);
    }
    let value = ValueVector::new(values)?;

    let count = reader.read_u16("circuitIdCount")?;
    let mut circuit_ids = Vec::with_capacity(usize::from(count).min(reader.remaining() / 2));
    for _ in 0..count {
        let len = reader.read_u16("circuitIds")?;
        let raw = reader.read_exact(usize::from(len), "circuitIds")?;
        let circuit_id = std::str::from_utf8(raw)
            .map_err(|_| reader.error("circuitIds", Malformed::InvalidValue))?;
        circuit_ids.push(circuit_id.to_string());
    }

    let query_hash = reader.read_u256("queryHash")?;
    let claim_path_not_exists = reader.read_bool("claimPathNotExists")?;
    let skip_claim_revocation_check = reader.read_bool("skipClaimRevocationCheck")?;
    reader.finish()?;

    Ok(QueryParams {
        schema,
        claim_path_key,
        operator,
        slot_index,
        value,
        circuit_ids,
        query_hash,
        claim_path_not_exists,
        skip_claim_revocation_check,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::uint;

    fn birthday_query() -> QueryParams {
        QueryParams {
            schema: uint!(180410020913331409885634153623124536270_U256),
            claim_path_key: uint!(
                8566939875427719562376598811066985304309117528846759529734201066483458512800_U256
            ),
            operator: 1,
            slot_index: 0,
            value: ValueVector::new(vec![uint!(1420070400000000000_U256)]).unwrap(),
            circuit_ids: vec!["credentialAtomicQuerySigV2OnChain".to_string()],
            query_hash: uint!(
                7854321536597559201098551954568590097739874725708651207094499063296207596002_U256
            ),
            claim_path_not_exists: false,
            skip_claim_revocation_check: false,
        }
    }

    #[test]
    fn test_round_trip() {
        let params = birthday_query();
        let encoded = encode_query_params(&params).unwrap();
        let decoded = decode_query_params(&encoded).unwrap();
        assert_eq!(decoded, params);
        assert_eq!(decoded.value.as_slice()[0], uint!(1420070400000000000_U256));
    }

    #[test]
    fn test_encoded_length() {
        let params = birthday_query();
        let encoded = encode_query_params(&params).unwrap();
        let id_len = "credentialAtomicQuerySigV2OnChain".len();
        assert_eq!(encoded.len(), QUERY_PARAMS_FIXED_LEN + 2 + id_len);
    }

    #[test]
    fn test_circuit_ids_keep_insertion_order() {
        let mut params = birthday_query();
        params.circuit_ids = vec!["z".to_string(), String::new(), "a".to_string()];
        let decoded = decode_query_params(&encode_query_params(&params).unwrap()).unwrap();
        assert_eq!(decoded.circuit_ids, vec!["z", "", "a"]);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut encoded = encode_query_params(&birthday_query()).unwrap().to_vec();
        encoded.push(0);
        let err = decode_query_params(&encoded).unwrap_err();
        assert!(matches!(
            err,
            CodecError::MalformedEncoding {
                section: Section::QueryParams,
                reason: Malformed::TrailingBytes { remaining: 1 },
                ..
            }
        ));
    }

    #[test]
    fn test_truncated_input_rejected() {
        let encoded = encode_query_params(&birthday_query()).unwrap();
        let err = decode_query_params(&encoded[..encoded.len() - 1]).unwrap_err();
        assert_eq!(err.field(), Some("skipClaimRevocationCheck"));
    }

    #[test]
    fn test_invalid_flag_rejected() {
        let mut encoded = encode_query_params(&birthday_query()).unwrap().to_vec();
        let last = encoded.len() - 1;
        encoded[last] = 2;
        let err = decode_query_params(&encoded).unwrap_err();
        assert_eq!(
            err,
            CodecError::malformed(
                Section::QueryParams,
                "skipClaimRevocationCheck",
                Malformed::InvalidValue
            )
        );
    }

    #[test]
    fn test_invalid_utf8_circuit_id_rejected() {
        let mut params = birthday_query();
        params.circuit_ids = vec!["ab".to_string()];
        let mut encoded = encode_query_params(&params).unwrap().to_vec();
        let id_offset = WORD_LEN * 2 + 1 + 2 + WORD_LEN * VALUE_VECTOR_LEN + 2 + 2;
        encoded[id_offset] = 0xff;
        let err = decode_query_params(&encoded).unwrap_err();
        assert_eq!(err.field(), Some("circuitIds"));
    }

    #[test]
    fn test_overlong_circuit_id_rejected_on_encode() {
        let mut params = birthday_query();
        params.circuit_ids = vec!["x".repeat(usize::from(u16::MAX) + 1)];
        assert!(matches!(
            encode_query_params(&params),
            Err(CodecError::MalformedEncoding {
                reason: Malformed::InvalidLength,
                ..
            })
        ));
    }
}
