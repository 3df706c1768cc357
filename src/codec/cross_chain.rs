//! Packed list of signed cross-chain messages.
//!
//! ```text
//! count:u16 | (tag:u8, fields..., sigLen:u16, sig[sigLen >= 65])*
//!
//! tag 0: idType:u16 | root:u256 | timestamp:u64 | replacedAtTimestamp:u64
//! tag 1: id:u256 | state:u256 | timestamp:u64 | replacedAtTimestamp:u64
//! ```

use alloy::primitives::Bytes;

use crate::domain::{
    CrossChainMessage, GlobalStateUpdate, IdentityStateUpdate, SignedMessage, MIN_SIGNATURE_LEN,
    TAG_GLOBAL_STATE, TAG_IDENTITY_STATE,
};

use super::cursor::{write_prefixed_u16, write_u16, write_u256, write_u64, write_u8, ByteReader};
use super::error::{CodecError, CodecResult, Malformed, Section};

/// Canonical encoding of a message: its tag followed by its fixed fields.
/// This is both the wire body and the payload of the signing hash.
pub fn encode_message_fields(message: &CrossChainMessage) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + 32 * 2 + 8 * 2);
    write_u8(&mut out, message.tag());
    match message {
        CrossChainMessage::GlobalState(update) => {
            write_u16(&mut out, update.id_type);
            write_u256(&mut out, &update.root);
            write_u64(&mut out, update.timestamp);
            write_u64(&mut out, update.replaced_at_timestamp);
        }
        CrossChainMessage::IdentityState(update) => {
            write_u256(&mut out, &update.id);
            write_u256(&mut out, &update.state);
            write_u64(&mut out, update.timestamp);
            write_u64(&mut out, update.replaced_at_timestamp);
        }
    }
    out
}

pub fn pack_cross_chain_proofs(messages: &[SignedMessage]) -> CodecResult<Bytes> {
    let count = u16::try_from(messages.len())
        .map_err(|_| CodecError::malformed(Section::CrossChain, "count", Malformed::InvalidLength))?;

    let mut out = Vec::new();
    write_u16(&mut out, count);
    for signed in messages {
        if signed.signature.len() < MIN_SIGNATURE_LEN {
            return Err(CodecError::malformed(
                Section::CrossChain,
                "signature",
                Malformed::InvalidLength,
            ));
        }
        out.extend_from_slice(&encode_message_fields(&signed.message));
        write_prefixed_u16(&mut out, &signed.signature, Section::CrossChain, "signature")?;
    }
    Ok(Bytes::from(out))
}

/// Decodes the list without checking signatures. An empty blob decodes to an
/// empty list.
pub fn unpack_cross_chain_proofs(bytes: &[u8]) -> CodecResult<Vec<SignedMessage>> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = ByteReader::new(bytes, Section::CrossChain);
    let count = reader.read_u16("count")?;
    let mut messages = Vec::with_capacity(usize::from(count).min(reader.remaining()));

    for _ in 0..count {
        let message = match reader.read_u8("tag")? {
            TAG_GLOBAL_STATE => CrossChainMessage::GlobalState(GlobalStateUpdate {
                id_type: reader.read_u16("idType")?,
                root: reader.read_u256("root")?,
                timestamp: reader.read_u64("timestamp")?,
                replaced_at_timestamp: reader.read_u64("replacedAtTimestamp")?,
            }),
            TAG_IDENTITY_STATE => CrossChainMessage::IdentityState(IdentityStateUpdate {
                id: reader.read_u256("id")?,
                state: reader.read_u256("state")?,
                timestamp: reader.read_u64("timestamp")?,
                replaced_at_timestamp: reader.read_u64("replacedAtTimestamp")?,
            }),
            _ => return Err(reader.error("tag", Malformed::InvalidValue)),
        };

        let sig_len = usize::from(reader.read_u16("sigLen")?);
        if sig_len < MIN_SIGNATURE_LEN {
            return Err(reader.error("sigLen", Malformed::InvalidLength));
        }
        let signature = Bytes::copy_from_slice(reader.read_exact(sig_len, "signature")?);
        messages.push(SignedMessage { message, signature });
    }

    reader.finish()?;
    Ok(messages)
}
