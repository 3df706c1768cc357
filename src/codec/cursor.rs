//! Fixed-width big-endian readers and writers shared by all blob layouts.

use alloy::primitives::U256;

use super::error::{CodecError, CodecResult, Malformed, Section};

/// Width of an encoded `u256` word.
pub const WORD_LEN: usize = 32;

/// Cursor over an encoded blob. Every read names the field it is decoding so
/// failures point at the offending field.
#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
    section: Section,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8], section: Section) -> Self {
        Self {
            bytes,
            offset: 0,
            section,
        }
    }

    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.offset)
    }

    /// Builds an error for `field` in this reader's section.
    pub fn error(&self, field: &'static str, reason: Malformed) -> CodecError {
        CodecError::malformed(self.section, field, reason)
    }

    pub fn read_exact(&mut self, len: usize, field: &'static str) -> CodecResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(self.error(field, Malformed::UnexpectedEnd));
        }
        let start = self.offset;
        self.offset += len;
        Ok(&self.bytes[start..start + len])
    }

    pub fn read_array<const N: usize>(&mut self, field: &'static str) -> CodecResult<[u8; N]> {
        let bytes = self.read_exact(N, field)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u8(&mut self, field: &'static str) -> CodecResult<u8> {
        Ok(self.read_array::<1>(field)?[0])
    }

    pub fn read_u16(&mut self, field: &'static str) -> CodecResult<u16> {
        Ok(u16::from_be_bytes(self.read_array(field)?))
    }

    pub fn read_u32(&mut self, field: &'static str) -> CodecResult<u32> {
        Ok(u32::from_be_bytes(self.read_array(field)?))
    }

    pub fn read_u64(&mut self, field: &'static str) -> CodecResult<u64> {
        Ok(u64::from_be_bytes(self.read_array(field)?))
    }

    pub fn read_u256(&mut self, field: &'static str) -> CodecResult<U256> {
        Ok(U256::from_be_bytes(self.read_array::<WORD_LEN>(field)?))
    }

    /// Reads a flag byte; anything other than `0` or `1` is rejected.
    pub fn read_bool(&mut self, field: &'static str) -> CodecResult<bool> {
        match self.read_u8(field)? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(self.error(field, Malformed::InvalidValue)),
        }
    }

    /// Fails if any bytes are left unread.
    pub fn finish(self) -> CodecResult<()> {
        match self.remaining() {
            0 => Ok(()),
            remaining => Err(self.error("<end>", Malformed::TrailingBytes { remaining })),
        }
    }
}

pub fn write_u8(out: &mut Vec<u8>, value: u8) {
    out.push(value);
}

pub fn write_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

pub fn write_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}

pub fn write_u64(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&value.to_be_bytes());
}

pub fn write_u256(out: &mut Vec<u8>, value: &U256) {
    out.extend_from_slice(&value.to_be_bytes::<WORD_LEN>());
}

pub fn write_bool(out: &mut Vec<u8>, value: bool) {
    write_u8(out, u8::from(value));
}

/// Writes a `u16` length prefix followed by the raw bytes.
pub fn write_prefixed_u16(
    out: &mut Vec<u8>,
    bytes: &[u8],
    section: Section,
    field: &'static str,
) -> CodecResult<()> {
    let len = u16::try_from(bytes.len())
        .map_err(|_| CodecError::malformed(section, field, Malformed::InvalidLength))?;
    write_u16(out, len);
    out.extend_from_slice(bytes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_are_big_endian() {
        let bytes = [0x01, 0x02, 0x00, 0x00, 0x00, 0x03];
        let mut reader = ByteReader::new(&bytes, Section::Proof);
        assert_eq!(reader.read_u16("a").unwrap(), 0x0102);
        assert_eq!(reader.read_u32("b").unwrap(), 3);
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn test_read_past_end_names_field() {
        let bytes = [0u8; 3];
        let mut reader = ByteReader::new(&bytes, Section::QueryParams);
        let err = reader.read_u64("slotIndex").unwrap_err();
        assert_eq!(
            err,
            CodecError::malformed(Section::QueryParams, "slotIndex", Malformed::UnexpectedEnd)
        );
    }

    #[test]
    fn test_finish_rejects_trailing_bytes() {
        let bytes = [0u8; 4];
        let mut reader = ByteReader::new(&bytes, Section::CrossChain);
        reader.read_u16("count").unwrap();
        assert!(matches!(
            reader.finish(),
            Err(CodecError::MalformedEncoding {
                reason: Malformed::TrailingBytes { remaining: 2 },
                ..
            })
        ));
    }

    #[test]
    fn test_bool_rejects_non_binary_flag() {
        let bytes = [2u8];
        let mut reader = ByteReader::new(&bytes, Section::QueryParams);
        assert!(reader.read_bool("claimPathNotExists").is_err());
    }

    #[test]
    fn test_u256_word_round_trip() {
        let value = U256::from(0xdead_beefu64) << 200;
        let mut out = Vec::new();
        write_u256(&mut out, &value);
        assert_eq!(out.len(), WORD_LEN);
        let mut reader = ByteReader::new(&out, Section::Proof);
        assert_eq!(reader.read_u256("word").unwrap(), value);
    }
}
