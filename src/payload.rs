//! Payload codec — the 32-byte record carried by every
//! watermarked image.
//!
//! # On-disk layout (32 bytes, all fields big-endian)
//!
//! ```text
//! Offset  Size  Field
//!    0      4   magic         = 0x5347_5001  ("SGP\x01", BE u32)
//!    4      4   crc32         CRC-32/IEEE of bytes [8..32)
//!    8     12   original_uid  owner identity, 96-bit unsigned
//!   20     12   current_uid   holder identity; zero = master
//!   30      1   flags         bit 0 = allow_derivative, bit 1 = allow_reprint
//!   31      1   reserved      must be 0
//! ```
//!
//! Serialization accumulates into a fixed stack buffer, then computes the
//! checksum over the covered range and writes it last so the
//! header-before-CRC bytes are frozen before hashing.

use crc32fast::Hasher;
use thiserror::Error;

pub const MAGIC: u32 = 0x5347_5001;
pub const RECORD_LEN: usize = 32;

/// Maximum value a 96-bit unsigned integer can hold.
pub const MAX_UID: u128 = (1u128 << 96) - 1;

pub const FLAG_ALLOW_DERIVATIVE: u8 = 0x01;
pub const FLAG_ALLOW_REPRINT: u8 = 0x02;
/// Bits 2-7 of the flags byte are reserved and must be zero.
const FLAG_RESERVED_MASK: u8 = !(FLAG_ALLOW_DERIVATIVE | FLAG_ALLOW_REPRINT);

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadError {
    #[error("uid {0} does not fit in 96 bits")]
    UidOverflow(u128),
}

/// Sub-reason for a failed [`PayloadRecord::deserialize`]. Never panics on
/// random input — any mismatch is reported here instead.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeserializeError {
    #[error("payload buffer length {0} != {RECORD_LEN}")]
    BadLength(usize),
    #[error("magic mismatch: expected {MAGIC:#010x}, got {actual:#010x}")]
    BadMagic { actual: u32 },
    #[error("crc32 mismatch: expected {expected:#010x}, got {actual:#010x}")]
    BadCrc { expected: u32, actual: u32 },
    /// Only returned when the context is in strict mode.
    #[error("reserved byte or upper flag bits are set while strict mode is enabled")]
    ReservedBitsSet,
}

/// The 32-byte record, decoded into its four logical fields. Never mutated
/// after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadRecord {
    pub original_uid: u128,
    pub current_uid: u128,
    pub flags: u8,
}

impl PayloadRecord {
    pub fn new(original_uid: u128, current_uid: u128, flags: u8) -> Result<Self, PayloadError> {
        if original_uid > MAX_UID {
            return Err(PayloadError::UidOverflow(original_uid));
        }
        if current_uid > MAX_UID {
            return Err(PayloadError::UidOverflow(current_uid));
        }
        Ok(Self { original_uid, current_uid, flags: flags & (FLAG_ALLOW_DERIVATIVE | FLAG_ALLOW_REPRINT) })
    }

    #[inline] pub fn allow_derivative(&self) -> bool { self.flags & FLAG_ALLOW_DERIVATIVE != 0 }
    #[inline] pub fn allow_reprint(&self) -> bool { self.flags & FLAG_ALLOW_REPRINT != 0 }
    #[inline] pub fn is_master(&self) -> bool { self.current_uid == 0 }

    /// Write magic, placeholder CRC, both UIDs, flags, reserved=0, then
    /// compute CRC-32/IEEE over bytes [8..32) and write it into bytes [4..8).
    pub fn serialize(&self) -> Result<[u8; RECORD_LEN], PayloadError> {
        if self.original_uid > MAX_UID {
            return Err(PayloadError::UidOverflow(self.original_uid));
        }
        if self.current_uid > MAX_UID {
            return Err(PayloadError::UidOverflow(self.current_uid));
        }

        let mut buf = [0u8; RECORD_LEN];
        buf[0..4].copy_from_slice(&MAGIC.to_be_bytes());
        // buf[4..8] (crc32) filled in last.
        buf[8..20].copy_from_slice(&self.original_uid.to_be_bytes()[4..16]);
        buf[20..32].copy_from_slice(&self.current_uid.to_be_bytes()[4..16]);
        buf[30] = self.flags & (FLAG_ALLOW_DERIVATIVE | FLAG_ALLOW_REPRINT);
        buf[31] = 0; // reserved

        let mut h = Hasher::new();
        h.update(&buf[8..32]);
        buf[4..8].copy_from_slice(&h.finalize().to_be_bytes());

        Ok(buf)
    }

    /// Validate length, magic, and CRC. In strict mode, a nonzero reserved
    /// byte or nonzero upper flag bits also invalidate the record.
    pub fn deserialize(bytes: &[u8], strict: bool) -> Result<Self, DeserializeError> {
        if bytes.len() != RECORD_LEN {
            return Err(DeserializeError::BadLength(bytes.len()));
        }

        let magic = u32::from_be_bytes(bytes[0..4].try_into().unwrap());
        if magic != MAGIC {
            return Err(DeserializeError::BadMagic { actual: magic });
        }

        let stored_crc = u32::from_be_bytes(bytes[4..8].try_into().unwrap());
        let mut h = Hasher::new();
        h.update(&bytes[8..32]);
        let expected_crc = h.finalize();
        if stored_crc != expected_crc {
            return Err(DeserializeError::BadCrc { expected: expected_crc, actual: stored_crc });
        }

        let mut original_be = [0u8; 16];
        original_be[4..16].copy_from_slice(&bytes[8..20]);
        let original_uid = u128::from_be_bytes(original_be);

        let mut current_be = [0u8; 16];
        current_be[4..16].copy_from_slice(&bytes[20..32]);
        let current_uid = u128::from_be_bytes(current_be);

        let raw_flags = bytes[30];
        let reserved = bytes[31];
        if strict && (reserved != 0 || raw_flags & FLAG_RESERVED_MASK != 0) {
            return Err(DeserializeError::ReservedBitsSet);
        }

        Ok(Self { original_uid, current_uid, flags: raw_flags & (FLAG_ALLOW_DERIVATIVE | FLAG_ALLOW_REPRINT) })
    }

    /// Expand the 32-byte record into 256 bits, most-significant-bit first.
    pub fn to_bits(&self) -> Result<[u8; 256], PayloadError> {
        let bytes = self.serialize()?;
        Ok(bytes_to_bits(&bytes))
    }
}

pub(crate) fn bytes_to_bits(bytes: &[u8; RECORD_LEN]) -> [u8; 256] {
    let mut bits = [0u8; 256];
    for (i, byte) in bytes.iter().enumerate() {
        for b in 0..8 {
            bits[i * 8 + b] = (byte >> (7 - b)) & 1;
        }
    }
    bits
}

pub(crate) fn bits_to_bytes(bits: &[u8]) -> [u8; RECORD_LEN] {
    debug_assert_eq!(bits.len(), 256);
    let mut bytes = [0u8; RECORD_LEN];
    for (i, byte) in bytes.iter_mut().enumerate() {
        let mut v = 0u8;
        for b in 0..8 {
            v = (v << 1) | (bits[i * 8 + b] & 1);
        }
        *byte = v;
    }
    bytes
}
