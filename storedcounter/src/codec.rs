//! Unsigned LEB128 varints, the only format a counter writes.
//!
//! Each byte carries seven bits of payload, least significant group first,
//! with the high bit set on every byte but the last. A `u64` takes at most
//! [`MAX_VARINT_LEN`] bytes.
//!
//! Decoding is lenient: an empty, truncated or overflowing buffer decodes to
//! `0` instead of failing. A counter whose stored bytes are corrupted will
//! therefore read as zero. Bytes after the terminating byte are ignored.

use prost::encoding::{decode_varint, encode_varint, encoded_len_varint};

/// The maximum number of bytes an encoded `u64` occupies.
pub const MAX_VARINT_LEN: usize = 10;

/// Returns the number of bytes `value` takes once encoded.
pub fn encoded_len(value: u64) -> usize {
    encoded_len_varint(value)
}

/// Encodes `value` with the minimal number of bytes.
pub fn encode(value: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(encoded_len(value));
    encode_varint(value, &mut buf);
    buf
}

/// Decodes a value from the front of `buf`, or `0` if `buf` does not start
/// with a well-formed varint.
pub fn decode(mut buf: &[u8]) -> u64 {
    decode_varint(&mut buf).unwrap_or(0)
}
