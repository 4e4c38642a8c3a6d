//! Envelope format v1.
//!
//! V1 layout, integers big-endian:
//! ```text
//! MAGIC "SEC1" (4) | VERSION (1) | ITERATIONS (4) | SALT (16) | NONCE (12) | CIPHERTEXT+TAG
//! ```

use super::{Envelope, HEADER_LEN, ITER_LEN, MAGIC, MAGIC_LEN, VER_LEN, split_body};
use crate::crypto::{NONCE_LEN, SALT_LEN};
use crate::error::{CodecError, Corruption, Result};

/// Current envelope format version.
pub const VERSION_V1: u8 = 1;

/// Parses a v1 envelope. The embedded iteration count is returned as stored;
/// clamping is the caller's job.
///
/// # Errors
///
/// Returns an error if the version byte is not 1 or the body is too short.
pub fn parse(data: &[u8]) -> Result<Envelope> {
    if data.len() <= HEADER_LEN {
        return Err(CodecError::Corrupted(Corruption::Truncated));
    }

    let version = data[MAGIC_LEN];
    if version != VERSION_V1 {
        return Err(CodecError::UnsupportedVersion(version));
    }

    let offset = MAGIC_LEN + VER_LEN;
    let mut iter_bytes = [0u8; ITER_LEN];
    iter_bytes.copy_from_slice(&data[offset..offset + ITER_LEN]);
    let iterations = u32::from_be_bytes(iter_bytes);

    let (salt, nonce, ciphertext) = split_body(&data[HEADER_LEN..])?;

    Ok(Envelope::new(iterations, salt, nonce, ciphertext))
}

/// Serializes an envelope to v1 bytes with the given iteration count.
pub fn serialize(iterations: u32, envelope: &Envelope) -> Vec<u8> {
    let mut buf =
        Vec::with_capacity(HEADER_LEN + SALT_LEN + NONCE_LEN + envelope.ciphertext().len());

    buf.extend_from_slice(MAGIC);
    buf.push(VERSION_V1);
    buf.extend_from_slice(&iterations.to_be_bytes());

    buf.extend_from_slice(envelope.salt());
    buf.extend_from_slice(envelope.nonce());
    buf.extend_from_slice(envelope.ciphertext());

    buf
}
