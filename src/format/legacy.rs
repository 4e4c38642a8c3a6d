//! Pre-header envelope layout.
//!
//! ```text
//! SALT (16) | NONCE (12) | CIPHERTEXT+TAG
//! ```
//!
//! Blocks written before the header existed carry no iteration count; the
//! reader supplies one.

use super::{Envelope, split_body};
use crate::crypto::{NONCE_LEN, SALT_LEN};
use crate::error::{CodecError, Corruption, Result};

/// Smallest legacy payload: salt plus nonce.
pub const MIN_LEN: usize = SALT_LEN + NONCE_LEN;

pub fn parse(data: &[u8]) -> Result<Envelope> {
    if data.len() < MIN_LEN {
        return Err(CodecError::Corrupted(Corruption::Truncated));
    }

    let (salt, nonce, ciphertext) = split_body(data)?;
    Ok(Envelope::legacy(salt, nonce, ciphertext))
}

pub fn serialize(envelope: &Envelope) -> Vec<u8> {
    let mut buf = Vec::with_capacity(MIN_LEN + envelope.ciphertext().len());
    buf.extend_from_slice(envelope.salt());
    buf.extend_from_slice(envelope.nonce());
    buf.extend_from_slice(envelope.ciphertext());
    buf
}
