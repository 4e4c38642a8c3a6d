use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::{KEY_LEN, MAX_ITERATIONS, MIN_ITERATIONS, SALT_LEN};
use crate::error::{CodecError, Result};

/// Clamps a requested PBKDF2 iteration count into
/// `[MIN_ITERATIONS, MAX_ITERATIONS]`.
pub fn clamp_iterations(iterations: u32) -> u32 {
    iterations.clamp(MIN_ITERATIONS, MAX_ITERATIONS)
}

/// Derive a 256-bit key from a password with PBKDF2-HMAC-SHA256.
///
/// The caller is expected to have clamped `iterations` already; this only
/// rejects inputs that cannot produce a key at all.
pub fn derive_key(
    password: &str,
    salt: &[u8],
    iterations: u32,
) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    if password.is_empty() {
        return Err(CodecError::EmptyPassword);
    }
    if salt.len() != SALT_LEN {
        return Err(CodecError::InvalidKdfInput("salt must be 16 bytes"));
    }
    if iterations == 0 {
        return Err(CodecError::InvalidKdfInput("iterations must be positive"));
    }

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key[..]);

    Ok(key)
}
