//! Binary envelope handling for secure blocks.
//!
//! Two layouts exist. The current one starts with a magic constant, a
//! version byte and the iteration count; the legacy one is bare
//! `salt | nonce | ciphertext` and relies on an externally supplied
//! iteration count. [`detect`] decides between them with a single probe
//! before any cryptographic work starts.

use std::fmt;

use zeroize::Zeroize;

use crate::crypto::{NONCE_LEN, SALT_LEN, TAG_LEN};
use crate::error::{CodecError, Corruption, Result};

pub mod legacy;
pub mod v1;

/// Magic bytes identifying a versioned envelope ("SEC1").
pub const MAGIC: &[u8; 4] = b"SEC1";
/// Length of magic bytes.
pub const MAGIC_LEN: usize = 4;
/// Length of version field.
pub const VER_LEN: usize = 1;
/// Length of the big-endian iteration count field.
pub const ITER_LEN: usize = 4;
/// Length of the fixed header preceding salt and nonce.
pub const HEADER_LEN: usize = MAGIC_LEN + VER_LEN + ITER_LEN;
/// Latest format version
pub const CURRENT_VERSION: u8 = v1::VERSION_V1;

/// Layout of a decoded payload, as decided by the magic probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeKind {
    /// Magic present; carries the raw version byte, supported or not.
    Versioned(u8),
    /// No magic: `salt | nonce | ciphertext` with external iteration count.
    Legacy,
}

/// Classifies decoded bytes. Total and side-effect free.
pub fn detect(data: &[u8]) -> EnvelopeKind {
    if data.len() > HEADER_LEN && data.starts_with(MAGIC) {
        EnvelopeKind::Versioned(data[MAGIC_LEN])
    } else {
        EnvelopeKind::Legacy
    }
}

/// A parsed envelope.
///
/// Salt and nonce are wiped when the envelope is dropped and left out of
/// `Debug` output.
pub struct Envelope {
    kind: EnvelopeKind,
    iterations: Option<u32>,
    salt: [u8; SALT_LEN],
    nonce: [u8; NONCE_LEN],
    ciphertext: Vec<u8>,
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("kind", &self.kind)
            .field("iterations", &self.iterations)
            .field("ciphertext_len", &self.ciphertext.len())
            .finish_non_exhaustive()
    }
}

impl Drop for Envelope {
    fn drop(&mut self) {
        self.salt.zeroize();
        self.nonce.zeroize();
    }
}

impl Envelope {
    /// Creates a current-version envelope.
    pub fn new(
        iterations: u32,
        salt: [u8; SALT_LEN],
        nonce: [u8; NONCE_LEN],
        ciphertext: Vec<u8>,
    ) -> Self {
        Self {
            kind: EnvelopeKind::Versioned(CURRENT_VERSION),
            iterations: Some(iterations),
            salt,
            nonce,
            ciphertext,
        }
    }

    /// Creates a legacy envelope, which carries no iteration count.
    pub fn legacy(salt: [u8; SALT_LEN], nonce: [u8; NONCE_LEN], ciphertext: Vec<u8>) -> Self {
        Self {
            kind: EnvelopeKind::Legacy,
            iterations: None,
            salt,
            nonce,
            ciphertext,
        }
    }

    pub fn kind(&self) -> EnvelopeKind {
        self.kind
    }

    /// The iteration count embedded in the envelope, exactly as stored.
    ///
    /// `None` for legacy envelopes.
    pub fn iterations(&self) -> Option<u32> {
        self.iterations
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    pub fn nonce(&self) -> &[u8; NONCE_LEN] {
        &self.nonce
    }

    /// Ciphertext with the authentication tag appended.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }
}

/// Parses decoded bytes into an envelope, dispatching on [`detect`].
///
/// # Errors
///
/// - [`CodecError::UnsupportedVersion`] if the magic is present but the
///   version is unknown
/// - [`CodecError::Corrupted`] if salt, nonce or ciphertext are missing
pub fn parse(data: &[u8]) -> Result<Envelope> {
    match detect(data) {
        EnvelopeKind::Versioned(v1::VERSION_V1) => v1::parse(data),
        EnvelopeKind::Versioned(version) => Err(CodecError::UnsupportedVersion(version)),
        EnvelopeKind::Legacy => legacy::parse(data),
    }
}

/// Serializes an envelope to bytes in its own layout.
///
/// # Errors
///
/// [`CodecError::UnsupportedVersion`] if the envelope claims a version this
/// crate cannot write.
pub fn serialize(envelope: &Envelope) -> Result<Vec<u8>> {
    match (envelope.kind(), envelope.iterations()) {
        (EnvelopeKind::Versioned(v1::VERSION_V1), Some(iterations)) => {
            Ok(v1::serialize(iterations, envelope))
        }
        (EnvelopeKind::Versioned(version), _) => Err(CodecError::UnsupportedVersion(version)),
        (EnvelopeKind::Legacy, _) => Ok(legacy::serialize(envelope)),
    }
}

/// Splits `salt | nonce | ciphertext` shared by both layouts.
fn split_body(body: &[u8]) -> Result<([u8; SALT_LEN], [u8; NONCE_LEN], Vec<u8>)> {
    let salt: [u8; SALT_LEN] = body
        .get(..SALT_LEN)
        .and_then(|s| s.try_into().ok())
        .ok_or(CodecError::Corrupted(Corruption::SaltLength))?;

    let nonce: [u8; NONCE_LEN] = body
        .get(SALT_LEN..SALT_LEN + NONCE_LEN)
        .and_then(|n| n.try_into().ok())
        .ok_or(CodecError::Corrupted(Corruption::NonceLength))?;

    let ciphertext = &body[SALT_LEN + NONCE_LEN..];
    // an empty plaintext still carries a full tag
    if ciphertext.len() < TAG_LEN {
        return Err(CodecError::Corrupted(Corruption::CiphertextLength));
    }

    Ok((salt, nonce, ciphertext.to_vec()))
}
