use std::fmt;

use thiserror::Error;

/// Coarse classification of a [`CodecError`].
///
/// Hosts usually only need this to decide how to present a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before any cryptographic work (empty password or block).
    Configuration,
    /// The block or envelope is structurally unusable.
    Format,
    /// The payload exceeds the configured size limit.
    SizeLimit,
    /// The authenticated cipher rejected the ciphertext.
    Authentication,
    /// Local failure unrelated to the input (e.g. no OS randomness).
    Internal,
}

/// The specific reason a payload was judged corrupted.
///
/// Never shown to the caller; it only reaches logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corruption {
    Decode,
    Truncated,
    SaltLength,
    NonceLength,
    CiphertextLength,
    InvalidUtf8,
}

impl fmt::Display for Corruption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self {
            Corruption::Decode => "payload is not valid url-safe base64",
            Corruption::Truncated => "payload too short for envelope",
            Corruption::SaltLength => "invalid salt length",
            Corruption::NonceLength => "invalid nonce length",
            Corruption::CiphertextLength => "ciphertext too short",
            Corruption::InvalidUtf8 => "plaintext is not valid UTF-8",
        };
        f.write_str(what)
    }
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("password is required")]
    EmptyPassword,

    #[error("block is empty")]
    EmptyBlock,

    #[error("invalid encrypted block: markers not found")]
    MissingMarkers,

    #[error("invalid block: content is empty")]
    EmptyPayload,

    #[error("block too large (max {max_mb}MB)")]
    TooLarge { max_mb: u32 },

    #[error("unsupported secure block version: {0}")]
    UnsupportedVersion(u8),

    #[error("invalid block format: corrupted data")]
    Corrupted(Corruption),

    #[error("decryption failed: wrong password or corrupted data")]
    Authentication,

    #[error("invalid key derivation input: {0}")]
    InvalidKdfInput(&'static str),

    #[error("OS random generator unavailable")]
    Random,

    #[error("encryption failed")]
    Encryption,
}

impl CodecError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodecError::EmptyPassword | CodecError::EmptyBlock => ErrorKind::Configuration,
            CodecError::MissingMarkers
            | CodecError::EmptyPayload
            | CodecError::UnsupportedVersion(_)
            | CodecError::Corrupted(_) => ErrorKind::Format,
            CodecError::TooLarge { .. } => ErrorKind::SizeLimit,
            CodecError::Authentication => ErrorKind::Authentication,
            CodecError::InvalidKdfInput(_) | CodecError::Random | CodecError::Encryption => {
                ErrorKind::Internal
            }
        }
    }

    /// Returns the corruption cause, if this is a corrupted-data error.
    pub fn corruption(&self) -> Option<Corruption> {
        match self {
            CodecError::Corrupted(c) => Some(*c),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;
