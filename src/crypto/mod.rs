//! Cryptographic primitives for secure blocks.
//!
//! Provides password-based key derivation and the authenticated cipher.

pub mod aead;
pub mod kdf;

pub use aead::{decrypt, encrypt, generate_nonce, generate_salt};
pub use kdf::{clamp_iterations, derive_key};

/// Length of the salt (16 bytes).
pub const SALT_LEN: usize = 16;
/// Length of the nonce (12 bytes for AES-256-GCM).
pub const NONCE_LEN: usize = 12;
/// Length of the encryption key (32 bytes / 256 bits).
pub const KEY_LEN: usize = 32;
/// Length of the authentication tag appended by the cipher (16 bytes).
pub const TAG_LEN: usize = 16;

/// Lowest accepted PBKDF2 iteration count.
pub const MIN_ITERATIONS: u32 = 100_000;
/// Highest accepted PBKDF2 iteration count.
pub const MAX_ITERATIONS: u32 = 10_000_000;
/// Iteration count used when nothing else is configured.
pub const DEFAULT_ITERATIONS: u32 = 600_000;
