//! Password-protected text blocks that can live inside ordinary documents.
//!
//! ```text
//! ---BEGIN SECURE BLOCK v1---
//! U0VDMQEACSfA...
//! ---END SECURE BLOCK---
//! ```
//!
//! The payload is an envelope (`"SEC1" | version | iterations | salt | nonce |
//! ciphertext+tag`) encrypted with AES-256-GCM under a PBKDF2-HMAC-SHA256
//! key, encoded as unpadded URL-safe base64. Blocks from before the envelope
//! header existed are still readable.

pub mod block;
mod codec;
pub mod config;
pub mod crypto;
pub mod document;
mod error;
pub mod format;
pub mod locate;
pub mod storage;

pub use crate::block::{BEGIN_MARKER, END_MARKER, is_encrypted_block};
pub use crate::codec::{Codec, decrypt, encrypt};
pub use crate::config::Config;
pub use crate::error::{CodecError, Corruption, ErrorKind};
pub use crate::storage::Storage;
