use zeroize::Zeroize;

use crate::block;
use crate::config::Config;
use crate::crypto::{self, clamp_iterations};
use crate::error::{CodecError, Corruption, Result};
use crate::format::{self, Envelope};

/// Encrypts and decrypts blocks under an explicit [`Config`].
///
/// A `Codec` holds no key material and no mutable state, so one value can
/// serve any number of concurrent calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct Codec {
    config: Config,
}

impl Codec {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Encrypts `plaintext` into a block using the configured iteration count.
    pub fn encrypt(&self, plaintext: &str, password: &str) -> Result<String> {
        encrypt(plaintext, password, self.config.iterations())
    }

    /// Decrypts the first block found in `block`.
    ///
    /// The configured iteration count is only used for legacy blocks, which
    /// do not carry their own.
    pub fn decrypt(&self, block: &str, password: &str) -> Result<String> {
        decrypt_with_limit(
            block,
            password,
            self.config.iterations(),
            self.config.max_decrypt_size_mb(),
        )
    }
}

/// Encrypts `plaintext` into a marker-wrapped block.
///
/// `iterations` is clamped into the accepted range and embedded in the
/// envelope. A fresh salt and nonce are drawn on every call, so encrypting
/// the same input twice never yields the same block.
///
/// # Errors
///
/// Fails with [`CodecError::EmptyPassword`] for an empty password, and with
/// an internal error if the OS random generator is unavailable.
pub fn encrypt(plaintext: &str, password: &str, iterations: u32) -> Result<String> {
    if password.is_empty() {
        return Err(CodecError::EmptyPassword);
    }

    let iterations = clamp_iterations(iterations);
    let salt = crypto::generate_salt()?;
    let nonce = crypto::generate_nonce()?;

    let key = crypto::derive_key(password, &salt, iterations)?;
    let ciphertext = crypto::encrypt(&key, &nonce, plaintext.as_bytes())?;
    drop(key);

    let envelope = Envelope::new(iterations, salt, nonce, ciphertext);
    let bytes = format::serialize(&envelope)?;

    tracing::debug!(
        plaintext_len = plaintext.len(),
        envelope_len = bytes.len(),
        iterations,
        "encrypted block"
    );

    Ok(block::wrap(&bytes))
}

/// Decrypts the first block found in `block`, using
/// [`Config::default`]'s size limit.
///
/// `default_iterations` (clamped) is used only for legacy envelopes; current
/// envelopes carry their own count, which is clamped as well.
pub fn decrypt(block: &str, password: &str, default_iterations: u32) -> Result<String> {
    decrypt_with_limit(
        block,
        password,
        default_iterations,
        Config::default().max_decrypt_size_mb(),
    )
}

fn decrypt_with_limit(
    block: &str,
    password: &str,
    default_iterations: u32,
    max_mb: u32,
) -> Result<String> {
    if password.is_empty() {
        return Err(CodecError::EmptyPassword);
    }
    if block.trim().is_empty() {
        return Err(CodecError::EmptyBlock);
    }

    let payload = block::payload(block)?;
    let data = block::decode(payload, max_mb)?;

    let envelope = format::parse(&data).inspect_err(|e| {
        tracing::debug!(error = ?e, len = data.len(), "rejected envelope");
    })?;

    let iterations = effective_iterations(&envelope, default_iterations);

    let key = crypto::derive_key(password, envelope.salt(), iterations)?;
    let mut plaintext = crypto::decrypt(&key, envelope.nonce(), envelope.ciphertext())
        .inspect_err(|_| {
            tracing::debug!(
                kind = ?envelope.kind(),
                iterations,
                ciphertext_len = envelope.ciphertext().len(),
                "authenticated decryption failed"
            );
        })?;
    drop(key);

    let text = String::from_utf8(std::mem::take(&mut *plaintext)).map_err(|e| {
        tracing::debug!(error = %e.utf8_error(), "decrypted bytes are not UTF-8");
        e.into_bytes().zeroize();
        CodecError::Corrupted(Corruption::InvalidUtf8)
    })?;

    tracing::debug!(kind = ?envelope.kind(), iterations, "decrypted block");
    Ok(text)
}

/// Iteration count to derive with: the embedded count for versioned
/// envelopes, `default_iterations` for legacy ones, clamped either way.
fn effective_iterations(envelope: &Envelope, default_iterations: u32) -> u32 {
    let iterations = clamp_iterations(envelope.iterations().unwrap_or(default_iterations));
    if envelope.iterations().is_some_and(|stored| stored != iterations) {
        tracing::warn!(
            stored = ?envelope.iterations(),
            used = iterations,
            "embedded iteration count out of range, clamped"
        );
    }
    iterations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{MAX_ITERATIONS, MIN_ITERATIONS, NONCE_LEN, SALT_LEN, TAG_LEN};
    use crate::error::ErrorKind;

    fn claiming(iterations: u32) -> Envelope {
        Envelope::new(iterations, [0u8; SALT_LEN], [0u8; NONCE_LEN], vec![0u8; TAG_LEN])
    }

    #[test]
    fn embedded_count_above_maximum_is_clamped() {
        assert_eq!(effective_iterations(&claiming(u32::MAX), MIN_ITERATIONS), MAX_ITERATIONS);
        assert_eq!(
            effective_iterations(&claiming(MAX_ITERATIONS + 1), MIN_ITERATIONS),
            MAX_ITERATIONS
        );
    }

    #[test]
    fn embedded_count_below_minimum_is_clamped() {
        assert_eq!(effective_iterations(&claiming(1), MAX_ITERATIONS), MIN_ITERATIONS);
    }

    #[test]
    fn embedded_count_in_range_wins_over_default() {
        assert_eq!(effective_iterations(&claiming(250_000), MIN_ITERATIONS), 250_000);
    }

    #[test]
    fn legacy_envelope_uses_clamped_default() {
        let legacy = Envelope::legacy([0u8; SALT_LEN], [0u8; NONCE_LEN], vec![0u8; TAG_LEN]);
        assert_eq!(effective_iterations(&legacy, 300_000), 300_000);
        assert_eq!(effective_iterations(&legacy, u32::MAX), MAX_ITERATIONS);
        assert_eq!(effective_iterations(&legacy, 0), MIN_ITERATIONS);
    }

    #[test]
    fn hello_world_scenario() {
        let block = encrypt("hello world", "pw123", 100_000).unwrap();
        assert_eq!(block.lines().count(), 3);
        assert!(crate::is_encrypted_block(&block));

        assert_eq!(decrypt(&block, "pw123", 100_000).unwrap(), "hello world");
        assert_eq!(
            decrypt(&block, "wrong", 100_000).unwrap_err().kind(),
            ErrorKind::Authentication
        );
    }

    #[test]
    fn empty_inputs_are_configuration_errors() {
        assert!(matches!(
            encrypt("x", "", MIN_ITERATIONS),
            Err(CodecError::EmptyPassword)
        ));
        assert!(matches!(
            decrypt("x", "", MIN_ITERATIONS),
            Err(CodecError::EmptyPassword)
        ));
        assert!(matches!(
            decrypt("", "pw", MIN_ITERATIONS),
            Err(CodecError::EmptyBlock)
        ));
    }

    #[test]
    fn codec_uses_configured_limit() {
        let codec = Codec::new(Config::new(MIN_ITERATIONS, 1));
        let huge = format!(
            "{}\n{}\n{}",
            block::BEGIN_MARKER,
            "A".repeat(1024 * 1024 + 4),
            block::END_MARKER
        );

        assert!(matches!(
            codec.decrypt(&huge, "pw"),
            Err(CodecError::TooLarge { max_mb: 1 })
        ));
    }

    #[test]
    fn non_utf8_plaintext_is_corrupted() {
        let salt = [1u8; crypto::SALT_LEN];
        let nonce = [2u8; crypto::NONCE_LEN];
        let key = crypto::derive_key("pw", &salt, MIN_ITERATIONS).unwrap();
        let ciphertext = crypto::encrypt(&key, &nonce, &[0xff, 0xfe]).unwrap();

        let envelope = Envelope::new(MIN_ITERATIONS, salt, nonce, ciphertext);
        let block = block::wrap(&format::serialize(&envelope).unwrap());

        let err = decrypt(&block, "pw", MIN_ITERATIONS).unwrap_err();
        assert_eq!(err.corruption(), Some(Corruption::InvalidUtf8));
    }
}
