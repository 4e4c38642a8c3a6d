//! Text armor for envelopes.
//!
//! A block is exactly three lines: the begin marker, the envelope encoded as
//! unpadded URL-safe base64, and the end marker. The alphabet contains no
//! characters that collide with common markup and no `=` padding.

use base64::{
    Engine,
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};

use crate::error::{CodecError, Corruption, Result};

pub const BEGIN_MARKER: &str = "---BEGIN SECURE BLOCK v1---";
pub const END_MARKER: &str = "---END SECURE BLOCK---";

/// Unpadded URL-safe base64 on output. Input is accepted with or without
/// padding; trailing bits must be zero so every payload has one spelling.
const ARMOR: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Renders envelope bytes as a block.
pub fn wrap(envelope: &[u8]) -> String {
    format!("{BEGIN_MARKER}\n{}\n{END_MARKER}", ARMOR.encode(envelope))
}

/// Returns the trimmed text strictly between the first begin marker and the
/// first end marker after it.
///
/// # Errors
///
/// - [`CodecError::MissingMarkers`] if either marker is absent
/// - [`CodecError::EmptyPayload`] if nothing but whitespace lies between them
pub fn payload(block: &str) -> Result<&str> {
    let start = block.find(BEGIN_MARKER).ok_or(CodecError::MissingMarkers)? + BEGIN_MARKER.len();
    let len = block[start..].find(END_MARKER).ok_or(CodecError::MissingMarkers)?;

    let payload = block[start..start + len].trim();
    if payload.is_empty() {
        return Err(CodecError::EmptyPayload);
    }
    Ok(payload)
}

/// Decodes an armored payload, enforcing `max_mb` on both the encoded and the
/// decoded length. The encoded length is checked before any decoding.
pub fn decode(payload: &str, max_mb: u32) -> Result<Vec<u8>> {
    let max_bytes = max_mb as usize * 1024 * 1024;

    if payload.len() > max_bytes {
        tracing::debug!(len = payload.len(), max_bytes, "encoded payload over size limit");
        return Err(CodecError::TooLarge { max_mb });
    }

    let data = ARMOR.decode(payload).map_err(|e| {
        tracing::debug!(error = %e, "failed to decode block payload");
        CodecError::Corrupted(Corruption::Decode)
    })?;

    if data.len() > max_bytes {
        tracing::debug!(len = data.len(), max_bytes, "decoded payload over size limit");
        return Err(CodecError::TooLarge { max_mb });
    }

    Ok(data)
}

/// True iff the trimmed text starts with the begin marker and ends with the
/// end marker. Purely syntactic.
pub fn is_encrypted_block(text: &str) -> bool {
    let text = text.trim();
    text.starts_with(BEGIN_MARKER) && text.ends_with(END_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_produces_three_lines() {
        let block = wrap(&[0xfb, 0xff, 0x00, 0x10]);
        let lines: Vec<&str> = block.lines().collect();

        assert_eq!(lines, vec![BEGIN_MARKER, "-_8AEA", END_MARKER]);
    }

    #[test]
    fn payload_ignores_surrounding_text() {
        let doc = format!("# notes\nbefore\n{}\nafter\n", wrap(b"abc"));
        assert_eq!(payload(&doc).unwrap(), "YWJj");
    }

    #[test]
    fn payload_requires_both_markers() {
        let only_begin = format!("{BEGIN_MARKER}\nYWJj\n");
        let only_end = format!("YWJj\n{END_MARKER}");
        let reversed = format!("{END_MARKER}\nYWJj\n{BEGIN_MARKER}");

        assert!(matches!(payload(&only_begin), Err(CodecError::MissingMarkers)));
        assert!(matches!(payload(&only_end), Err(CodecError::MissingMarkers)));
        assert!(matches!(payload(&reversed), Err(CodecError::MissingMarkers)));
    }

    #[test]
    fn whitespace_only_payload_is_empty() {
        let block = format!("{BEGIN_MARKER}\n  \t\n{END_MARKER}");
        assert!(matches!(payload(&block), Err(CodecError::EmptyPayload)));
    }

    #[test]
    fn decode_accepts_padded_input() {
        assert_eq!(decode("YWI", 1).unwrap(), b"ab");
        assert_eq!(decode("YWI=", 1).unwrap(), b"ab");
    }

    #[test]
    fn decode_rejects_foreign_alphabet() {
        let err = decode("YW+/", 1).unwrap_err();
        assert_eq!(err.corruption(), Some(Corruption::Decode));
    }

    #[test]
    fn decode_rejects_nonzero_trailing_bits() {
        // "YWJ" and "YWI" differ only in bits that fall outside the last byte
        let err = decode("YWJ", 1).unwrap_err();
        assert_eq!(err.corruption(), Some(Corruption::Decode));
    }

    #[test]
    fn oversized_payload_is_rejected_before_decoding() {
        // not valid base64, so reaching the decoder would be a Decode error
        let payload = "!".repeat(1024 * 1024 + 1);
        assert!(matches!(
            decode(&payload, 1),
            Err(CodecError::TooLarge { max_mb: 1 })
        ));
    }

    #[test]
    fn block_membership_is_syntactic() {
        assert!(is_encrypted_block(&format!("\n  {}  \n", wrap(b"x"))));
        assert!(is_encrypted_block(&format!("{BEGIN_MARKER}garbage{END_MARKER}")));
        assert!(!is_encrypted_block(&format!("text {}", wrap(b"x"))));
        assert!(!is_encrypted_block(""));
    }
}
