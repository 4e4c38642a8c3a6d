//! The single encrypt/decrypt action a host offers on a document.
//!
//! Selection beats cursor, and cursor beats whole document. Nothing here
//! knows about editors or terminals; hosts pass text and byte offsets in and
//! write the returned text back.

use std::ops::Range;

use anyhow::{Result, bail};

use crate::block::is_encrypted_block;
use crate::codec::Codec;
use crate::locate::{block_range, find_blocks};

/// What [`toggle`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    EncryptedSelection,
    DecryptedSelection,
    DecryptedBlock,
    EncryptedFile,
    DecryptedFile,
}

impl Outcome {
    /// Short confirmation suitable for a status line.
    pub fn message(&self) -> &'static str {
        match self {
            Outcome::EncryptedSelection => "selection encrypted",
            Outcome::DecryptedSelection => "selection decrypted",
            Outcome::DecryptedBlock => "block decrypted",
            Outcome::EncryptedFile => "file encrypted",
            Outcome::DecryptedFile => "file decrypted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggled {
    pub text: String,
    pub outcome: Outcome,
}

/// True if the whole document is one encrypted block. Hosts treat such a
/// document as read-only until it is decrypted.
pub fn is_locked(text: &str) -> bool {
    is_encrypted_block(text)
}

/// Encrypts or decrypts part of `text`.
///
/// `selection` is a byte range; an empty range is a bare cursor.
/// - non-empty selection: decrypt it if it is a block, otherwise replace it
///   with `"\n" + block + "\n"`
/// - cursor: decrypt the block containing or nearest to the cursor
/// - no block anywhere: encrypt or decrypt the whole document
///
/// # Errors
///
/// Fails if the selection is out of bounds or splits a character, if the
/// document is empty, if text to be decrypted holds more than one block, or
/// if the codec fails.
pub fn toggle(
    codec: &Codec,
    text: &str,
    selection: Range<usize>,
    password: &str,
) -> Result<Toggled> {
    let (from, to) = (
        selection.start.min(selection.end),
        selection.start.max(selection.end),
    );
    if to > text.len() {
        bail!("selection {from}..{to} is outside the document ({} bytes)", text.len());
    }
    if !text.is_char_boundary(from) || !text.is_char_boundary(to) {
        bail!("selection {from}..{to} does not fall on character boundaries");
    }

    if from < to {
        let selected = &text[from..to];
        let (replacement, outcome) = if is_encrypted_block(selected) {
            ensure_single_block(selected, "selection")?;
            (codec.decrypt(selected.trim(), password)?, Outcome::DecryptedSelection)
        } else {
            let block = codec.encrypt(selected, password)?;
            (format!("\n{block}\n"), Outcome::EncryptedSelection)
        };
        return Ok(Toggled {
            text: splice(text, from..to, &replacement),
            outcome,
        });
    }

    if let Some(range) = block_range(text, from, to) {
        let plain = codec.decrypt(range.block, password)?;
        return Ok(Toggled {
            text: splice(text, range.begin..range.end, &plain),
            outcome: Outcome::DecryptedBlock,
        });
    }

    toggle_file(codec, text, password)
}

/// Whole-document variant of [`toggle`].
pub fn toggle_file(codec: &Codec, text: &str, password: &str) -> Result<Toggled> {
    if text.is_empty() {
        bail!("document is empty, nothing to do");
    }

    if is_locked(text) {
        ensure_single_block(text, "document")?;
        Ok(Toggled {
            text: codec.decrypt(text.trim(), password)?,
            outcome: Outcome::DecryptedFile,
        })
    } else {
        Ok(Toggled {
            text: codec.encrypt(text, password)?,
            outcome: Outcome::EncryptedFile,
        })
    }
}

/// Text that passes [`is_encrypted_block`] may still hold several blocks with
/// plain text between them. Decrypting it would keep only the first block.
fn ensure_single_block(text: &str, what: &str) -> Result<()> {
    let trimmed = text.trim();
    match find_blocks(trimmed).as_slice() {
        [only] if *only == (0..trimmed.len()) => Ok(()),
        _ => bail!("{what} contains more than one block"),
    }
}

fn splice(text: &str, range: Range<usize>, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len() - range.len() + replacement.len());
    out.push_str(&text[..range.start]);
    out.push_str(replacement);
    out.push_str(&text[range.end..]);
    out
}
