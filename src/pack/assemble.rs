// Packed buffer assembly.
//
// Layout: every offset-token string NUL-terminated, concatenated in
// increasing-offset order, followed by every final asset text,
// NUL-terminated, in corpus order. Token offsets double as the implicit
// index during decoding, so the assembly walk re-derives each expected
// offset and refuses discontinuous tables.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::corpus::Corpus;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PackError {
    /// The offset-token table has no entry at an expected position. A gap
    /// means the grammar builder emitted references the packed layout
    /// cannot satisfy, so nothing is written.
    #[error("token table malformed: no entry at offset {expected}")]
    MalformedTokenTable { expected: usize },
}

/// The packed buffer and the absolute offset of each asset's text in it.
#[derive(Debug, Clone, Default)]
pub struct PackedBlob {
    pub bytes: Vec<u8>,
    /// (asset name, starting byte offset), in corpus order.
    pub offsets: Vec<(String, usize)>,
}

/// Serialize the offset-token region followed by the final asset texts.
pub fn assemble(
    corpus: &Corpus,
    offset_tokens: &BTreeMap<u16, Vec<u8>>,
) -> Result<PackedBlob, PackError> {
    let mut blob = PackedBlob::default();
    let mut current = 0usize;

    for _ in 0..offset_tokens.len() {
        let token = u16::try_from(current)
            .ok()
            .and_then(|key| offset_tokens.get(&key))
            .ok_or(PackError::MalformedTokenTable { expected: current })?;
        blob.bytes.extend_from_slice(token);
        blob.bytes.push(0);
        current += token.len() + 1;
    }

    for (name, text) in corpus.iter() {
        blob.offsets.push((name.to_string(), current));
        blob.bytes.extend_from_slice(text);
        blob.bytes.push(0);
        current += text.len() + 1;
    }

    Ok(blob)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
