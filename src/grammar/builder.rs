// Two-phase grammar construction over a mutable corpus.
//
// Phase A assigns byte values 128..=255 to mined substrings; phase B stores
// further substrings out-of-line and replaces occurrences with 3-byte offset
// references. Both phases run mine -> accept -> replace rounds until the
// miner finds nothing profitable, so construction itself cannot fail.

use std::collections::BTreeMap;

use log::{debug, info};

use crate::corpus::{Corpus, TOKEN_MARKER};

use super::miner::{MinerConfig, TokenClass, find_best_token};
use super::replace::replace_in_corpus;
use super::{BYTE_TOKEN_BASE, MAX_BYTE_TOKENS, OFFSET_SPACE};

/// The grammar produced by a compression run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TokenTables {
    /// Single-byte token strings in mining order; index `i` is byte `128+i`.
    pub byte_tokens: Vec<Vec<u8>>,
    /// Offset-token strings keyed by their byte offset in the packed
    /// buffer's token region. Offsets are exactly the positions the strings
    /// occupy once concatenated with NUL terminators in mining order.
    pub offset_tokens: BTreeMap<u16, Vec<u8>>,
}

impl TokenTables {
    /// String assigned to a byte-token value, if any.
    pub fn byte_token(&self, value: u8) -> Option<&[u8]> {
        value
            .checked_sub(BYTE_TOKEN_BASE)
            .and_then(|i| self.byte_tokens.get(usize::from(i)))
            .map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.byte_tokens.is_empty() && self.offset_tokens.is_empty()
    }
}

/// Mine both token classes, rewriting the corpus in place.
///
/// A token string may itself contain byte-token values and offset
/// references accepted in earlier rounds; references always point at
/// strictly earlier offsets, so the reference graph is acyclic.
pub fn build_grammar(corpus: &mut Corpus, cfg: &MinerConfig) -> TokenTables {
    let mut tables = TokenTables::default();

    // Phase A: single-byte tokens.
    for value in BYTE_TOKEN_BASE..=u8::MAX {
        let Some(candidate) = find_best_token(corpus, TokenClass::SingleByte, cfg) else {
            break;
        };
        debug!(
            "byte token {}/{}: len {}, score {}",
            tables.byte_tokens.len() + 1,
            MAX_BYTE_TOKENS,
            candidate.bytes.len(),
            candidate.score
        );
        replace_in_corpus(corpus, &candidate.bytes, &[value]);
        tables.byte_tokens.push(candidate.bytes);
    }
    info!("mined {} single-byte tokens", tables.byte_tokens.len());

    // Phase B: offset tokens.
    let mut offset = 0usize;
    while offset < OFFSET_SPACE {
        let Some(candidate) = find_best_token(corpus, TokenClass::Offset, cfg) else {
            break;
        };
        debug!(
            "offset token at {}: len {}, score {}",
            offset,
            candidate.bytes.len(),
            candidate.score
        );
        let replacement = [
            TOKEN_MARKER,
            (offset & 0xFF) as u8,
            ((offset >> 8) & 0xFF) as u8,
        ];
        replace_in_corpus(corpus, &candidate.bytes, &replacement);
        let next = offset + candidate.bytes.len() + 1;
        tables.offset_tokens.insert(offset as u16, candidate.bytes);
        offset = next;
    }
    if !tables.offset_tokens.is_empty() {
        info!("mined {} offset tokens", tables.offset_tokens.len());
    }

    tables
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
