// Worklist-based expansion of packed content.
//
// Mirrors the generated C unpacker byte for byte: literals in 0..=127 copy
// through, bytes >= 128 expand a single-byte token string, and the marker
// byte reads a little-endian 16-bit offset and expands the pack from there.
// Expansion frames live on an explicit stack (left-to-right, depth-first),
// so deeply nested grammars cannot exhaust the call stack. NUL bytes inside
// the 2 offset bytes of an escape are consumed with the escape and never
// read as terminators.

use thiserror::Error;

use crate::corpus::{Corpus, TOKEN_MARKER};
use crate::grammar::{BYTE_TOKEN_BASE, TokenTables};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExpandError {
    #[error("byte token 0x{value:02X} has no table entry")]
    UnknownByteToken { value: u8 },
    #[error("truncated reference at position {position}")]
    TruncatedReference { position: usize },
    #[error("expansion exceeds the {limit}-byte output capacity")]
    CapacityExceeded { limit: usize },
}

/// Expands packed content against a byte-token table.
pub struct Expander<'a> {
    pack: &'a [u8],
    byte_tokens: &'a [Vec<u8>],
    /// Output bytes an expansion may produce; `None` is unbounded.
    pub capacity: Option<usize>,
}

struct Frame<'a> {
    source: &'a [u8],
    pos: usize,
}

enum Step {
    Pop,
    PushPack(usize),
    PushToken(u8),
    Literal(u8),
}

impl<'a> Expander<'a> {
    pub fn new(pack: &'a [u8], byte_tokens: &'a [Vec<u8>]) -> Self {
        Self {
            pack,
            byte_tokens,
            capacity: None,
        }
    }

    /// Fully expand the NUL-terminated region starting at `offset`.
    pub fn expand(&self, offset: usize) -> Result<Vec<u8>, ExpandError> {
        let pack = self.pack;
        let byte_tokens = self.byte_tokens;

        let mut out = Vec::new();
        let mut stack: Vec<Frame<'a>> = vec![Frame {
            source: pack,
            pos: offset,
        }];

        loop {
            let step = {
                let Some(top) = stack.last_mut() else { break };
                match top.source.get(top.pos).copied() {
                    None | Some(0) => Step::Pop,
                    Some(TOKEN_MARKER) => {
                        if top.pos + 2 >= top.source.len() {
                            return Err(ExpandError::TruncatedReference { position: top.pos });
                        }
                        let lo = top.source[top.pos + 1];
                        let hi = top.source[top.pos + 2];
                        top.pos += 3;
                        Step::PushPack(usize::from(u16::from_le_bytes([lo, hi])))
                    }
                    Some(byte) if byte >= BYTE_TOKEN_BASE => {
                        top.pos += 1;
                        Step::PushToken(byte)
                    }
                    Some(byte) => {
                        top.pos += 1;
                        Step::Literal(byte)
                    }
                }
            };

            match step {
                Step::Pop => {
                    stack.pop();
                }
                Step::PushPack(target) => stack.push(Frame {
                    source: pack,
                    pos: target,
                }),
                Step::PushToken(value) => {
                    let token = byte_tokens
                        .get(usize::from(value - BYTE_TOKEN_BASE))
                        .ok_or(ExpandError::UnknownByteToken { value })?;
                    stack.push(Frame {
                        source: token.as_slice(),
                        pos: 0,
                    });
                }
                Step::Literal(byte) => {
                    if let Some(limit) = self.capacity {
                        if out.len() >= limit {
                            return Err(ExpandError::CapacityExceeded { limit });
                        }
                    }
                    out.push(byte);
                }
            }
        }

        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Reference depth
// ---------------------------------------------------------------------------

/// Number of expansion frames needed for the deepest reference chain in the
/// tables and final assets. Sizes the generated unpacker's frame stack.
pub fn max_reference_depth(tables: &TokenTables, corpus: &Corpus) -> usize {
    let mut byte_memo: Vec<Option<usize>> = vec![None; tables.byte_tokens.len()];
    let mut offset_memo: std::collections::BTreeMap<u16, usize> = std::collections::BTreeMap::new();
    corpus
        .iter()
        .map(|(_, text)| span_depth(text, tables, &mut byte_memo, &mut offset_memo))
        .max()
        .unwrap_or(1)
}

fn span_depth(
    span: &[u8],
    tables: &TokenTables,
    byte_memo: &mut Vec<Option<usize>>,
    offset_memo: &mut std::collections::BTreeMap<u16, usize>,
) -> usize {
    let mut deepest = 0usize;
    let mut i = 0;
    while i < span.len() {
        let byte = span[i];
        if byte == TOKEN_MARKER && i + 2 < span.len() {
            let target = u16::from_le_bytes([span[i + 1], span[i + 2]]);
            if let Some(child) = tables.offset_tokens.get(&target) {
                let depth = match offset_memo.get(&target) {
                    Some(&depth) => depth,
                    None => {
                        let depth = span_depth(child, tables, byte_memo, offset_memo);
                        offset_memo.insert(target, depth);
                        depth
                    }
                };
                deepest = deepest.max(depth);
            }
            i += 3;
        } else if byte >= BYTE_TOKEN_BASE {
            let index = usize::from(byte - BYTE_TOKEN_BASE);
            if index < tables.byte_tokens.len() {
                let depth = match byte_memo[index] {
                    Some(depth) => depth,
                    None => {
                        let depth =
                            span_depth(&tables.byte_tokens[index], tables, byte_memo, offset_memo);
                        byte_memo[index] = Some(depth);
                        depth
                    }
                };
                deepest = deepest.max(depth);
            }
            i += 1;
        } else {
            i += 1;
        }
    }
    1 + deepest
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
