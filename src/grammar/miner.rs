// Candidate mining: scan the corpus, score every repeated substring, and
// return the single best candidate for the current round.

use std::collections::HashMap;

use crate::corpus::{Corpus, TOKEN_MARKER};

// ---------------------------------------------------------------------------
// Token classes
// ---------------------------------------------------------------------------

/// Which token class a mining round is selecting for.
///
/// The class determines the byte cost of one replacement site, which feeds
/// the score and therefore where the miner draws the profitability line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    /// Replacement is one raw byte in 128..=255.
    SingleByte,
    /// Replacement is a marker byte plus a little-endian 16-bit offset.
    Offset,
}

impl TokenClass {
    /// Bytes occupied by one replacement site.
    #[inline]
    pub fn reference_cost(self) -> usize {
        match self {
            TokenClass::SingleByte => 1,
            TokenClass::Offset => 3,
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Substring length bounds for mining.
#[derive(Debug, Clone, Copy)]
pub struct MinerConfig {
    /// Minimum candidate length.
    pub min_token_size: usize,
    /// Maximum candidate length; 0 disables the bound.
    ///
    /// A nonzero bound also truncates the scanned window of every asset to
    /// its first `max_token_size` bytes. That is how the scan bound has
    /// always behaved and packed outputs depend on it, so it is kept as-is
    /// rather than generalized to a pure length cap.
    pub max_token_size: usize,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            min_token_size: 3,
            max_token_size: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// A selected candidate and its score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub bytes: Vec<u8>,
    /// Estimated net byte savings of adopting the candidate.
    pub score: i64,
}

struct Occurrence {
    count: usize,
    first_seen: usize,
}

/// True when a candidate starting at `start` would begin inside or just
/// after a reference escape (marker plus 2 offset bytes).
#[inline]
fn starts_in_escape(text: &[u8], start: usize) -> bool {
    (start >= 1 && text[start - 1] == TOKEN_MARKER)
        || (start >= 2 && text[start - 2] == TOKEN_MARKER)
}

/// True when the candidate ends with a marker whose offset bytes would be
/// cut off. Candidates running to the end of the scan window are exempt.
#[inline]
fn splits_escape(text: &[u8], start: usize, len: usize, window: usize) -> bool {
    let end = start + len;
    end < window && (text[end - 1] == TOKEN_MARKER || (end >= 2 && text[end - 2] == TOKEN_MARKER))
}

/// Return the highest-scoring repeated substring, or `None` when nothing
/// scores above zero.
///
/// Occurrences are counted across all assets, overlapping matches included.
/// The score of a substring of length `L` occurring `C` times is
/// `L*(C-1) - C*referenceCost - 1`. Ties keep the first-seen candidate;
/// assets are scanned in name order, so selection is deterministic.
pub fn find_best_token(corpus: &Corpus, class: TokenClass, cfg: &MinerConfig) -> Option<Candidate> {
    let min_len = cfg.min_token_size.max(1);
    let mut occurrences: HashMap<Vec<u8>, Occurrence> = HashMap::new();
    let mut seq = 0usize;

    for (_name, text) in corpus.iter() {
        let mut window = text.len();
        if cfg.max_token_size > 0 && window > cfg.max_token_size {
            window = cfg.max_token_size;
        }
        if window < min_len {
            continue;
        }
        for len in min_len..=window {
            for start in 0..=window - len {
                if starts_in_escape(text, start) || splits_escape(text, start, len, window) {
                    continue;
                }
                let entry = occurrences
                    .entry(text[start..start + len].to_vec())
                    .or_insert_with(|| {
                        let first_seen = seq;
                        seq += 1;
                        Occurrence {
                            count: 0,
                            first_seen,
                        }
                    });
                entry.count += 1;
            }
        }
    }

    let cost = class.reference_cost() as i64;
    let mut best: Option<(Candidate, usize)> = None;
    for (bytes, occ) in occurrences {
        if occ.count < 2 {
            continue;
        }
        let len = bytes.len() as i64;
        let count = occ.count as i64;
        let score = len * (count - 1) - count * cost - 1;
        let better = match &best {
            None => true,
            Some((current, first_seen)) => {
                score > current.score || (score == current.score && occ.first_seen < *first_seen)
            }
        };
        if better {
            best = Some((Candidate { bytes, score }, occ.first_seen));
        }
    }

    match best {
        Some((candidate, _)) if candidate.score > 0 => Some(candidate),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
