// Grammar construction: dictionary mining, token replacement, and the
// two-phase builder that turns a corpus into token tables.
//
// - `miner`   — candidate scoring and selection (one best token per round)
// - `replace` — global find-and-replace of an accepted token
// - `builder` — phase orchestration and the resulting token tables

pub mod builder;
pub mod miner;
pub mod replace;

// Re-export key types for convenience.
pub use builder::{TokenTables, build_grammar};
pub use miner::{Candidate, MinerConfig, TokenClass, find_best_token};
pub use replace::{replace_all, replace_in_corpus};

/// First byte value assigned to single-byte tokens.
pub const BYTE_TOKEN_BASE: u8 = 128;

/// Capacity of the single-byte token class (values 128..=255).
pub const MAX_BYTE_TOKENS: usize = 128;

/// Exclusive upper bound of the 16-bit offset-token address space.
pub const OFFSET_SPACE: usize = 1 << 16;
