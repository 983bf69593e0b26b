// Core pipeline: corpus and options in, artifacts out.
//
// Runs the grammar builder over the corpus, assembles the packed buffer,
// and renders the generated C artifacts. Pure in-memory transform; file
// handling lives in `io`.

use std::collections::BTreeMap;

use log::info;

use crate::codegen::{self, SourceParams, generate_header, generate_source};
use crate::corpus::Corpus;
use crate::grammar::{self, MinerConfig, TokenTables};
use crate::pack::{self, PackError, max_reference_depth};

/// Configuration for one compression run.
#[derive(Debug, Clone)]
pub struct PackerOptions {
    /// Minimum substring length considered for tokens.
    pub min_token_size: usize,
    /// Maximum substring length; 0 disables the bound. A nonzero bound also
    /// truncates mining to each asset's leading bytes.
    pub max_token_size: usize,
    /// Directive prepended to every expanded shader, without the newline.
    pub version_directive: String,
}

impl Default for PackerOptions {
    fn default() -> Self {
        Self {
            min_token_size: 3,
            max_token_size: 0,
            version_directive: String::new(),
        }
    }
}

/// Summary counters for a completed run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackStats {
    pub assets: usize,
    pub input_bytes: usize,
    pub packed_bytes: usize,
    pub byte_tokens: usize,
    pub offset_tokens: usize,
    pub max_output_size: usize,
}

/// Everything a compression run produces.
#[derive(Debug, Clone)]
pub struct PackOutput {
    /// The packed blob: token region followed by asset texts.
    pub pack: Vec<u8>,
    /// (asset name, packed-buffer offset), in corpus order.
    pub offsets: Vec<(String, usize)>,
    /// Generated C header text.
    pub header: String,
    /// Generated C source text.
    pub source: String,
    /// Final token tables.
    pub tables: TokenTables,
    pub stats: PackStats,
}

/// Compress the corpus and render every artifact.
///
/// Degenerate inputs are not errors: an empty corpus or one with nothing
/// worth tokenizing packs as-is with empty tables. The only failure is a
/// malformed offset table surfacing from assembly.
pub fn pack_corpus(
    mut corpus: Corpus,
    aliases: &BTreeMap<String, String>,
    opts: &PackerOptions,
) -> Result<PackOutput, PackError> {
    let input_bytes: usize = corpus.iter().map(|(_, t)| t.len()).sum();
    // Captured before mining: the longest *expanded* asset, which bounds the
    // generated output buffer.
    let longest_text = corpus.longest_len();

    let cfg = MinerConfig {
        min_token_size: opts.min_token_size,
        max_token_size: opts.max_token_size,
    };
    let tables = grammar::build_grammar(&mut corpus, &cfg);

    let blob = pack::assemble(&corpus, &tables.offset_tokens)?;
    let max_depth = max_reference_depth(&tables, &corpus);

    let header = generate_header(aliases, &blob.offsets);
    let source = generate_source(&SourceParams {
        byte_tokens: &tables.byte_tokens,
        aliases,
        version_directive: &opts.version_directive,
        longest_text,
        max_depth,
    });

    let stats = PackStats {
        assets: corpus.len(),
        input_bytes,
        packed_bytes: blob.bytes.len(),
        byte_tokens: tables.byte_tokens.len(),
        offset_tokens: tables.offset_tokens.len(),
        max_output_size: codegen::max_output_size(longest_text, &opts.version_directive),
    };
    info!(
        "packed {} assets: {} -> {} bytes, {} byte tokens, {} offset tokens",
        stats.assets, stats.input_bytes, stats.packed_bytes, stats.byte_tokens, stats.offset_tokens
    );

    Ok(PackOutput {
        pack: blob.bytes,
        offsets: blob.offsets,
        header,
        source,
        tables,
        stats,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
