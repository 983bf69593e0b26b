#![no_main]
use std::collections::BTreeMap;

use glslpack::corpus::Corpus;
use glslpack::pack::Expander;
use glslpack::packer::{self, PackerOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() || data.len() > 512 {
        return;
    }

    // Map arbitrary bytes into the accepted input range: 7-bit, no NUL, no
    // reference marker.
    let sanitize = |b: u8| -> u8 {
        let b = b & 0x7F;
        if b == 0 || b == b'$' { b'x' } else { b }
    };

    // First byte picks the asset count; the rest is split evenly.
    let assets = usize::from(data[0] % 3) + 1;
    let payload: Vec<u8> = data[1..].iter().copied().map(sanitize).collect();
    let chunk = payload.len() / assets + 1;

    let mut corpus = Corpus::new();
    let mut originals: Vec<(String, Vec<u8>)> = Vec::new();
    for (i, piece) in payload.chunks(chunk).enumerate() {
        let name = format!("t{i}");
        let text = String::from_utf8_lossy(piece).into_owned();
        corpus.insert(&name, &text).unwrap();
        originals.push((name, text.into_bytes()));
    }

    let opts = PackerOptions {
        min_token_size: 2,
        version_directive: "#version 100".to_string(),
        ..Default::default()
    };
    let output = packer::pack_corpus(corpus, &BTreeMap::new(), &opts).unwrap();

    let expander = Expander::new(&output.pack, &output.tables.byte_tokens);
    let by_name: BTreeMap<&str, &[u8]> = originals
        .iter()
        .map(|(n, t)| (n.as_str(), t.as_slice()))
        .collect();
    for (name, offset) in &output.offsets {
        let expanded = expander.expand(*offset).unwrap();
        assert_eq!(expanded.as_slice(), by_name[name.as_str()]);
    }
});
