// Generation of the companion C header: per-asset offset constants, extern
// declarations for uniform aliases, and the unpacker prototype.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::glsl::UNIFORM_ALIAS_PREFIX;

/// Derive the C identifier for an asset name: strip any directory path and
/// extension, replace non-identifier characters, and prefix `shader_` (which
/// also guards a leading digit).
fn asset_identifier(name: &str) -> String {
    let begin = name.rfind(['/', '\\']).map_or(0, |i| i + 1);
    let end = match name.rfind('.') {
        Some(i) if i >= begin => i,
        _ => name.len(),
    };
    let stem: String = name[begin..end]
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("shader_{stem}")
}

/// Render the header for the given aliases and packed-buffer offsets.
pub fn generate_header(aliases: &BTreeMap<String, String>, offsets: &[(String, usize)]) -> String {
    let mut out = String::from("#pragma once\n\n#include <stddef.h>\n\n");

    if !offsets.is_empty() {
        out.push_str("enum ShaderOffset {\n");
        for (name, offset) in offsets {
            let _ = writeln!(out, "\t{} = {offset},", asset_identifier(name));
        }
        out.push_str("};\n\n");
    }

    for (name, alias) in aliases {
        if alias.starts_with(UNIFORM_ALIAS_PREFIX) {
            let _ = writeln!(out, "extern const char* uniform_{name};");
        }
    }
    out.push('\n');

    out.push_str("char* shader_unpack(const char* pack, size_t offset);\n");
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
