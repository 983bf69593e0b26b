// GLSL preprocessing: version-directive handling, external-variable
// extraction, and identifier renaming. This stage produces the normalized
// ASCII text the compressor works on; the compressor itself never looks at
// GLSL syntax.

use std::collections::BTreeMap;

use log::debug;

/// Alias prefix for uniforms; aliases with this prefix are exported by the
/// generated header and source.
pub const UNIFORM_ALIAS_PREFIX: char = 'u';

/// Alias prefix for `in`/`out` variables.
pub const STAGE_IO_ALIAS_PREFIX: char = 'a';

/// Aliases assigned to external variables across every shader in a run.
#[derive(Debug, Default, Clone)]
pub struct AliasMaps {
    /// uniform name -> `u<n>` alias.
    pub uniforms: BTreeMap<String, String>,
    /// in/out name -> `a<n>` alias.
    pub stage_io: BTreeMap<String, String>,
}

impl AliasMaps {
    /// Uniform and in/out aliases merged, for renaming and codegen.
    pub fn combined(&self) -> BTreeMap<String, String> {
        let mut all = self.uniforms.clone();
        all.extend(
            self.stage_io
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        all
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExternalKind {
    Uniform,
    StageIo,
}

#[inline]
fn is_ident_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

/// Keyword match at `i`, bounded by non-identifier characters on both sides.
fn matches_keyword(bytes: &[u8], i: usize, keyword: &[u8]) -> bool {
    if i > 0 && is_ident_char(bytes[i - 1]) {
        return false;
    }
    bytes[i..].starts_with(keyword)
        && bytes
            .get(i + keyword.len())
            .is_none_or(|&c| !is_ident_char(c))
}

/// Parse the integer of a `#version` directive; 0 when absent.
pub fn extract_version(code: &str) -> u32 {
    let Some(pos) = code.find("#version") else {
        return 0;
    };
    let rest = code[pos + "#version".len()..].trim_start();
    let digits: &str = &rest[..rest
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(rest.len())];
    digits.parse().unwrap_or(0)
}

/// Remove the first `#version` line, including its trailing newline.
pub fn strip_version_directive(code: &str) -> String {
    let Some(pos) = code.find("#version") else {
        return code.to_string();
    };
    let end = code[pos..]
        .find('\n')
        .map_or(code.len(), |i| pos + i + 1);
    let mut out = String::with_capacity(code.len());
    out.push_str(&code[..pos]);
    out.push_str(&code[end..]);
    out
}

/// Scan for `uniform`, `in`, and `out` declarations and assign an alias to
/// every newly seen variable name. Aliases are shared across shaders, so
/// the same uniform declared in several stages maps to one alias. Handles
/// comma-separated declarator lists and array suffixes.
pub fn extract_externals(code: &str, aliases: &mut AliasMaps) {
    let bytes = code.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }

        let kind = if matches_keyword(bytes, i, b"uniform") {
            i += 7;
            ExternalKind::Uniform
        } else if matches_keyword(bytes, i, b"in") {
            i += 2;
            ExternalKind::StageIo
        } else if matches_keyword(bytes, i, b"out") {
            i += 3;
            ExternalKind::StageIo
        } else {
            i += 1;
            continue;
        };

        // Type name, surrounded by whitespace.
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        while i < bytes.len() && is_ident_char(bytes[i]) {
            i += 1;
        }
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        // Declarator list: name[, name2, ...];
        loop {
            let start = i;
            while i < bytes.len() && is_ident_char(bytes[i]) {
                i += 1;
            }
            if start == i {
                break;
            }
            let name = &code[start..i];

            // Optional array suffix.
            if i < bytes.len() && bytes[i] == b'[' {
                i += 1;
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b' ') {
                    i += 1;
                }
                if i < bytes.len() && bytes[i] == b']' {
                    i += 1;
                }
            }

            let (map, prefix) = match kind {
                ExternalKind::Uniform => (&mut aliases.uniforms, UNIFORM_ALIAS_PREFIX),
                ExternalKind::StageIo => (&mut aliases.stage_io, STAGE_IO_ALIAS_PREFIX),
            };
            if !map.contains_key(name) {
                let alias = format!("{prefix}{}", map.len());
                debug!("external {kind:?} {name} -> {alias}");
                map.insert(name.to_string(), alias);
            }

            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i < bytes.len() && bytes[i] == b';' {
                i += 1;
                break;
            } else if i < bytes.len() && bytes[i] == b',' {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
            } else {
                break;
            }
        }
    }
}

/// Replace whole identifiers found in `map` with their aliases.
///
/// Identifier characters are `[A-Za-z0-9_]`; the input is expected to be
/// ASCII (enforced at ingestion).
pub fn rename_identifiers(code: &str, map: &BTreeMap<String, String>) -> String {
    let bytes = code.as_bytes();
    let mut out = String::with_capacity(code.len());
    let mut i = 0;
    while i < bytes.len() {
        if is_ident_char(bytes[i]) {
            let start = i;
            while i < bytes.len() && is_ident_char(bytes[i]) {
                i += 1;
            }
            let word = &code[start..i];
            match map.get(word) {
                Some(alias) => out.push_str(alias),
                None => out.push_str(word),
            }
        } else {
            out.push(bytes[i] as char);
            i += 1;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
