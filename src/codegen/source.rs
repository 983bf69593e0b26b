// Generation of the C translation unit that unpacks shaders at runtime.
//
// The emitted file is self-contained: capacity constants, the version
// literal, the single-byte token table, uniform alias definitions, and the
// unpacker routine. The routine must match the packed format exactly; its
// fixed output buffer and frame stack are sized here, at build time, from
// what the encoder actually produced.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::glsl::UNIFORM_ALIAS_PREFIX;

use super::escape::c_string_literal;

/// Inputs for the generated C source.
pub struct SourceParams<'a> {
    /// Single-byte token strings in mining order.
    pub byte_tokens: &'a [Vec<u8>],
    /// External-variable aliases (original name -> alias).
    pub aliases: &'a BTreeMap<String, String>,
    /// Version directive prepended to every expanded shader, no newline.
    pub version_directive: &'a str,
    /// Longest pre-tokenization asset length in bytes.
    pub longest_text: usize,
    /// Frames needed for the deepest reference chain.
    pub max_depth: usize,
}

/// Fixed capacity of the generated output buffer: the longest fully
/// expanded asset plus the version line and both NUL terminators.
pub fn max_output_size(longest_text: usize, version_directive: &str) -> usize {
    longest_text + version_directive.len() + 2
}

// The expansion routine. Frames are (source, position) pairs on a fixed
// stack; capacity and depth are re-checked before every write and push, and
// a violation stops expansion with a diagnostic, leaving a truncated,
// NUL-terminated result.
const UNPACK_ROUTINE: &str = r#"typedef struct {
	const char* src;
	size_t pos;
} unpack_frame;

char* shader_unpack(const char* const pack, size_t offset) {
	char* out = (char*)malloc(MAX_OUTPUT_SIZE + 1);
	unpack_frame stack[UNPACK_MAX_DEPTH];
	size_t depth = 0;
	size_t write_pos = VERSION_LENGTH;

	if (!out) {
		fprintf(stderr, "shader_unpack: allocation failed\n");
		return NULL;
	}

	memcpy(out, version, VERSION_LENGTH);

	stack[0].src = pack;
	stack[0].pos = offset;

	for (;;) {
		unpack_frame* top = &stack[depth];
		unsigned char c = (unsigned char)top->src[top->pos];

		if (c == '\0') {
			if (depth == 0) {
				break;
			}
			depth--;
		} else if (c == '$') {
			uint16_t ref = (uint16_t)((uint8_t)top->src[top->pos + 1] | ((uint8_t)top->src[top->pos + 2] << 8));
			top->pos += 3;
			if (depth + 1 >= UNPACK_MAX_DEPTH) {
				fprintf(stderr, "shader_unpack: reference nesting too deep\n");
				break;
			}
			depth++;
			stack[depth].src = pack + ref;
			stack[depth].pos = 0;
		} else if (c >= 128) {
			top->pos += 1;
			if (c - 128 >= TOKEN_COUNT) {
				fprintf(stderr, "shader_unpack: byte token out of range\n");
				break;
			}
			if (depth + 1 >= UNPACK_MAX_DEPTH) {
				fprintf(stderr, "shader_unpack: reference nesting too deep\n");
				break;
			}
			depth++;
			stack[depth].src = tokens[c - 128];
			stack[depth].pos = 0;
		} else {
			if (write_pos >= MAX_OUTPUT_SIZE) {
				fprintf(stderr, "shader_unpack: output buffer overflow\n");
				break;
			}
			out[write_pos] = (char)c;
			write_pos += 1;
			top->pos += 1;
		}
	}

	out[write_pos] = '\0';
	return out;
}
"#;

/// Render the unpacker translation unit.
pub fn generate_source(p: &SourceParams) -> String {
    let mut out = String::new();

    out.push_str("#include <stdint.h>\n");
    out.push_str("#include <stdlib.h>\n");
    out.push_str("#include <string.h>\n");
    out.push_str("#include <stdio.h>\n\n");

    let _ = writeln!(
        out,
        "#define MAX_OUTPUT_SIZE {}",
        max_output_size(p.longest_text, p.version_directive)
    );
    let _ = writeln!(out, "#define VERSION_LENGTH {}", p.version_directive.len() + 1);
    let _ = writeln!(out, "#define TOKEN_COUNT {}", p.byte_tokens.len());
    let _ = writeln!(out, "#define UNPACK_MAX_DEPTH {}", p.max_depth.max(1));
    out.push('\n');

    let _ = writeln!(
        out,
        "static const char* const version = \"{}\\n\";",
        p.version_directive
    );
    out.push('\n');

    out.push_str("static const char* const tokens[] = {\n");
    if p.byte_tokens.is_empty() {
        // A zero-length initializer is not valid C; the TOKEN_COUNT guard
        // keeps this placeholder unreachable.
        out.push_str("\t\"\",\n");
    }
    for token in p.byte_tokens {
        let _ = writeln!(out, "\t\"{}\",", c_string_literal(token));
    }
    out.push_str("};\n\n");

    for (name, alias) in p.aliases {
        if alias.starts_with(UNIFORM_ALIAS_PREFIX) {
            let _ = writeln!(out, "const char* uniform_{name} = \"{alias}\";");
        }
    }
    out.push('\n');

    out.push_str(UNPACK_ROUTINE);
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn aliases(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn constants_reflect_corpus_and_version() {
        let byte_tokens = vec![b"abc".to_vec()];
        let source = generate_source(&SourceParams {
            byte_tokens: &byte_tokens,
            aliases: &BTreeMap::new(),
            version_directive: "#version 330 core",
            longest_text: 100,
            max_depth: 3,
        });
        // 100 + 17 + 2
        assert!(source.contains("#define MAX_OUTPUT_SIZE 119\n"));
        assert!(source.contains("#define VERSION_LENGTH 18\n"));
        assert!(source.contains("#define TOKEN_COUNT 1\n"));
        assert!(source.contains("#define UNPACK_MAX_DEPTH 3\n"));
        assert!(source.contains("static const char* const version = \"#version 330 core\\n\";"));
    }

    #[test]
    fn token_table_lists_escaped_strings_in_order() {
        let byte_tokens = vec![b"vec4(".to_vec(), vec![0x01, b'A'], b"\n}".to_vec()];
        let source = generate_source(&SourceParams {
            byte_tokens: &byte_tokens,
            aliases: &BTreeMap::new(),
            version_directive: "#version 100",
            longest_text: 10,
            max_depth: 1,
        });
        let table_start = source.find("const tokens[]").unwrap();
        let a = source[table_start..].find("\t\"vec4(\",").unwrap();
        let b = source[table_start..].find("\t\"\\x01\"\"A\",").unwrap();
        let c = source[table_start..].find("\t\"\\n}\",").unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn empty_token_table_keeps_a_placeholder_entry() {
        let source = generate_source(&SourceParams {
            byte_tokens: &[],
            aliases: &BTreeMap::new(),
            version_directive: "#version 100",
            longest_text: 0,
            max_depth: 1,
        });
        assert!(source.contains("#define TOKEN_COUNT 0\n"));
        assert!(source.contains("static const char* const tokens[] = {\n\t\"\",\n};"));
    }

    #[test]
    fn only_uniform_class_aliases_are_defined() {
        let map = aliases(&[("resolution", "u0"), ("position", "a0"), ("time", "u1")]);
        let source = generate_source(&SourceParams {
            byte_tokens: &[],
            aliases: &map,
            version_directive: "#version 100",
            longest_text: 0,
            max_depth: 1,
        });
        assert!(source.contains("const char* uniform_resolution = \"u0\";"));
        assert!(source.contains("const char* uniform_time = \"u1\";"));
        assert!(!source.contains("uniform_position"));
    }

    #[test]
    fn routine_writes_version_before_expanding() {
        let source = generate_source(&SourceParams {
            byte_tokens: &[],
            aliases: &BTreeMap::new(),
            version_directive: "#version 100",
            longest_text: 0,
            max_depth: 1,
        });
        let memcpy = source.find("memcpy(out, version, VERSION_LENGTH);").unwrap();
        let loop_start = source.find("for (;;)").unwrap();
        assert!(memcpy < loop_start);
        assert!(source.contains("char* shader_unpack(const char* const pack, size_t offset)"));
    }
}
