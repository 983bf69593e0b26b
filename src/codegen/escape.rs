// C string-literal escaping for token strings.
//
// Token strings carry arbitrary bytes: control characters, assigned
// byte-token values >= 128, and embedded offset escapes. Unrepresentable
// bytes become uppercase 2-digit \xHH escapes; when the byte after such an
// escape is itself a hex digit, the literal is closed and reopened so a C
// compiler cannot absorb the digit into the escape.

use std::fmt::Write;

/// Render `bytes` as the body of a C string literal (no outer quotes).
pub fn c_string_literal(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for (i, &byte) in bytes.iter().enumerate() {
        match byte {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x08 => out.push_str("\\b"),
            0x0C => out.push_str("\\f"),
            0x07 => out.push_str("\\a"),
            0x0B => out.push_str("\\v"),
            0x20..=0x7E => out.push(byte as char),
            _ => {
                let _ = write!(out, "\\x{byte:02X}");
                if bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit) {
                    out.push_str("\"\"");
                }
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
