//! Quoting of log bytes for the TAP diagnostic block

use std::fmt::Write;

/// Render raw log bytes as the body of a double-quoted string
///
/// Quotes and control bytes are escaped, NUL bytes are dropped, and a hex
/// digit directly after a `\xHH` escape is escaped too so that a reader
/// cannot fold it into the preceding escape.
pub fn escape_for_render(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut after_hex = false;

    for &byte in bytes {
        if byte == 0 {
            continue;
        }
        let follows_hex = after_hex;
        after_hex = false;

        match byte {
            b'"' => out.push_str("\\\""),
            b if follows_hex && b.is_ascii_hexdigit() => {
                push_hex(&mut out, b);
                after_hex = true;
            }
            b if b.is_ascii_graphic() => out.push(char::from(b)),
            b' ' => out.push(' '),
            b'\n' => out.push_str("\\n"),
            b'\t' => out.push_str("\\t"),
            0x08 => out.push_str("\\b"),
            0x0c => out.push_str("\\f"),
            0x0b => out.push_str("\\v"),
            0x07 => out.push_str("\\a"),
            b => {
                push_hex(&mut out, b);
                after_hex = true;
            }
        }
    }
    out
}

fn push_hex(out: &mut String, byte: u8) {
    // Writing to a String cannot fail
    let _ = write!(out, "\\x{:02x}", byte);
}
