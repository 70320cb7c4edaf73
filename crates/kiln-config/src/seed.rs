//! Permissive seed parsing
//!
//! Seeds arrive from `-s`, `KILN_SEED` and `kiln.toml`. All three accept the
//! same loose syntax as C's `strtoul(text, NULL, 0)`: optional leading
//! whitespace and sign, `0x`/`0X` for hexadecimal, a leading `0` for octal,
//! decimal otherwise. Parsing stops at the first character that is not a
//! digit of the selected radix; no digits at all yields zero.

/// Parse a seed the way `strtoul(text, NULL, 0)` would, truncated to 32 bits.
///
/// Never fails. Out-of-range magnitudes saturate to `u64::MAX` before
/// truncation, and a leading `-` negates modulo 2^64.
pub fn parse_permissive(text: &str) -> u32 {
    let trimmed = text.trim_start();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let (radix, digits) = split_radix(unsigned);

    let mut value: u64 = 0;
    let mut overflow = false;
    for ch in digits.chars() {
        let Some(digit) = ch.to_digit(radix) else {
            break;
        };
        match value
            .checked_mul(u64::from(radix))
            .and_then(|v| v.checked_add(u64::from(digit)))
        {
            Some(next) => value = next,
            None => overflow = true,
        }
    }

    let value = if overflow {
        u64::MAX
    } else if negative {
        value.wrapping_neg()
    } else {
        value
    };
    value as u32
}

fn split_radix(text: &str) -> (u32, &str) {
    if let Some(rest) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        // "0x" without hex digits parses as the lone "0"
        if rest.starts_with(|c: char| c.is_ascii_hexdigit()) {
            return (16, rest);
        }
        return (10, "0");
    }
    if text.starts_with('0') {
        (8, text)
    } else {
        (10, text)
    }
}
