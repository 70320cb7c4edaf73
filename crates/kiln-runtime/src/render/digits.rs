//! Digit producers for the renderer
//!
//! Integer and UTF-8 producers emit least-significant first; the caller
//! copies them out in reverse. The float producer emits in reading order.

const LOWER: &[u8; 16] = b"0123456789abcdef";
const UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// Hex digits of a `u64`, at most 16
pub(crate) const HEX_MAX: usize = 16;
/// Decimal digits of a `u64`, at most 20
pub(crate) const DEC_MAX: usize = 20;
/// Longest UTF-8 sequence the encoder produces
pub(crate) const UTF8_MAX: usize = 6;
/// Mantissa positions of `%a`, radix point included
const FLOAT_POSITIONS: usize = 15;
/// Mantissa positions plus `p`, sign and exponent digits
pub(crate) const FLOAT_MAX: usize = FLOAT_POSITIONS + 2 + DEC_MAX;

/// Smallest and largest base-2 exponent the scaling loops will reach
const MIN_EXPONENT: i32 = (-307 - 15) * 4;
const MAX_EXPONENT: i32 = 308 * 4;

pub(crate) fn table(upper: bool) -> &'static [u8; 16] {
    if upper {
        UPPER
    } else {
        LOWER
    }
}

/// Reversed hex digits of `value`
pub(crate) fn hex_reversed(mut value: u64, upper: bool, out: &mut [u8; HEX_MAX]) -> usize {
    let digits = table(upper);
    if value == 0 {
        out[0] = b'0';
        return 1;
    }
    let mut len = 0;
    while value > 0 {
        out[len] = digits[(value & 15) as usize];
        value >>= 4;
        len += 1;
    }
    len
}

/// Reversed decimal digits of `value`
pub(crate) fn dec_reversed(mut value: u64, out: &mut [u8; DEC_MAX]) -> usize {
    if value == 0 {
        out[0] = b'0';
        return 1;
    }
    let mut len = 0;
    while value > 0 {
        out[len] = b'0' + (value % 10) as u8;
        value /= 10;
        len += 1;
    }
    len
}

/// Hexadecimal float body (no sign, no `0x`) of a finite, non-negative value
///
/// The value is scaled into `[1, 16)` four exponent bits at a time, then
/// digits are peeled off one per position. The exponent suffix is omitted
/// when it is zero.
pub(crate) fn hex_float(mut value: f64, upper: bool, out: &mut [u8; FLOAT_MAX]) -> usize {
    let digits = table(upper);
    if value == 0.0 {
        out[0] = b'0';
        return 1;
    }

    let mut exponent: i32 = 0;
    if value < 1.0 {
        while exponent > MIN_EXPONENT && value < 1.0 {
            value *= 16.0;
            exponent -= 4;
        }
    } else {
        while exponent < MAX_EXPONENT && value >= 16.0 {
            value *= 0.0625;
            exponent += 4;
        }
    }

    let mut len = 0;
    while value > 0.0 && len < FLOAT_POSITIONS {
        let digit = value as u32;
        value = (value - f64::from(digit)) * 16.0;
        out[len] = digits[(digit & 15) as usize];
        if len == 0 && value > 0.0 {
            len += 1;
            out[len] = b'.';
        }
        len += 1;
    }

    if exponent != 0 {
        let start = len;
        let mut reversed = [0u8; DEC_MAX];
        let n = dec_reversed(u64::from(exponent.unsigned_abs()), &mut reversed);
        out[len..len + n].copy_from_slice(&reversed[..n]);
        len += n;
        if exponent < 0 {
            out[len] = b'-';
            len += 1;
        }
        out[len] = if upper { b'P' } else { b'p' };
        len += 1;
        out[start..len].reverse();
    }
    len
}

/// Reversed UTF-8 encoding of one code point
///
/// Values needing more than six bytes become U+FFFD.
pub(crate) fn utf8_reversed(mut ch: u32, out: &mut [u8; UTF8_MAX]) -> usize {
    if ch <= 0x7f {
        out[0] = ch as u8;
        return 1;
    }
    let mut last_mask: u32 = 0x1f;
    let mut len = 0;
    while len < UTF8_MAX && ch > last_mask {
        out[len] = 0x80 | (ch & 0x3f) as u8;
        last_mask >>= 1;
        ch >>= 6;
        len += 1;
    }
    if len < UTF8_MAX {
        out[len] = ((!last_mask) << 2) as u8 | ch as u8;
        len + 1
    } else {
        out[..3].copy_from_slice(&[0xbd, 0xbf, 0xef]);
        3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn forward_hex(value: u64) -> String {
        let mut buf = [0u8; HEX_MAX];
        let n = hex_reversed(value, false, &mut buf);
        buf[..n].iter().rev().map(|&b| b as char).collect()
    }

    fn float(value: f64) -> String {
        let mut buf = [0u8; FLOAT_MAX];
        let n = hex_float(value, false, &mut buf);
        String::from_utf8(buf[..n].to_vec()).unwrap()
    }

    fn utf8(ch: u32) -> Vec<u8> {
        let mut buf = [0u8; UTF8_MAX];
        let n = utf8_reversed(ch, &mut buf);
        buf[..n].iter().rev().copied().collect()
    }

    #[test]
    fn test_hex_digits() {
        assert_eq!(forward_hex(0), "0");
        assert_eq!(forward_hex(0xbeef), "beef");
        assert_eq!(forward_hex(u64::MAX), "ffffffffffffffff");
    }

    #[rstest]
    #[case(1.0, "1")]
    #[case(0.5, "8p-4")]
    #[case(2.5, "2.8")]
    #[case(256.0, "1p8")]
    #[case(0.1, "1.999999999999ap-4")]
    #[case(0.0, "0")]
    fn test_hex_float(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(float(value), expected);
    }

    #[test]
    fn test_hex_float_extremes_fit() {
        assert!(float(f64::MAX).len() <= FLOAT_MAX);
        assert!(float(f64::MIN_POSITIVE).len() <= FLOAT_MAX);
        assert!(float(5e-324).len() <= FLOAT_MAX);
    }

    #[rstest]
    #[case(0x41)]
    #[case(0xe9)]
    #[case(0x20ac)]
    #[case(0x1f600)]
    fn test_utf8_matches_std(#[case] ch: u32) {
        let expected = char::from_u32(ch).unwrap().to_string().into_bytes();
        assert_eq!(utf8(ch), expected);
    }

    #[test]
    fn test_utf8_long_forms() {
        assert_eq!(utf8(0x3ff_ffff), vec![0xfc, 0xbf, 0xbf, 0xbf, 0xbf, 0xbf]);
        assert_eq!(utf8(0x7fff_ffff), vec![0xef, 0xbf, 0xbd]);
        assert_eq!(utf8(0xffff_ffff), vec![0xef, 0xbf, 0xbd]);
    }
}
