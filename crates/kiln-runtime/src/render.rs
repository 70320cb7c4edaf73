//! Portable printf-style renderer
//!
//! Renders a format string and an argument slice into any [`Output`]. Every
//! byte is counted whether or not it fits, so rendering into [`Measure`]
//! (capacity zero) yields exactly the length a full render would write.
//!
//! Supported conversions: `%s`, `%ls`, `%d`, `%i`, `%x`, `%X`, `%a`, `%A`,
//! `%p` and `%%`. Flags `0-+ #` are accepted and ignored; a width is parsed
//! and ignored; a precision limits `%s` and `%ls`. `*` in either position
//! consumes an integer argument. Length modifiers `hh`, `h`, `l`, `ll`, `z`
//! and `L` select the integer width.

mod arg;
mod digits;

pub use arg::Arg;

use digits::{DEC_MAX, FLOAT_MAX, HEX_MAX, UTF8_MAX};
use thiserror::Error;

/// Renderer errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderError {
    #[error("unsupported conversion '%{0}'")]
    UnsupportedConversion(char),

    #[error("rendered length exceeds {}", i32::MAX)]
    Overflow,

    #[error("conversion {position} has no argument")]
    MissingArgument { position: usize },

    #[error("argument {position} does not fit conversion '%{conversion}'")]
    ArgumentMismatch { position: usize, conversion: char },
}

/// Destination for rendered bytes
pub trait Output {
    /// Number of bytes that can be stored
    fn capacity(&self) -> usize;

    /// Store `byte` at `at`; only called with `at < capacity()`
    fn put(&mut self, at: usize, byte: u8);
}

impl Output for [u8] {
    fn capacity(&self) -> usize {
        self.len()
    }

    fn put(&mut self, at: usize, byte: u8) {
        self[at] = byte;
    }
}

/// Zero-capacity output that only counts
#[derive(Debug, Default, Clone, Copy)]
pub struct Measure;

impl Output for Measure {
    fn capacity(&self) -> usize {
        0
    }

    fn put(&mut self, _at: usize, _byte: u8) {}
}

/// Render `format` with `args` into `out`
///
/// Returns the full rendered length, which may exceed `out.capacity()`;
/// only the first `capacity()` bytes are stored. No terminator is written.
pub fn render<O: Output + ?Sized>(
    out: &mut O,
    format: &str,
    args: &[Arg<'_>],
) -> Result<usize, RenderError> {
    let mut sink = Sink {
        capacity: out.capacity(),
        out,
        count: 0,
    };
    let mut args = Args { args, next: 0 };
    let bytes = format.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'%' {
            sink.push(bytes[pos]);
            pos += 1;
            continue;
        }

        let spec = Spec::parse(bytes, &mut pos);
        let Some(&conversion) = bytes.get(pos) else {
            break;
        };
        pos += 1;
        let conversion = char::from(conversion);

        if spec.dynamic_width {
            args.count(conversion)?;
        }
        let precision = match spec.precision {
            Precision::Dynamic => args.count(conversion)?,
            Precision::Fixed(p) => p,
        };

        match conversion {
            's' if spec.length > 0 => {
                let value = args.take()?;
                match value {
                    Arg::WStr(text) => sink.wide(text, precision),
                    Arg::Null => sink.push_all(b"(null)"),
                    _ => return Err(args.mismatch(conversion)),
                }
            }
            's' => {
                let value = args.take()?;
                match value {
                    Arg::Str(text) => sink.narrow(text.as_bytes(), precision),
                    Arg::Null => sink.push_all(b"(null)"),
                    _ => return Err(args.mismatch(conversion)),
                }
            }
            'p' => {
                let value = args.take()?;
                let addr = match value {
                    Arg::Ptr(addr) => addr,
                    Arg::Null => 0,
                    _ => return Err(args.mismatch(conversion)),
                };
                match u64::try_from(addr) {
                    Ok(bits) => sink.hex(bits, false),
                    Err(_) if addr == 0 => sink.push_all(b"(null)"),
                    Err(_) => sink.push_all(b"(nonnull)"),
                }
            }
            'x' | 'X' => {
                let bits = args.bits(conversion)?;
                sink.hex(bits & spec.mask(), conversion == 'X');
            }
            'd' | 'i' => {
                let mask = spec.mask();
                let mut value = args.bits(conversion)? & mask;
                if value & !(mask >> 1) != 0 {
                    value = (!value).wrapping_add(1) & mask;
                    sink.push(b'-');
                }
                sink.decimal(value);
            }
            'a' | 'A' => {
                let value = match args.take()? {
                    Arg::Float(value) => value,
                    _ => return Err(args.mismatch(conversion)),
                };
                sink.hex_float(value, conversion == 'A');
            }
            '%' => sink.push(b'%'),
            other => return Err(RenderError::UnsupportedConversion(other)),
        }
    }

    if sink.count >= i32::MAX as usize {
        return Err(RenderError::Overflow);
    }
    Ok(sink.count)
}

/// Length `format` would render to
pub fn measure(format: &str, args: &[Arg<'_>]) -> Result<usize, RenderError> {
    render(&mut Measure, format, args)
}

enum Precision {
    Fixed(usize),
    Dynamic,
}

/// Parsed `%` specification up to the conversion character
struct Spec {
    dynamic_width: bool,
    precision: Precision,
    /// Net length modifier: `h` -1, `l` +1, `z` 5, `L` 10
    length: i32,
}

impl Spec {
    /// Parse from the `%` at `*pos`, leaving `*pos` on the conversion character
    fn parse(bytes: &[u8], pos: &mut usize) -> Self {
        let at = |i: usize| bytes.get(i).copied().unwrap_or(0);
        let mut i = *pos + 1;

        while matches!(at(i), b'0' | b'-' | b'+' | b' ' | b'#') {
            i += 1;
        }

        let mut dynamic_width = false;
        if at(i) == b'*' {
            dynamic_width = true;
            i += 1;
        } else {
            while at(i).is_ascii_digit() {
                i += 1;
            }
        }

        let mut precision = Precision::Fixed(0);
        if at(i) == b'.' {
            i += 1;
            if at(i) == b'*' {
                precision = Precision::Dynamic;
                i += 1;
            } else {
                let mut value = 0usize;
                while at(i).is_ascii_digit() {
                    value = (value * 10 + usize::from(at(i) - b'0')) & 127;
                    i += 1;
                }
                precision = Precision::Fixed(value);
            }
        }

        let mut length = 0i32;
        loop {
            match at(i) {
                b'h' => length -= 1,
                b'l' => length += 1,
                b'z' => length = 5,
                b'L' => length = 10,
                _ => break,
            }
            i += 1;
        }

        *pos = i;
        Spec {
            dynamic_width,
            precision,
            length,
        }
    }

    /// Integer mask selected by the length modifier
    fn mask(&self) -> u64 {
        match self.length {
            i32::MIN..=-2 => u64::from(u8::MAX),
            -1 => u64::from(u16::MAX),
            0 => u64::from(u32::MAX),
            1..=4 => u64::MAX,
            _ => usize::MAX as u64,
        }
    }
}

struct Args<'s, 'a> {
    args: &'s [Arg<'a>],
    next: usize,
}

impl<'a> Args<'_, 'a> {
    fn take(&mut self) -> Result<Arg<'a>, RenderError> {
        let value = self
            .args
            .get(self.next)
            .copied()
            .ok_or(RenderError::MissingArgument {
                position: self.next,
            })?;
        self.next += 1;
        Ok(value)
    }

    fn mismatch(&self, conversion: char) -> RenderError {
        RenderError::ArgumentMismatch {
            position: self.next.saturating_sub(1),
            conversion,
        }
    }

    fn bits(&mut self, conversion: char) -> Result<u64, RenderError> {
        let value = self.take()?;
        value.as_bits().ok_or_else(|| self.mismatch(conversion))
    }

    fn count(&mut self, conversion: char) -> Result<usize, RenderError> {
        let value = self.take()?;
        value.as_count().ok_or_else(|| self.mismatch(conversion))
    }
}

/// Counting writer over an [`Output`]
struct Sink<'o, O: Output + ?Sized> {
    out: &'o mut O,
    capacity: usize,
    count: usize,
}

impl<O: Output + ?Sized> Sink<'_, O> {
    fn push(&mut self, byte: u8) {
        if self.count < self.capacity {
            self.out.put(self.count, byte);
        }
        self.count = self.count.saturating_add(1);
    }

    fn push_all(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.push(byte);
        }
    }

    fn push_reversed(&mut self, bytes: &[u8]) {
        for &byte in bytes.iter().rev() {
            self.push(byte);
        }
    }

    /// `%s`: a zero precision means unlimited
    fn narrow(&mut self, text: &[u8], precision: usize) {
        let limit = if precision == 0 {
            text.len()
        } else {
            precision.min(text.len())
        };
        self.push_all(&text[..limit]);
    }

    /// `%ls`: precision counts code points; a NUL ends the string
    fn wide(&mut self, text: &[u32], precision: usize) {
        let mut encoded = [0u8; UTF8_MAX];
        for (index, &ch) in text.iter().enumerate() {
            if ch == 0 || (precision != 0 && index >= precision) {
                break;
            }
            let n = digits::utf8_reversed(ch, &mut encoded);
            self.push_reversed(&encoded[..n]);
        }
    }

    fn hex(&mut self, value: u64, upper: bool) {
        let mut buf = [0u8; HEX_MAX];
        let n = digits::hex_reversed(value, upper, &mut buf);
        self.push_reversed(&buf[..n]);
    }

    fn decimal(&mut self, value: u64) {
        let mut buf = [0u8; DEC_MAX];
        let n = digits::dec_reversed(value, &mut buf);
        self.push_reversed(&buf[..n]);
    }

    fn hex_float(&mut self, mut value: f64, upper: bool) {
        let word = |lower: &'static [u8], caps: &'static [u8]| if upper { caps } else { lower };
        if value.is_nan() {
            self.push_all(word(b"nan", b"NAN"));
            return;
        }
        if value < 0.0 {
            self.push(b'-');
            value = -value;
        }
        if value / 2.0 == value && value > 0.0 {
            self.push_all(word(b"inf", b"INF"));
            return;
        }
        self.push_all(word(b"0x", b"0X"));
        let mut buf = [0u8; FLOAT_MAX];
        let n = digits::hex_float(value, upper, &mut buf);
        self.push_all(&buf[..n]);
    }
}
