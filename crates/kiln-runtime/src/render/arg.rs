//! Renderer arguments
//!
//! The renderer is fed a slice of [`Arg`] values instead of a C-style
//! variadic list. `From` conversions let [`log_printf!`](crate::log_printf)
//! accept plain Rust values.

/// One argument consumed by a conversion
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arg<'a> {
    /// `%s`
    Str(&'a str),
    /// `%ls`, one code point per element
    WStr(&'a [u32]),
    /// `%d`, `%i`, `%x`, or a `*` width/precision
    Int(i64),
    /// `%d`, `%i`, `%x`, or a `*` width/precision
    Uint(u64),
    /// `%a`
    Float(f64),
    /// `%p`
    Ptr(usize),
    /// Absent string or pointer
    Null,
}

impl Arg<'_> {
    /// Bits for an integer conversion, before masking
    pub(crate) fn as_bits(&self) -> Option<u64> {
        match *self {
            Arg::Int(v) => Some(v as u64),
            Arg::Uint(v) => Some(v),
            Arg::Ptr(v) => Some(v as u64),
            Arg::Null => Some(0),
            _ => None,
        }
    }

    /// Value of a `*` width or precision, negative clamped to zero
    pub(crate) fn as_count(&self) -> Option<usize> {
        match *self {
            Arg::Int(v) => Some(usize::try_from(v).unwrap_or(0)),
            Arg::Uint(v) => Some(usize::try_from(v).unwrap_or(usize::MAX)),
            _ => None,
        }
    }
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(value: &'a str) -> Self {
        Arg::Str(value)
    }
}

impl<'a> From<&'a String> for Arg<'a> {
    fn from(value: &'a String) -> Self {
        Arg::Str(value.as_str())
    }
}

impl<'a> From<Option<&'a str>> for Arg<'a> {
    fn from(value: Option<&'a str>) -> Self {
        value.map_or(Arg::Null, Arg::Str)
    }
}

impl<'a> From<&'a [u32]> for Arg<'a> {
    fn from(value: &'a [u32]) -> Self {
        Arg::WStr(value)
    }
}

impl<'a, const N: usize> From<&'a [u32; N]> for Arg<'a> {
    fn from(value: &'a [u32; N]) -> Self {
        Arg::WStr(value)
    }
}

impl<T> From<*const T> for Arg<'_> {
    fn from(value: *const T) -> Self {
        if value.is_null() {
            Arg::Null
        } else {
            Arg::Ptr(value as usize)
        }
    }
}

macro_rules! impl_from_int {
    ($variant:ident as $wide:ty: $($ty:ty),*) => {
        $(
            impl From<$ty> for Arg<'_> {
                fn from(value: $ty) -> Self {
                    Arg::$variant(value as $wide)
                }
            }
        )*
    };
}

impl_from_int!(Int as i64: i8, i16, i32, i64, isize);
impl_from_int!(Uint as u64: u8, u16, u32, u64, usize);

impl From<f32> for Arg<'_> {
    fn from(value: f32) -> Self {
        Arg::Float(f64::from(value))
    }
}

impl From<f64> for Arg<'_> {
    fn from(value: f64) -> Self {
        Arg::Float(value)
    }
}
