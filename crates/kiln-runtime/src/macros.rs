//! Convenience macros for test bodies

/// Append rendered text to the test's diagnostic log
///
/// Arguments are converted with `Arg::from`, so plain strings, integers,
/// floats and raw pointers can be passed directly. Returns the number of
/// bytes stored.
///
/// ```
/// use kiln_runtime::{log_printf, Harness};
///
/// let h = Harness::default();
/// assert_eq!(log_printf!(h, "%s=%d", "answer", 42), 9);
/// ```
#[macro_export]
macro_rules! log_printf {
    ($harness:expr, $format:expr $(, $arg:expr)* $(,)?) => {
        $harness.log_printf($format, &[$($crate::render::Arg::from($arg)),*])
    };
}

/// Fail the test unless `cond` holds, noting the location in the log
///
/// ```
/// use kiln_runtime::{kiln_assert, Harness, Status};
///
/// let h = Harness::default();
/// let status = h.run_protected(&mut || {
///     kiln_assert!(h, 1 + 1 == 3);
///     Status::Ok
/// });
/// assert_eq!(status, Status::NotOk);
/// ```
#[macro_export]
macro_rules! kiln_assert {
    ($harness:expr, $cond:expr $(,)?) => {
        if !$cond {
            $harness.assert_failed(stringify!($cond), file!(), line!())
        }
    };
}
