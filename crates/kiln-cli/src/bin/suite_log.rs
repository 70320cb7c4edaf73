//! Diagnostic log self-test: assertions and rendered messages
//!
//! Byte counts exclude any terminator; each message starts in a fresh log.

use kiln_runtime::{kiln_assert, log_printf, Arg, Harness, Status, TestEntry};
use std::any::Any;
use std::io::Write;
use std::process::ExitCode;

static TESTS: [TestEntry; 22] = [
    TestEntry::new("assert", assert),
    TestEntry::new("assert_fail", assert_fail).todo(),
    TestEntry::new("explicit_false", explicit_false).todo(),
    TestEntry::new("message", message),
    TestEntry::new("message_percent", message_percent),
    TestEntry::new("message_s", message_s),
    TestEntry::new("message_s/precision", message_s_precision),
    TestEntry::new("message_ls", message_ls),
    TestEntry::new("message_ls/precision", message_ls_precision),
    TestEntry::new("message_x", message_x),
    TestEntry::new("message_x/precision", message_x_precision),
    TestEntry::new("message_p", message_p),
    TestEntry::new("message_a", message_a),
    TestEntry::new("message_a/limits", message_a_limits),
    TestEntry::new("message_a/rand", message_a_rand),
    TestEntry::new("message_i", message_i),
    TestEntry::new("message_i/precision", message_i_precision),
    TestEntry::new("message_i/negative", message_i_negative),
    TestEntry::new("message_i/size", message_i_size),
    TestEntry::new("message_writer", message_writer),
    TestEntry::new("message_overflow", message_overflow),
    TestEntry::new("zeta", zeta),
];

fn hex_digits(mut n: u64) -> usize {
    let mut count = 1;
    while n >= 16 {
        n >>= 4;
        count += 1;
    }
    count
}

fn dec_digits(mut n: u64) -> usize {
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}

/// Positive values that fit in a signed `usize`
fn random_size(h: &Harness) -> usize {
    (h.rand() as usize).wrapping_mul(12345) & (usize::MAX >> 1)
}

fn assert(h: &Harness, _: &mut dyn Any) -> Status {
    let v = h.rand();
    let w = h.rand();
    kiln_assert!(h, v != w);
    Status::Ok
}

fn assert_fail(h: &Harness, _: &mut dyn Any) -> Status {
    let v = h.rand();
    let w = h.rand();
    kiln_assert!(h, v == w);
    Status::Ok
}

fn explicit_false(h: &Harness, _: &mut dyn Any) -> Status {
    let missing: Option<&str> = None;
    kiln_assert!(h, missing.is_some());
    Status::Ok
}

fn message(h: &Harness, _: &mut dyn Any) -> Status {
    h.log_write(b"Hello, world!");
    Status::Ok
}

fn message_percent(h: &Harness, _: &mut dyn Any) -> Status {
    let bytes = log_printf!(h, "100%%");
    kiln_assert!(h, bytes == 4);
    Status::Ok
}

fn message_s(h: &Harness, _: &mut dyn Any) -> Status {
    let bytes = log_printf!(h, "Quotation: \"%s\"", "Hello, world!");
    kiln_assert!(h, bytes == 13 + 13);
    Status::Ok
}

fn message_s_precision(h: &Harness, _: &mut dyn Any) -> Status {
    let text = "abcdefghijklm";
    let num = 1 + h.rand() % 12;
    let bytes = log_printf!(h, "Quotation: \"%.*s\" %.5s", num, text, text);
    kiln_assert!(h, bytes == 14 + num as usize + 5);
    Status::Ok
}

fn message_ls(h: &Harness, _: &mut dyn Any) -> Status {
    let wide: Vec<u32> = "Hello, world!".chars().map(u32::from).collect();
    let bytes = log_printf!(h, "Wide %ls: ", &wide[..]);
    log_printf!(h, "%ls", &[0x101u32, 0x250c]);
    kiln_assert!(h, bytes == 7 + 13);
    Status::Ok
}

fn message_ls_precision(h: &Harness, _: &mut dyn Any) -> Status {
    let wide: Vec<u32> = "abcdefghijklm".chars().map(u32::from).collect();
    let num = 1 + h.rand() % 12;
    let bytes = log_printf!(h, "Wide %.*ls", num, &wide[..]);
    kiln_assert!(h, bytes == 5 + num as usize);
    Status::Ok
}

fn message_x(h: &Harness, _: &mut dyn Any) -> Status {
    let num = h.rand();
    let bytes = log_printf!(h, "Number %x.", num);
    kiln_assert!(h, bytes == hex_digits(u64::from(num)) + 8);
    Status::Ok
}

fn message_x_precision(h: &Harness, _: &mut dyn Any) -> Status {
    let num = random_size(h);
    let bytes = log_printf!(h, "Number %0zX.", num);
    kiln_assert!(h, bytes == hex_digits(num as u64) + 8);
    Status::Ok
}

fn message_p(h: &Harness, _: &mut dyn Any) -> Status {
    let bytes = log_printf!(h, "Pointer %p != %p.", h as *const Harness, Arg::Null);
    kiln_assert!(h, bytes > 10);
    Status::Ok
}

fn message_a(h: &Harness, _: &mut dyn Any) -> Status {
    let bytes = log_printf!(h, "Float %a %a %a %a.", 1.0, 0.0, -1.0, f64::INFINITY);
    kiln_assert!(h, bytes >= 10 + 7);
    Status::Ok
}

fn message_a_limits(h: &Harness, _: &mut dyn Any) -> Status {
    let bytes = log_printf!(
        h,
        "Float %a %a %a %a.",
        f64::MAX,
        f64::MIN_POSITIVE,
        f64::EPSILON,
        f32::EPSILON
    );
    kiln_assert!(h, bytes >= 10 + 7);
    Status::Ok
}

fn message_a_rand(h: &Harness, _: &mut dyn Any) -> Status {
    let num = h.rand();
    let sign = if num & 1 == 1 { -1.0 } else { 1.0 };
    let v = sign * (f64::from(num) * 256.0 / f64::from(u32::MAX));
    let w = sign * (f64::from(num) / 256.0 / f64::from(u32::MAX));
    let bytes = log_printf!(h, "%a * %a = %a;", v, w, v * w);
    kiln_assert!(h, bytes > 10);
    Status::Ok
}

fn message_i(h: &Harness, _: &mut dyn Any) -> Status {
    let num = h.rand() % i32::MAX as u32;
    let bytes = log_printf!(h, "Number %i.", num);
    kiln_assert!(h, bytes == dec_digits(u64::from(num)) + 8);
    Status::Ok
}

fn message_i_precision(h: &Harness, _: &mut dyn Any) -> Status {
    let num = random_size(h);
    let bytes = log_printf!(h, "Number %*.*zi.", 1, 1, num);
    kiln_assert!(h, bytes == dec_digits(num as u64) + 8);
    Status::Ok
}

fn message_i_negative(h: &Harness, _: &mut dyn Any) -> Status {
    let magnitude = h.rand() % i32::MAX as u32;
    let num = -(magnitude as i32);
    let bytes = log_printf!(h, "Number %i.", num);
    let sign = usize::from(num < 0);
    kiln_assert!(h, bytes == dec_digits(u64::from(magnitude)) + sign + 8);
    Status::Ok
}

fn message_i_size(h: &Harness, _: &mut dyn Any) -> Status {
    let num = random_size(h);
    let bytes = log_printf!(h, "Number %zi.", num);
    kiln_assert!(h, bytes == dec_digits(num as u64) + 8);
    Status::Ok
}

fn message_writer(h: &Harness, _: &mut dyn Any) -> Status {
    let mut writer = h.log_writer();
    kiln_assert!(h, write!(writer, "native {:>4}|", 42).is_ok());
    Status::Ok
}

/// A message larger than the log is cut at capacity
fn message_overflow(h: &Harness, _: &mut dyn Any) -> Status {
    let capacity = h.log().capacity();
    let long = "x".repeat(capacity * 2);
    let bytes = log_printf!(h, "%s", long.as_str());
    kiln_assert!(h, bytes == capacity);
    kiln_assert!(h, log_printf!(h, "more") == 0);
    Status::Ok
}

fn zeta(_: &Harness, _: &mut dyn Any) -> Status {
    Status::Ok
}

fn main() -> ExitCode {
    kiln_cli::main(&TESTS, &mut ())
}
