//! Core self-test: random source, static skip and TODO handling

use kiln_runtime::{Harness, Status, TestEntry};
use std::any::Any;
use std::process::ExitCode;

static TESTS: [TestEntry; 5] = [
    TestEntry::new("memrand", memrand),
    TestEntry::new("rand", rand),
    TestEntry::new("skip", skipped).skip(),
    TestEntry::new("todo", todo).todo(),
    TestEntry::new("zeta", zeta),
];

/// Two fills in a row must differ
fn memrand(h: &Harness, _: &mut dyn Any) -> Status {
    let mut v = [0u8; 11];
    let mut w = [0u8; 11];
    h.fill_random(&mut v);
    h.fill_random(&mut w);
    if v == w {
        h.fail();
    }
    Status::Ok
}

/// Two draws in a row must differ
fn rand(h: &Harness, _: &mut dyn Any) -> Status {
    let v = h.rand();
    let w = h.rand();
    if v == w {
        h.fail();
    }
    Status::Ok
}

/// Never runs
fn skipped(h: &Harness, _: &mut dyn Any) -> Status {
    h.fail()
}

fn todo(_: &Harness, _: &mut dyn Any) -> Status {
    Status::NotOk
}

fn zeta(_: &Harness, _: &mut dyn Any) -> Status {
    Status::Ok
}

fn main() -> ExitCode {
    kiln_cli::main(&TESTS, &mut ())
}
