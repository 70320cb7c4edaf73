//! Bail-out self-test: from a fixture setup and from a body

use kiln_runtime::{Fixture, Harness, Status, TestEntry};
use std::any::Any;
use std::process::ExitCode;

static BAD_SETUP: Fixture = Fixture::new(setup_bad).with_teardown(teardown_bad);

static TESTS: [TestEntry; 4] = [
    TestEntry::new("alpha", pass),
    TestEntry::new("setup_fail", unreachable_body)
        .todo()
        .with_fixture(&BAD_SETUP),
    TestEntry::new("zeta", pass),
    TestEntry::new("body_bail", body_bail),
];

fn setup_bad(h: &Harness, _: &mut dyn Any) -> Option<Box<dyn Any>> {
    h.bail_out(Some("setup was bad."))
}

fn teardown_bad(_: &Harness, _: Box<dyn Any>) {
    eprintln!("# teardown ran");
}

fn unreachable_body(_: &Harness, _: &mut dyn Any) -> Status {
    eprintln!("# body ran");
    Status::Ok
}

fn body_bail(h: &Harness, _: &mut dyn Any) -> Status {
    h.log_write(b"partial");
    h.bail_out(None)
}

fn pass(_: &Harness, _: &mut dyn Any) -> Status {
    Status::Ok
}

fn main() -> ExitCode {
    kiln_cli::main(&TESTS, &mut ())
}
