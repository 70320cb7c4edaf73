//! Misuse self-test: failures signalled where nothing can catch them
//!
//! Every entry except `before` aborts the process; pick one by prefix.
//! The `bail_` entries print their `Bail out!` line before aborting.

use kiln_runtime::{Fixture, Harness, Status, TestEntry};
use std::any::Any;
use std::process::ExitCode;

static FAILING_TEARDOWN: Fixture = Fixture::new(setup_unit).with_teardown(teardown_fail);
static BAILING_TEARDOWN: Fixture = Fixture::new(setup_unit).with_teardown(teardown_bail);

static TESTS: [TestEntry; 6] = [
    TestEntry::new("before", pass),
    TestEntry::new("worker", fail_on_worker),
    TestEntry::new("teardown", pass).with_fixture(&FAILING_TEARDOWN),
    TestEntry::new("nested", fail_after_nested),
    TestEntry::new("bail_teardown", pass).with_fixture(&BAILING_TEARDOWN),
    TestEntry::new("bail_worker", bail_on_worker),
];

fn pass(_: &Harness, _: &mut dyn Any) -> Status {
    Status::Ok
}

/// Worker threads have no jump context of their own
fn fail_on_worker(h: &Harness, _: &mut dyn Any) -> Status {
    std::thread::scope(|s| {
        s.spawn(|| {
            h.fail();
        });
    });
    Status::Ok
}

fn bail_on_worker(h: &Harness, _: &mut dyn Any) -> Status {
    std::thread::scope(|s| {
        s.spawn(|| {
            h.bail_out(Some("worker"));
        });
    });
    Status::Ok
}

fn setup_unit(_: &Harness, _: &mut dyn Any) -> Option<Box<dyn Any>> {
    Some(Box::new(()))
}

/// Teardown runs unprotected
fn teardown_fail(h: &Harness, _: Box<dyn Any>) {
    h.fail()
}

fn teardown_bail(h: &Harness, _: Box<dyn Any>) {
    h.bail_out(Some("cleanup broke"))
}

/// Returning from the inner protected call clears the context for the outer body
fn fail_after_nested(h: &Harness, _: &mut dyn Any) -> Status {
    let inner = h.run_protected(&mut || h.fail());
    if inner == Status::NotOk {
        h.fail();
    }
    Status::Ok
}

fn main() -> ExitCode {
    kiln_cli::main(&TESTS, &mut ())
}
