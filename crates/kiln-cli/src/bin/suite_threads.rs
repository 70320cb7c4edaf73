//! Worker-thread self-test: bodies that spread work over scoped threads
//!
//! Workers print to both standard streams while the driver is mid-run and
//! share the test's log.

use kiln_runtime::{kiln_assert, Harness, Status, TestEntry};
use std::any::Any;
use std::process::ExitCode;
use std::thread;

const WORKERS: usize = 4;

static TESTS: [TestEntry; 3] = [
    TestEntry::new("worker_print", worker_print),
    TestEntry::new("worker_log", worker_log),
    TestEntry::new("zeta", zeta),
];

fn worker_print(_: &Harness, _: &mut dyn Any) -> Status {
    thread::scope(|s| {
        s.spawn(|| println!("# from worker"));
    });
    thread::scope(|s| {
        s.spawn(|| eprintln!("from worker on stderr"));
    });
    Status::Ok
}

fn worker_log(h: &Harness, _: &mut dyn Any) -> Status {
    thread::scope(|s| {
        for _ in 0..WORKERS {
            s.spawn(|| h.log_write(b"abcd"));
        }
    });
    let contents = h.log().contents(h.log().active_index());
    kiln_assert!(h, contents == b"abcd".repeat(WORKERS));
    Status::Ok
}

fn zeta(_: &Harness, _: &mut dyn Any) -> Status {
    Status::Ok
}

fn main() -> ExitCode {
    kiln_cli::main(&TESTS, &mut ())
}
