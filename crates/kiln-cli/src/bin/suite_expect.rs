//! Expected-panic self-test
//!
//! `in_range` installs an [`Expecter`] from its setup. `out_range` panics
//! with the same payload after the driver has restored the default
//! mechanism, so the panic leaves the driver and is caught here.

use kiln_cli::Cli;
use kiln_runtime::{
    accept, throws, Classifier, Expecter, Fixture, Harness, Status, TestEntry,
};
use std::any::Any;
use std::ffi::OsString;
use std::panic;
use std::process::ExitCode;

#[derive(Debug)]
struct OutOfRange;

static RANGE_RULES: [Classifier; 2] = [accept::<OutOfRange>(), throws::<String>()];
static EXPECT_RANGE: Expecter = Expecter::new(&RANGE_RULES);

static EXPECTING: Fixture = Fixture::new(install_expecter);

static TESTS: [TestEntry; 5] = [
    TestEntry::new("in_range", out_of_range).with_fixture(&EXPECTING),
    TestEntry::new("thrown", thrown).todo().with_fixture(&EXPECTING),
    TestEntry::new("runtime", not_applicable),
    TestEntry::new("out_range", out_of_range),
    TestEntry::new("zeta", zeta),
];

fn install_expecter(h: &Harness, _: &mut dyn Any) -> Option<Box<dyn Any>> {
    h.set_mechanism(&EXPECT_RANGE);
    Some(Box::new(()))
}

fn out_of_range(_: &Harness, _: &mut dyn Any) -> Status {
    panic::panic_any(OutOfRange)
}

fn thrown(_: &Harness, _: &mut dyn Any) -> Status {
    panic::panic_any(String::from("range check"))
}

fn not_applicable(_: &Harness, _: &mut dyn Any) -> Status {
    Status::Ignore
}

fn zeta(h: &Harness, _: &mut dyn Any) -> Status {
    h.log_write(b"out_range should have ended the run");
    Status::NotOk
}

/// Whether the command line selects `zeta`
fn wants_zeta() -> bool {
    let args: Vec<OsString> = std::env::args_os().collect();
    Cli::try_parse_for("suite_expect", &args)
        .ok()
        .and_then(|cli| cli.prefix().map(|prefix| "zeta".starts_with(prefix)))
        .unwrap_or(true)
}

fn main() -> ExitCode {
    match panic::catch_unwind(|| kiln_cli::main(&TESTS, &mut ())) {
        Ok(code) => code,
        Err(payload) if payload.is::<OutOfRange>() => {
            let directive = if wants_zeta() { "" } else { " # SKIP by request" };
            print!(
                "ok 4 - out_range\n  ---\n  message: \"Panic passed through.\"\n  ...\nok 5 - zeta{directive}\n"
            );
            ExitCode::SUCCESS
        }
        Err(payload) => panic::resume_unwind(payload),
    }
}
