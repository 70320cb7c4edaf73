//! Driver transcripts, run in-process
//!
//! Every run passes `-s 1` and a default configuration so the transcripts
//! do not depend on the clock, the environment or a stray `kiln.toml`.

use kiln_cli::{run_with_config, Outcome};
use kiln_config::{Config, LogConfig, ProjectConfig};
use kiln_runtime::{log_printf, Fixture, Harness, Status, TestEntry};
use pretty_assertions::assert_eq;
use std::any::Any;
use std::cell::Cell;

struct Transcript {
    outcome: Outcome,
    stdout: String,
    stderr: String,
}

fn run_entries(entries: &[TestEntry], args: &[&str], user: &mut dyn Any) -> Transcript {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let argv = ["suite", "-s", "1"].iter().chain(args).copied();
    let outcome = run_with_config(
        entries,
        argv,
        &Config::default(),
        user,
        &mut stdout,
        &mut stderr,
    );
    Transcript {
        outcome,
        stdout: String::from_utf8(stdout).unwrap(),
        stderr: String::from_utf8(stderr).unwrap(),
    }
}

fn run(entries: &[TestEntry], args: &[&str]) -> Transcript {
    run_entries(entries, args, &mut ())
}

thread_local! {
    static CALLS: Cell<u32> = const { Cell::new(0) };
}

fn calls() -> u32 {
    CALLS.with(Cell::get)
}

fn pass(_: &Harness, _: &mut dyn Any) -> Status {
    CALLS.with(|c| c.set(c.get() + 1));
    Status::Ok
}

fn fail(_: &Harness, _: &mut dyn Any) -> Status {
    CALLS.with(|c| c.set(c.get() + 1));
    Status::NotOk
}

fn signal(h: &Harness, _: &mut dyn Any) -> Status {
    h.fail()
}

fn quoted_then_fail(h: &Harness, _: &mut dyn Any) -> Status {
    h.log_write(b"Hello, \"world\"");
    h.fail()
}

fn bail_setup(h: &Harness, _: &mut dyn Any) -> Option<Box<dyn Any>> {
    h.bail_out(Some("x"))
}

fn note_teardown(_: &Harness, _: Box<dyn Any>) {
    CALLS.with(|c| c.set(c.get() + 100));
}

static BAIL_SETUP: Fixture = Fixture::new(bail_setup).with_teardown(note_teardown);

// ============================================================================
// Result lines
// ============================================================================

#[test]
fn test_single_passing_entry() {
    static ENTRIES: [TestEntry; 1] = [TestEntry::new("a", pass)];
    let t = run(&ENTRIES, &[]);
    assert_eq!(t.stdout, "1..1\n# random_seed: 0x1\nok 1 - a\n");
    assert_eq!(t.outcome, Outcome::Passed);
    assert_eq!(t.stderr, "");
}

#[test]
fn test_todo_failure_keeps_run_green() {
    static ENTRIES: [TestEntry; 1] = [TestEntry::new("a", fail).todo()];
    let t = run(&ENTRIES, &[]);
    assert_eq!(t.stdout, "1..1\n# random_seed: 0x1\nnot ok 1 - a # TODO\n");
    assert_eq!(t.outcome, Outcome::Passed);
}

#[test]
fn test_skip_never_invokes_body() {
    static ENTRIES: [TestEntry; 1] = [TestEntry::new("a", pass).skip()];
    CALLS.with(|c| c.set(0));
    let t = run(&ENTRIES, &[]);
    assert_eq!(t.stdout, "1..1\n# random_seed: 0x1\nok 1 - a # SKIP\n");
    assert_eq!(calls(), 0);
}

#[test]
fn test_failure_flips_run() {
    static ENTRIES: [TestEntry; 2] = [TestEntry::new("a", signal), TestEntry::new("b", pass)];
    let t = run(&ENTRIES, &[]);
    assert_eq!(
        t.stdout,
        "1..2\n# random_seed: 0x1\nnot ok 1 - a\nok 2 - b\n"
    );
    assert_eq!(t.outcome, Outcome::Failed);
}

#[test]
fn test_runtime_skip() {
    fn not_here(_: &Harness, _: &mut dyn Any) -> Status {
        Status::Ignore
    }
    static ENTRIES: [TestEntry; 1] = [TestEntry::new("a", not_here)];
    let t = run(&ENTRIES, &[]);
    assert_eq!(t.stdout, "1..1\n# random_seed: 0x1\nok 1 - a # SKIP at runtime\n");
    assert_eq!(t.outcome, Outcome::Passed);
}

#[test]
fn test_zero_seed_line() {
    static ENTRIES: [TestEntry; 0] = [];
    let t = run(&ENTRIES, &["-s", "0"]);
    assert_eq!(t.stdout, "1..0\n# random_seed: 0\n");
    assert_eq!(t.outcome, Outcome::Passed);
}

// ============================================================================
// Prefix selection
// ============================================================================

#[test]
fn test_prefix_skips_by_request() {
    static ENTRIES: [TestEntry; 3] = [
        TestEntry::new("message_s", pass),
        TestEntry::new("message_x", pass),
        TestEntry::new("zeta", fail).skip(),
    ];
    let t = run(&ENTRIES, &["message_x"]);
    assert_eq!(
        t.stdout,
        "1..3\n# random_seed: 0x1\n\
         ok 1 - message_s # SKIP by request\n\
         ok 2 - message_x\n\
         ok 3 - zeta # SKIP by request\n"
    );
}

// ============================================================================
// Diagnostics
// ============================================================================

#[test]
fn test_diagnostic_block_escapes_quotes() {
    static ENTRIES: [TestEntry; 1] = [TestEntry::new("a", quoted_then_fail)];
    let t = run(&ENTRIES, &[]);
    assert_eq!(
        t.stdout,
        "1..1\n# random_seed: 0x1\nnot ok 1 - a\n  ---\n  message: \"Hello, \\\"world\\\"\"\n  ...\n"
    );
}

#[test]
fn test_each_test_gets_a_fresh_log() {
    fn first(h: &Harness, _: &mut dyn Any) -> Status {
        log_printf!(h, "n=%d", 1);
        Status::Ok
    }
    fn second(h: &Harness, _: &mut dyn Any) -> Status {
        log_printf!(h, "n=%d", 2);
        Status::Ok
    }
    fn silent(_: &Harness, _: &mut dyn Any) -> Status {
        Status::Ok
    }
    static ENTRIES: [TestEntry; 3] = [
        TestEntry::new("first", first),
        TestEntry::new("second", second),
        TestEntry::new("silent", silent),
    ];
    let t = run(&ENTRIES, &[]);
    assert_eq!(
        t.stdout,
        "1..3\n# random_seed: 0x1\n\
         ok 1 - first\n  ---\n  message: \"n=1\"\n  ...\n\
         ok 2 - second\n  ---\n  message: \"n=2\"\n  ...\n\
         ok 3 - silent\n"
    );
}

#[test]
fn test_log_capacity_from_config() {
    fn chatty(h: &Harness, _: &mut dyn Any) -> Status {
        h.log_write(b"0123456789");
        Status::Ok
    }
    static ENTRIES: [TestEntry; 1] = [TestEntry::new("a", chatty)];
    let config = Config {
        project: ProjectConfig {
            log: Some(LogConfig { capacity: Some(4) }),
            ..ProjectConfig::default()
        },
        project_root: None,
    };
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let outcome = run_with_config(
        &ENTRIES,
        ["suite", "-s", "1"],
        &config,
        &mut (),
        &mut stdout,
        &mut stderr,
    );
    assert_eq!(outcome, Outcome::Passed);
    assert!(String::from_utf8(stdout).unwrap().contains("message: \"0123\""));
}

// ============================================================================
// Seeding
// ============================================================================

#[test]
fn test_every_test_starts_from_the_run_seed() {
    fn draw(h: &Harness, _: &mut dyn Any) -> Status {
        log_printf!(h, "%x", h.rand());
        Status::Ok
    }
    static ENTRIES: [TestEntry; 2] = [TestEntry::new("a", draw), TestEntry::new("b", draw)];
    let t = run(&ENTRIES, &["-s", "7"]);
    let messages: Vec<&str> = t
        .stdout
        .lines()
        .filter(|line| line.starts_with("  message:"))
        .collect();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0], messages[1]);
}

// ============================================================================
// Fixtures and user data
// ============================================================================

#[test]
fn test_user_data_and_fixture_handle() {
    fn setup(_: &Harness, user: &mut dyn Any) -> Option<Box<dyn Any>> {
        let base = *user.downcast_ref::<u32>()?;
        Some(Box::new(base * 2))
    }
    fn uses_handle(_: &Harness, handle: &mut dyn Any) -> Status {
        match handle.downcast_ref::<u32>() {
            Some(20) => Status::Ok,
            _ => Status::NotOk,
        }
    }
    fn uses_user(_: &Harness, user: &mut dyn Any) -> Status {
        match user.downcast_mut::<u32>() {
            Some(value) => {
                *value += 1;
                Status::Ok
            }
            None => Status::NotOk,
        }
    }
    static DOUBLE: Fixture = Fixture::new(setup);
    static ENTRIES: [TestEntry; 2] = [
        TestEntry::new("handle", uses_handle).with_fixture(&DOUBLE),
        TestEntry::new("user", uses_user),
    ];

    let mut user = 10u32;
    let t = run_entries(&ENTRIES, &[], &mut user);
    assert_eq!(
        t.stdout,
        "1..2\n# random_seed: 0x1\nok 1 - handle\nok 2 - user\n"
    );
    assert_eq!(user, 11);
}

#[test]
fn test_failed_setup_skips_body_and_teardown() {
    fn setup(h: &Harness, _: &mut dyn Any) -> Option<Box<dyn Any>> {
        h.fail()
    }
    static FAILING: Fixture = Fixture::new(setup).with_teardown(note_teardown);
    static ENTRIES: [TestEntry; 2] = [
        TestEntry::new("a", pass).with_fixture(&FAILING),
        TestEntry::new("b", pass),
    ];
    CALLS.with(|c| c.set(0));
    let t = run(&ENTRIES, &[]);
    assert_eq!(t.stdout, "1..2\n# random_seed: 0x1\nnot ok 1 - a\nok 2 - b\n");
    assert_eq!(calls(), 1);
}

// ============================================================================
// Bail-out
// ============================================================================

#[test]
fn test_bail_from_second_setup_stops_run() {
    static ENTRIES: [TestEntry; 3] = [
        TestEntry::new("one", pass),
        TestEntry::new("two", pass).with_fixture(&BAIL_SETUP),
        TestEntry::new("three", pass),
    ];
    CALLS.with(|c| c.set(0));
    let t = run(&ENTRIES, &[]);
    assert_eq!(t.stdout, "1..3\n# random_seed: 0x1\nok 1 - one\nBail out! x\n");
    assert_eq!(t.outcome, Outcome::Failed);
    // Only the first body ran; no body or teardown for the bailing entry.
    assert_eq!(calls(), 1);
}

#[test]
fn test_bail_from_todo_body_still_fails_run() {
    fn bail(h: &Harness, _: &mut dyn Any) -> Status {
        h.bail_out(None)
    }
    static ENTRIES: [TestEntry; 2] = [TestEntry::new("a", bail).todo(), TestEntry::new("b", pass)];
    let t = run(&ENTRIES, &[]);
    assert_eq!(t.stdout, "1..2\n# random_seed: 0x1\nBail out!\n");
    assert_eq!(t.outcome, Outcome::Failed);
}

// ============================================================================
// Command line
// ============================================================================

#[test]
fn test_list_names_on_stderr() {
    static ENTRIES: [TestEntry; 2] = [TestEntry::new("a", pass), TestEntry::new("b/c", pass)];
    let t = run(&ENTRIES, &["-l"]);
    assert_eq!(t.outcome, Outcome::Usage);
    assert_eq!(t.stdout, "");
    assert_eq!(t.stderr, "a\nb/c\n");
}

#[test]
fn test_help_on_stderr() {
    static ENTRIES: [TestEntry; 1] = [TestEntry::new("a", pass)];
    for flag in ["-h", "-?"] {
        let t = run(&ENTRIES, &[flag]);
        assert_eq!(t.outcome, Outcome::Usage);
        assert_eq!(t.stdout, "");
        assert!(t.stderr.contains("suite [option [option ...]] [(prefix)]"));
    }
}

#[test]
fn test_unknown_option() {
    static ENTRIES: [TestEntry; 1] = [TestEntry::new("a", pass)];
    let t = run(&ENTRIES, &["-q"]);
    assert_eq!(t.outcome, Outcome::Usage);
    assert_eq!(t.stdout, "");
    assert!(t.stderr.contains("-q"));
}

#[test]
fn test_seed_without_value() {
    static ENTRIES: [TestEntry; 1] = [TestEntry::new("a", pass)];
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let outcome = run_with_config(
        &ENTRIES,
        ["suite", "-s"],
        &Config::default(),
        &mut (),
        &mut stdout,
        &mut stderr,
    );
    assert_eq!(outcome, Outcome::Usage);
    assert!(stdout.is_empty());
    assert!(!stderr.is_empty());
}
