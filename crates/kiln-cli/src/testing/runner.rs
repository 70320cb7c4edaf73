//! Test runner - sequences entries through one harness
//!
//! For each entry the runner decides whether it runs, prepares the harness
//! (re-seed, clear the active log buffer, reinstall the default mechanism),
//! runs setup and body under protection, tears down, classifies the status
//! and hands the result to the reporter. A bail-out stops the run after the
//! current entry.

use crate::testing::reporter::TapReporter;
use kiln_runtime::log::DEFAULT_CAPACITY;
use kiln_runtime::{Harness, MechanismRef, Status, TestEntry, UNWIND};
use std::any::Any;
use std::io::{self, Write};

/// Result of a single test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestResult {
    /// Body finished with `Ok`
    Pass,
    /// Not run, either statically or because its name missed the prefix
    Skip { by_request: bool },
    /// Body decided at runtime that it does not apply
    Ignored,
    /// Setup or body failed
    Fail { status: Status },
}

impl TestResult {
    /// Classify the status of a test that ran
    pub fn from_status(status: Status) -> Self {
        match status {
            Status::Ok => TestResult::Pass,
            Status::Ignore => TestResult::Ignored,
            status => TestResult::Fail { status },
        }
    }

    /// Check if the result is reported as `ok`
    pub fn is_pass(&self) -> bool {
        !self.is_fail()
    }

    /// Check if the result is reported as `not ok`
    pub fn is_fail(&self) -> bool {
        matches!(self, TestResult::Fail { .. })
    }
}

/// One reported test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRun {
    /// 1-based position in the entry list
    pub number: usize,
    pub name: &'static str,
    pub result: TestResult,
    /// Entry carried the TODO flag
    pub todo: bool,
    /// Bytes logged while the test ran; `None` when it did not run
    pub diagnostics: Option<Vec<u8>>,
}

impl TestRun {
    /// TAP directive appended to the result line
    pub fn directive(&self) -> &'static str {
        match self.result {
            TestResult::Skip { by_request: true } => " # SKIP by request",
            TestResult::Skip { by_request: false } => " # SKIP",
            TestResult::Ignored => " # SKIP at runtime",
            _ if self.todo => " # TODO",
            _ => "",
        }
    }

    /// Check if this test fails the run
    pub fn fails_run(&self) -> bool {
        self.result.is_fail() && !self.todo
    }
}

/// Outcome of a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub seed: u32,
    /// Reported tests in order; a bail-out leaves the rest unreported
    pub runs: Vec<TestRun>,
    pub bailed: bool,
    pub bail_reason: Option<String>,
}

impl RunSummary {
    /// Check if the run succeeded: no bail-out and no failure outside TODO tests
    pub fn success(&self) -> bool {
        !self.bailed && !self.runs.iter().any(TestRun::fails_run)
    }

    pub fn passed(&self) -> usize {
        self.runs.iter().filter(|r| r.result == TestResult::Pass).count()
    }

    pub fn failed(&self) -> usize {
        self.runs.iter().filter(|r| r.result.is_fail()).count()
    }

    pub fn skipped(&self) -> usize {
        self.runs
            .iter()
            .filter(|r| matches!(r.result, TestResult::Skip { .. } | TestResult::Ignored))
            .count()
    }
}

/// Test runner with run configuration
pub struct TestRunner {
    seed: u32,
    prefix: String,
    log_capacity: usize,
    mechanism: MechanismRef,
}

impl TestRunner {
    /// Create a runner for `seed` that runs every entry
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            prefix: String::new(),
            log_capacity: DEFAULT_CAPACITY,
            mechanism: UNWIND,
        }
    }

    /// Only run entries whose names start with `prefix`
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Bytes per diagnostic buffer
    pub fn with_log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity;
        self
    }

    /// Mechanism reinstalled before every test
    pub fn with_mechanism(mut self, mechanism: MechanismRef) -> Self {
        self.mechanism = mechanism;
        self
    }

    /// Run `entries` in order, reporting each one as it finishes
    ///
    /// `user` is handed to setups, and to bodies of entries without a
    /// fixture. Only output errors are returned; test failures are part of
    /// the summary.
    pub fn run<W: Write>(
        &self,
        entries: &[TestEntry],
        user: &mut dyn Any,
        reporter: &mut TapReporter<W>,
    ) -> io::Result<RunSummary> {
        let harness = Harness::new(self.log_capacity);
        harness.set_seed(self.seed);
        tracing::info!(
            seed = self.seed,
            count = entries.len(),
            prefix = %self.prefix,
            "starting run"
        );

        reporter.plan(entries.len())?;
        reporter.seed(self.seed)?;

        let mut summary = RunSummary {
            seed: self.seed,
            ..RunSummary::default()
        };

        for (index, entry) in entries.iter().enumerate() {
            let by_request = !entry.name.starts_with(self.prefix.as_str());
            let skip = by_request || entry.is_skip();

            let status = if skip {
                Status::Ok
            } else {
                harness.reseed();
                harness.log().reset_active();
                harness.set_mechanism(self.mechanism);
                tracing::debug!(test = entry.name, "running");
                self.execute(&harness, entry, user)
            };

            if harness.bailed() {
                let reason = harness.bail_reason().map(str::to_owned);
                reporter.bail_out(reason.as_deref())?;
                summary.bailed = true;
                summary.bail_reason = reason;
                break;
            }

            let result = if skip {
                TestResult::Skip { by_request }
            } else {
                TestResult::from_status(status)
            };
            let diagnostics = (!skip).then(|| {
                let finished = harness.log().swap();
                harness.log().contents(finished)
            });
            tracing::debug!(test = entry.name, ?result, "finished");

            let run = TestRun {
                number: index + 1,
                name: entry.name,
                result,
                todo: entry.is_todo(),
                diagnostics,
            };
            reporter.result(&run)?;
            summary.runs.push(run);
        }

        reporter.flush()?;
        Ok(summary)
    }

    /// Setup, body and teardown of one entry
    ///
    /// A failed setup skips both body and teardown; so does a bail-out
    /// during setup, which the caller detects on the harness.
    fn execute(&self, harness: &Harness, entry: &TestEntry, user: &mut dyn Any) -> Status {
        let Some(fixture) = entry.fixture else {
            return harness.run_protected(&mut || (entry.body)(harness, &mut *user));
        };

        let mut handle = None;
        let setup = harness.run_protected(&mut || {
            handle = (fixture.setup)(harness, &mut *user);
            Status::Ok
        });
        if harness.bailed() {
            return Status::NotOk;
        }
        let mut handle = match (setup, handle) {
            (Status::Ok, Some(handle)) => handle,
            (Status::Ok, None) => {
                tracing::debug!(test = entry.name, "setup produced no handle");
                return Status::NotOk;
            }
            (status, _) => return status,
        };

        let status = harness.run_protected(&mut || (entry.body)(harness, &mut *handle));
        match fixture.teardown {
            Some(teardown) => teardown(harness, handle),
            None => drop(handle),
        }
        status
    }
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new(0)
    }
}

impl std::fmt::Debug for TestRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestRunner")
            .field("seed", &self.seed)
            .field("prefix", &self.prefix)
            .field("log_capacity", &self.log_capacity)
            .finish_non_exhaustive()
    }
}
