//! Kiln CLI - entry point of a Kiln test program
//!
//! A test program declares its entries and hands them to [`main`]:
//!
//! ```no_run
//! use kiln_runtime::{Harness, Status, TestEntry};
//! use std::any::Any;
//! use std::process::ExitCode;
//!
//! fn rand_differs(h: &Harness, _: &mut dyn Any) -> Status {
//!     if h.rand() == h.rand() {
//!         h.fail();
//!     }
//!     Status::Ok
//! }
//!
//! static TESTS: [TestEntry; 1] = [TestEntry::new("rand", rand_differs)];
//!
//! fn main() -> ExitCode {
//!     kiln_cli::main(&TESTS, &mut ())
//! }
//! ```
//!
//! The program then accepts `-s <seed>`, `-l`, `-h` and a name prefix, and
//! writes a TAP transcript to stdout.

pub mod args;
pub mod logging;
pub mod settings;
pub mod testing;

pub use args::Cli;
pub use settings::RunSettings;
pub use testing::{RunSummary, TapReporter, TestResult, TestRun, TestRunner};

use anyhow::{Context, Result};
use kiln_config::{Config, ConfigLoader};
use kiln_runtime::TestEntry;
use std::any::Any;
use std::env;
use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;

/// How an invocation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every qualifying test passed
    Passed,
    /// A test failed, the run bailed out, or output could not be written
    Failed,
    /// Help, listing or a command-line error; nothing ran
    Usage,
}

impl Outcome {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Passed => ExitCode::SUCCESS,
            Outcome::Failed | Outcome::Usage => ExitCode::FAILURE,
        }
    }
}

/// Run `entries` as configured by the process arguments and environment
pub fn main(entries: &[TestEntry], user: &mut dyn Any) -> ExitCode {
    logging::init();
    // Unlocked handles: test bodies and their worker threads write to the
    // same streams while the run is in progress.
    run_with_args(
        entries,
        env::args_os(),
        user,
        &mut io::stdout(),
        &mut io::stderr(),
    )
    .exit_code()
}

/// Run `entries` with explicit arguments and streams
///
/// Configuration is loaded from `kiln.toml` above the working directory and
/// from the `KILN_*` environment, but only when tests are actually run.
pub fn run_with_args<I, T>(
    entries: &[TestEntry],
    args: I,
    user: &mut dyn Any,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> Outcome
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args = args.into_iter().map(Into::into).collect::<Vec<_>>();
    report_errors(stderr, |stderr| {
        dispatch(entries, &args, user, stdout, stderr, &load_config)
    })
}

/// Like [`run_with_args`] but with an already resolved configuration
pub fn run_with_config<I, T>(
    entries: &[TestEntry],
    args: I,
    config: &Config,
    user: &mut dyn Any,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> Outcome
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args = args.into_iter().map(Into::into).collect::<Vec<_>>();
    report_errors(stderr, |stderr| {
        dispatch(entries, &args, user, stdout, stderr, &|| Ok(config.clone()))
    })
}

fn load_config() -> Result<Config> {
    let dir = env::current_dir().context("Failed to determine the working directory")?;
    ConfigLoader::new()
        .load_from_directory(&dir)
        .context("Failed to load kiln configuration")
}

fn report_errors(
    stderr: &mut dyn Write,
    f: impl FnOnce(&mut dyn Write) -> Result<Outcome>,
) -> Outcome {
    match f(&mut *stderr) {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::error!(error = %err, "run aborted");
            let _ = writeln!(stderr, "error: {err:#}");
            Outcome::Failed
        }
    }
}

fn dispatch(
    entries: &[TestEntry],
    args: &[OsString],
    user: &mut dyn Any,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
    load: &dyn Fn() -> Result<Config>,
) -> Result<Outcome> {
    let program = args
        .first()
        .map(|arg| arg.to_string_lossy().into_owned())
        .unwrap_or_else(|| "kiln".to_owned());

    let cli = match Cli::try_parse_for(&program, args) {
        Ok(cli) => cli,
        Err(err) => {
            write!(stderr, "{}", err.render())?;
            return Ok(Outcome::Usage);
        }
    };

    if cli.help {
        write!(stderr, "{}", Cli::usage(&program))?;
        return Ok(Outcome::Usage);
    }
    if cli.list {
        for entry in entries {
            writeln!(stderr, "{}", entry.name)?;
        }
        return Ok(Outcome::Usage);
    }

    let settings = RunSettings::resolve(&cli, &load()?);
    tracing::debug!(?settings, "run settings");

    let runner = TestRunner::new(settings.seed)
        .with_prefix(settings.prefix)
        .with_log_capacity(settings.log_capacity);
    let mut reporter = TapReporter::new(stdout);
    let summary = runner
        .run(entries, user, &mut reporter)
        .context("Failed to write TAP output")?;

    Ok(if summary.success() {
        Outcome::Passed
    } else {
        Outcome::Failed
    })
}
