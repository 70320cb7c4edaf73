//! Run context
//!
//! [`Harness`] owns every piece of state a run shares between the driver
//! and the test bodies: random source, diagnostic log, status of the test in
//! progress, bail flag and the installed failure mechanism. Each field is
//! individually synchronised, so bodies may hand `&Harness` to worker
//! threads; no operation spans fields transactionally.

use crate::entry::Status;
use crate::failure::{self, FailureMechanism, UNWIND};
use crate::log::{Log, LogWriter, DEFAULT_CAPACITY};
use crate::render::Arg;
use crate::rng::Rng;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::{OnceLock, PoisonError, RwLock};

/// Shared state of one test run
pub struct Harness {
    rng: Rng,
    seed: AtomicU32,
    log: Log,
    next_status: AtomicU8,
    bailed: AtomicBool,
    bail_reason: OnceLock<String>,
    mechanism: RwLock<&'static dyn FailureMechanism>,
}

impl Harness {
    /// Create a harness whose log buffers hold `log_capacity` bytes each
    pub fn new(log_capacity: usize) -> Self {
        Self {
            rng: Rng::new(0),
            seed: AtomicU32::new(0),
            log: Log::new(log_capacity),
            next_status: AtomicU8::new(Status::Ok as u8),
            bailed: AtomicBool::new(false),
            bail_reason: OnceLock::new(),
            mechanism: RwLock::new(UNWIND),
        }
    }

    // ------------------------------------------------------------------
    // Random source
    // ------------------------------------------------------------------

    /// Set the run seed and restart the random sequence from it
    pub fn set_seed(&self, seed: u32) {
        self.seed.store(seed, Ordering::Release);
        self.rng.seed(seed);
    }

    /// The run seed
    pub fn seed(&self) -> u32 {
        self.seed.load(Ordering::Acquire)
    }

    /// Restart the random sequence from the run seed
    pub fn reseed(&self) {
        self.rng.seed(self.seed());
    }

    /// Next value of the random sequence
    pub fn rand(&self) -> u32 {
        self.rng.next_u32()
    }

    /// Fill `buffer` with random bytes
    pub fn fill_random(&self, buffer: &mut [u8]) {
        self.rng.fill(buffer);
    }

    // ------------------------------------------------------------------
    // Diagnostic log
    // ------------------------------------------------------------------

    pub fn log(&self) -> &Log {
        &self.log
    }

    /// Append raw bytes to the test's log
    pub fn log_write(&self, bytes: &[u8]) -> usize {
        self.log.write(bytes)
    }

    /// Append rendered text to the test's log; see [`log_printf!`](crate::log_printf)
    pub fn log_printf(&self, format: &str, args: &[Arg<'_>]) -> usize {
        self.log.formatted_write(format, args)
    }

    /// `write!` target for the test's log
    pub fn log_writer(&self) -> LogWriter<'_> {
        self.log.writer()
    }

    // ------------------------------------------------------------------
    // Failure propagation
    // ------------------------------------------------------------------

    /// Install a failure mechanism
    ///
    /// Takes effect for the rest of the current test; the driver reinstalls
    /// its default before the next one.
    pub fn set_mechanism(&self, mechanism: &'static dyn FailureMechanism) {
        *self
            .mechanism
            .write()
            .unwrap_or_else(PoisonError::into_inner) = mechanism;
    }

    /// The installed failure mechanism
    pub fn mechanism(&self) -> &'static dyn FailureMechanism {
        *self
            .mechanism
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `body` under the installed mechanism
    ///
    /// A failure signalled during the body makes the result `NotOk` even if
    /// the mechanism's catch reports success.
    pub fn run_protected(&self, body: &mut dyn FnMut() -> Status) -> Status {
        self.next_status.store(Status::Ok as u8, Ordering::Release);
        let status = self.mechanism().catch(body);
        failure::deactivate();
        match status {
            Status::Ok => Status::from_u8(self.next_status.load(Ordering::Acquire)),
            other => other,
        }
    }

    /// Fail the current test immediately
    ///
    /// Aborts the process when called outside a protected body on this
    /// thread, e.g. from a worker thread or from a teardown.
    pub fn fail(&self) -> ! {
        self.next_status.store(Status::NotOk as u8, Ordering::Release);
        self.mechanism().signal_failure()
    }

    /// Fail the current test and stop the whole run after it
    ///
    /// Inside a protected body the driver prints the bail directive once
    /// the test has unwound. Outside one the process is about to abort, so
    /// the directive goes to stdout here.
    pub fn bail_out(&self, reason: Option<&str>) -> ! {
        self.next_status.store(Status::NotOk as u8, Ordering::Release);
        if let Some(reason) = reason {
            let _ = self.bail_reason.set(reason.to_owned());
        }
        self.bailed.store(true, Ordering::Release);
        tracing::warn!(?reason, "bail out requested");
        if !failure::is_active() {
            let mut stdout = io::stdout().lock();
            let _ = write_bail_directive(&mut stdout, reason);
            let _ = stdout.flush();
        }
        self.mechanism().signal_failure()
    }

    /// Check if a bail-out was requested
    pub fn bailed(&self) -> bool {
        self.bailed.load(Ordering::Acquire)
    }

    /// Reason given by the first bail-out, if any
    pub fn bail_reason(&self) -> Option<&str> {
        self.bail_reason.get().map(String::as_str)
    }

    /// Record a failed assertion and fail the test; used by [`kiln_assert!`](crate::kiln_assert)
    #[doc(hidden)]
    pub fn assert_failed(&self, expr: &str, file: &str, line: u32) -> ! {
        tracing::debug!(expr, file, line, "assertion failed");
        self.log_printf(
            "assert %s:%d: %s",
            &[Arg::Str(file), Arg::from(line), Arg::Str(expr)],
        );
        self.fail()
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for Harness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Harness")
            .field("seed", &self.seed())
            .field("log", &self.log)
            .field("bailed", &self.bailed())
            .finish_non_exhaustive()
    }
}

/// Write the TAP `Bail out!` line, with the reason when there is one
pub fn write_bail_directive(out: &mut dyn Write, reason: Option<&str>) -> io::Result<()> {
    match reason {
        Some(reason) => writeln!(out, "Bail out! {reason}"),
        None => writeln!(out, "Bail out!"),
    }
}
