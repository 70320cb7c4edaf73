//! TAP reporter - writes the run transcript
//!
//! Every line is written as soon as it is known, so a transcript cut short
//! by an abort still holds the results of the tests that finished.

use crate::testing::runner::TestRun;
use kiln_runtime::{escape_for_render, write_bail_directive};
use std::io::{self, Write};

/// Writes TAP lines to an output stream
pub struct TapReporter<W: Write> {
    out: W,
}

impl<W: Write> TapReporter<W> {
    /// Create a reporter writing to `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Plan line: `1..<count>`
    pub fn plan(&mut self, count: usize) -> io::Result<()> {
        writeln!(self.out, "1..{count}")
    }

    /// Seed comment, `0` for a zero seed and `0x...` otherwise
    pub fn seed(&mut self, seed: u32) -> io::Result<()> {
        if seed == 0 {
            writeln!(self.out, "# random_seed: 0")
        } else {
            writeln!(self.out, "# random_seed: {seed:#x}")
        }
    }

    /// Result line, followed by the diagnostic block when the test logged anything
    pub fn result(&mut self, run: &TestRun) -> io::Result<()> {
        let verdict = if run.result.is_pass() { "ok" } else { "not ok" };
        writeln!(
            self.out,
            "{verdict} {} - {}{}",
            run.number,
            run.name,
            run.directive()
        )?;
        match &run.diagnostics {
            Some(bytes) if !bytes.is_empty() => self.diagnostic(bytes),
            _ => Ok(()),
        }
    }

    /// YAML-ish block carrying the escaped log bytes
    pub fn diagnostic(&mut self, bytes: &[u8]) -> io::Result<()> {
        write!(
            self.out,
            "  ---\n  message: \"{}\"\n  ...\n",
            escape_for_render(bytes)
        )
    }

    /// `Bail out!`, with the reason after a space when there is one
    pub fn bail_out(&mut self, reason: Option<&str>) -> io::Result<()> {
        write_bail_directive(&mut self.out, reason)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Recover the output stream
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> std::fmt::Debug for TapReporter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TapReporter").finish_non_exhaustive()
    }
}
