//! Stream adapter over the active log buffer

use super::Log;
use std::{fmt, io};

/// Lets test bodies use `write!` with the native formatter
///
/// Writes go to whichever buffer is active at the time of each call.
/// Once the buffer is full, `io::Write` reports a zero-length write and
/// `fmt::Write` reports an error.
///
/// Both traits provide `write_fmt`, so bring only one of them into scope
/// where `write!` is used on a `LogWriter`.
#[derive(Debug, Clone, Copy)]
pub struct LogWriter<'a> {
    log: &'a Log,
}

impl<'a> LogWriter<'a> {
    pub fn new(log: &'a Log) -> Self {
        Self { log }
    }
}

impl io::Write for LogWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.log.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Write for LogWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.log.write(s.as_bytes()) == s.len() {
            Ok(())
        } else {
            Err(fmt::Error)
        }
    }
}
