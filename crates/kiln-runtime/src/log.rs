//! Double-buffered diagnostic log
//!
//! Each test writes into the *active* buffer. When the test finishes the
//! driver calls [`Log::swap`], which flips the active buffer and hands back
//! the one to render, so a straggling background writer for the next test
//! never touches the bytes being rendered.
//!
//! Space is reserved with a compare-and-swap loop on the buffer cursor;
//! bytes are stored as atomics so a racing writer is never undefined
//! behaviour. No locks are taken.

mod escape;
mod writer;

pub use escape::escape_for_render;
pub use writer::LogWriter;

use crate::render::{self, Arg, Output};
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

/// Bytes per buffer when no capacity is configured
pub const DEFAULT_CAPACITY: usize = 128;

/// One fixed-capacity region with its write cursor
struct LogBuffer {
    cursor: AtomicUsize,
    data: Box<[AtomicU8]>,
}

impl LogBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            cursor: AtomicUsize::new(0),
            data: (0..capacity).map(|_| AtomicU8::new(0)).collect(),
        }
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Reserve `n` bytes, returning the granted `(start, len)`
    ///
    /// Fails once the cursor sits at capacity. A request that does not fit
    /// moves the cursor to capacity and is granted only the remaining tail.
    fn reserve(&self, n: usize) -> Option<(usize, usize)> {
        let capacity = self.capacity();
        let top = capacity.saturating_sub(n);
        let start = self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |cursor| {
                if cursor >= capacity {
                    None
                } else if cursor >= top {
                    Some(capacity)
                } else {
                    Some(cursor + n)
                }
            })
            .ok()?;
        Some((start, n.min(capacity - start)))
    }

    fn region(&self, start: usize, len: usize) -> Region<'_> {
        Region {
            bytes: &self.data[start..start + len],
        }
    }

    fn contents(&self) -> Vec<u8> {
        let end = self.cursor.load(Ordering::Acquire).min(self.capacity());
        self.data[..end]
            .iter()
            .map(|b| b.load(Ordering::Relaxed))
            .collect()
    }
}

/// A reserved slice of a buffer
struct Region<'a> {
    bytes: &'a [AtomicU8],
}

impl Output for Region<'_> {
    fn capacity(&self) -> usize {
        self.bytes.len()
    }

    fn put(&mut self, at: usize, byte: u8) {
        self.bytes[at].store(byte, Ordering::Relaxed);
    }
}

/// The pair of buffers and the generation counter selecting the active one
pub struct Log {
    buffers: [LogBuffer; 2],
    generation: AtomicUsize,
}

impl Log {
    /// Allocate two buffers of `capacity` bytes each
    pub fn new(capacity: usize) -> Self {
        Self {
            buffers: [LogBuffer::new(capacity), LogBuffer::new(capacity)],
            generation: AtomicUsize::new(0),
        }
    }

    /// Bytes per buffer
    pub fn capacity(&self) -> usize {
        self.buffers[0].capacity()
    }

    /// Index of the buffer currently receiving writes
    pub fn active_index(&self) -> usize {
        self.generation.load(Ordering::Acquire) % 2
    }

    fn active(&self) -> &LogBuffer {
        &self.buffers[self.active_index()]
    }

    /// Empty buffer `index`
    pub fn reset(&self, index: usize) {
        self.buffers[index % 2].cursor.store(0, Ordering::Release);
    }

    /// Empty the active buffer
    pub fn reset_active(&self) {
        self.reset(self.active_index());
    }

    /// Flip the active buffer, returning the index of the one to render
    pub fn swap(&self) -> usize {
        self.generation.fetch_add(1, Ordering::AcqRel) % 2
    }

    /// Copy out the written part of buffer `index`
    pub fn contents(&self, index: usize) -> Vec<u8> {
        self.buffers[index % 2].contents()
    }

    /// Append `bytes` to the active buffer
    ///
    /// Returns the number of bytes stored, which is less than requested when
    /// the buffer fills and zero once it is full.
    pub fn write(&self, bytes: &[u8]) -> usize {
        let buffer = self.active();
        let Some((start, len)) = buffer.reserve(bytes.len()) else {
            tracing::trace!(requested = bytes.len(), "diagnostic log full");
            return 0;
        };
        for (slot, &byte) in buffer.data[start..start + len].iter().zip(bytes) {
            slot.store(byte, Ordering::Relaxed);
        }
        len
    }

    /// Render `format` straight into the active buffer
    ///
    /// The format is rendered twice: once to measure, once into exactly the
    /// reserved space. A rendering error abandons the write. Returns the
    /// number of bytes stored.
    pub fn formatted_write(&self, format: &str, args: &[Arg<'_>]) -> usize {
        let needed = match render::measure(format, args) {
            Ok(needed) => needed,
            Err(error) => {
                tracing::debug!(%error, format, "diagnostic format rejected");
                return 0;
            }
        };
        let buffer = self.active();
        let Some((start, len)) = buffer.reserve(needed) else {
            return 0;
        };
        let mut region = buffer.region(start, len);
        // Same arguments as the measuring pass.
        let _ = render::render(&mut region, format, args);
        len
    }

    /// `io::Write`/`fmt::Write` adapter over the active buffer
    pub fn writer(&self) -> LogWriter<'_> {
        LogWriter::new(self)
    }
}

impl Default for Log {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for Log {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Log")
            .field("capacity", &self.capacity())
            .field("active", &self.active_index())
            .finish()
    }
}
