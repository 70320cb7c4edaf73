//! Deterministic random source
//!
//! A linear congruential generator over a single atomic word. Concurrent
//! callers race through a compare-and-swap loop, so every call observes a
//! distinct step; the sequence is reproducible only for a single thread.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const MULTIPLIER: u32 = 48271;
const INCREMENT: u32 = 9;

/// Seedable, lock-free LCG
#[derive(Debug)]
pub struct Rng {
    state: AtomicU32,
}

impl Rng {
    pub const fn new(seed: u32) -> Self {
        Self {
            state: AtomicU32::new(seed),
        }
    }

    /// Restart the sequence from `seed`
    pub fn seed(&self, seed: u32) {
        self.state.store(seed, Ordering::Release);
    }

    /// Advance the generator and return the new state
    pub fn next_u32(&self) -> u32 {
        let previous = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |x| Some(step(x)))
            .unwrap_or_else(|x| x);
        step(previous)
    }

    /// Fill `buffer` with successive values in native byte order
    ///
    /// A trailing partial word copies only the bytes that fit.
    pub fn fill(&self, buffer: &mut [u8]) {
        for chunk in buffer.chunks_mut(std::mem::size_of::<u32>()) {
            let word = self.next_u32().to_ne_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
    }
}

impl Default for Rng {
    fn default() -> Self {
        Self::new(0)
    }
}

fn step(x: u32) -> u32 {
    x.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT)
}

/// Seed derived from the wall clock, used when none is configured
pub fn default_seed() -> u32 {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    secs.wrapping_mul(0x87e5_c341) as u32
}
