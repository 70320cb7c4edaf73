//! Kiln Runtime - core of the Kiln test engine
//!
//! This library provides the pieces a test run is built from:
//! - A seedable, lock-free random source
//! - A double-buffered, lock-free diagnostic log
//! - A portable printf-style renderer that fills the log
//! - An installable failure-propagation mechanism
//! - The [`Harness`] run context tying them together
//!
//! The driver that sequences entries and speaks TAP lives in `kiln-cli`.

/// Kiln runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod entry;
pub mod expect;
pub mod failure;
pub mod harness;
pub mod log;
pub mod render;
pub mod rng;

mod macros;

// Re-export commonly used types
pub use entry::{Fixture, Flags, SetupFn, Status, TeardownFn, TestEntry, TestFn};
pub use expect::{accept, reject, throws, Classifier, Expecter};
pub use failure::{FailureMechanism, FailureSignal, MechanismRef, Unwind, UNWIND};
pub use harness::{write_bail_directive, Harness};
pub use log::{escape_for_render, Log, LogWriter};
pub use render::{render, Arg, Measure, Output, RenderError};
pub use rng::Rng;
