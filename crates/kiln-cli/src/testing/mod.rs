//! Test runner infrastructure for Kiln
//!
//! The runner sequences entries through a harness; the reporter turns each
//! outcome into TAP on the way out.

pub mod reporter;
pub mod runner;

pub use reporter::TapReporter;
pub use runner::{RunSummary, TestResult, TestRun, TestRunner};
