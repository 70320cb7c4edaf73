//! Test entries, fixtures and result codes
//!
//! Entries are declared statically by the test program and handed to the
//! driver as a slice; nothing here is mutated during a run.

use crate::harness::Harness;
use bitflags::bitflags;
use std::any::Any;
use std::fmt;

/// Result of a protected call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Status {
    /// Test passed
    Ok = 0,
    /// Test failed, either by return value or by a failure signal
    NotOk = 1,
    /// Test raised a panic payload classified as a failure
    Throws = 2,
    /// Test decided at runtime that it does not apply
    Ignore = 3,
}

impl Status {
    /// Decode a status stored as its discriminant
    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Status::Ok,
            2 => Status::Throws,
            3 => Status::Ignore,
            _ => Status::NotOk,
        }
    }

    /// Check if this status counts as a pass
    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }
}

bitflags! {
    /// Static markers on a test entry
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Flags: u8 {
        /// Expected to fail; a failure does not fail the run
        const TODO = 0b01;
        /// Never run
        const SKIP = 0b10;
    }
}

/// Test body: receives the harness and either the fixture handle or the run's user data
pub type TestFn = fn(&Harness, &mut dyn Any) -> Status;

/// Fixture setup: receives the run's user data, returns the handle or `None` on failure
pub type SetupFn = fn(&Harness, &mut dyn Any) -> Option<Box<dyn Any>>;

/// Fixture teardown: consumes the handle produced by setup
pub type TeardownFn = fn(&Harness, Box<dyn Any>);

/// Setup/teardown pair producing a per-test handle
#[derive(Clone, Copy)]
pub struct Fixture {
    pub setup: SetupFn,
    /// Without a teardown the handle is dropped
    pub teardown: Option<TeardownFn>,
}

impl Fixture {
    pub const fn new(setup: SetupFn) -> Self {
        Self {
            setup,
            teardown: None,
        }
    }

    pub const fn with_teardown(self, teardown: TeardownFn) -> Self {
        Self {
            teardown: Some(teardown),
            ..self
        }
    }
}

/// One statically declared test
#[derive(Clone, Copy)]
pub struct TestEntry {
    pub name: &'static str,
    pub body: TestFn,
    pub flags: Flags,
    pub fixture: Option<&'static Fixture>,
}

impl TestEntry {
    /// Plain entry with no flags and no fixture
    pub const fn new(name: &'static str, body: TestFn) -> Self {
        Self {
            name,
            body,
            flags: Flags::empty(),
            fixture: None,
        }
    }

    /// Mark as expected to fail
    pub const fn todo(self) -> Self {
        Self {
            flags: self.flags.union(Flags::TODO),
            ..self
        }
    }

    /// Mark as never run
    pub const fn skip(self) -> Self {
        Self {
            flags: self.flags.union(Flags::SKIP),
            ..self
        }
    }

    /// Attach a fixture
    pub const fn with_fixture(self, fixture: &'static Fixture) -> Self {
        Self {
            fixture: Some(fixture),
            ..self
        }
    }

    /// Check if the entry is statically skipped
    pub fn is_skip(&self) -> bool {
        self.flags.contains(Flags::SKIP)
    }

    /// Check if the entry is expected to fail
    pub fn is_todo(&self) -> bool {
        self.flags.contains(Flags::TODO)
    }

    /// Directive for the entry's static flags (`SKIP` wins over `TODO`)
    pub fn directive(&self) -> &'static str {
        if self.is_skip() {
            " # SKIP"
        } else if self.is_todo() {
            " # TODO"
        } else {
            ""
        }
    }
}

impl fmt::Debug for Fixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fixture")
            .field("teardown", &self.teardown.is_some())
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for TestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestEntry")
            .field("name", &self.name)
            .field("flags", &self.flags)
            .field("fixture", &self.fixture)
            .finish_non_exhaustive()
    }
}
