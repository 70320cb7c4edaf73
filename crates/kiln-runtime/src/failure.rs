//! Failure propagation
//!
//! A failure is signalled by unwinding with a [`FailureSignal`] payload to
//! the nearest protected call on the same thread. Each thread carries a
//! single jump-context flag saying whether such a call is active; signalling
//! without one is unrecoverable and aborts the process.
//!
//! # Nesting
//!
//! The context is one flag, not a stack. A protected call made inside
//! another works, but when the inner call returns the flag is cleared, so a
//! failure signalled afterwards by the outer body aborts instead of
//! unwinding to the outer call.

use crate::entry::Status;
use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::process;

thread_local! {
    static JUMP_ACTIVE: Cell<bool> = const { Cell::new(false) };
}

/// Panic payload carried by a failure signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureSignal;

/// The installable {catch, signal-failure} pair
///
/// Implementations must return [`Status::NotOk`] from `catch` when the body
/// is interrupted by their own `signal_failure`.
pub trait FailureMechanism: Sync {
    /// Run `body` under protection
    fn catch(&self, body: &mut dyn FnMut() -> Status) -> Status;

    /// Abandon the current protected body
    fn signal_failure(&self) -> !;
}

/// How a mechanism is installed on the harness
pub type MechanismRef = &'static dyn FailureMechanism;

/// Default mechanism: failure signals are caught, other panics pass through
#[derive(Debug, Default, Clone, Copy)]
pub struct Unwind;

/// The default mechanism, in the form [`Harness::set_mechanism`](crate::Harness::set_mechanism) takes
pub static UNWIND: MechanismRef = &Unwind;

impl FailureMechanism for Unwind {
    fn catch(&self, body: &mut dyn FnMut() -> Status) -> Status {
        match protect(body) {
            Ok(status) => status,
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    fn signal_failure(&self) -> ! {
        raise()
    }
}

/// Run `body` with this thread's jump context active
///
/// A failure signal becomes `Ok(Status::NotOk)`; any other panic payload is
/// handed back for the mechanism to classify or re-raise.
pub fn protect(body: &mut dyn FnMut() -> Status) -> Result<Status, Box<dyn Any + Send>> {
    JUMP_ACTIVE.with(|active| active.set(true));
    let outcome = panic::catch_unwind(AssertUnwindSafe(body));
    deactivate();
    match outcome {
        Ok(status) => Ok(status),
        Err(payload) if payload.is::<FailureSignal>() => Ok(Status::NotOk),
        Err(payload) => Err(payload),
    }
}

/// Unwind to the active protected call, or abort if there is none
pub fn raise() -> ! {
    if is_active() {
        panic::resume_unwind(Box::new(FailureSignal));
    }
    tracing::error!(
        thread = ?std::thread::current().name(),
        "failure signalled outside of a protected call"
    );
    process::abort()
}

/// Check if this thread is inside a protected call
pub fn is_active() -> bool {
    JUMP_ACTIVE.with(Cell::get)
}

/// Clear this thread's jump context
pub fn deactivate() {
    JUMP_ACTIVE.with(|active| active.set(false));
}
