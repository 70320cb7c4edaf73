//! Expected panics
//!
//! [`Expecter`] is a second [`FailureMechanism`]. Besides catching failure
//! signals it classifies other panic payloads by type, trying an ordered
//! list of classifiers; the first that recognises the payload decides the
//! status. Payloads nobody recognises are re-raised.
//!
//! ```
//! use kiln_runtime::{accept, reject, Classifier, Expecter};
//!
//! struct OutOfRange;
//! struct Cancelled;
//!
//! static RULES: [Classifier; 2] = [accept::<OutOfRange>(), reject::<Cancelled>()];
//! static EXPECT_RANGE: Expecter = Expecter::new(&RULES);
//! ```
//!
//! Installing it from a fixture's setup scopes it to that test; the driver
//! restores the run's default before the next one.

use crate::entry::Status;
use crate::failure::{self, FailureMechanism};
use std::any::Any;
use std::panic;

/// Payload test paired with the status it yields
#[derive(Clone, Copy)]
pub struct Classifier {
    matches: fn(&(dyn Any + Send)) -> bool,
    verdict: Status,
}

impl Classifier {
    /// Status for `payload`, if this classifier recognises it
    pub fn classify(&self, payload: &(dyn Any + Send)) -> Option<Status> {
        (self.matches)(payload).then_some(self.verdict)
    }
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("verdict", &self.verdict)
            .finish_non_exhaustive()
    }
}

fn is_payload<T: Any>(payload: &(dyn Any + Send)) -> bool {
    payload.is::<T>()
}

/// A `T` payload is allowed: the test passes
pub const fn accept<T: Any>() -> Classifier {
    Classifier {
        matches: is_payload::<T>,
        verdict: Status::Ok,
    }
}

/// A `T` payload is rejected: the test fails
pub const fn reject<T: Any>() -> Classifier {
    Classifier {
        matches: is_payload::<T>,
        verdict: Status::NotOk,
    }
}

/// A `T` payload is reported as a thrown failure
pub const fn throws<T: Any>() -> Classifier {
    Classifier {
        matches: is_payload::<T>,
        verdict: Status::Throws,
    }
}

/// Mechanism classifying panic payloads, first match wins
#[derive(Debug, Clone, Copy)]
pub struct Expecter {
    classifiers: &'static [Classifier],
}

impl Expecter {
    pub const fn new(classifiers: &'static [Classifier]) -> Self {
        Self { classifiers }
    }

    /// Status chosen by the first matching classifier
    pub fn classify(&self, payload: &(dyn Any + Send)) -> Option<Status> {
        self.classifiers.iter().find_map(|c| c.classify(payload))
    }
}

impl FailureMechanism for Expecter {
    fn catch(&self, body: &mut dyn FnMut() -> Status) -> Status {
        match failure::protect(body) {
            Ok(status) => status,
            Err(payload) => match self.classify(&*payload) {
                Some(status) => {
                    tracing::debug!(?status, "panic payload classified");
                    status
                }
                None => panic::resume_unwind(payload),
            },
        }
    }

    fn signal_failure(&self) -> ! {
        failure::raise()
    }
}
