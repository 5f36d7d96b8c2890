//! One-shot completion cells
//!
//! A command's outcome is delivered by an upcall that runs while the
//! issuing call is suspended in [`DriverHost::wait`]. The upcall and the
//! waiter share a [`Completion`]: the upcall resolves it exactly once,
//! the waiter reads the record only after the wait returns. There is no
//! other mutation path, so the status can never be observed before the
//! completion fires.
//!
//! [`DriverHost::wait`]: crate::DriverHost::wait

use alloc::rc::Rc;
use core::cell::RefCell;
use driver_types::{StatusCode, UpcallArgs};

/// An upcall handler registered with the host
///
/// The scheduling model is single-threaded cooperative, so a plain `Rc`
/// closure is the sharing primitive; the host holds a clone for the
/// lifetime of the subscription.
pub type Upcall = Rc<dyn Fn(UpcallArgs)>;

/// What a resolved completion carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionRecord {
    /// Driver-reported outcome; `0` is success
    pub status: StatusCode,
    /// Driver-reported response length in bytes
    pub length: usize,
}

/// A one-shot completion shared between an upcall and a waiting call
#[derive(Debug, Clone, Default)]
pub struct Completion {
    state: Rc<RefCell<Option<CompletionRecord>>>,
}

impl Completion {
    /// Creates an unresolved completion
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(None)),
        }
    }

    /// Returns the upcall handler that resolves this completion
    ///
    /// The handler records the first invocation and ignores any later
    /// ones; a driver completes a given command at most once, and a late
    /// duplicate must not overwrite the recorded outcome.
    pub fn upcall(&self) -> Upcall {
        let state = Rc::clone(&self.state);
        Rc::new(move |args: UpcallArgs| {
            let mut slot = state.borrow_mut();
            if slot.is_none() {
                *slot = Some(CompletionRecord {
                    status: args.status(),
                    length: args.length(),
                });
            }
        })
    }

    /// Returns true once the upcall has fired
    pub fn is_resolved(&self) -> bool {
        self.state.borrow().is_some()
    }

    /// Returns the recorded outcome, if resolved
    pub fn record(&self) -> Option<CompletionRecord> {
        *self.state.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_unresolved() {
        let completion = Completion::new();
        assert!(!completion.is_resolved());
        assert_eq!(completion.record(), None);
    }

    #[test]
    fn test_upcall_resolves_once() {
        let completion = Completion::new();
        let upcall = completion.upcall();

        upcall(UpcallArgs::completion(StatusCode::SUCCESS, 5));
        assert!(completion.is_resolved());

        let record = completion.record().unwrap();
        assert_eq!(record.status, StatusCode::SUCCESS);
        assert_eq!(record.length, 5);
    }

    #[test]
    fn test_duplicate_upcall_is_ignored() {
        let completion = Completion::new();
        let upcall = completion.upcall();

        upcall(UpcallArgs::completion(StatusCode::new(418), 0));
        upcall(UpcallArgs::completion(StatusCode::SUCCESS, 99));

        let record = completion.record().unwrap();
        assert_eq!(record.status, StatusCode::new(418));
        assert_eq!(record.length, 0);
    }

    #[test]
    fn test_clones_share_state() {
        let completion = Completion::new();
        let observer = completion.clone();
        let upcall = completion.upcall();

        upcall(UpcallArgs::completion(StatusCode::SUCCESS, 1));
        assert!(observer.is_resolved());
    }
}
