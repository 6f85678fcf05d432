//! The UI thread as a value you can check against
//!
//! Immediate-mode renderers keep their font stack in a global context owned
//! by one thread. [`UiThread`] records which thread that is, and every
//! operation that touches the stack or reads a native font validates the
//! caller against it before doing anything else.

use std::thread::{self, ThreadId};

use crate::error::{FontError, Result};

/// Capability token naming the render thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UiThread {
    id: ThreadId,
}

impl UiThread {
    /// Designate the calling thread as the UI thread
    pub fn current() -> Self {
        Self {
            id: thread::current().id(),
        }
    }

    /// Designate an arbitrary thread, e.g. one spawned to run the render loop
    pub fn from_id(id: ThreadId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> ThreadId {
        self.id
    }

    /// Are we running on the UI thread right now?
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.id
    }

    /// Fail fast with [`FontError::ThreadAffinity`] when called elsewhere
    pub fn check(&self) -> Result<()> {
        let actual = thread::current().id();
        if actual == self.id {
            Ok(())
        } else {
            Err(FontError::ThreadAffinity {
                expected: self.id,
                actual,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_thread_passes() {
        let ui = UiThread::current();
        assert!(ui.is_current());
        assert!(ui.check().is_ok());
    }

    #[test]
    fn test_other_thread_fails() {
        let ui = UiThread::current();
        let result = thread::spawn(move || ui.check()).join();

        match result {
            Ok(Err(FontError::ThreadAffinity { expected, actual })) => {
                assert_eq!(expected, ui.id());
                assert_ne!(expected, actual);
            }
            other => panic!("expected a thread affinity error, got {other:?}"),
        }
    }

    #[test]
    fn test_from_id_round_trips() {
        let id = thread::current().id();
        assert_eq!(UiThread::from_id(id), UiThread::current());
    }
}
