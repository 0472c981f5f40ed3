//! Test utilities for Pullback development.
//!
//! Provides a [`RecordingObserver`] that captures every
//! [`AllocEvent`](pullback_core::AllocEvent) for later assertions, plus
//! record types and deterministic LIFO scripts in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::{Arc, Mutex, MutexGuard};

use pullback_core::{AllocEvent, AllocObserver};

/// Observer that appends every event to a shared log.
///
/// Clones share the same log, so keep one clone for assertions and box
/// another into the allocator under test.
#[derive(Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<AllocEvent>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self) -> MutexGuard<'_, Vec<AllocEvent>> {
        // A poisoned log only means another test thread panicked mid-push.
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Copy of every event recorded so far, oldest first.
    pub fn events(&self) -> Vec<AllocEvent> {
        self.log().clone()
    }

    /// Number of recorded events matching `pred`.
    pub fn count(&self, pred: impl Fn(&AllocEvent) -> bool) -> usize {
        self.log().iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&self) {
        self.log().clear();
    }
}

impl AllocObserver for RecordingObserver {
    fn on_event(&mut self, event: AllocEvent) {
        self.log().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pullback_core::TapeId;

    #[test]
    fn clones_share_one_log() {
        let observer = RecordingObserver::new();
        let mut sink = observer.clone();
        sink.on_event(AllocEvent::TapePushed {
            tape: TapeId(0),
            len: 1,
        });
        sink.on_event(AllocEvent::TapePopped {
            tape: TapeId(0),
            len: 0,
        });
        assert_eq!(observer.events().len(), 2);
        assert_eq!(
            observer.count(|e| matches!(e, AllocEvent::TapePopped { .. })),
            1
        );
        observer.clear();
        assert!(observer.events().is_empty());
    }
}
