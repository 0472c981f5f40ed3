//! [`AllocObserver`] that forwards events to `tracing`.
//!
//! Only compiled with the `tracing` feature. Events are emitted at TRACE
//! level under the `pullback` target with structured fields, so they are
//! filtered out unless a subscriber explicitly enables them.

use crate::traits::{AllocEvent, AllocObserver};

/// Forwards every allocator event to `tracing::trace!`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl AllocObserver for TracingObserver {
    fn on_event(&mut self, event: AllocEvent) {
        match event {
            AllocEvent::SlabAcquired { bytes, slab_count } => {
                tracing::trace!(target: "pullback", bytes, slab_count, "slab acquired");
            }
            AllocEvent::Allocated { bytes, align } => {
                tracing::trace!(target: "pullback", bytes, align, "allocate");
            }
            AllocEvent::Deallocated { bytes, reclaimed } => {
                tracing::trace!(target: "pullback", bytes, reclaimed, "deallocate");
            }
            AllocEvent::SubcontextAllocated { id, size, depth } => {
                tracing::trace!(target: "pullback", id = %id, size, depth, "subcontext allocated");
            }
            AllocEvent::SubcontextReleased { id, depth } => {
                tracing::trace!(target: "pullback", id = %id, depth, "subcontext released");
            }
            AllocEvent::TapeCreated {
                tape,
                element_size,
                element_align,
            } => {
                tracing::trace!(
                    target: "pullback",
                    tape = tape.0,
                    element_size,
                    element_align,
                    "tape created"
                );
            }
            AllocEvent::TapePushed { tape, len } => {
                tracing::trace!(target: "pullback", tape = tape.0, len, "tape push");
            }
            AllocEvent::TapePopped { tape, len } => {
                tracing::trace!(target: "pullback", tape = tape.0, len, "tape pop");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{SubcontextId, TapeId};

    #[test]
    fn accepts_every_event_without_a_subscriber() {
        let mut observer = TracingObserver;
        for event in [
            AllocEvent::SlabAcquired {
                bytes: 4096,
                slab_count: 1,
            },
            AllocEvent::SubcontextAllocated {
                id: SubcontextId(0x1000),
                size: 8,
                depth: 1,
            },
            AllocEvent::SubcontextReleased {
                id: SubcontextId(0x1000),
                depth: 0,
            },
            AllocEvent::TapePushed {
                tape: TapeId(2),
                len: 1,
            },
        ] {
            observer.on_event(event);
        }
    }
}
