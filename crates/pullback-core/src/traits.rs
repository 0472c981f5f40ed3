//! Observation hook for allocator activity.
//!
//! Allocators carry an optional [`AllocObserver`]. With no observer
//! installed the hot path pays a single branch; installing one routes
//! every [`AllocEvent`] through it in program order.

use crate::id::{SubcontextId, TapeId};

/// A single allocator event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocEvent {
    /// A new slab was requested from the system allocator.
    SlabAcquired {
        /// Capacity of the new slab in bytes.
        bytes: usize,
        /// Number of slabs owned by the arena after acquisition.
        slab_count: usize,
    },
    /// Bytes were bump-allocated from the arena.
    Allocated {
        /// Requested size in bytes.
        bytes: usize,
        /// Requested alignment.
        align: usize,
    },
    /// Bytes were handed back to the arena.
    Deallocated {
        /// Size of the returned region in bytes.
        bytes: usize,
        /// Whether the bytes were reclaimed now rather than deferred.
        reclaimed: bool,
    },
    /// A subcontext was pushed onto a linear map context.
    SubcontextAllocated {
        /// The new subcontext.
        id: SubcontextId,
        /// Payload size in bytes.
        size: usize,
        /// Number of live subcontexts after the push.
        depth: usize,
    },
    /// The top subcontext of a linear map context was released.
    SubcontextReleased {
        /// The released subcontext.
        id: SubcontextId,
        /// Number of live subcontexts after the release.
        depth: usize,
    },
    /// A tape was registered with a tape manager.
    TapeCreated {
        /// The new tape.
        tape: TapeId,
        /// Element size in bytes.
        element_size: usize,
        /// Element alignment.
        element_align: usize,
    },
    /// A slot was pushed onto a tape.
    TapePushed {
        /// The tape.
        tape: TapeId,
        /// Live slots on the tape after the push.
        len: usize,
    },
    /// The top slot of a tape was popped.
    TapePopped {
        /// The tape.
        tape: TapeId,
        /// Live slots on the tape after the pop.
        len: usize,
    },
}

/// Receives allocator events.
///
/// Implementations must not call back into the allocator that emitted
/// the event.
pub trait AllocObserver {
    /// Called once per event, synchronously, on the allocating thread.
    fn on_event(&mut self, event: AllocEvent);
}

impl<F: FnMut(AllocEvent)> AllocObserver for F {
    fn on_event(&mut self, event: AllocEvent) {
        self(event)
    }
}
