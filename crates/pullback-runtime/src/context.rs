//! Linear map contexts: per-computation stacks of variable-sized records.
//!
//! A [`LinearMapContext`] is created when a forward pass starts and owns
//! one [`Arena`]. Every differentiable call site or branch arm that needs
//! to keep a record pushes a [`Subcontext`] onto the context; the backward
//! pass releases them in reverse order.
//!
//! # Lifetime
//!
//! The context is shared through `Rc`. Each live subcontext holds one
//! strong reference, so the reference count is always
//! `1 + live subcontexts` while the creator still holds its handle, and
//! the context (with all its slabs) is freed only after the last
//! subcontext is released and the creator drops its `Rc`.
//!
//! The count is not atomic: a context and its subcontexts are confined to
//! one thread. Sharing a context across threads would need an `Arc`-based
//! variant; none is provided.

use std::cell::{Cell, RefCell};
use std::ptr::NonNull;
use std::rc::Rc;

use pullback_arena::{Arena, ArenaConfig, ArenaStats, BoxedObserver, ConfigError};
use pullback_core::{violated, AllocEvent, ContractViolation, SubcontextId};

use crate::subcontext::{Subcontext, SubcontextHeader, HEADER_STRIDE};

/// Allocator for the linear-map records of one differentiated computation.
///
/// # Invariants
///
/// - `last` is `None` iff `depth == 0`.
/// - Following `previous` links from `last` visits exactly `depth`
///   subcontexts, newest first.
pub struct LinearMapContext {
    /// Most recently allocated live subcontext.
    last: Cell<Option<NonNull<SubcontextHeader>>>,
    /// Number of live subcontexts.
    depth: Cell<usize>,
    arena: RefCell<Arena>,
}

impl LinearMapContext {
    /// Create a context whose arena can hold at least `reserved_capacity`
    /// bytes of subcontexts (headers included) before it grows.
    ///
    /// The returned `Rc` has a strong count of 1.
    pub fn new(reserved_capacity: usize) -> Rc<Self> {
        Self::from_arena(Arena::reserved(reserved_capacity))
    }

    /// Create a context with an explicit arena config.
    pub fn with_config(
        config: ArenaConfig,
        reserved_capacity: usize,
    ) -> Result<Rc<Self>, ConfigError> {
        Ok(Self::from_arena(Arena::with_reserved(
            config,
            reserved_capacity,
        )?))
    }

    fn from_arena(arena: Arena) -> Rc<Self> {
        Rc::new(Self {
            last: Cell::new(None),
            depth: Cell::new(0),
            arena: RefCell::new(arena),
        })
    }

    /// Push a subcontext with `size` payload bytes.
    ///
    /// Takes one strong reference on the context for as long as the
    /// subcontext lives. The payload is uninitialised and aligned to the
    /// header alignment.
    pub fn allocate_subcontext(self: &Rc<Self>, size: usize) -> Subcontext {
        let layout = Subcontext::layout_for(size);
        let memory = self.arena.borrow_mut().allocate(layout);
        let sub = Subcontext::emplace(memory, self.last.get(), size, Rc::clone(self));
        self.last.set(Some(sub.header_ptr()));
        self.depth.set(self.depth.get() + 1);
        self.arena.borrow_mut().notify(AllocEvent::SubcontextAllocated {
            id: sub.id(),
            size,
            depth: self.depth.get(),
        });
        sub
    }

    /// Pop `header` off the stack and return its memory to the arena.
    ///
    /// Called by [`Subcontext::release`] once it has checked that `header`
    /// is the top and moved the header out of arena memory.
    pub(crate) fn pop(
        &self,
        header: NonNull<SubcontextHeader>,
        previous: Option<NonNull<SubcontextHeader>>,
        size: usize,
    ) {
        debug_assert!(self.is_top(header));
        self.last.set(previous);
        self.depth.set(self.depth.get() - 1);
        let mut arena = self.arena.borrow_mut();
        arena.deallocate(header.cast(), Subcontext::layout_for(size));
        arena.notify(AllocEvent::SubcontextReleased {
            id: id_of(header),
            depth: self.depth.get(),
        });
    }

    /// Whether `header` is the current top of the stack.
    pub(crate) fn is_top(&self, header: NonNull<SubcontextHeader>) -> bool {
        self.last.get() == Some(header)
    }

    /// Abort with an out-of-order release of `header`.
    #[cold]
    #[track_caller]
    pub(crate) fn not_top(&self, header: NonNull<SubcontextHeader>) -> ! {
        violated(ContractViolation::SubcontextNotTop {
            released: id_of(header),
            top: self.last_subcontext(),
        })
    }

    /// Identity of the most recently allocated live subcontext.
    pub fn last_subcontext(&self) -> Option<SubcontextId> {
        self.last.get().map(id_of)
    }

    /// Number of live subcontexts.
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    /// Whether no subcontext is live.
    pub fn is_empty(&self) -> bool {
        self.last.get().is_none()
    }

    /// Distance in bytes from a subcontext's header to its payload.
    pub const fn header_stride() -> usize {
        HEADER_STRIDE
    }

    /// Snapshot of the arena counters.
    pub fn arena_stats(&self) -> ArenaStats {
        self.arena.borrow().stats()
    }

    /// Install an allocation observer on the context's arena.
    ///
    /// The observer must not call back into this context.
    pub fn set_observer(&self, observer: BoxedObserver) -> Option<BoxedObserver> {
        self.arena.borrow_mut().set_observer(observer)
    }
}

impl Drop for LinearMapContext {
    fn drop(&mut self) {
        // Every live subcontext holds a strong reference, so reaching here
        // with a non-empty stack means the reference count was corrupted.
        if self.last.get().is_some() {
            violated(ContractViolation::LiveSubcontexts {
                live: self.depth.get(),
            });
        }
    }
}

pub(crate) fn id_of(header: NonNull<SubcontextHeader>) -> SubcontextId {
    SubcontextId(header.as_ptr() as usize)
}
