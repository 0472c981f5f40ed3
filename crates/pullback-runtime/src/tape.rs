//! Typed LIFO tapes sharing one arena.
//!
//! A [`TapeManager`] owns an arena and any number of tapes. Each tape
//! stores fixed-layout elements; every push allocates one slot
//! (`SlotHeader` + element) from the shared arena and links it to the
//! tape's previous top. Pops follow the links back.
//!
//! Tapes are independent stacks, but their slots interleave in the arena,
//! so a pop only reclaims bytes at once when its slot is the newest
//! allocation in its slab. Other pops are deferred until the slots above
//! them are popped too; draining every tape empties the arena.

#![allow(unsafe_code)]

use std::ptr::NonNull;

use pullback_arena::{Arena, ArenaConfig, ArenaStats, BoxedObserver, ConfigError};
use pullback_core::{violated, AllocEvent, ContractViolation, RecordLayout, TapeId};

/// In-arena link from a slot to the slot pushed before it on the same tape.
#[repr(C)]
struct SlotHeader {
    previous: Option<NonNull<SlotHeader>>,
}

const SLOT_HEADER: RecordLayout = RecordLayout::of::<SlotHeader>();

/// Per-tape bookkeeping.
pub struct TapeDescriptor {
    element: RecordLayout,
    /// Whole-slot layout: header, padding, element.
    slot: RecordLayout,
    /// Offset of the element from the start of its slot.
    slot_header_stride: usize,
    last: Option<NonNull<SlotHeader>>,
    len: usize,
}

impl TapeDescriptor {
    fn new(element: RecordLayout) -> Self {
        let (slot, slot_header_stride) = SLOT_HEADER.extend(element);
        Self {
            element,
            slot: slot.pad_to_align(),
            slot_header_stride,
            last: None,
            len: 0,
        }
    }

    /// Element size in bytes.
    pub fn element_size(&self) -> usize {
        self.element.size()
    }

    /// Element alignment in bytes.
    pub fn element_align(&self) -> usize {
        self.element.align()
    }

    /// Distance from the start of a slot to its element.
    pub fn slot_header_stride(&self) -> usize {
        self.slot_header_stride
    }

    /// Number of pushed slots not yet popped.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether every pushed slot has been popped.
    pub fn is_empty(&self) -> bool {
        self.last.is_none()
    }

    fn payload_of(&self, slot: NonNull<SlotHeader>) -> NonNull<u8> {
        // SAFETY: every slot spans `slot_header_stride + element size`
        // bytes, so the payload start is in bounds of the slot.
        unsafe { slot.cast::<u8>().add(self.slot_header_stride) }
    }
}

/// Registry of LIFO tapes over a single arena.
///
/// # Examples
///
/// ```
/// use pullback_runtime::TapeManager;
///
/// let mut tapes = TapeManager::new();
/// let id = tapes.create_tape_for::<f64>();
/// let slot = tapes.allocate(id).cast::<f64>();
/// unsafe { slot.as_ptr().write(2.5) };
/// let popped = tapes.pop(id).cast::<f64>();
/// assert_eq!(unsafe { popped.as_ptr().read() }, 2.5);
/// ```
pub struct TapeManager {
    arena: Arena,
    tapes: Vec<TapeDescriptor>,
}

// SAFETY: the raw slot pointers all point into slabs owned by `arena`,
// which moves with the manager. Nothing is shared with another owner,
// and `&TapeManager` exposes no interior mutability, so moving the whole
// manager to another thread is sound. It stays `!Sync` through the raw
// pointers.
unsafe impl Send for TapeManager {}

impl TapeManager {
    /// Create a manager with no tapes and the default arena config.
    pub fn new() -> Self {
        Self::from_arena(Arena::default())
    }

    /// Create a manager with an explicit arena config.
    pub fn with_config(config: ArenaConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_arena(Arena::new(config)?))
    }

    fn from_arena(arena: Arena) -> Self {
        Self {
            arena,
            tapes: Vec::new(),
        }
    }

    /// Register a tape whose elements have `element` layout.
    ///
    /// IDs are assigned in strictly increasing order starting at 0.
    pub fn create_tape(&mut self, element: RecordLayout) -> TapeId {
        let tape = TapeId(self.tapes.len());
        self.tapes.push(TapeDescriptor::new(element));
        self.arena.notify(AllocEvent::TapeCreated {
            tape,
            element_size: element.size(),
            element_align: element.align(),
        });
        tape
    }

    /// Register a tape of `T` elements.
    pub fn create_tape_for<T>(&mut self) -> TapeId {
        self.create_tape(RecordLayout::of::<T>())
    }

    /// Push a slot onto `tape`, returning its uninitialised payload.
    ///
    /// The payload is aligned to the tape's element alignment and stays
    /// valid until the slot is popped.
    ///
    /// # Panics
    ///
    /// Panics with a contract violation if `tape` was not created by this
    /// manager.
    #[track_caller]
    pub fn allocate(&mut self, tape: TapeId) -> NonNull<u8> {
        let slot_layout = self.lookup(tape).slot;
        let slot = self.arena.allocate(slot_layout).cast::<SlotHeader>();
        let descriptor = &mut self.tapes[tape.0];
        // SAFETY: `slot` was just allocated with a layout that starts with
        // a SlotHeader at its alignment, and nothing else refers to it.
        unsafe {
            slot.as_ptr().write(SlotHeader {
                previous: descriptor.last,
            });
        }
        descriptor.last = Some(slot);
        descriptor.len += 1;
        let payload = descriptor.payload_of(slot);
        let len = descriptor.len;
        self.arena.notify(AllocEvent::TapePushed { tape, len });
        payload
    }

    /// Pop the most recent slot of `tape`, returning its payload.
    ///
    /// The payload stays readable until the next allocation on this
    /// manager; read it out before pushing again.
    ///
    /// # Panics
    ///
    /// Panics with a contract violation if `tape` is unknown or has no
    /// unpopped slot.
    #[track_caller]
    pub fn pop(&mut self, tape: TapeId) -> NonNull<u8> {
        let descriptor = self.lookup(tape);
        let Some(slot) = descriptor.last else {
            violated(ContractViolation::EmptyTape { tape });
        };
        let slot_layout = descriptor.slot;

        let descriptor = &mut self.tapes[tape.0];
        // SAFETY: `slot` is the live top of this tape; its header was
        // written by `allocate` and the arena has not reused it since.
        descriptor.last = unsafe { slot.as_ref().previous };
        descriptor.len -= 1;
        let payload = descriptor.payload_of(slot);
        let len = descriptor.len;

        self.arena.deallocate(slot.cast(), slot_layout);
        self.arena.notify(AllocEvent::TapePopped { tape, len });
        payload
    }

    #[track_caller]
    fn lookup(&self, tape: TapeId) -> &TapeDescriptor {
        match self.tapes.get(tape.0) {
            Some(descriptor) => descriptor,
            None => violated(ContractViolation::UnknownTape {
                tape,
                registered: self.tapes.len(),
            }),
        }
    }

    /// Number of registered tapes.
    pub fn tape_count(&self) -> usize {
        self.tapes.len()
    }

    /// Bookkeeping for `tape`.
    ///
    /// # Panics
    ///
    /// Panics with a contract violation if `tape` is unknown.
    #[track_caller]
    pub fn descriptor(&self, tape: TapeId) -> &TapeDescriptor {
        self.lookup(tape)
    }

    /// Live slots on `tape`.
    #[track_caller]
    pub fn len(&self, tape: TapeId) -> usize {
        self.lookup(tape).len()
    }

    /// Whether `tape` has no live slot.
    #[track_caller]
    pub fn is_empty(&self, tape: TapeId) -> bool {
        self.lookup(tape).is_empty()
    }

    /// Snapshot of the arena counters.
    pub fn arena_stats(&self) -> ArenaStats {
        self.arena.stats()
    }

    /// Install an allocation observer, returning the previous one.
    pub fn set_observer(&mut self, observer: BoxedObserver) -> Option<BoxedObserver> {
        self.arena.set_observer(observer)
    }
}

impl Default for TapeManager {
    fn default() -> Self {
        Self::new()
    }
}
