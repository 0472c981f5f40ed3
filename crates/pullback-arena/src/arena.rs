//! Grow-only bump arena over a list of slabs.
//!
//! The arena is tuned for owners that release regions in LIFO order: a
//! release of the most recent region rewinds its slab, and once a slab
//! empties the arena steps back to the previous one. A release out of
//! that order is deferred. Its bytes come back when every region above it
//! in the same slab has been released too. All slab memory is returned to
//! the system when the arena is dropped.

use std::ptr::NonNull;

use smallvec::SmallVec;

use pullback_core::{violated, AllocEvent, AllocObserver, ContractViolation, RecordLayout};

use crate::config::ArenaConfig;
use crate::error::ConfigError;
use crate::slab::{Release, Slab};
use crate::stats::ArenaStats;

/// Boxed observer stored by an arena.
pub type BoxedObserver = Box<dyn AllocObserver + Send>;

/// A slab-backed bump allocator.
///
/// # Invariants
///
/// - Every slab after `current` is empty.
/// - Every pointer returned by [`allocate`](Self::allocate) lies inside a
///   slab owned by this arena and stays valid until the region is
///   released, the arena is [`reset`](Self::reset), or the arena drops.
pub struct Arena {
    slabs: SmallVec<[Slab; 4]>,
    /// Index of the slab currently being filled.
    current: usize,
    config: ArenaConfig,
    stats: ArenaStats,
    observer: Option<BoxedObserver>,
}

impl Arena {
    /// Create an arena with no slab; the first allocation acquires one.
    pub fn new(config: ArenaConfig) -> Result<Self, ConfigError> {
        Self::with_reserved(config, 0)
    }

    /// Create an arena whose first slab holds at least `reserved` bytes.
    ///
    /// `reserved` is a sizing hint only: the arena still grows past it on
    /// demand. A hint of zero defers slab acquisition to the first
    /// allocation.
    pub fn with_reserved(config: ArenaConfig, reserved: usize) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid(config, reserved))
    }

    /// Build an arena from a config already known to be valid.
    fn from_valid(config: ArenaConfig, reserved: usize) -> Self {
        let mut arena = Self {
            slabs: SmallVec::new(),
            current: 0,
            config,
            stats: ArenaStats::default(),
            observer: None,
        };
        if reserved > 0 {
            let capacity = arena.config.slab_bytes.max(reserved);
            arena.push_slab(capacity);
        }
        arena
    }

    /// Create an arena with the default config and a reserved first slab.
    pub fn reserved(reserved: usize) -> Self {
        Self::from_valid(ArenaConfig::default(), reserved)
    }

    /// Bump-allocate a region described by `layout`.
    ///
    /// The returned memory is uninitialised and aligned to
    /// `layout.align()`. Never fails: exhaustion of the system allocator
    /// terminates the process.
    #[inline]
    pub fn allocate(&mut self, layout: RecordLayout) -> NonNull<u8> {
        let slab_index = self.current;
        let (ptr, consumed) = match self.slabs.get_mut(slab_index) {
            Some(slab) => {
                let before = slab.used();
                match slab.alloc(layout) {
                    Some(ptr) => (ptr, slab.used() - before),
                    None => self.allocate_slow(layout),
                }
            }
            None => self.allocate_slow(layout),
        };
        self.stats.allocations += 1;
        self.stats.grow_in_use(consumed);
        self.notify(AllocEvent::Allocated {
            bytes: layout.size(),
            align: layout.align(),
        });
        ptr
    }

    /// Place `layout` in a later slab, acquiring a new one if none fits.
    ///
    /// Returns the region and the number of bytes its slab consumed.
    #[cold]
    fn allocate_slow(&mut self, layout: RecordLayout) -> (NonNull<u8>, usize) {
        // Slabs after `current` are empty leftovers from earlier growth.
        let first_candidate = if self.slabs.is_empty() {
            0
        } else {
            self.current + 1
        };
        for index in first_candidate..self.slabs.len() {
            if let Some(ptr) = self.slabs[index].alloc(layout) {
                self.current = index;
                return (ptr, self.slabs[index].used());
            }
        }

        let needed = layout
            .size()
            .checked_add(layout.align())
            .unwrap_or_else(|| violated(ContractViolation::SizeOverflow { size: layout.size() }));
        let capacity = self.config.slab_bytes.max(needed);
        self.push_slab(capacity);
        let slab = &mut self.slabs[self.current];
        // capacity >= size + align, so a fresh slab always fits.
        let ptr = slab
            .alloc(layout)
            .expect("fresh slab sized for the request always fits");
        (ptr, slab.used())
    }

    fn push_slab(&mut self, capacity: usize) {
        self.slabs.push(Slab::new(capacity));
        self.current = self.slabs.len() - 1;
        self.stats.slabs_acquired += 1;
        self.stats.bytes_reserved += capacity;
        self.notify(AllocEvent::SlabAcquired {
            bytes: capacity,
            slab_count: self.slabs.len(),
        });
    }

    /// Return a region to the arena.
    ///
    /// If the region is the newest one still outstanding in its slab, its
    /// bytes and the alignment padding in front of it are reclaimed, along
    /// with any deferred regions directly beneath it, and `true` is
    /// returned. Otherwise the release is deferred and `false` is
    /// returned. A pointer this arena did not hand out is ignored.
    #[inline]
    pub fn deallocate(&mut self, ptr: NonNull<u8>, layout: RecordLayout) -> bool {
        let mut reclaimed = false;
        // Nothing lives past `current`; the owning slab is almost always
        // `current` itself.
        for index in (0..self.slabs.len().min(self.current + 1)).rev() {
            let slab = &mut self.slabs[index];
            let before = slab.used();
            match slab.release(ptr, layout.size()) {
                Release::Unknown => continue,
                Release::Deferred => {}
                Release::Reclaimed => {
                    let freed = before - slab.used();
                    self.stats.shrink_in_use(freed);
                    reclaimed = true;
                }
            }
            break;
        }
        if reclaimed {
            while self.current > 0 && self.slabs[self.current].is_empty() {
                self.current -= 1;
            }
            self.stats.reclaimed += 1;
        }
        self.stats.deallocations += 1;
        self.notify(AllocEvent::Deallocated {
            bytes: layout.size(),
            reclaimed,
        });
        reclaimed
    }

    /// Rewind every slab, invalidating all outstanding regions.
    ///
    /// Slabs are kept for reuse.
    pub fn reset(&mut self) {
        for slab in &mut self.slabs {
            slab.reset();
        }
        self.current = 0;
        self.stats.bytes_in_use = 0;
    }

    /// Whether `ptr` points into one of this arena's slabs.
    #[cfg(test)]
    pub(crate) fn contains(&self, ptr: NonNull<u8>) -> bool {
        self.slabs.iter().any(|slab| slab.contains(ptr))
    }

    /// Install an observer, returning the previous one.
    pub fn set_observer(&mut self, observer: BoxedObserver) -> Option<BoxedObserver> {
        self.observer.replace(observer)
    }

    /// Remove the installed observer.
    pub fn take_observer(&mut self) -> Option<BoxedObserver> {
        self.observer.take()
    }

    /// Forward an event to the installed observer, if any.
    ///
    /// Owners of the arena use this to report their own operations
    /// through the same hook.
    #[inline]
    pub fn notify(&mut self, event: AllocEvent) {
        if let Some(observer) = self.observer.as_mut() {
            observer.on_event(event);
        }
    }

    /// Number of slabs currently owned.
    pub fn slab_count(&self) -> usize {
        self.slabs.len()
    }

    /// Bytes held from the system allocator.
    pub fn bytes_reserved(&self) -> usize {
        self.stats.bytes_reserved
    }

    /// Bytes currently consumed by outstanding regions and their padding.
    pub fn bytes_in_use(&self) -> usize {
        self.stats.bytes_in_use
    }

    /// Snapshot of the arena's counters.
    pub fn stats(&self) -> ArenaStats {
        self.stats.clone()
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::from_valid(ArenaConfig::default(), 0)
    }
}
