//! Contiguous byte slabs with bump allocation.
//!
//! A [`Slab`] is one block obtained from the system allocator plus a
//! cursor that advances on each allocation. Slabs are never freed while
//! their arena lives; they are only rewound (by release or reset) and
//! dropped when the arena is dropped.
//!
//! Each slab keeps a stack of marks, one per allocation. Releasing the
//! newest region rewinds the cursor to where it stood before that
//! allocation, padding included. Releasing an older region only marks it;
//! its bytes come back once every region above it has been released.

use std::ptr::NonNull;

use pullback_core::RecordLayout;

use crate::raw::RawBlock;

/// Alignment of every slab's base address.
pub const SLAB_ALIGN: usize = 16;

/// Bookkeeping for one allocation that has not been rewound yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Mark {
    /// Offset of the region itself.
    start: usize,
    /// Offset one past the region.
    end: usize,
    /// Cursor before the allocation, i.e. before its alignment padding.
    before: usize,
    /// Cleared when the region is released below the top.
    live: bool,
}

/// Outcome of [`Slab::release`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Release {
    /// The region was the newest in the slab; the cursor was rewound past
    /// it and past any released regions directly beneath it.
    Reclaimed,
    /// The region is released but a newer live region sits above it. Its
    /// bytes come back once everything above is released too.
    Deferred,
    /// The region does not belong to this slab.
    Unknown,
}

/// A single contiguous memory slab with bump allocation.
pub struct Slab {
    block: RawBlock,
    /// Bump pointer: next free byte offset.
    cursor: usize,
    /// One mark per allocation not yet rewound, oldest first. The top mark
    /// is always live.
    marks: Vec<Mark>,
}

impl Slab {
    /// Create a new slab with the given capacity in bytes.
    ///
    /// The slab's memory is uninitialised.
    pub fn new(capacity: usize) -> Self {
        Self {
            block: RawBlock::allocate(capacity, SLAB_ALIGN),
            cursor: 0,
            marks: Vec::new(),
        }
    }

    /// Offset at which an allocation of `layout` would start, and the
    /// cursor after it, or `None` if it does not fit.
    #[inline]
    fn place(&self, layout: RecordLayout) -> Option<(usize, usize)> {
        let base = self.block.addr();
        let here = base.checked_add(self.cursor)?;
        let aligned = here.checked_add(layout.align() - 1)? & !(layout.align() - 1);
        let start = aligned - base;
        let end = start.checked_add(layout.size())?;
        (end <= self.block.len()).then_some((start, end))
    }

    /// Bump-allocate `layout` from this slab.
    ///
    /// Returns the start of the region, aligned to `layout.align()`, or
    /// `None` if there is insufficient remaining capacity. Alignment
    /// padding in front of the region is consumed until the region is
    /// rewound.
    #[inline]
    pub fn alloc(&mut self, layout: RecordLayout) -> Option<NonNull<u8>> {
        let (start, end) = self.place(layout)?;
        self.marks.push(Mark {
            start,
            end,
            before: self.cursor,
            live: true,
        });
        self.cursor = end;
        Some(self.block.at(start))
    }

    /// Release the region `[ptr, ptr + size)`.
    ///
    /// The newest region is rewound immediately, together with its
    /// padding and any already-released regions beneath it. An older
    /// region is only marked released.
    #[inline]
    pub fn release(&mut self, ptr: NonNull<u8>, size: usize) -> Release {
        let Some(start) = (ptr.as_ptr() as usize).checked_sub(self.block.addr()) else {
            return Release::Unknown;
        };
        let Some(end) = start.checked_add(size) else {
            return Release::Unknown;
        };
        if end > self.cursor {
            return Release::Unknown;
        }
        let Some(index) = self
            .marks
            .iter()
            .rposition(|m| m.live && m.start == start && m.end == end)
        else {
            return Release::Unknown;
        };
        self.marks[index].live = false;
        if index + 1 < self.marks.len() {
            return Release::Deferred;
        }
        while let Some(mark) = self.marks.last().copied().filter(|m| !m.live) {
            self.cursor = mark.before;
            self.marks.pop();
        }
        Release::Reclaimed
    }

    /// Whether `ptr` points into this slab's capacity.
    #[cfg(test)]
    pub(crate) fn contains(&self, ptr: NonNull<u8>) -> bool {
        let addr = ptr.as_ptr() as usize;
        addr >= self.block.addr() && addr < self.block.addr() + self.block.len()
    }

    /// Reset the bump pointer to zero without deallocating.
    ///
    /// All previous allocations become invalid.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.marks.clear();
    }

    /// Whether no allocation in this slab is still live.
    ///
    /// A slab holding only zero-sized regions at offset 0 has a cursor of
    /// zero but is not empty.
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Number of bytes consumed, including alignment padding.
    pub fn used(&self) -> usize {
        self.cursor
    }

    /// Remaining free capacity in bytes.
    #[cfg(test)]
    pub(crate) fn remaining(&self) -> usize {
        self.block.len() - self.cursor
    }
}
