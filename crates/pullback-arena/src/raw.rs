//! Low-level primitives for arena memory operations.
//!
//! This is the only module in `pullback-arena` that contains `unsafe`.
//! It owns exactly three unsafe operations, each with a `// SAFETY:`
//! comment: acquiring a block from the system allocator, offsetting into
//! it, and returning it.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use pullback_core::{violated, ContractViolation};

/// A block of uninitialised bytes owned by the arena.
///
/// Freed when dropped. The block never moves once allocated, so pointers
/// into it remain valid for the block's lifetime.
pub(crate) struct RawBlock {
    ptr: NonNull<u8>,
    layout: Layout,
}

// SAFETY: RawBlock exclusively owns its allocation; no aliasing handle
// to the memory exists outside the arena that owns the block.
unsafe impl Send for RawBlock {}

impl RawBlock {
    /// Acquire `bytes` bytes aligned to `align` from the system allocator.
    ///
    /// Terminates the process through [`alloc::handle_alloc_error`] if the
    /// system allocator cannot satisfy the request.
    pub(crate) fn allocate(bytes: usize, align: usize) -> Self {
        let layout = match Layout::from_size_align(bytes.max(1), align) {
            Ok(layout) => layout,
            Err(_) => violated(ContractViolation::SizeOverflow { size: bytes }),
        };
        // SAFETY: layout has non-zero size (bytes.max(1)).
        let raw = unsafe { alloc::alloc(layout) };
        match NonNull::new(raw) {
            Some(ptr) => Self { ptr, layout },
            None => alloc::handle_alloc_error(layout),
        }
    }

    /// Address of the first byte.
    #[inline]
    pub(crate) fn addr(&self) -> usize {
        self.ptr.as_ptr() as usize
    }

    /// Capacity in bytes.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.layout.size()
    }

    /// Pointer to the byte at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is past the end of the block.
    #[inline]
    pub(crate) fn at(&self, offset: usize) -> NonNull<u8> {
        assert!(offset <= self.len(), "offset {offset} outside block");
        // SAFETY: offset is within the allocation (or one past its end),
        // so the result stays in bounds and is non-null.
        unsafe { NonNull::new_unchecked(self.ptr.as_ptr().add(offset)) }
    }
}

impl Drop for RawBlock {
    fn drop(&mut self) {
        // SAFETY: ptr was returned by alloc::alloc with exactly this layout
        // and has not been freed.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_is_aligned() {
        let block = RawBlock::allocate(256, 64);
        assert_eq!(block.addr() % 64, 0);
        assert_eq!(block.len(), 256);
    }

    #[test]
    fn zero_sized_request_still_owns_a_byte() {
        let block = RawBlock::allocate(0, 16);
        assert_eq!(block.len(), 1);
    }

    #[test]
    fn at_offsets_from_base() {
        let block = RawBlock::allocate(64, 16);
        assert_eq!(block.at(0).as_ptr() as usize, block.addr());
        assert_eq!(block.at(64).as_ptr() as usize, block.addr() + 64);
    }

    #[test]
    #[should_panic(expected = "outside block")]
    fn at_past_end_panics() {
        let block = RawBlock::allocate(64, 16);
        let _ = block.at(65);
    }
}
