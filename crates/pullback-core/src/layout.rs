//! Size and alignment of linear-map records.
//!
//! Generated code describes each record shape to the runtime as a
//! [`RecordLayout`]. The runtime never inspects payload contents; it only
//! needs enough layout information to reserve and align storage.

use std::fmt;

use crate::error::{violated, ContractViolation};

/// Round `value` up to the next multiple of `align`.
///
/// `align` must be a power of two.
#[inline]
pub const fn round_up(value: usize, align: usize) -> usize {
    (value + align - 1) & !(align - 1)
}

/// Byte size and alignment of a record stored by the runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RecordLayout {
    size: usize,
    align: usize,
}

impl RecordLayout {
    /// Describe a record of `size` bytes aligned to `align`.
    ///
    /// # Panics
    ///
    /// Panics with [`ContractViolation::InvalidAlignment`] if `align` is
    /// zero or not a power of two.
    #[track_caller]
    pub fn new(size: usize, align: usize) -> Self {
        if !align.is_power_of_two() {
            violated(ContractViolation::InvalidAlignment { align });
        }
        Self { size, align }
    }

    /// Layout of the Rust type `T`.
    pub const fn of<T>() -> Self {
        Self {
            size: std::mem::size_of::<T>(),
            align: std::mem::align_of::<T>(),
        }
    }

    /// Payload size in bytes.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Required alignment in bytes (always a power of two).
    pub const fn align(&self) -> usize {
        self.align
    }

    /// Size rounded up to a multiple of the alignment.
    pub const fn stride(&self) -> usize {
        round_up(self.size, self.align)
    }

    /// This layout with its size rounded up to the alignment.
    ///
    /// Records laid out back to back at the same alignment need no
    /// padding between them when each is padded this way.
    #[track_caller]
    pub fn pad_to_align(&self) -> RecordLayout {
        if self.size > usize::MAX - (self.align - 1) {
            violated(ContractViolation::SizeOverflow { size: self.size });
        }
        RecordLayout {
            size: self.stride(),
            align: self.align,
        }
    }

    /// Layout of a header of this shape followed by `payload` bytes.
    ///
    /// The payload starts at `self.stride()` rounded to `payload.align()`;
    /// the combined alignment is the larger of the two. Returns the combined
    /// layout and the payload offset.
    #[track_caller]
    pub fn extend(&self, payload: RecordLayout) -> (RecordLayout, usize) {
        let align = self.align.max(payload.align);
        let offset = round_up(self.size, payload.align.max(self.align));
        let size = offset
            .checked_add(payload.size)
            .unwrap_or_else(|| violated(ContractViolation::SizeOverflow { size: payload.size }));
        (RecordLayout { size, align }, offset)
    }
}

impl fmt::Display for RecordLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes @ align {}", self.size, self.align)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn round_up_to_power_of_two() {
        assert_eq!(round_up(0, 8), 0);
        assert_eq!(round_up(1, 8), 8);
        assert_eq!(round_up(8, 8), 8);
        assert_eq!(round_up(24, 16), 32);
    }

    #[test]
    fn of_matches_mem_layout() {
        #[allow(dead_code)]
        struct Pair {
            x: f32,
            y: f32,
        }
        let layout = RecordLayout::of::<Pair>();
        assert_eq!(layout.size(), 8);
        assert_eq!(layout.align(), 4);
    }

    #[test]
    #[should_panic(expected = "alignment")]
    fn non_power_of_two_alignment_is_fatal() {
        let _ = RecordLayout::new(8, 3);
    }

    #[test]
    #[should_panic(expected = "alignment")]
    fn zero_alignment_is_fatal() {
        let _ = RecordLayout::new(8, 0);
    }

    #[test]
    fn extend_places_payload_after_header() {
        // 24-byte header, 8-aligned; payload wants 32-byte alignment.
        let header = RecordLayout::new(24, 8);
        let (combined, offset) = header.extend(RecordLayout::new(10, 32));
        assert_eq!(offset, 32);
        assert_eq!(combined.size(), 42);
        assert_eq!(combined.align(), 32);
    }

    #[test]
    fn extend_with_smaller_payload_alignment_uses_header_stride() {
        let header = RecordLayout::new(8, 8);
        let (combined, offset) = header.extend(RecordLayout::new(3, 1));
        assert_eq!(offset, 8);
        assert_eq!(combined.size(), 11);
        assert_eq!(combined.align(), 8);
    }

    #[test]
    fn pad_to_align_rounds_size_only() {
        let padded = RecordLayout::new(27, 8).pad_to_align();
        assert_eq!(padded.size(), 32);
        assert_eq!(padded.align(), 8);
        assert_eq!(RecordLayout::new(0, 16).pad_to_align().size(), 0);
    }

    proptest! {
        #[test]
        fn round_up_is_aligned_and_minimal(value in 0usize..1 << 20, shift in 0u32..12) {
            let align = 1usize << shift;
            let r = round_up(value, align);
            prop_assert_eq!(r % align, 0);
            prop_assert!(r >= value);
            prop_assert!(r - value < align);
        }
    }
}
