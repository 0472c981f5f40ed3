//! Subcontexts: one variable-sized record pushed onto a linear map context.
//!
//! Each subcontext is a single arena allocation: a [`SubcontextHeader`]
//! at offset 0 followed by the caller's payload at [`HEADER_STRIDE`].
//! The header links to the previously allocated subcontext and holds a
//! strong reference to the owning context.

#![allow(unsafe_code)]

use std::mem::{ManuallyDrop, MaybeUninit};
use std::ptr::NonNull;
use std::rc::Rc;

use pullback_core::{round_up, RecordLayout, SubcontextId};

use crate::context::{id_of, LinearMapContext};

/// In-arena header of a subcontext.
///
/// Opaque outside this crate; generated code only ever sees pointers to
/// it.
#[repr(C)]
pub struct SubcontextHeader {
    previous: Option<NonNull<SubcontextHeader>>,
    size: usize,
    owner: ManuallyDrop<Rc<LinearMapContext>>,
}

const HEADER: RecordLayout = RecordLayout::of::<SubcontextHeader>();

/// Offset of the payload from the start of a subcontext.
pub const HEADER_STRIDE: usize = round_up(HEADER.size(), HEADER.align());

/// Owning handle to a live subcontext.
///
/// There is exactly one handle per subcontext. Release it with
/// [`release`](Self::release) once its payload has been consumed; the
/// owning context must see releases in reverse allocation order.
/// Dropping the handle without releasing it leaks the subcontext and
/// keeps the context alive forever.
#[must_use = "a subcontext must be released, or its context leaks"]
pub struct Subcontext {
    header: NonNull<SubcontextHeader>,
}

impl Subcontext {
    /// Arena layout of a subcontext with `size` payload bytes.
    ///
    /// Padded to the header alignment so consecutive subcontexts sit back
    /// to back and a LIFO release sequence rewinds the arena completely.
    #[track_caller]
    pub(crate) fn layout_for(size: usize) -> RecordLayout {
        HEADER
            .extend(RecordLayout::new(size, HEADER.align()))
            .0
            .pad_to_align()
    }

    /// Write a header into freshly allocated arena memory.
    pub(crate) fn emplace(
        memory: NonNull<u8>,
        previous: Option<NonNull<SubcontextHeader>>,
        size: usize,
        owner: Rc<LinearMapContext>,
    ) -> Self {
        let header = memory.cast::<SubcontextHeader>();
        // SAFETY: memory was just allocated with `layout_for(size)`, which
        // is large enough and aligned for a SubcontextHeader, and nothing
        // else refers to it yet.
        unsafe {
            header.as_ptr().write(SubcontextHeader {
                previous,
                size,
                owner: ManuallyDrop::new(owner),
            });
        }
        Self { header }
    }

    #[inline]
    fn header(&self) -> &SubcontextHeader {
        // SAFETY: the header stays initialised until `release` consumes the
        // unique handle, and the owner reference it holds keeps the arena
        // (and therefore the memory) alive.
        unsafe { self.header.as_ref() }
    }

    pub(crate) fn header_ptr(&self) -> NonNull<SubcontextHeader> {
        self.header
    }

    /// Identity of this subcontext.
    pub fn id(&self) -> SubcontextId {
        id_of(self.header)
    }

    /// The subcontext allocated immediately before this one on the same
    /// context, if any.
    ///
    /// Does not change any state; the backward pass may use it to inspect
    /// ancestors without releasing anything.
    pub fn previous(&self) -> Option<SubcontextId> {
        self.header().previous.map(id_of)
    }

    /// Raw pointer form of [`previous`](Self::previous).
    pub fn previous_raw(&self) -> Option<NonNull<SubcontextHeader>> {
        self.header().previous
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.header().size
    }

    /// Whether the payload is zero bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The context this subcontext was allocated from.
    pub fn context(&self) -> &Rc<LinearMapContext> {
        &self.header().owner
    }

    /// Address of the payload, immediately after the header.
    ///
    /// Valid for reads and writes of [`len`](Self::len) bytes until the
    /// subcontext is released. The caller is responsible for constructing
    /// and dropping any value placed there.
    #[inline]
    pub fn buffer(&self) -> NonNull<u8> {
        // SAFETY: the allocation spans HEADER_STRIDE + size bytes, so the
        // payload start is in bounds (one past the end when size == 0).
        unsafe { NonNull::new_unchecked(self.header.as_ptr().cast::<u8>().add(HEADER_STRIDE)) }
    }

    /// The payload as uninitialised bytes.
    pub fn buffer_mut(&mut self) -> &mut [MaybeUninit<u8>] {
        let len = self.len();
        // SAFETY: the payload is `len` bytes owned by this subcontext, and
        // the `&mut self` borrow makes the slice the only access path.
        unsafe { std::slice::from_raw_parts_mut(self.buffer().as_ptr().cast(), len) }
    }

    /// Release the subcontext, dropping its reference on the context.
    ///
    /// This may free the context if no other reference remains.
    ///
    /// # Panics
    ///
    /// Panics with a contract violation if a subcontext allocated after
    /// this one on the same context is still live.
    #[track_caller]
    pub fn release(self) {
        let header = self.header;
        if !self.context().is_top(header) {
            self.context().not_top(header);
        }
        // SAFETY: the header is live and is the top of its context. Reading
        // it moves the owner reference out; the arena memory is not read
        // again before it is returned below.
        let SubcontextHeader {
            previous,
            size,
            owner,
        } = unsafe { header.as_ptr().read() };
        let owner = ManuallyDrop::into_inner(owner);
        owner.pop(header, previous, size);
        drop(owner);
    }

    /// Give up the handle, returning the raw header pointer.
    ///
    /// The subcontext stays live; recover the handle with
    /// [`from_raw`](Self::from_raw).
    pub fn into_raw(self) -> NonNull<SubcontextHeader> {
        self.header
    }

    /// Rebuild a handle from a pointer produced by
    /// [`into_raw`](Self::into_raw).
    ///
    /// # Safety
    ///
    /// `header` must come from `into_raw`, must not have been released,
    /// and no other handle to the same subcontext may be used while the
    /// returned one exists.
    pub unsafe fn from_raw(header: NonNull<SubcontextHeader>) -> Self {
        Self { header }
    }
}
