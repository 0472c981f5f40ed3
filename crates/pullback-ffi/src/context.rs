//! Context lifecycle: create, retain, release, retain count.
//!
//! A `PullbackContext *` is the pointer produced by `Rc::into_raw`. Each
//! handle held by C code accounts for one strong reference; live
//! subcontexts hold their own.

use std::mem::ManuallyDrop;
use std::rc::Rc;

use pullback_runtime::LinearMapContext;

use crate::handle::{non_null, PullbackContext};

pub(crate) fn into_handle(ctx: Rc<LinearMapContext>) -> *mut PullbackContext {
    Rc::into_raw(ctx).cast_mut().cast()
}

/// Borrow the `Rc` behind a handle without touching its count.
///
/// # Safety
///
/// `ctx` must be non-null and carry a strong reference that outlives the
/// returned value.
#[allow(unsafe_code)]
#[track_caller]
pub(crate) unsafe fn borrow(
    ctx: *mut PullbackContext,
    operation: &'static str,
) -> ManuallyDrop<Rc<LinearMapContext>> {
    let ptr = non_null(ctx, operation).cast::<LinearMapContext>();
    // SAFETY: ptr came from Rc::into_raw; ManuallyDrop keeps the count
    // unchanged when the borrow ends.
    ManuallyDrop::new(unsafe { Rc::from_raw(ptr.as_ptr()) })
}

/// Create a context whose first slab can hold `reserved_capacity` bytes.
///
/// The returned handle has a retain count of 1. Release it with
/// `pullback_context_release`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn pullback_context_create(reserved_capacity: usize) -> *mut PullbackContext {
    into_handle(LinearMapContext::new(reserved_capacity))
}

/// Take an extra strong reference on `ctx`.
///
/// # Safety
///
/// `ctx` must be a live handle from `pullback_context_create`.
#[no_mangle]
#[allow(unsafe_code)]
pub unsafe extern "C" fn pullback_context_retain(ctx: *mut PullbackContext) {
    let ptr = non_null(ctx, "pullback_context_retain").cast::<LinearMapContext>();
    // SAFETY: ptr came from Rc::into_raw and the caller holds a reference.
    unsafe { Rc::increment_strong_count(ptr.as_ptr()) };
}

/// Drop one strong reference on `ctx`, freeing it at zero.
///
/// The context cannot reach zero while a subcontext is live, because
/// every subcontext holds its own reference.
///
/// # Safety
///
/// `ctx` must be a live handle, and the caller gives up the reference it
/// releases.
#[no_mangle]
#[allow(unsafe_code)]
pub unsafe extern "C" fn pullback_context_release(ctx: *mut PullbackContext) {
    let ptr = non_null(ctx, "pullback_context_release").cast::<LinearMapContext>();
    // SAFETY: ptr came from Rc::into_raw and the caller owns one reference.
    unsafe { Rc::decrement_strong_count(ptr.as_ptr()) };
}

/// Current strong reference count of `ctx`.
///
/// # Safety
///
/// `ctx` must be a live handle.
#[no_mangle]
#[allow(unsafe_code)]
pub unsafe extern "C" fn pullback_context_retain_count(ctx: *mut PullbackContext) -> usize {
    // SAFETY: the caller's reference keeps the context alive for the call.
    let rc = unsafe { borrow(ctx, "pullback_context_retain_count") };
    Rc::strong_count(&rc)
}
