//! Subcontext entry points: allocate, project buffer, previous, release.
//!
//! A `PullbackSubcontext *` is the raw header pointer of a live
//! subcontext (`Subcontext::into_raw`). The C caller owns it until it
//! passes it to `pullback_subcontext_release`.

use std::ffi::c_void;
use std::ptr;

use pullback_runtime::{Subcontext, SubcontextHeader};

use crate::context::borrow;
use crate::handle::{non_null, PullbackContext, PullbackSubcontext};

/// Run `f` on the handle behind `sub` and give the handle back.
///
/// # Safety
///
/// `sub` must be a live subcontext handle.
#[allow(unsafe_code)]
#[track_caller]
unsafe fn with_subcontext<R>(
    sub: *mut PullbackSubcontext,
    operation: &'static str,
    f: impl FnOnce(&Subcontext) -> R,
) -> R {
    let header = non_null(sub, operation).cast::<SubcontextHeader>();
    // SAFETY: header is a live subcontext handed out by into_raw; the
    // rebuilt handle is returned to raw form before this call ends.
    let handle = unsafe { Subcontext::from_raw(header) };
    let out = f(&handle);
    let _ = handle.into_raw();
    out
}

/// Push a subcontext with `size` payload bytes onto `ctx`.
///
/// The new subcontext holds its own reference on `ctx`.
///
/// # Safety
///
/// `ctx` must be a live context handle.
#[no_mangle]
#[allow(unsafe_code)]
pub unsafe extern "C" fn pullback_subcontext_allocate(
    ctx: *mut PullbackContext,
    size: usize,
) -> *mut PullbackSubcontext {
    // SAFETY: the caller's reference keeps the context alive for the call.
    let rc = unsafe { borrow(ctx, "pullback_subcontext_allocate") };
    rc.allocate_subcontext(size).into_raw().as_ptr().cast()
}

/// Address of the payload of `sub`.
///
/// # Safety
///
/// `sub` must be a live subcontext handle.
#[no_mangle]
#[allow(unsafe_code)]
pub unsafe extern "C" fn pullback_subcontext_project_buffer(
    sub: *mut PullbackSubcontext,
) -> *mut c_void {
    // SAFETY: forwarded caller contract.
    unsafe {
        with_subcontext(sub, "pullback_subcontext_project_buffer", |s| {
            s.buffer().as_ptr().cast()
        })
    }
}

/// The subcontext allocated just before `sub`, or null.
///
/// # Safety
///
/// `sub` must be a live subcontext handle.
#[no_mangle]
#[allow(unsafe_code)]
pub unsafe extern "C" fn pullback_subcontext_previous(
    sub: *mut PullbackSubcontext,
) -> *mut PullbackSubcontext {
    // SAFETY: forwarded caller contract.
    unsafe {
        with_subcontext(sub, "pullback_subcontext_previous", |s| {
            s.previous_raw()
                .map_or(ptr::null_mut(), |p| p.as_ptr().cast())
        })
    }
}

/// Release `sub`, which must be the most recent live subcontext of its
/// context. May free the context.
///
/// # Safety
///
/// `sub` must be a live subcontext handle; it is invalid afterwards.
#[no_mangle]
#[allow(unsafe_code)]
pub unsafe extern "C" fn pullback_subcontext_release(sub: *mut PullbackSubcontext) {
    let header = non_null(sub, "pullback_subcontext_release").cast::<SubcontextHeader>();
    // SAFETY: the caller hands over the only handle.
    unsafe { Subcontext::from_raw(header) }.release();
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;
    use crate::context::{
        pullback_context_create, pullback_context_release, pullback_context_retain_count,
    };
    use pullback_test_utils::fixtures::Pair;

    unsafe fn write_pair(sub: *mut PullbackSubcontext, value: Pair) {
        pullback_subcontext_project_buffer(sub)
            .cast::<Pair>()
            .write(value);
    }

    unsafe fn read_pair(sub: *mut PullbackSubcontext) -> Pair {
        pullback_subcontext_project_buffer(sub).cast::<Pair>().read()
    }

    #[test]
    fn subcontext_linked_list() {
        let ctx = pullback_context_create(32);
        let size = std::mem::size_of::<Pair>();
        unsafe {
            assert_eq!(pullback_context_retain_count(ctx), 1);

            let sub1 = pullback_subcontext_allocate(ctx, size);
            assert!(pullback_subcontext_previous(sub1).is_null());
            assert_eq!(pullback_context_retain_count(ctx), 2);
            write_pair(sub1, Pair::splat(1.0));

            let sub2 = pullback_subcontext_allocate(ctx, size);
            assert_eq!(pullback_subcontext_previous(sub2), sub1);
            assert_eq!(pullback_context_retain_count(ctx), 3);
            write_pair(sub2, Pair::splat(2.0));

            assert_eq!(read_pair(sub2), Pair::splat(2.0));
            assert_eq!(read_pair(sub1), Pair::splat(1.0));

            pullback_subcontext_release(sub2);
            assert_eq!(pullback_context_retain_count(ctx), 2);
            pullback_subcontext_release(sub1);
            assert_eq!(pullback_context_retain_count(ctx), 1);
            pullback_context_release(ctx);
        }
    }

    #[test]
    fn subcontext_keeps_released_context_alive() {
        let ctx = pullback_context_create(0);
        unsafe {
            let sub = pullback_subcontext_allocate(ctx, 16);
            pullback_context_release(ctx);
            // The subcontext's own reference keeps the arena alive.
            pullback_subcontext_project_buffer(sub)
                .cast::<u64>()
                .write(0xfeed);
            assert_eq!(
                pullback_subcontext_project_buffer(sub).cast::<u64>().read(),
                0xfeed
            );
            pullback_subcontext_release(sub);
        }
    }

    #[test]
    fn buffer_is_header_stride_past_handle() {
        let ctx = pullback_context_create(0);
        unsafe {
            let sub = pullback_subcontext_allocate(ctx, 4);
            let buffer = pullback_subcontext_project_buffer(sub) as usize;
            assert_eq!(buffer - sub as usize, pullback_runtime::HEADER_STRIDE);
            pullback_subcontext_release(sub);
            pullback_context_release(ctx);
        }
    }
}
