//! Tape manager entry points.
//!
//! A `PullbackTapeManager *` is a boxed [`TapeManager`]; tape ids cross
//! the boundary as plain `size_t` values.

use std::ffi::c_void;

use pullback_core::{RecordLayout, TapeId};
use pullback_runtime::TapeManager;

use crate::handle::{non_null, PullbackTapeManager};

/// Borrow the manager behind a handle.
///
/// # Safety
///
/// `mgr` must be a live manager handle with no other borrow active.
#[allow(unsafe_code)]
#[track_caller]
unsafe fn manager<'a>(
    mgr: *mut PullbackTapeManager,
    operation: &'static str,
) -> &'a mut TapeManager {
    let ptr = non_null(mgr, operation).cast::<TapeManager>();
    // SAFETY: ptr came from Box::into_raw in pullback_tape_manager_create
    // and the caller guarantees exclusive access for the call.
    unsafe { &mut *ptr.as_ptr() }
}

/// Create an empty tape manager.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn pullback_tape_manager_create() -> *mut PullbackTapeManager {
    Box::into_raw(Box::new(TapeManager::new())).cast()
}

/// Destroy a tape manager and every tape it owns.
///
/// # Safety
///
/// `mgr` must be a live manager handle; it is invalid afterwards, as is
/// every payload pointer obtained from it.
#[no_mangle]
#[allow(unsafe_code)]
pub unsafe extern "C" fn pullback_tape_manager_destroy(mgr: *mut PullbackTapeManager) {
    let ptr = non_null(mgr, "pullback_tape_manager_destroy").cast::<TapeManager>();
    // SAFETY: ptr came from Box::into_raw and ownership is handed back.
    drop(unsafe { Box::from_raw(ptr.as_ptr()) });
}

/// Register a tape of `element_size`-byte elements aligned to
/// `element_alignment`, returning its id.
///
/// # Safety
///
/// `mgr` must be a live manager handle.
#[no_mangle]
#[allow(unsafe_code)]
pub unsafe extern "C" fn pullback_tape_create(
    mgr: *mut PullbackTapeManager,
    element_size: usize,
    element_alignment: usize,
) -> usize {
    // SAFETY: forwarded caller contract.
    let mgr = unsafe { manager(mgr, "pullback_tape_create") };
    mgr.create_tape(RecordLayout::new(element_size, element_alignment)).0
}

/// Push a slot onto tape `tape_id`, returning its payload.
///
/// # Safety
///
/// `mgr` must be a live manager handle.
#[no_mangle]
#[allow(unsafe_code)]
pub unsafe extern "C" fn pullback_tape_allocate(
    mgr: *mut PullbackTapeManager,
    tape_id: usize,
) -> *mut c_void {
    // SAFETY: forwarded caller contract.
    let mgr = unsafe { manager(mgr, "pullback_tape_allocate") };
    mgr.allocate(TapeId(tape_id)).as_ptr().cast()
}

/// Pop the most recent slot of tape `tape_id`, returning its payload.
///
/// The payload may be read until the next allocation on `mgr`.
///
/// # Safety
///
/// `mgr` must be a live manager handle.
#[no_mangle]
#[allow(unsafe_code)]
pub unsafe extern "C" fn pullback_tape_pop(
    mgr: *mut PullbackTapeManager,
    tape_id: usize,
) -> *mut c_void {
    // SAFETY: forwarded caller contract.
    let mgr = unsafe { manager(mgr, "pullback_tape_pop") };
    mgr.pop(TapeId(tape_id)).as_ptr().cast()
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;

    #[test]
    fn tape_round_trip_through_c_surface() {
        let mgr = pullback_tape_manager_create();
        unsafe {
            let a = pullback_tape_create(mgr, 8, 8);
            let b = pullback_tape_create(mgr, 4, 4);
            assert_eq!((a, b), (0, 1));

            let a1 = pullback_tape_allocate(mgr, a);
            a1.cast::<f64>().write(1.5);
            let b1 = pullback_tape_allocate(mgr, b);
            b1.cast::<u32>().write(9);
            let a2 = pullback_tape_allocate(mgr, a);
            a2.cast::<f64>().write(2.5);

            let popped = pullback_tape_pop(mgr, a);
            assert_eq!(popped, a2);
            assert_eq!(popped.cast::<f64>().read(), 2.5);
            assert_eq!(pullback_tape_pop(mgr, b).cast::<u32>().read(), 9);
            assert_eq!(pullback_tape_pop(mgr, a).cast::<f64>().read(), 1.5);

            pullback_tape_manager_destroy(mgr);
        }
    }

    #[test]
    fn payloads_meet_requested_alignment() {
        let mgr = pullback_tape_manager_create();
        unsafe {
            let id = pullback_tape_create(mgr, 3, 64);
            for _ in 0..8 {
                assert_eq!(pullback_tape_allocate(mgr, id) as usize % 64, 0);
            }
            pullback_tape_manager_destroy(mgr);
        }
    }

    #[test]
    #[should_panic(expected = "null handle passed to pullback_tape_pop")]
    fn null_manager_is_fatal() {
        let _ = unsafe { manager(std::ptr::null_mut(), "pullback_tape_pop") };
    }
}
