//! Opaque handle types and the null check shared by every entry point.

use std::ptr::NonNull;

use pullback_core::{violated, ContractViolation};

/// Opaque C view of a linear map context.
pub struct PullbackContext {
    _opaque: [u8; 0],
}

/// Opaque C view of a subcontext header.
pub struct PullbackSubcontext {
    _opaque: [u8; 0],
}

/// Opaque C view of a tape manager.
pub struct PullbackTapeManager {
    _opaque: [u8; 0],
}

/// Reject a null handle passed to `operation`.
#[track_caller]
pub(crate) fn non_null<T>(ptr: *mut T, operation: &'static str) -> NonNull<T> {
    match NonNull::new(ptr) {
        Some(ptr) => ptr,
        None => violated(ContractViolation::NullHandle { operation }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "null handle passed to pullback_test")]
    fn null_is_a_violation() {
        non_null(std::ptr::null_mut::<PullbackContext>(), "pullback_test");
    }

    #[test]
    fn non_null_passes_through() {
        let mut value = 0u8;
        let ptr: *mut u8 = &mut value;
        assert_eq!(non_null(ptr, "pullback_test").as_ptr(), ptr);
    }
}
