//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// Errors from validating an [`ArenaConfig`](crate::ArenaConfig).
///
/// Configuration is the only recoverable failure in the arena; running
/// out of memory and misuse are fatal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `slab_bytes` is outside the accepted range.
    SlabSizeOutOfRange {
        /// The rejected slab size.
        slab_bytes: usize,
        /// Smallest accepted size.
        min: usize,
        /// Largest accepted size.
        max: usize,
    },
    /// `slab_bytes` is not a power of two.
    SlabSizeNotPowerOfTwo {
        /// The rejected slab size.
        slab_bytes: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SlabSizeOutOfRange {
                slab_bytes,
                min,
                max,
            } => {
                write!(
                    f,
                    "slab size {slab_bytes} bytes out of range: must be within [{min}, {max}]"
                )
            }
            Self::SlabSizeNotPowerOfTwo { slab_bytes } => {
                write!(f, "slab size {slab_bytes} bytes is not a power of two")
            }
        }
    }
}

impl Error for ConfigError {}
