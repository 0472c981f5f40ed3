//! Arena configuration parameters.

use crate::error::ConfigError;

/// Configuration for the slab arena.
///
/// Controls how many bytes are requested from the system allocator each
/// time the arena grows. Validated at construction; immutable after.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Size of each ordinary slab in bytes.
    ///
    /// Default: 4096. Must be a power of two between
    /// [`MIN_SLAB_BYTES`](Self::MIN_SLAB_BYTES) and
    /// [`MAX_SLAB_BYTES`](Self::MAX_SLAB_BYTES). Requests larger than a
    /// slab get a dedicated slab sized to fit.
    pub slab_bytes: usize,
}

impl ArenaConfig {
    /// Default slab size: one 4 KiB page.
    pub const DEFAULT_SLAB_BYTES: usize = 4096;

    /// Smallest accepted slab size.
    pub const MIN_SLAB_BYTES: usize = 64;

    /// Largest accepted slab size (1 GiB).
    pub const MAX_SLAB_BYTES: usize = 1 << 30;

    /// Create a config with the given slab size.
    pub fn new(slab_bytes: usize) -> Self {
        Self { slab_bytes }
    }

    /// Check the config against the documented constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(Self::MIN_SLAB_BYTES..=Self::MAX_SLAB_BYTES).contains(&self.slab_bytes) {
            return Err(ConfigError::SlabSizeOutOfRange {
                slab_bytes: self.slab_bytes,
                min: Self::MIN_SLAB_BYTES,
                max: Self::MAX_SLAB_BYTES,
            });
        }
        if !self.slab_bytes.is_power_of_two() {
            return Err(ConfigError::SlabSizeNotPowerOfTwo {
                slab_bytes: self.slab_bytes,
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SLAB_BYTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid_page_sized() {
        let config = ArenaConfig::default();
        assert_eq!(config.slab_bytes, 4096);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_non_power_of_two() {
        assert_eq!(
            ArenaConfig::new(1000).validate(),
            Err(ConfigError::SlabSizeNotPowerOfTwo { slab_bytes: 1000 })
        );
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(matches!(
            ArenaConfig::new(32).validate(),
            Err(ConfigError::SlabSizeOutOfRange { slab_bytes: 32, .. })
        ));
        assert!(matches!(
            ArenaConfig::new(1 << 31).validate(),
            Err(ConfigError::SlabSizeOutOfRange { .. })
        ));
    }

    #[test]
    fn bounds_are_accepted() {
        assert!(ArenaConfig::new(ArenaConfig::MIN_SLAB_BYTES).validate().is_ok());
        assert!(ArenaConfig::new(ArenaConfig::MAX_SLAB_BYTES).validate().is_ok());
    }
}
