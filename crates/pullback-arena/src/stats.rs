//! Always-on allocation counters.
//!
//! [`ArenaStats`] is maintained by the arena on every operation and can
//! be read at any time for telemetry or leak checks.

/// Allocation and memory counters for one arena.
///
/// Counters are cumulative since the arena was created; byte gauges
/// reflect the current state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    /// Number of `allocate` calls.
    pub allocations: u64,
    /// Number of `deallocate` calls.
    pub deallocations: u64,
    /// Number of `deallocate` calls that rewound a slab cursor.
    pub reclaimed: u64,
    /// Number of slabs requested from the system allocator.
    pub slabs_acquired: u64,
    /// Bytes held from the system allocator across all slabs.
    pub bytes_reserved: usize,
    /// Bytes currently consumed by slab cursors, including padding.
    pub bytes_in_use: usize,
    /// Largest value `bytes_in_use` has reached.
    pub high_water_bytes: usize,
}

impl ArenaStats {
    pub(crate) fn grow_in_use(&mut self, delta: usize) {
        self.bytes_in_use += delta;
        self.high_water_bytes = self.high_water_bytes.max(self.bytes_in_use);
    }

    pub(crate) fn shrink_in_use(&mut self, delta: usize) {
        self.bytes_in_use -= delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stats_are_zero() {
        let s = ArenaStats::default();
        assert_eq!(s.allocations, 0);
        assert_eq!(s.deallocations, 0);
        assert_eq!(s.reclaimed, 0);
        assert_eq!(s.slabs_acquired, 0);
        assert_eq!(s.bytes_reserved, 0);
        assert_eq!(s.bytes_in_use, 0);
        assert_eq!(s.high_water_bytes, 0);
    }

    #[test]
    fn high_water_survives_shrink() {
        let mut s = ArenaStats::default();
        s.grow_in_use(100);
        s.shrink_in_use(60);
        s.grow_in_use(10);
        assert_eq!(s.bytes_in_use, 50);
        assert_eq!(s.high_water_bytes, 100);
    }
}
