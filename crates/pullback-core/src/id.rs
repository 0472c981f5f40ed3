//! Strongly-typed identifiers for tapes and subcontexts.

use std::fmt;

/// Identifies a tape within a tape manager.
///
/// Tapes are registered with a manager and assigned sequential IDs.
/// `TapeId(n)` corresponds to the n-th tape created on that manager.
/// IDs are never reused or invalidated while the manager lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TapeId(pub usize);

impl fmt::Display for TapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a subcontext allocation.
///
/// Encodes the address of the subcontext header. Two live subcontexts
/// never share an identity; once a subcontext is released its address
/// may be handed out again by the same context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubcontextId(pub usize);

impl fmt::Display for SubcontextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tape_ids_order_by_creation_index() {
        assert!(TapeId(0) < TapeId(1));
    }

    #[test]
    fn display_formats() {
        assert_eq!(TapeId(3).to_string(), "3");
        assert_eq!(SubcontextId(0x40).to_string(), "0x40");
    }
}
