//! Contract violations detected by the runtime.
//!
//! The runtime has no recoverable failure path: callers are generated
//! forward/backward passes whose structure guarantees LIFO use. Any
//! deviation is a programmer error in the generated code and terminates
//! the computation through [`violated`].

use std::error::Error;
use std::fmt;

use crate::id::{SubcontextId, TapeId};

/// A broken precondition of the allocation runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContractViolation {
    /// A subcontext was released while a later one is still live.
    SubcontextNotTop {
        /// The subcontext being released.
        released: SubcontextId,
        /// The current top of the owning context, if any.
        top: Option<SubcontextId>,
    },
    /// A context was destroyed while subcontexts were still outstanding.
    LiveSubcontexts {
        /// Number of subcontexts still linked.
        live: usize,
    },
    /// `pop` was called on a tape with no unpopped slot.
    EmptyTape {
        /// The empty tape.
        tape: TapeId,
    },
    /// A tape ID that was never returned by `create_tape` on this manager.
    UnknownTape {
        /// The unrecognised tape.
        tape: TapeId,
        /// Number of tapes registered on the manager.
        registered: usize,
    },
    /// An alignment that is zero or not a power of two.
    InvalidAlignment {
        /// The rejected alignment.
        align: usize,
    },
    /// A record size that overflows the address space once its header
    /// is added.
    SizeOverflow {
        /// The requested payload size.
        size: usize,
    },
    /// A null handle was passed across the C boundary.
    NullHandle {
        /// The entry point that received it.
        operation: &'static str,
    },
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SubcontextNotTop { released, top } => match top {
                Some(top) => write!(
                    f,
                    "subcontext {released} released out of order: current top is {top}"
                ),
                None => write!(
                    f,
                    "subcontext {released} released out of order: context has no live subcontext"
                ),
            },
            Self::LiveSubcontexts { live } => {
                write!(f, "context destroyed with {live} live subcontext(s)")
            }
            Self::EmptyTape { tape } => write!(f, "pop from empty tape {tape}"),
            Self::UnknownTape { tape, registered } => {
                write!(
                    f,
                    "unknown tape {tape}: manager has {registered} registered tape(s)"
                )
            }
            Self::InvalidAlignment { align } => {
                write!(f, "invalid alignment {align}: must be a non-zero power of two")
            }
            Self::SizeOverflow { size } => {
                write!(f, "record size {size} overflows with its header")
            }
            Self::NullHandle { operation } => write!(f, "null handle passed to {operation}"),
        }
    }
}

impl Error for ContractViolation {}

/// Abort the current computation with a contract violation.
///
/// Panics with a message of the form `contract violation: <detail>`. At
/// the C boundary the panic cannot unwind and the process aborts.
#[cold]
#[inline(never)]
#[track_caller]
pub fn violated(violation: ContractViolation) -> ! {
    panic!("contract violation: {violation}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_tape() {
        let msg = ContractViolation::EmptyTape { tape: TapeId(4) }.to_string();
        assert_eq!(msg, "pop from empty tape 4");

        let msg = ContractViolation::UnknownTape {
            tape: TapeId(9),
            registered: 2,
        }
        .to_string();
        assert!(msg.contains("unknown tape 9"));
        assert!(msg.contains("2 registered"));
    }

    #[test]
    fn display_out_of_order_release() {
        let msg = ContractViolation::SubcontextNotTop {
            released: SubcontextId(0x10),
            top: Some(SubcontextId(0x40)),
        }
        .to_string();
        assert!(msg.contains("0x10"));
        assert!(msg.contains("current top is 0x40"));

        let msg = ContractViolation::SubcontextNotTop {
            released: SubcontextId(0x10),
            top: None,
        }
        .to_string();
        assert!(msg.contains("no live subcontext"));
    }

    #[test]
    #[should_panic(expected = "contract violation: context destroyed with 2 live subcontext(s)")]
    fn violated_panics_with_prefix() {
        violated(ContractViolation::LiveSubcontexts { live: 2 });
    }
}
