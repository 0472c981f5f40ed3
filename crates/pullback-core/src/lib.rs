//! Core types and traits for the Pullback linear-map runtime.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the allocator crates and the C boundary:
//! tape identifiers, record layouts, contract violations, and the
//! allocation observer hook.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod layout;
pub mod traits;
#[cfg(feature = "tracing")]
pub mod tracing_observer;

pub use error::{violated, ContractViolation};
pub use id::{SubcontextId, TapeId};
pub use layout::{round_up, RecordLayout};
pub use traits::{AllocEvent, AllocObserver};
#[cfg(feature = "tracing")]
pub use tracing_observer::TracingObserver;
