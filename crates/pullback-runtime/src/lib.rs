//! Linear-map record storage for reverse-mode differentiation.
//!
//! Two allocators sit on top of [`pullback_arena::Arena`]:
//!
//! - [`LinearMapContext`] is a reference-counted stack of variable-sized
//!   [`Subcontext`] records, one context per differentiated computation.
//! - [`TapeManager`] owns any number of typed LIFO tapes of fixed-layout
//!   elements that share one arena.
//!
//! Both expect strictly LIFO use. Releasing anything other than the top
//! of a context, or popping an empty tape, is a contract violation and
//! panics in every build.
//!
//! `unsafe` is confined to [`subcontext`] and [`tape`], which write
//! headers into arena memory.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod context;
pub mod subcontext;
pub mod tape;

pub use context::LinearMapContext;
pub use subcontext::{Subcontext, SubcontextHeader, HEADER_STRIDE};
pub use tape::{TapeDescriptor, TapeManager};
