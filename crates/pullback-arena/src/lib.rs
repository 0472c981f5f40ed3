//! Slab-backed bump arena for Pullback linear-map records.
//!
//! Provides the grow-only allocator underneath linear map contexts and
//! tape managers. This crate is one of three that may contain `unsafe`
//! code (along with `pullback-runtime` and `pullback-ffi`); here it is
//! confined to `raw.rs`.
//!
//! # Architecture
//!
//! ```text
//! Arena
//! ├── Slab[] (system-allocated blocks, bump cursor each)
//! │   └── RawBlock (owned allocation, freed on drop)
//! ├── ArenaStats (always-on counters)
//! └── Option<Box<dyn AllocObserver>> (off unless installed)
//! ```
//!
//! # Release discipline
//!
//! The arena expects its owner to release regions mostly in reverse
//! allocation order. Such releases rewind slab cursors, padding included.
//! An out-of-order release is deferred until everything above it in its
//! slab has been released, so releasing every region always returns the
//! arena to empty.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod arena;
pub mod config;
pub mod error;
mod raw;
pub mod slab;
pub mod stats;

// Public re-exports for the primary API surface.
pub use arena::{Arena, BoxedObserver};
pub use config::ArenaConfig;
pub use error::ConfigError;
pub use slab::{Release, Slab, SLAB_ALIGN};
pub use stats::ArenaStats;
