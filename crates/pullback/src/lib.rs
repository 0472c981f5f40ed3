//! Pullback: linear-map record storage for reverse-mode differentiation.
//!
//! This is the facade crate that re-exports the public API of the Pullback
//! sub-crates. Generated forward passes push records (the state each
//! pullback needs) and the backward pass consumes them in reverse.
//!
//! # Quick start
//!
//! ```rust
//! use std::rc::Rc;
//! use pullback::prelude::*;
//!
//! // Forward pass: one context per differentiated computation.
//! let ctx = LinearMapContext::new(256);
//! let outer = ctx.allocate_subcontext(16);
//! let inner = ctx.allocate_subcontext(8);
//! assert_eq!(inner.previous(), Some(outer.id()));
//! assert_eq!(Rc::strong_count(&ctx), 3);
//!
//! // Backward pass: release in reverse order.
//! inner.release();
//! outer.release();
//! assert_eq!(Rc::strong_count(&ctx), 1);
//!
//! // Loops use typed tapes instead.
//! let mut tapes = TapeManager::new();
//! let id = tapes.create_tape_for::<f32>();
//! let slot = tapes.allocate(id);
//! assert_eq!(slot.as_ptr() as usize % 4, 0);
//! tapes.pop(id);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `pullback-core` | IDs, record layouts, contract violations, observer hook |
//! | [`arena`] | `pullback-arena` | Slab-backed bump arena, config, stats |
//! | [`runtime`] | `pullback-runtime` | Linear map contexts, subcontexts, tapes |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and the observer hook (`pullback-core`).
pub use pullback_core as types;

/// The bump arena underneath contexts and tapes (`pullback-arena`).
///
/// Most users only touch [`arena::ArenaConfig`] and [`arena::ArenaStats`].
pub use pullback_arena as arena;

/// Contexts, subcontexts and tapes (`pullback-runtime`).
pub use pullback_runtime as runtime;

/// Common imports for typical Pullback usage.
///
/// ```rust
/// use pullback::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use pullback_core::{AllocEvent, AllocObserver, RecordLayout, SubcontextId, TapeId};

    // Arena configuration
    pub use pullback_arena::{ArenaConfig, ArenaStats, ConfigError};

    // Runtime
    pub use pullback_runtime::{LinearMapContext, Subcontext, TapeManager};
}
