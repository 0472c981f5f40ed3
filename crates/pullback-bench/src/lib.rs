//! Benchmark workloads for the Pullback linear-map runtime.
//!
//! - [`reference_script`]: a deterministic mixed push/pop sequence shaped
//!   like a forward/backward pass with nested calls.
//! - [`run_context_script`]: replays a script against a context.
//! - [`unwind_chain`]: allocate a straight chain, then release it.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::rc::Rc;

use pullback_runtime::{LinearMapContext, Subcontext};
use pullback_test_utils::fixtures::{lifo_script, LifoOp};

/// Largest payload the reference script pushes, in bytes.
pub const REFERENCE_MAX_RECORD: usize = 96;

/// Deterministic script of `steps` operations plus the final unwind.
pub fn reference_script(seed: u64, steps: usize) -> Vec<LifoOp> {
    lifo_script(seed, steps, REFERENCE_MAX_RECORD)
}

/// Replay `ops` against `ctx`, returning the deepest stack reached.
///
/// Anything still live at the end is released, so the context is empty
/// again on return.
pub fn run_context_script(ctx: &Rc<LinearMapContext>, ops: &[LifoOp]) -> usize {
    let mut stack: Vec<Subcontext> = Vec::new();
    let mut peak = 0;
    for op in ops {
        match *op {
            LifoOp::Push(size) => {
                stack.push(ctx.allocate_subcontext(size));
                peak = peak.max(stack.len());
            }
            LifoOp::Pop => {
                if let Some(sub) = stack.pop() {
                    sub.release();
                }
            }
        }
    }
    while let Some(sub) = stack.pop() {
        sub.release();
    }
    peak
}

/// Push `depth` subcontexts of `size` bytes, then release them all.
pub fn unwind_chain(ctx: &Rc<LinearMapContext>, depth: usize, size: usize) {
    let chain: Vec<Subcontext> = (0..depth).map(|_| ctx.allocate_subcontext(size)).collect();
    for sub in chain.into_iter().rev() {
        sub.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pullback_runtime::HEADER_STRIDE;

    #[test]
    fn reference_script_leaves_context_empty() {
        let ctx = LinearMapContext::new(1024);
        let peak = run_context_script(&ctx, &reference_script(3, 1_000));
        assert!(peak > 1);
        assert!(ctx.is_empty());
        assert_eq!(ctx.arena_stats().bytes_in_use, 0);
    }

    #[test]
    fn unwind_chain_restores_refcount() {
        let ctx = LinearMapContext::new(0);
        unwind_chain(&ctx, 64, 24);
        assert_eq!(Rc::strong_count(&ctx), 1);
        let stats = ctx.arena_stats();
        assert_eq!(stats.high_water_bytes, 64 * (HEADER_STRIDE + 24));
        assert_eq!(stats.bytes_in_use, 0);
    }
}
