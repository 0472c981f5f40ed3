//! Record types and deterministic operation scripts.
//!
//! - [`Pair`] is the two-float record used by the subcontext chain
//!   scenarios.
//! - [`Wide`] is an over-aligned record for alignment checks.
//! - [`lifo_script`] produces random but always-valid push/pop sequences
//!   from a fixed seed.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Two-float record, the shape of a simple pullback's captured state.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pair {
    pub x: f32,
    pub y: f32,
}

impl Pair {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }
}

/// A 32-byte-aligned record.
#[repr(C, align(32))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Wide {
    pub lanes: [f64; 4],
}

impl Wide {
    pub fn tagged(tag: u64) -> Self {
        Self {
            lanes: [tag as f64; 4],
        }
    }
}

/// One step of a LIFO script.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifoOp {
    /// Push a record of this many payload bytes.
    Push(usize),
    /// Pop the most recent record.
    Pop,
}

/// Deterministic RNG for reproducible randomized tests.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Generate `steps` operations that never pop an empty stack, followed by
/// enough pops to unwind completely.
///
/// Push sizes are drawn from `0..=max_size`.
pub fn lifo_script(seed: u64, steps: usize, max_size: usize) -> Vec<LifoOp> {
    let mut rng = seeded_rng(seed);
    let mut depth = 0usize;
    let mut ops = Vec::with_capacity(steps * 2);
    for _ in 0..steps {
        if depth == 0 || rng.random_bool(0.6) {
            ops.push(LifoOp::Push(rng.random_range(0..=max_size)));
            depth += 1;
        } else {
            ops.push(LifoOp::Pop);
            depth -= 1;
        }
    }
    ops.extend(std::iter::repeat_n(LifoOp::Pop, depth));
    ops
}
