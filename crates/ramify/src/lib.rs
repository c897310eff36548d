//! ramify - Parallel divide-and-conquer recursion compiled onto a
//! work-stealing runtime
//!
//! This crate turns a declarative recursive specification into a tree of
//! spawned, future-coordinated tasks:
//! - `Definition<I, O>` - predicate + alternative base/step bodies
//! - `Group<I, O>` - a fixed ordered set of mutually recursive definitions
//! - `Operator<I, O>` - a compiled callable `I -> Future<O>`
//! - `fun` / `group` / `parec` / `prec` - the composition surface
//! - `rec` - the sequential reference evaluation of the same definitions
//!
//! Scheduling — the worker pool, the bounded deques, the cooperative
//! `Future::get` — lives in [`ramify_runtime`], re-exported here for
//! convenience.
//!
//! # Example
//!
//! ```rust
//! use ramify::{fun, group, parec, Continuations};
//!
//! // Mutually recursive even/odd by alternation.
//! let defs = group(vec![
//!     fun(
//!         |x: &u32| *x == 0,
//!         |_| true,
//!         |x, f: &Continuations<u32, bool>| f.call(1, x - 1).get(),
//!     ),
//!     fun(
//!         |x: &u32| *x == 0,
//!         |_| false,
//!         |x, f: &Continuations<u32, bool>| f.call(0, x - 1).get(),
//!     ),
//! ]);
//!
//! let even = parec(&defs, 0);
//! let odd = parec(&defs, 1);
//! assert!(even.call(6).get());
//! assert!(odd.call(7).get());
//! ```
//!
//! # Randomized dispatch
//!
//! When a definition carries several base or step alternatives they must be
//! observationally equivalent; the group's [`Picker`] chooses among them on
//! every invocation. The default picker is seeded from entropy; inject
//! [`SeededPicker::seeded`] or [`FixedPicker`] to make dispatch
//! reproducible.

pub mod definition;
pub mod group;
pub mod operator;
pub mod picker;

pub use definition::{fun, rec, rec_with, Definition};
pub use group::{group, Group};
pub use operator::{parec, prec, Continuations, Operator};
pub use picker::{FixedPicker, Picker, SeededPicker};

// The scheduling substrate, re-exported for callers that configure pools or
// work with futures directly.
pub use ramify_runtime::{
    global_pool, spawn, Future, PoolConfig, PoolHandle, Promise, TaskError, ThreadPool,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_surface_round_trip() {
        // The README-level flow: define, compile, call, await.
        let triple = prec(fun(
            |x: &u32| *x == 0,
            |_| 0u32,
            |x, f: &Continuations<u32, u32>| f.recurse(x - 1).get() + 3,
        ));

        assert_eq!(triple.call(5).get(), 15);

        // The same definition evaluated sequentially.
        let def = fun(
            |x: &u32| *x == 0,
            |_| 0u32,
            |x, f: &Continuations<u32, u32>| f.recurse(x - 1).get() + 3,
        );
        assert_eq!(rec(5, &def), 15);
    }
}
