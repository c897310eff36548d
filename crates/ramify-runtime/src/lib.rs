//! ramify-runtime - Work-stealing task runtime with future-coordinated
//! scheduling
//!
//! This crate provides the scheduling substrate underneath the `ramify`
//! recursion compiler:
//! - `Promise<T>` / `Future<T>` - a single-writer, read-once completion cell
//! - `WorkDeque<T>` - a bounded, lock-guarded work-stealing deque
//! - `ThreadPool` - a fixed set of worker threads with graceful shutdown
//! - `spawn` - the entry point turning a closure into a scheduled task
//!
//! # Execution model
//!
//! A fixed pool of OS threads (default: one per detected hardware thread,
//! overridable once via [`WORKER_COUNT_ENV`]) runs a work-stealing loop:
//! each worker executes its own most recently spawned task first and steals
//! the oldest task from a random victim when its queue runs dry. The only
//! suspension point is [`Future::get`], which is cooperative: instead of
//! blocking the OS thread, the waiter keeps running scheduling steps until
//! the awaited result is ready. Unbounded logical recursion therefore runs
//! on a constant number of threads.
//!
//! Forward progress is guaranteed as long as some runnable task exists
//! anywhere in the pool. A cycle of futures all waiting on each other with
//! no independent ready work spins forever; the runtime does not detect
//! this.
//!
//! # Ordering
//!
//! Sibling tasks spawned without an intervening `get` may run in any order,
//! including fully concurrently. `get` establishes the happens-before edge
//! between the producing task's completion and the code that follows.
//!
//! Once spawned, a task always runs to completion: there is no
//! cancellation, and a full queue degrades to inline execution rather than
//! dropping work.

pub mod config;
pub mod deque;
pub mod error;
pub mod future;
pub mod pool;

mod sync;
mod worker;

pub use config::{PoolConfig, WORKER_COUNT_ENV};
pub use deque::{WorkDeque, DEFAULT_QUEUE_CAPACITY};
pub use error::TaskError;
pub use future::{Future, Promise};
pub use pool::{global_pool, spawn, PoolHandle, ThreadPool};
