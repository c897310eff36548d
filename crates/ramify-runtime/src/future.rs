//! Future/promise completion cells.
//!
//! A [`Promise`] and the [`Future`] it produces share one heap-allocated
//! completion cell. The producing task writes the cell exactly once; the
//! consumer reads it exactly once. `Arc` keeps the cell alive as long as
//! either side holds a handle, so a future dropped before completion
//! neither leaks nor dangles.
//!
//! # Waiting without blocking
//!
//! [`Future::get`] never blocks the OS thread. While the cell is
//! incomplete, a future spawned on a pool repeatedly runs scheduling steps
//! of that pool — draining the caller's own deque and stealing from others
//! — so the thread that waits is also the thread that makes progress. Deep
//! recursion therefore creates unbounded logical tasks on a constant number
//! of OS threads. The flip side is documented in the crate root: a cycle of
//! futures all waiting on each other, with no independent ready work, spins
//! forever and is not detected.
//!
//! A promise dropped without [`Promise::set`] leaves its future permanently
//! incomplete. That is a caller error, not a crash: `get` on such a future
//! spins (politely) for good.

use std::any::Any;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_utils::Backoff;
use parking_lot::Mutex;

use crate::error::{panic_message, TaskError};
use crate::pool::PoolShared;
use crate::worker;

pub(crate) type PanicPayload = Box<dyn Any + Send + 'static>;

/// Shared completion slot: a done latch plus the value it guards.
///
/// The latch flips false→true exactly once, after the value has been
/// written under the mutex; observers that see the latch may take the
/// value.
pub(crate) struct SyncCell<T> {
    done: AtomicBool,
    value: Mutex<Option<Result<T, PanicPayload>>>,
}

impl<T> SyncCell<T> {
    fn new() -> Self {
        SyncCell {
            done: AtomicBool::new(false),
            value: Mutex::new(None),
        }
    }

    fn completed(result: Result<T, PanicPayload>) -> Self {
        SyncCell {
            done: AtomicBool::new(true),
            value: Mutex::new(Some(result)),
        }
    }

    pub(crate) fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    pub(crate) fn complete(&self, result: Result<T, PanicPayload>) {
        let mut slot = self.value.lock();
        debug_assert!(slot.is_none(), "completion cell written twice");
        *slot = Some(result);
        drop(slot);
        self.done.store(true, Ordering::Release);
    }

    fn take(&self) -> Result<T, PanicPayload> {
        self.value
            .lock()
            .take()
            .expect("completion cell read before it was written")
    }
}

/// The write-once producer side of a completion cell.
///
/// Created by the spawning path of the runtime, or manually via
/// [`Promise::new`] for hand-rolled handoffs. `set` may be called at most
/// once, and [`Promise::future`] produces at most one future.
pub struct Promise<T> {
    cell: Arc<SyncCell<T>>,
    scheduler: Option<Arc<PoolShared>>,
    future_taken: bool,
}

impl<T> Promise<T> {
    /// Create an unbound promise.
    ///
    /// The paired future is not attached to any pool, so waiting on it
    /// relaxes the CPU instead of helping a scheduler; prefer
    /// [`spawn`](crate::spawn) for anything that runs as a task.
    pub fn new() -> Self {
        Promise {
            cell: Arc::new(SyncCell::new()),
            scheduler: None,
            future_taken: false,
        }
    }

    /// Create a promise whose future helps the given pool while waiting.
    pub(crate) fn bound(scheduler: Arc<PoolShared>) -> Self {
        Promise {
            cell: Arc::new(SyncCell::new()),
            scheduler: Some(scheduler),
            future_taken: false,
        }
    }

    /// Produce the single future paired with this promise.
    ///
    /// # Panics
    ///
    /// Panics if called a second time.
    pub fn future(&mut self) -> Future<T> {
        assert!(
            !self.future_taken,
            "a promise produces exactly one future"
        );
        self.future_taken = true;

        Future {
            cell: Arc::clone(&self.cell),
            scheduler: self.scheduler.clone(),
        }
    }

    /// Fulfill the promise.
    ///
    /// Must be called at most once; a second call trips a debug assertion
    /// and is otherwise a contract violation.
    pub fn set(&self, value: T) {
        self.cell.complete(Ok(value));
    }

    /// Fulfill the promise with a task outcome, including a captured panic.
    pub(crate) fn complete(&self, result: Result<T, PanicPayload>) {
        self.cell.complete(result);
    }
}

impl<T> Default for Promise<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A read-once handle to the eventual result of a task.
///
/// Futures are move-only: the value is consumed by [`Future::get`] or
/// [`Future::join`], or abandoned by dropping the future.
pub struct Future<T> {
    cell: Arc<SyncCell<T>>,
    scheduler: Option<Arc<PoolShared>>,
}

impl<T> Future<T> {
    /// An already-completed future.
    ///
    /// Used by the spawn path when a full queue forces inline execution,
    /// and handy wherever an API wants a future for a value it already has.
    pub fn ready(value: T) -> Self {
        Future {
            cell: Arc::new(SyncCell::completed(Ok(value))),
            scheduler: None,
        }
    }

    /// Non-blocking poll of the completion latch.
    pub fn is_done(&self) -> bool {
        self.cell.is_done()
    }

    /// Wait for the result, helping the scheduler while it is not ready.
    ///
    /// If the producing task panicked, the panic payload is re-raised here,
    /// on the consumer's thread.
    pub fn get(self) -> T {
        self.wait();
        match self.cell.take() {
            Ok(value) => value,
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    /// Wait for the result without panicking on task failure.
    ///
    /// A captured panic is returned as [`TaskError::Panicked`] carrying the
    /// panic message.
    pub fn join(self) -> Result<T, TaskError> {
        self.wait();
        self.cell
            .take()
            .map_err(|payload| TaskError::Panicked(panic_message(payload.as_ref())))
    }

    fn wait(&self) {
        if self.cell.is_done() {
            return;
        }

        // Resolve the helping context once: if this thread is a worker of
        // the future's own pool it drains its local queue first, otherwise
        // it acts as a pure thief.
        let local = self
            .scheduler
            .as_ref()
            .and_then(worker::current_index_in);

        let backoff = Backoff::new();
        while !self.cell.is_done() {
            let helped = match &self.scheduler {
                Some(shared) => shared.schedule_step(local),
                None => false,
            };
            if helped {
                backoff.reset();
            } else {
                backoff.snooze();
            }
        }
    }
}
