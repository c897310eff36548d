//! Worker threads and the ambient scheduling context.
//!
//! Each worker thread registers itself in a thread-local on startup and
//! clears the registration when its run loop exits. All ambient lookup goes
//! through the two narrow accessors below; everything else in the runtime
//! carries its pool handle explicitly.

use std::cell::RefCell;
use std::sync::Arc;

use crossbeam_utils::Backoff;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::pool::PoolShared;

struct CurrentWorker {
    pool: Arc<PoolShared>,
    index: usize,
}

thread_local! {
    static CURRENT: RefCell<Option<CurrentWorker>> = const { RefCell::new(None) };

    // Victim selection for this thread. Worker threads reseed it at startup
    // when the pool was configured with a fixed seed.
    static SCHED_RNG: RefCell<SmallRng> = RefCell::new(SmallRng::from_entropy());
}

/// The pool (and worker index) this thread runs for, if it is a worker.
pub(crate) fn current_pool() -> Option<(Arc<PoolShared>, usize)> {
    CURRENT.with(|current| {
        current
            .borrow()
            .as_ref()
            .map(|worker| (Arc::clone(&worker.pool), worker.index))
    })
}

/// This thread's worker index within `shared`, if it is one of its workers.
pub(crate) fn current_index_in(shared: &Arc<PoolShared>) -> Option<usize> {
    CURRENT.with(|current| {
        current
            .borrow()
            .as_ref()
            .filter(|worker| Arc::ptr_eq(&worker.pool, shared))
            .map(|worker| worker.index)
    })
}

/// Run `f` with this thread's scheduling RNG.
pub(crate) fn with_rng<R>(f: impl FnOnce(&mut SmallRng) -> R) -> R {
    SCHED_RNG.with(|rng| f(&mut rng.borrow_mut()))
}

/// Scoped registration of the current thread as a pool worker.
///
/// Dropping the guard (when the run loop returns) clears the thread-local,
/// so a thread never outlives its registration.
struct Registration;

impl Registration {
    fn enter(shared: &Arc<PoolShared>, index: usize, seed: Option<u64>) -> Registration {
        CURRENT.with(|current| {
            let mut current = current.borrow_mut();
            debug_assert!(current.is_none(), "worker thread registered twice");
            *current = Some(CurrentWorker {
                pool: Arc::clone(shared),
                index,
            });
        });

        if let Some(seed) = seed {
            SCHED_RNG.with(|rng| *rng.borrow_mut() = SmallRng::seed_from_u64(seed));
        }

        Registration
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        CURRENT.with(|current| current.borrow_mut().take());
    }
}

/// The worker thread body: scheduling steps until the liveness flag is
/// poisoned.
///
/// An idle worker spins through [`Backoff::snooze`] rather than parking on
/// a condition variable. The cooperative-helping wait model requires every
/// queue to stay drainable by any thread at any moment; the cost is idle
/// CPU burn, the benefit is that deep recursion never needs more OS
/// threads.
pub(crate) fn run(shared: Arc<PoolShared>, index: usize, seed: Option<u64>) {
    let _registration = Registration::enter(&shared, index, seed);

    let backoff = Backoff::new();
    while shared.is_alive(index) {
        if shared.schedule_step(Some(index)) {
            backoff.reset();
        } else {
            backoff.snooze();
        }
    }
}
