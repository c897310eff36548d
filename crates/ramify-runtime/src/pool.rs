//! The worker pool: lifecycle, scheduling steps, and the spawn entry point.
//!
//! A [`ThreadPool`] owns a fixed set of worker threads, one bounded
//! [`WorkDeque`](crate::WorkDeque) per worker. Spawning wraps a closure
//! into a task paired with a [`Promise`]/[`Future`] and pushes it onto the
//! calling worker's deque (or a random one when called from outside the
//! pool). A full deque never blocks or drops work: the task simply runs
//! inline in the caller and the returned future is already complete.
//!
//! Teardown is synchronous and graceful: dropping the pool poisons every
//! worker's liveness flag and joins all threads, leaving no orphans. Tasks
//! still queued at that point are dropped along with their promises; await
//! the futures you care about before dropping the pool.

use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;

use crossbeam_utils::CachePadded;
use rand::Rng;
use tracing::{debug, trace};

use crate::config::PoolConfig;
use crate::deque::WorkDeque;
use crate::future::{Future, Promise};
use crate::worker;

/// One deferred, once-executed unit of work.
pub(crate) struct Task(Box<dyn FnOnce() + Send + 'static>);

impl Task {
    fn run(self) {
        (self.0)()
    }
}

/// State shared by all workers of one pool and by every handle into it.
///
/// The worker list is immutable after construction; each deque is guarded
/// by its own lock and each liveness flag is an independent atomic, so no
/// pool-wide lock exists.
pub(crate) struct PoolShared {
    deques: Vec<WorkDeque<Task>>,
    alive: Vec<CachePadded<AtomicBool>>,
}

impl PoolShared {
    pub(crate) fn num_workers(&self) -> usize {
        self.deques.len()
    }

    pub(crate) fn is_alive(&self, index: usize) -> bool {
        self.alive[index].load(Ordering::Acquire)
    }

    fn poison(&self) {
        for flag in self.alive.iter() {
            flag.store(false, Ordering::Release);
        }
    }

    fn is_shut_down(&self) -> bool {
        // Liveness flags are poisoned together; the first one stands in for
        // the whole pool.
        !self.is_alive(0)
    }

    /// Run at most one task: the caller's own queue first (newest task,
    /// LIFO), then a uniformly random victim's queue (oldest task, FIFO).
    ///
    /// Returns whether a task was executed. Callers loop around this —
    /// worker run loops until poisoned, waiting futures until done.
    pub(crate) fn schedule_step(&self, local: Option<usize>) -> bool {
        if let Some(index) = local {
            if let Some(task) = self.deques[index].pop_back() {
                task.run();
                return true;
            }
        }

        let workers = self.deques.len();
        // A lone worker has nobody to steal from. Foreign threads always
        // have the whole pool as potential victims.
        if local.is_some() && workers <= 1 {
            return false;
        }

        let victim = worker::with_rng(|rng| match local {
            None => rng.gen_range(0..workers),
            // Draw from the other workers only, which is the same as
            // re-picking on self without the retry loop.
            Some(me) => {
                let v = rng.gen_range(0..workers - 1);
                if v >= me {
                    v + 1
                } else {
                    v
                }
            }
        });

        if let Some(task) = self.deques[victim].pop_front() {
            task.run();
            return true;
        }

        false
    }

    pub(crate) fn spawn<F, T>(self: &Arc<Self>, f: F) -> Future<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let mut promise = Promise::bound(Arc::clone(self));
        let future = promise.future();

        let task = Task(Box::new(move || {
            let result = panic::catch_unwind(panic::AssertUnwindSafe(f));
            promise.complete(result);
        }));

        // Nobody drains the queues of a pool that has shut down; degrade to
        // inline execution rather than strand the task.
        if self.is_shut_down() {
            task.run();
            return future;
        }

        let target = worker::current_index_in(self)
            .unwrap_or_else(|| worker::with_rng(|rng| rng.gen_range(0..self.num_workers())));

        if let Err(task) = self.deques[target].push_back(task) {
            trace!(worker = target, "queue full, running task inline");
            task.run();
        }

        future
    }
}

/// A fixed pool of worker threads executing spawned tasks.
///
/// The pool is the lifecycle owner: dropping it shuts the workers down.
/// For a cheap shareable spawn handle, see [`ThreadPool::handle`].
///
/// # Example
///
/// ```rust
/// use ramify_runtime::ThreadPool;
///
/// let pool = ThreadPool::new();
/// let future = pool.spawn(|| 1 + 1);
/// assert_eq!(future.get(), 2);
/// ```
pub struct ThreadPool {
    handle: PoolHandle,
    workers: Vec<thread::JoinHandle<()>>,
}

impl ThreadPool {
    /// Create a pool with the default configuration (one worker per
    /// detected hardware thread).
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    /// Create a pool from an explicit configuration.
    pub fn with_config(config: PoolConfig) -> Self {
        let num_workers = config.effective_workers();

        let shared = Arc::new(PoolShared {
            deques: (0..num_workers)
                .map(|_| WorkDeque::with_capacity(config.queue_capacity()))
                .collect(),
            alive: (0..num_workers)
                .map(|_| CachePadded::new(AtomicBool::new(true)))
                .collect(),
        });

        let mut workers = Vec::with_capacity(num_workers);
        for index in 0..num_workers {
            let shared = Arc::clone(&shared);
            let seed = config.steal_seed().map(|s| s.wrapping_add(index as u64));
            let handle = thread::Builder::new()
                .name(format!("{}-{}", config.thread_name_prefix(), index))
                .spawn(move || worker::run(shared, index, seed))
                .expect("failed to spawn worker thread");
            workers.push(handle);
        }

        debug!(workers = num_workers, "thread pool started");

        ThreadPool {
            handle: PoolHandle { shared },
            workers,
        }
    }

    /// Spawn a task on this pool.
    ///
    /// Callable from any thread. When called from one of this pool's
    /// workers the task lands on that worker's own queue; otherwise a
    /// random worker's queue is chosen. Never blocks: a full queue runs the
    /// task inline and returns an already-completed future.
    pub fn spawn<F, T>(&self, f: F) -> Future<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.handle.spawn(f)
    }

    /// Number of worker threads in this pool.
    pub fn num_workers(&self) -> usize {
        self.handle.num_workers()
    }

    /// A cheap clonable handle for spawning onto this pool.
    pub fn handle(&self) -> PoolHandle {
        self.handle.clone()
    }
}

impl Default for ThreadPool {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.handle.shared.poison();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
        debug!("thread pool shut down");
    }
}

/// A clonable spawn handle to a [`ThreadPool`].
///
/// Handles do not keep the workers running — lifecycle stays with the
/// `ThreadPool` value. Spawning through a handle whose pool has shut down
/// runs every task inline (the poisoned workers no longer drain queues, but
/// a full or abandoned queue degrades to inline execution, so the future
/// still completes).
#[derive(Clone)]
pub struct PoolHandle {
    pub(crate) shared: Arc<PoolShared>,
}

impl PoolHandle {
    /// See [`ThreadPool::spawn`].
    pub fn spawn<F, T>(&self, f: F) -> Future<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.shared.spawn(f)
    }

    /// Number of worker threads in the pool behind this handle.
    pub fn num_workers(&self) -> usize {
        self.shared.num_workers()
    }
}

/// Process-wide pool, lazily constructed on first use.
static GLOBAL_POOL: OnceLock<ThreadPool> = OnceLock::new();

/// The process-wide pool.
///
/// Constructed on first access from [`PoolConfig::from_env`], which reads
/// the worker-count override exactly once.
pub fn global_pool() -> &'static ThreadPool {
    GLOBAL_POOL.get_or_init(|| ThreadPool::with_config(PoolConfig::from_env()))
}

/// Spawn a task on the ambient pool.
///
/// From a worker thread this targets the worker's own pool; from any other
/// thread it targets the global pool.
pub fn spawn<F, T>(f: F) -> Future<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    if let Some((shared, _)) = worker::current_pool() {
        shared.spawn(f)
    } else {
        global_pool().spawn(f)
    }
}
