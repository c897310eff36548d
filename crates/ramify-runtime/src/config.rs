//! Pool configuration.
//!
//! The runtime takes one piece of process-wide startup configuration: the
//! worker-count override, read from the environment exactly once when the
//! global pool is first constructed. Everything else is programmatic,
//! through the [`PoolConfig`] builder.

use std::env;
use std::thread;

use tracing::warn;

use crate::deque::DEFAULT_QUEUE_CAPACITY;

/// Environment variable overriding the worker count of the global pool.
///
/// Accepts a positive integer. Absent, zero, or unparsable values fall back
/// to the detected hardware concurrency.
pub const WORKER_COUNT_ENV: &str = "RAMIFY_WORKERS";

/// Configuration for a [`ThreadPool`](crate::ThreadPool).
///
/// # Example
///
/// ```rust
/// use ramify_runtime::{PoolConfig, ThreadPool};
///
/// let pool = ThreadPool::with_config(
///     PoolConfig::new()
///         .with_workers(4)
///         .with_thread_name_prefix("my-worker"),
/// );
/// assert_eq!(pool.num_workers(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Worker-thread count; `None` means detected hardware concurrency.
    num_workers: Option<usize>,
    /// Name prefix for worker threads.
    thread_name_prefix: String,
    /// Slots in each worker's deque.
    queue_capacity: usize,
    /// Seed for victim selection; `None` seeds from entropy.
    steal_seed: Option<u64>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            num_workers: None,
            thread_name_prefix: "ramify-worker".to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            steal_seed: None,
        }
    }
}

impl PoolConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration plus the environment override, if usable.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        match env::var(WORKER_COUNT_ENV) {
            Ok(value) => match value.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.num_workers = Some(n),
                _ => warn!(
                    value = %value,
                    "ignoring invalid {} override",
                    WORKER_COUNT_ENV
                ),
            },
            Err(env::VarError::NotPresent) => {}
            Err(err) => warn!(error = %err, "could not read {}", WORKER_COUNT_ENV),
        }

        config
    }

    /// Set the number of worker threads. Clamped to a minimum of 1.
    pub fn with_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = Some(num_workers);
        self
    }

    /// Set the worker thread name prefix.
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Set the per-worker queue capacity. Clamped to a minimum of 1.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Seed victim selection deterministically (worker `i` derives its seed
    /// from this value and `i`).
    pub fn with_steal_seed(mut self, seed: u64) -> Self {
        self.steal_seed = Some(seed);
        self
    }

    pub(crate) fn effective_workers(&self) -> usize {
        self.num_workers.unwrap_or_else(detected_parallelism).max(1)
    }

    pub(crate) fn thread_name_prefix(&self) -> &str {
        &self.thread_name_prefix
    }

    pub(crate) fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    pub(crate) fn steal_seed(&self) -> Option<u64> {
        self.steal_seed
    }
}

fn detected_parallelism() -> usize {
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}
