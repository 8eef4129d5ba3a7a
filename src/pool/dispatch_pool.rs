//! Dispatch pool implementation

use crate::core::{BoxedSink, Item, PoolError, Result, Sink, StartEndGate};
use crate::pool::config::PoolConfig;
use crate::pool::worker::{Worker, WorkerFailure, WorkerStatSnapshot, WorkerState, WorkerStats};
use crate::queue::{ItemQueue, QueueError};
use crossbeam_channel::Receiver;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A fixed set of workers, each draining its own queue into its own sink.
///
/// # Lifecycle
///
/// - Construction spawns every worker thread. Workers then block until the
///   first item is submitted to *any* of them.
/// - [`submit`](Self::submit) routes an item to exactly one worker's queue.
/// - [`shutdown`](Self::shutdown) stops accepting items, signals the end,
///   and joins every thread within the configured timeout. Dropping the pool
///   does the same.
///
/// # Sinks
///
/// The sink passed at construction is owned by worker 0; workers 1..N get
/// clones from [`Sink::try_clone`].
///
/// # Example
///
/// ```rust
/// use rust_dispatch_pool::prelude::*;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// # fn main() -> Result<()> {
/// let delivered = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&delivered);
/// let sink = sink_fn(move |_item: Item| {
///     counter.fetch_add(1, Ordering::SeqCst);
///     Ok(())
/// });
///
/// let pool = DispatchPool::new(3, sink)?;
/// for worker_id in 0..3 {
///     pool.submit(worker_id, Item::from("payload"))?;
/// }
/// pool.shutdown()?;
///
/// assert_eq!(delivered.load(Ordering::SeqCst), 3);
/// # Ok(())
/// # }
/// ```
pub struct DispatchPool {
    config: PoolConfig,
    queues: Vec<Arc<ItemQueue<Item>>>,
    workers: Vec<Worker>,
    gate: Arc<StartEndGate>,
    failures: Receiver<WorkerFailure>,
    accepting: AtomicBool,
    released: AtomicBool,
    next_worker: AtomicUsize,
    total_items_submitted: AtomicU64,
}

impl std::fmt::Debug for DispatchPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchPool")
            .field("config", &self.config)
            .field("running", &self.accepting.load(Ordering::Relaxed))
            .field("started", &self.released.load(Ordering::Relaxed))
            .field(
                "total_items_submitted",
                &self.total_items_submitted.load(Ordering::Relaxed),
            )
            .finish()
    }
}

impl DispatchPool {
    /// Create a pool of `num_workers` workers with default settings
    pub fn new<S: Sink + 'static>(num_workers: usize, sink: S) -> Result<Self> {
        Self::with_config(PoolConfig::new(num_workers), sink)
    }

    /// Create a pool with custom configuration.
    ///
    /// # Errors
    ///
    /// - `PoolError::InvalidConfig` - zero workers or zero poll interval
    /// - `PoolError::SinkClone` - the sink could not be cloned for a worker
    /// - `PoolError::SpawnError` - a worker thread could not be spawned;
    ///   workers spawned before it are stopped and joined
    pub fn with_config<S: Sink + 'static>(config: PoolConfig, sink: S) -> Result<Self> {
        config.validate()?;
        let num_workers = config.num_workers;

        // Clone every sink up front so a failed clone leaves no threads behind
        let prototype: BoxedSink = Box::new(sink);
        let mut sinks = Vec::with_capacity(num_workers);
        for worker_id in 1..num_workers {
            let clone = prototype
                .try_clone()
                .map_err(|e| PoolError::sink_clone(worker_id, e))?;
            sinks.push(clone);
        }
        sinks.insert(0, prototype);

        let gate = Arc::new(StartEndGate::new());
        let (failure_tx, failure_rx) = crossbeam_channel::unbounded();
        let queues: Vec<_> = (0..num_workers)
            .map(|_| Arc::new(ItemQueue::new()))
            .collect();

        let mut workers = Vec::with_capacity(num_workers);
        for (id, sink) in sinks.into_iter().enumerate() {
            match Worker::new(
                id,
                Arc::clone(&queues[id]),
                Arc::clone(&gate),
                sink,
                failure_tx.clone(),
                &config,
            ) {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    gate.signal_end();
                    for queue in &queues {
                        queue.close();
                    }
                    for worker in &workers {
                        if let Err(join_err) = worker.join_timeout(config.shutdown_timeout) {
                            log::error!("rollback of worker {} failed: {}", worker.id(), join_err);
                        }
                    }
                    return Err(e);
                }
            }
        }

        log::info!(
            "dispatch pool '{}' started with {} workers",
            config.thread_name_prefix,
            num_workers
        );
        #[cfg(feature = "tracing")]
        crate::metrics::record_pool_start(num_workers, &config.thread_name_prefix);

        Ok(Self {
            config,
            queues,
            workers,
            gate,
            failures: failure_rx,
            accepting: AtomicBool::new(true),
            released: AtomicBool::new(false),
            next_worker: AtomicUsize::new(0),
            total_items_submitted: AtomicU64::new(0),
        })
    }

    /// Submit an item to one worker.
    ///
    /// The first successful submission of the pool's lifetime releases every
    /// worker. Within one worker items are delivered in submission order.
    ///
    /// # Errors
    ///
    /// - `PoolError::OutOfRange` - `worker_id >= num_workers()`; no queue is touched
    /// - `PoolError::ShuttingDown` - shutdown has started
    /// - `PoolError::WorkerStopped` - the worker stopped after a sink failure
    ///
    /// A rejected item is dropped.
    pub fn submit(&self, worker_id: usize, item: Item) -> Result<()> {
        let queue = self
            .queues
            .get(worker_id)
            .ok_or_else(|| PoolError::out_of_range(worker_id, self.queues.len()))?;

        if !self.accepting.load(Ordering::Acquire) {
            return Err(PoolError::shutting_down(&self.config.thread_name_prefix));
        }

        queue.push(item).map_err(|e| match e {
            QueueError::Closed(_) if !self.accepting.load(Ordering::Acquire) => {
                PoolError::shutting_down(&self.config.thread_name_prefix)
            }
            _ => PoolError::worker_stopped(worker_id),
        })?;

        self.total_items_submitted.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "tracing")]
        crate::metrics::record_submission(worker_id, queue.len());

        if !self.released.swap(true, Ordering::AcqRel) {
            log::debug!("first item submitted to worker {}, releasing workers", worker_id);
            self.gate.signal_start();
        }
        Ok(())
    }

    /// Submit an item to the next worker in round-robin order.
    ///
    /// Returns the id of the worker that received the item.
    pub fn dispatch(&self, item: Item) -> Result<usize> {
        let worker_id = self.next_worker.fetch_add(1, Ordering::Relaxed) % self.queues.len();
        self.submit(worker_id, item)?;
        Ok(worker_id)
    }

    /// Block until every submitted item has been delivered, failed or
    /// discarded, or until `timeout` elapses. Returns whether that happened.
    pub fn wait_for_drain(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        loop {
            let settled =
                self.total_items_delivered() + self.total_items_failed() + self.total_items_discarded();
            if settled >= self.total_items_submitted() {
                return true;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return false;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    /// Get the number of workers
    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    /// Get the configuration the pool was built with
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Check if the pool still accepts items
    pub fn is_running(&self) -> bool {
        self.accepting.load(Ordering::Acquire)
    }

    /// Check if workers have been released by a first submission
    pub fn is_started(&self) -> bool {
        self.gate.is_started()
    }

    /// The gate shared by all workers
    pub fn gate(&self) -> &StartEndGate {
        &self.gate
    }

    /// Receiver of sink failure reports, one per failed worker
    pub fn failures(&self) -> &Receiver<WorkerFailure> {
        &self.failures
    }

    /// Current queue length of one worker (approximate)
    pub fn queue_len(&self, worker_id: usize) -> Result<usize> {
        self.queues
            .get(worker_id)
            .map(|q| q.len())
            .ok_or_else(|| PoolError::out_of_range(worker_id, self.queues.len()))
    }

    /// Lifecycle state of every worker, indexed by worker id
    pub fn worker_states(&self) -> Vec<WorkerState> {
        self.workers.iter().map(|w| w.state()).collect()
    }

    /// Get total number of items accepted
    pub fn total_items_submitted(&self) -> u64 {
        self.total_items_submitted.load(Ordering::Relaxed)
    }

    /// Get statistics for all workers
    pub fn get_stats(&self) -> Vec<Arc<WorkerStats>> {
        self.workers.iter().map(|w| w.stats()).collect()
    }

    /// Get a serializable copy of every worker's statistics
    pub fn stats_snapshot(&self) -> Vec<WorkerStatSnapshot> {
        self.workers.iter().map(|w| w.stats().snapshot()).collect()
    }

    /// Get total items delivered across all workers
    pub fn total_items_delivered(&self) -> u64 {
        self.workers
            .iter()
            .map(|w| w.stats().get_items_delivered())
            .sum()
    }

    /// Get total items whose delivery failed across all workers
    pub fn total_items_failed(&self) -> u64 {
        self.workers.iter().map(|w| w.stats().get_items_failed()).sum()
    }

    /// Get total items discarded across all workers
    pub fn total_items_discarded(&self) -> u64 {
        self.workers
            .iter()
            .map(|w| w.stats().get_items_discarded())
            .sum()
    }

    /// Shutdown the pool and wait for all workers to exit
    ///
    /// # Shutdown Sequence
    ///
    /// 1. Stops accepting new items
    /// 2. Signals the end on the shared gate and closes every queue
    /// 3. Joins every worker within `shutdown_timeout` (shared deadline)
    ///
    /// What happens to queued items depends on the configured
    /// [`ShutdownPolicy`](crate::ShutdownPolicy).
    ///
    /// # Errors
    ///
    /// Returns the first `JoinTimeout` or `WorkerPanic` encountered; every
    /// worker is still given a join attempt. Calling again retries workers
    /// that timed out.
    pub fn shutdown(&self) -> Result<()> {
        let was_accepting = self.accepting.swap(false, Ordering::AcqRel);

        self.gate.signal_end();
        for queue in &self.queues {
            queue.close();
        }

        let deadline = self
            .config
            .shutdown_timeout
            .and_then(|timeout| Instant::now().checked_add(timeout));

        let mut first_error = None;
        for worker in &self.workers {
            let remaining = deadline.map(|d| d.saturating_duration_since(Instant::now()));
            if let Err(e) = worker.join_timeout(remaining) {
                log::warn!("worker {} did not shut down cleanly: {}", worker.id(), e);
                first_error.get_or_insert(e);
            }
        }

        if was_accepting {
            log::info!(
                "dispatch pool '{}' shut down: {} submitted, {} delivered, {} failed, {} discarded",
                self.config.thread_name_prefix,
                self.total_items_submitted(),
                self.total_items_delivered(),
                self.total_items_failed(),
                self.total_items_discarded()
            );
            #[cfg(feature = "tracing")]
            crate::metrics::record_pool_shutdown(
                self.total_items_delivered(),
                self.total_items_discarded(),
            );
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for DispatchPool {
    fn drop(&mut self) {
        if self.workers.iter().any(|w| !w.is_finished()) || self.is_running() {
            if let Err(e) = self.shutdown() {
                log::error!(
                    "Failed to shutdown dispatch pool '{}' during drop: {}",
                    self.config.thread_name_prefix,
                    e
                );
            }
        }
    }
}
