//! Worker thread implementation

use crate::core::error::panic_message;
use crate::core::{BoxedSink, Item, PoolError, Result, SinkError, StartEndGate};
use crate::pool::config::{PoolConfig, ShutdownPolicy};
use crate::queue::{ItemQueue, QueueError};
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[cfg(feature = "tracing")]
use tracing::{span, Level};

/// Sleep between `is_finished` checks while joining with a timeout
const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Lifecycle of a worker thread
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum WorkerState {
    /// Thread spawned, loop not entered yet
    Created = 0,
    /// Blocked until the pool's first submission
    WaitingForStart = 1,
    /// Delivering items to the sink
    Processing = 2,
    /// Queue observed empty, watching for new items or the end signal
    Draining = 3,
    /// Exited normally
    Terminated = 4,
    /// Exited because the sink failed
    Failed = 5,
}

impl WorkerState {
    /// Whether the worker loop has exited
    pub fn is_finished(self) -> bool {
        matches!(self, WorkerState::Terminated | WorkerState::Failed)
    }
}

impl From<u8> for WorkerState {
    fn from(value: u8) -> Self {
        match value {
            0 => WorkerState::Created,
            1 => WorkerState::WaitingForStart,
            2 => WorkerState::Processing,
            3 => WorkerState::Draining,
            4 => WorkerState::Terminated,
            _ => WorkerState::Failed,
        }
    }
}

#[derive(Debug)]
struct StateCell(AtomicU8);

impl StateCell {
    fn new() -> Self {
        Self(AtomicU8::new(WorkerState::Created as u8))
    }

    fn get(&self) -> WorkerState {
        WorkerState::from(self.0.load(Ordering::Acquire))
    }

    fn set(&self, state: WorkerState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

/// Statistics for a worker thread
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Items handed to the sink successfully
    pub items_delivered: AtomicU64,
    /// Payload bytes handed to the sink successfully
    pub bytes_delivered: AtomicU64,
    /// Items whose delivery failed (sink error or panic)
    pub items_failed: AtomicU64,
    /// Items dropped without delivery at shutdown or after a failure
    pub items_discarded: AtomicU64,
    /// Total time spent inside the sink (microseconds)
    pub total_processing_time_us: AtomicU64,
}

impl WorkerStats {
    /// Create new worker statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one successful delivery
    pub fn record_delivery(&self, bytes: usize, microseconds: u64) {
        self.items_delivered.fetch_add(1, Ordering::Relaxed);
        self.bytes_delivered
            .fetch_add(bytes as u64, Ordering::Relaxed);
        self.total_processing_time_us
            .fetch_add(microseconds, Ordering::Relaxed);
    }

    /// Increment items failed counter
    pub fn increment_failed(&self) {
        self.items_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Add to the discarded items counter
    pub fn add_discarded(&self, count: u64) {
        self.items_discarded.fetch_add(count, Ordering::Relaxed);
    }

    /// Get total items delivered
    pub fn get_items_delivered(&self) -> u64 {
        self.items_delivered.load(Ordering::Relaxed)
    }

    /// Get total bytes delivered
    pub fn get_bytes_delivered(&self) -> u64 {
        self.bytes_delivered.load(Ordering::Relaxed)
    }

    /// Get total items failed
    pub fn get_items_failed(&self) -> u64 {
        self.items_failed.load(Ordering::Relaxed)
    }

    /// Get total items discarded
    pub fn get_items_discarded(&self) -> u64 {
        self.items_discarded.load(Ordering::Relaxed)
    }

    /// Get average time per delivered item in microseconds
    pub fn get_average_processing_time_us(&self) -> f64 {
        let total = self.total_processing_time_us.load(Ordering::Relaxed);
        let count = self.items_delivered.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    /// Take a plain copy of the counters
    pub fn snapshot(&self) -> WorkerStatSnapshot {
        WorkerStatSnapshot {
            items_delivered: self.get_items_delivered(),
            bytes_delivered: self.get_bytes_delivered(),
            items_failed: self.get_items_failed(),
            items_discarded: self.get_items_discarded(),
            average_processing_time_us: self.get_average_processing_time_us(),
        }
    }
}

/// Point-in-time copy of [`WorkerStats`]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkerStatSnapshot {
    /// Items handed to the sink successfully
    pub items_delivered: u64,
    /// Payload bytes handed to the sink successfully
    pub bytes_delivered: u64,
    /// Items whose delivery failed
    pub items_failed: u64,
    /// Items dropped without delivery
    pub items_discarded: u64,
    /// Average time per delivered item in microseconds
    pub average_processing_time_us: f64,
}

/// Report sent to the pool when a worker's sink fails
#[derive(Debug)]
pub struct WorkerFailure {
    /// Worker whose sink failed
    pub worker_id: usize,
    /// The sink's error
    pub error: SinkError,
}

impl From<WorkerFailure> for PoolError {
    fn from(failure: WorkerFailure) -> Self {
        PoolError::sink(failure.worker_id, failure.error)
    }
}

/// A worker thread draining one queue into one sink
#[derive(Debug)]
pub struct Worker {
    id: usize,
    thread: Mutex<Option<thread::JoinHandle<()>>>,
    stats: Arc<WorkerStats>,
    state: Arc<StateCell>,
}

impl Worker {
    /// Spawn a worker consuming `queue` into `sink`.
    ///
    /// The worker waits on `gate` before touching its queue and reports a
    /// sink failure on `failures` before exiting.
    pub(crate) fn new(
        id: usize,
        queue: Arc<ItemQueue<Item>>,
        gate: Arc<StartEndGate>,
        sink: BoxedSink,
        failures: Sender<WorkerFailure>,
        config: &PoolConfig,
    ) -> Result<Self> {
        let stats = Arc::new(WorkerStats::new());
        let state = Arc::new(StateCell::new());

        let worker_loop = WorkerLoop {
            id,
            queue,
            gate,
            sink,
            failures,
            stats: Arc::clone(&stats),
            state: Arc::clone(&state),
            poll_interval: config.poll_interval,
            policy: config.shutdown_policy,
        };

        let thread = thread::Builder::new()
            .name(format!("{}-{}", config.thread_name_prefix, id))
            .spawn(move || worker_loop.run())
            .map_err(|e| PoolError::spawn_with_source(id, "Cannot create worker thread", e))?;

        Ok(Self {
            id,
            thread: Mutex::new(Some(thread)),
            stats,
            state,
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Get worker statistics
    pub fn stats(&self) -> Arc<WorkerStats> {
        Arc::clone(&self.stats)
    }

    /// Current lifecycle state
    pub fn state(&self) -> WorkerState {
        self.state.get()
    }

    /// Whether the thread has been joined or has exited
    pub fn is_finished(&self) -> bool {
        self.thread
            .lock()
            .as_ref()
            .map_or(true, |handle| handle.is_finished())
    }

    /// Join the worker thread, waiting at most `timeout` (`None` = forever).
    ///
    /// On timeout the handle is kept so a later call can try again.
    /// Joining an already joined worker is a no-op.
    pub fn join_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        let mut slot = self.thread.lock();
        let Some(handle) = slot.take() else {
            return Ok(());
        };

        if let Some(timeout) = timeout {
            let start = Instant::now();
            while !handle.is_finished() {
                if start.elapsed() >= timeout {
                    *slot = Some(handle);
                    return Err(PoolError::join_timeout(
                        self.id,
                        timeout.as_millis() as u64,
                    ));
                }
                thread::sleep(JOIN_POLL_INTERVAL);
            }
        }

        handle
            .join()
            .map_err(|panic_info| PoolError::worker_panic(self.id, panic_message(&*panic_info)))
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        if let Some(handle) = self.thread.get_mut().take() {
            if handle.is_finished() {
                if let Err(panic_info) = handle.join() {
                    log::error!(
                        "worker {} panicked: {}",
                        self.id,
                        panic_message(&*panic_info)
                    );
                }
            } else {
                log::warn!(
                    "worker {} still running when dropped; thread is detached",
                    self.id
                );
            }
        }
    }
}

/// State moved onto the worker thread
struct WorkerLoop {
    id: usize,
    queue: Arc<ItemQueue<Item>>,
    gate: Arc<StartEndGate>,
    sink: BoxedSink,
    failures: Sender<WorkerFailure>,
    stats: Arc<WorkerStats>,
    state: Arc<StateCell>,
    poll_interval: Duration,
    policy: ShutdownPolicy,
}

impl WorkerLoop {
    /// Main worker loop
    ///
    /// Waits for the pool-wide start, then delivers items until the queue is
    /// closed and drained (`Drain`) or the end signal is seen (`Immediate`).
    fn run(mut self) {
        #[cfg(feature = "tracing")]
        let worker_span = span!(Level::DEBUG, "worker", id = self.id);
        #[cfg(feature = "tracing")]
        let _guard = worker_span.enter();

        self.state.set(WorkerState::WaitingForStart);
        // An end that beats the start can still leave a first submission queued
        if self.gate.wait_for_start() {
            log::debug!("worker {} started with sink {}", self.id, self.sink.name());
        } else {
            log::debug!("worker {} ended before the pool started", self.id);
        }
        self.state.set(WorkerState::Processing);

        loop {
            if self.policy == ShutdownPolicy::Immediate && self.gate.is_ended() {
                self.queue.close();
                self.discard_remaining("shutdown");
                break;
            }

            match self.queue.recv_timeout(self.poll_interval) {
                Ok(item) => {
                    self.state.set(WorkerState::Processing);
                    if let Err(error) = self.deliver(item) {
                        self.fail(error);
                        return;
                    }
                }
                Err(QueueError::Empty) => {
                    self.state.set(WorkerState::Draining);
                    if self.gate.is_ended() {
                        // Closing under the queue lock settles racing pushes:
                        // they either land before this and get drained, or
                        // are rejected back to the submitter.
                        self.queue.close();
                    }
                }
                Err(QueueError::Disconnected) | Err(QueueError::Closed(_)) => break,
            }
        }

        self.finish();
    }

    /// Hand one item to the sink, catching panics
    fn deliver(&mut self, item: Item) -> std::result::Result<(), SinkError> {
        let bytes = item.len();
        let start = Instant::now();
        let sink = &mut self.sink;
        let outcome = catch_unwind(AssertUnwindSafe(move || sink.on_item(item)));
        let elapsed = start.elapsed();

        match outcome {
            Ok(Ok(())) => {
                self.stats
                    .record_delivery(bytes, elapsed.as_micros() as u64);
                #[cfg(feature = "tracing")]
                crate::metrics::record_delivery(self.id, bytes, elapsed, true);
                Ok(())
            }
            Ok(Err(error)) => {
                self.stats.increment_failed();
                #[cfg(feature = "tracing")]
                crate::metrics::record_delivery(self.id, bytes, elapsed, false);
                Err(error)
            }
            Err(panic_info) => {
                self.stats.increment_failed();
                #[cfg(feature = "tracing")]
                crate::metrics::record_delivery(self.id, bytes, elapsed, false);
                Err(SinkError::panicked(panic_message(&*panic_info)))
            }
        }
    }

    /// Drop whatever is still queued and account for it
    fn discard_remaining(&self, reason: &str) {
        let remaining = self.queue.drain();
        if !remaining.is_empty() {
            log::warn!(
                "worker {} discarding {} queued items ({})",
                self.id,
                remaining.len(),
                reason
            );
            self.stats.add_discarded(remaining.len() as u64);
        }
    }

    /// Stop after a sink failure and report it to the pool
    fn fail(self, error: SinkError) {
        log::error!(
            "worker {} stopping: sink {} failed: {}",
            self.id,
            self.sink.name(),
            error
        );
        self.queue.close();
        self.discard_remaining("sink failure");
        self.state.set(WorkerState::Failed);

        #[cfg(feature = "tracing")]
        crate::metrics::record_worker_failure(self.id, &error);

        let failure = WorkerFailure {
            worker_id: self.id,
            error,
        };
        if self.failures.send(failure).is_err() {
            log::warn!("worker {} failure report dropped: pool is gone", self.id);
        }
    }

    /// Flush the sink and mark the worker terminated
    fn finish(mut self) {
        if let Err(error) = self.sink.flush() {
            self.fail(error);
            return;
        }

        log::debug!(
            "worker {} shutting down: {} delivered, {} discarded",
            self.id,
            self.stats.get_items_delivered(),
            self.stats.get_items_discarded()
        );
        self.state.set(WorkerState::Terminated);
    }
}
