//! # Rust Dispatch Pool
//!
//! A fixed-size worker pool in which every worker owns a private FIFO queue
//! and a private sink. A controller routes each item to exactly one worker;
//! workers are released together on the first submission and stopped
//! together at shutdown.
//!
//! ## Features
//!
//! - **Per-worker queues**: Items sent to worker *i* are only ever seen by worker *i*
//! - **Strict FIFO**: Delivery order within a worker matches submission order
//! - **Shared start/end gate**: One signal releases all workers, one stops them
//! - **Clonable sinks**: The pool clones your sink so workers never share state
//! - **Failure isolation**: A failing or panicking sink stops only its worker
//! - **Bounded shutdown**: Joining workers is limited by a configurable timeout
//!
//! ## Quick Start
//!
//! ```rust
//! use rust_dispatch_pool::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let sink = sink_fn(|item: Item| {
//!     println!("received {} bytes", item.len());
//!     Ok(())
//! });
//!
//! let pool = DispatchPool::new(4, sink)?;
//!
//! for worker_id in 0..4 {
//!     pool.submit(worker_id, Item::from("hello"))?;
//! }
//!
//! // Drains every queue, then joins the workers
//! pool.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Pool Configuration
//!
//! ```rust
//! use rust_dispatch_pool::prelude::*;
//! use std::time::Duration;
//!
//! # fn main() -> Result<()> {
//! let config = PoolConfig::new(8)
//!     .with_thread_name_prefix("ingest")
//!     .with_shutdown_timeout(Duration::from_secs(2))
//!     .with_shutdown_policy(ShutdownPolicy::Immediate);
//!
//! let pool = DispatchPool::with_config(config, sink_fn(|_item: Item| Ok(())))?;
//! # pool.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Sinks
//!
//! ```rust
//! use rust_dispatch_pool::prelude::*;
//!
//! struct ByteCounter {
//!     bytes: usize,
//! }
//!
//! impl Sink for ByteCounter {
//!     fn on_item(&mut self, item: Item) -> std::result::Result<(), SinkError> {
//!         self.bytes += item.len();
//!         Ok(())
//!     }
//!
//!     fn try_clone(&self) -> std::result::Result<BoxedSink, SinkError> {
//!         Ok(Box::new(ByteCounter { bytes: 0 }))
//!     }
//!
//!     fn name(&self) -> &str {
//!         "ByteCounter"
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let pool = DispatchPool::new(2, ByteCounter { bytes: 0 })?;
//! pool.dispatch(Item::new(vec![0; 64]))?;
//! # pool.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure Reporting
//!
//! ```rust
//! use rust_dispatch_pool::prelude::*;
//! use std::time::Duration;
//!
//! # fn main() -> Result<()> {
//! let pool = DispatchPool::new(2, sink_fn(|_item: Item| {
//!     Err(SinkError::rejected("disk full"))
//! }))?;
//!
//! pool.submit(1, Item::from("x"))?;
//! let failure = pool.failures().recv_timeout(Duration::from_secs(5)).unwrap();
//! assert_eq!(failure.worker_id, 1);
//! # pool.shutdown()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod core;
#[cfg(feature = "tracing")]
pub mod metrics;
pub mod pool;
pub mod prelude;
pub mod queue;
pub mod sinks;

pub use crate::core::{
    sink_fn, BoxedSink, FnSink, Item, PoolError, Result, Sink, SinkError, StartEndGate,
};
pub use crate::pool::{
    DispatchPool, PoolConfig, ShutdownPolicy, WorkerFailure, WorkerStatSnapshot, WorkerState,
    WorkerStats,
};
pub use crate::sinks::FileSink;
