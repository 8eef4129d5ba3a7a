//! Dispatch pool and worker implementations

pub mod config;
pub mod dispatch_pool;
pub mod worker;

pub use config::{PoolConfig, ShutdownPolicy};
pub use dispatch_pool::DispatchPool;
pub use worker::{Worker, WorkerFailure, WorkerStatSnapshot, WorkerState, WorkerStats};
