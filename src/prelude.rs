//! Convenient re-exports for common types and traits

pub use crate::core::{
    sink_fn, BoxedSink, FnSink, Item, PoolError, Result, Sink, SinkError, StartEndGate,
};
pub use crate::pool::{
    DispatchPool, PoolConfig, ShutdownPolicy, WorkerFailure, WorkerState, WorkerStats,
};
pub use crate::sinks::FileSink;
