//! Core types and traits for the dispatch pool

pub mod error;
pub mod gate;
pub mod item;
pub mod sink;

pub use error::{PoolError, Result, SinkError};
pub use gate::StartEndGate;
pub use item::Item;
pub use sink::{sink_fn, BoxedSink, FnSink, Sink};
