//! Sink trait and related types

use crate::core::error::SinkError;
use crate::core::item::Item;
use std::fmt;

/// Capability that consumes items delivered by one worker.
///
/// Every worker owns exactly one sink. The pool hands the sink it was built
/// with to worker 0 and calls [`try_clone`](Sink::try_clone) once for every
/// other worker, so implementations must give each clone its own resources
/// (file handle, connection, buffer) rather than share mutable state.
pub trait Sink: Send {
    /// Consume one item.
    ///
    /// The sink takes ownership of the item and frees it when done.
    ///
    /// # Errors
    ///
    /// An error stops the calling worker; other workers keep running.
    fn on_item(&mut self, item: Item) -> Result<(), SinkError>;

    /// Produce an independently resourced instance for another worker.
    ///
    /// # Errors
    ///
    /// Returns an error if the new instance's resources cannot be acquired.
    fn try_clone(&self) -> Result<BoxedSink, SinkError>;

    /// Flush buffered output; called once when the worker stops normally
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Get the sink's name for logging
    fn name(&self) -> &str {
        "Sink"
    }
}

impl fmt::Debug for dyn Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sink({})", self.name())
    }
}

/// A boxed sink that can be sent to a worker thread
pub type BoxedSink = Box<dyn Sink>;

impl Sink for BoxedSink {
    fn on_item(&mut self, item: Item) -> Result<(), SinkError> {
        (**self).on_item(item)
    }

    fn try_clone(&self) -> Result<BoxedSink, SinkError> {
        (**self).try_clone()
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Helper to create a sink from a closure.
///
/// Clones copy the closure, so any captured state is cloned per worker.
#[derive(Clone)]
pub struct FnSink<F>
where
    F: FnMut(Item) -> Result<(), SinkError> + Clone + Send + 'static,
{
    closure: F,
    name: String,
}

impl<F> FnSink<F>
where
    F: FnMut(Item) -> Result<(), SinkError> + Clone + Send + 'static,
{
    /// Create a new closure sink
    pub fn new(closure: F) -> Self {
        Self {
            closure,
            name: "FnSink".to_string(),
        }
    }

    /// Create a new closure sink with a custom name
    pub fn with_name<S: Into<String>>(closure: F, name: S) -> Self {
        Self {
            closure,
            name: name.into(),
        }
    }
}

impl<F> Sink for FnSink<F>
where
    F: FnMut(Item) -> Result<(), SinkError> + Clone + Send + 'static,
{
    fn on_item(&mut self, item: Item) -> Result<(), SinkError> {
        (self.closure)(item)
    }

    fn try_clone(&self) -> Result<BoxedSink, SinkError> {
        Ok(Box::new(self.clone()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Shorthand for [`FnSink::new`]
pub fn sink_fn<F>(closure: F) -> FnSink<F>
where
    F: FnMut(Item) -> Result<(), SinkError> + Clone + Send + 'static,
{
    FnSink::new(closure)
}
