//! Error types for the dispatch pool

/// Result type for dispatch pool operations
pub type Result<T> = std::result::Result<T, PoolError>;

/// Errors raised by a [`Sink`](crate::core::Sink) implementation.
///
/// Kept separate from [`PoolError`] so that sink implementors only depend on
/// this type.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SinkError {
    /// I/O failure inside the sink
    #[error("sink I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The sink refused an item
    #[error("sink rejected item: {reason}")]
    Rejected {
        /// Why the item was refused
        reason: String,
    },

    /// Sink panicked while handling an item
    #[error("sink panicked: {message}")]
    Panicked {
        /// Panic payload rendered as text
        message: String,
    },

    /// General sink error
    #[error("{0}")]
    Other(String),
}

impl SinkError {
    /// Create a rejected error
    pub fn rejected(reason: impl Into<String>) -> Self {
        SinkError::Rejected {
            reason: reason.into(),
        }
    }

    /// Create a panicked error
    pub fn panicked(message: impl Into<String>) -> Self {
        SinkError::Panicked {
            message: message.into(),
        }
    }

    /// Create a generic sink error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        SinkError::Other(msg.into())
    }
}

/// Errors that can occur in the dispatch pool
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PoolError {
    /// Invalid configuration with parameter
    #[error("Invalid configuration for '{parameter}': {message}")]
    InvalidConfig {
        /// Configuration parameter name
        parameter: String,
        /// Error message
        message: String,
    },

    /// Submission addressed a worker the pool does not have
    #[error("Worker id {worker_id} is out of range for a pool of {worker_count} workers")]
    OutOfRange {
        /// Requested worker id
        worker_id: usize,
        /// Number of workers in the pool
        worker_count: usize,
    },

    /// Pool is shutting down and no longer accepts items
    #[error("Dispatch pool '{pool_name}' is shutting down")]
    ShuttingDown {
        /// Name of the pool
        pool_name: String,
    },

    /// Worker stopped after a sink failure; its queue is closed
    #[error("Worker #{worker_id} has stopped and no longer accepts items")]
    WorkerStopped {
        /// ID of the stopped worker
        worker_id: usize,
    },

    /// Cloning the prototype sink for a worker failed
    #[error("Failed to clone sink for worker #{worker_id}")]
    SinkClone {
        /// Worker the clone was meant for
        worker_id: usize,
        /// Underlying sink error
        #[source]
        source: SinkError,
    },

    /// A sink failed while consuming an item
    #[error("Sink of worker #{worker_id} failed")]
    Sink {
        /// Worker whose sink failed
        worker_id: usize,
        /// Underlying sink error
        #[source]
        source: SinkError,
    },

    /// Failed to spawn a worker thread with details
    #[error("Failed to spawn worker thread #{thread_id}: {message}")]
    SpawnError {
        /// ID of the thread that failed to spawn
        thread_id: usize,
        /// Error message
        message: String,
        /// Source IO error
        #[source]
        source: Option<std::io::Error>,
    },

    /// Worker thread did not exit within the shutdown timeout
    #[error("Worker thread #{worker_id} did not exit within {timeout_ms}ms")]
    JoinTimeout {
        /// ID of the worker that is still running
        worker_id: usize,
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// Worker panic with details
    #[error("Worker thread #{thread_id} panicked: {message}")]
    WorkerPanic {
        /// ID of the panicked thread
        thread_id: usize,
        /// Panic message
        message: String,
    },

    /// General error
    #[error("{0}")]
    Other(String),
}

impl PoolError {
    /// Create an invalid config error
    pub fn invalid_config(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        PoolError::InvalidConfig {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create an out of range error
    pub fn out_of_range(worker_id: usize, worker_count: usize) -> Self {
        PoolError::OutOfRange {
            worker_id,
            worker_count,
        }
    }

    /// Create a shutting down error
    pub fn shutting_down(pool_name: impl Into<String>) -> Self {
        PoolError::ShuttingDown {
            pool_name: pool_name.into(),
        }
    }

    /// Create a worker stopped error
    pub fn worker_stopped(worker_id: usize) -> Self {
        PoolError::WorkerStopped { worker_id }
    }

    /// Create a sink clone error
    pub fn sink_clone(worker_id: usize, source: SinkError) -> Self {
        PoolError::SinkClone { worker_id, source }
    }

    /// Create a sink failure error
    pub fn sink(worker_id: usize, source: SinkError) -> Self {
        PoolError::Sink { worker_id, source }
    }

    /// Create a spawn error with source
    pub fn spawn_with_source(
        thread_id: usize,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        PoolError::SpawnError {
            thread_id,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a join timeout error
    pub fn join_timeout(worker_id: usize, timeout_ms: u64) -> Self {
        PoolError::JoinTimeout {
            worker_id,
            timeout_ms,
        }
    }

    /// Create a worker panic error
    pub fn worker_panic(thread_id: usize, message: impl Into<String>) -> Self {
        PoolError::WorkerPanic {
            thread_id,
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        PoolError::Other(msg.into())
    }
}

/// Render a `catch_unwind` payload as text
pub(crate) fn panic_message(panic_info: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
