//! Per-worker item queues.
//!
//! Each worker of a [`DispatchPool`] consumes from its own [`ItemQueue`].
//! The pool is the producer side, the worker the only consumer.
//!
//! ```rust
//! use rust_dispatch_pool::queue::{ItemQueue, QueueError};
//! use std::time::Duration;
//!
//! let queue = ItemQueue::new();
//! queue.push(1).unwrap();
//! queue.push(2).unwrap();
//!
//! assert_eq!(queue.pop(), Some(1));
//! assert_eq!(queue.recv_timeout(Duration::from_millis(10)), Ok(2));
//!
//! queue.close();
//! assert!(matches!(queue.push(3), Err(QueueError::Closed(3))));
//! assert_eq!(queue.recv_timeout(Duration::from_millis(10)), Err(QueueError::Disconnected));
//! ```
//!
//! [`DispatchPool`]: crate::pool::DispatchPool

mod item_queue;

pub use item_queue::ItemQueue;

/// Errors that can occur during queue operations.
///
/// A rejected push hands the item back in [`QueueError::Closed`] so the
/// caller keeps ownership.
#[derive(Debug, PartialEq, Eq)]
pub enum QueueError<T> {
    /// Queue is closed and not accepting new items
    Closed(T),
    /// No item arrived before the timeout
    Empty,
    /// Queue is closed and has been fully drained
    Disconnected,
}

impl<T> QueueError<T> {
    /// Take back the item of a rejected push
    pub fn into_inner(self) -> Option<T> {
        match self {
            QueueError::Closed(item) => Some(item),
            _ => None,
        }
    }
}

impl<T> std::fmt::Display for QueueError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueError::Closed(_) => write!(f, "queue is closed"),
            QueueError::Empty => write!(f, "queue is empty"),
            QueueError::Disconnected => write!(f, "queue is closed and drained"),
        }
    }
}

impl<T: std::fmt::Debug> std::error::Error for QueueError<T> {}

/// Result type for queue operations.
pub type QueueResult<T, E> = std::result::Result<T, QueueError<E>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_error_display() {
        assert_eq!(QueueError::Closed(7u8).to_string(), "queue is closed");
        assert_eq!(QueueError::<u8>::Empty.to_string(), "queue is empty");
        assert_eq!(
            QueueError::<u8>::Disconnected.to_string(),
            "queue is closed and drained"
        );
    }

    #[test]
    fn test_into_inner_returns_rejected_item() {
        assert_eq!(QueueError::Closed("item").into_inner(), Some("item"));
        assert_eq!(QueueError::<&str>::Empty.into_inner(), None);
    }
}
