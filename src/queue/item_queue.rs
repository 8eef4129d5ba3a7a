//! Mutex-guarded unbounded FIFO with push notification.

use super::{QueueError, QueueResult};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

struct Inner<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// An unbounded FIFO queue shared between producers and one consumer.
///
/// Every operation serializes on a single lock. Any number of threads may
/// push; exactly one thread may consume (`pop`, `recv_timeout`, `drain`).
/// With a single consumer an `is_empty()` check followed by `pop()` cannot
/// lose an item, although the answer of `is_empty()` may be stale by the
/// time the caller acts on it.
///
/// Pushes notify the consumer, so a consumer blocked in
/// [`recv_timeout`](Self::recv_timeout) wakes as soon as an item arrives.
pub struct ItemQueue<T> {
    inner: Mutex<Inner<T>>,
    available: Condvar,
}

impl<T> ItemQueue<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::new(),
                closed: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Appends an item at the tail and wakes the consumer.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Closed`] carrying the item back if the queue
    /// has been closed.
    pub fn push(&self, item: T) -> QueueResult<(), T> {
        {
            let mut inner = self.inner.lock();
            if inner.closed {
                return Err(QueueError::Closed(item));
            }
            inner.items.push_back(item);
        }
        self.available.notify_one();
        Ok(())
    }

    /// Removes and returns the head, or `None` if the queue is empty.
    pub fn pop(&self) -> Option<T> {
        self.inner.lock().items.pop_front()
    }

    /// Removes the head, waiting up to `timeout` for one to arrive.
    ///
    /// Items queued before [`close`](Self::close) are still handed out.
    ///
    /// # Returns
    ///
    /// - `Ok(item)` if an item was available
    /// - `Err(QueueError::Empty)` if nothing arrived within the timeout
    /// - `Err(QueueError::Disconnected)` if the queue is closed and empty
    pub fn recv_timeout(&self, timeout: Duration) -> QueueResult<T, T> {
        // A timeout too large for an Instant waits without a deadline
        let deadline = Instant::now().checked_add(timeout);
        let mut inner = self.inner.lock();

        loop {
            if let Some(item) = inner.items.pop_front() {
                return Ok(item);
            }
            if inner.closed {
                return Err(QueueError::Disconnected);
            }
            let Some(deadline) = deadline else {
                self.available.wait(&mut inner);
                continue;
            };
            if self.available.wait_until(&mut inner, deadline).timed_out() {
                // One last look: a push may have raced the timeout
                return match inner.items.pop_front() {
                    Some(item) => Ok(item),
                    None if inner.closed => Err(QueueError::Disconnected),
                    None => Err(QueueError::Empty),
                };
            }
        }
    }

    /// Removes every queued item, oldest first.
    pub fn drain(&self) -> Vec<T> {
        self.inner.lock().items.drain(..).collect()
    }

    /// Stops accepting items and wakes the consumer.
    ///
    /// Already queued items stay in the queue.
    pub fn close(&self) {
        self.inner.lock().closed = true;
        self.available.notify_all();
    }

    /// Whether [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Whether the queue currently holds no items
    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }

    /// Number of queued items
    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }
}

impl<T> Default for ItemQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for ItemQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("ItemQueue")
            .field("len", &inner.items.len())
            .field("closed", &inner.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_fifo_order() {
        let queue = ItemQueue::new();
        for i in 0..5 {
            queue.push(i).unwrap();
        }
        assert_eq!(queue.len(), 5);

        let popped: Vec<_> = std::iter::from_fn(|| queue.pop()).collect();
        assert_eq!(popped, vec![0, 1, 2, 3, 4]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_pop_empty_returns_none() {
        let queue: ItemQueue<u32> = ItemQueue::new();
        assert_eq!(queue.pop(), None);
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_recv_timeout_on_empty_queue() {
        let queue: ItemQueue<u32> = ItemQueue::new();
        let start = Instant::now();
        let result = queue.recv_timeout(Duration::from_millis(30));
        assert_eq!(result, Err(QueueError::Empty));
        assert!(start.elapsed() >= Duration::from_millis(25));
    }

    #[test]
    fn test_push_wakes_blocked_consumer() {
        let queue = Arc::new(ItemQueue::new());
        let consumer_queue = Arc::clone(&queue);

        let consumer = thread::spawn(move || {
            let start = Instant::now();
            let item = consumer_queue.recv_timeout(Duration::from_secs(10));
            (item, start.elapsed())
        });

        thread::sleep(Duration::from_millis(20));
        queue.push(42u32).unwrap();

        let (item, elapsed) = consumer.join().expect("consumer panicked");
        assert_eq!(item, Ok(42));
        assert!(elapsed < Duration::from_secs(5));
    }

    #[test]
    fn test_close_rejects_push_and_returns_item() {
        let queue = ItemQueue::new();
        queue.push("kept").unwrap();
        queue.close();
        assert!(queue.is_closed());

        let err = queue.push("rejected").unwrap_err();
        assert_eq!(err.into_inner(), Some("rejected"));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_closed_queue_still_drains() {
        let queue = ItemQueue::new();
        queue.push(1).unwrap();
        queue.push(2).unwrap();
        queue.close();

        assert_eq!(queue.recv_timeout(Duration::from_millis(10)), Ok(1));
        assert_eq!(queue.recv_timeout(Duration::from_millis(10)), Ok(2));
        assert_eq!(
            queue.recv_timeout(Duration::from_millis(10)),
            Err(QueueError::Disconnected)
        );
    }

    #[test]
    fn test_close_wakes_blocked_consumer() {
        let queue: Arc<ItemQueue<u32>> = Arc::new(ItemQueue::new());
        let consumer_queue = Arc::clone(&queue);

        let consumer =
            thread::spawn(move || consumer_queue.recv_timeout(Duration::from_secs(10)));

        thread::sleep(Duration::from_millis(20));
        queue.close();

        assert_eq!(
            consumer.join().expect("consumer panicked"),
            Err(QueueError::Disconnected)
        );
    }

    #[test]
    fn test_recv_timeout_with_unrepresentable_deadline() {
        let queue: Arc<ItemQueue<u32>> = Arc::new(ItemQueue::new());
        queue.push(7).unwrap();
        assert_eq!(queue.recv_timeout(Duration::MAX), Ok(7));

        let consumer_queue = Arc::clone(&queue);
        let consumer = thread::spawn(move || consumer_queue.recv_timeout(Duration::MAX));

        thread::sleep(Duration::from_millis(20));
        queue.push(8).unwrap();
        assert_eq!(consumer.join().expect("consumer panicked"), Ok(8));

        queue.close();
        assert_eq!(
            queue.recv_timeout(Duration::MAX),
            Err(QueueError::Disconnected)
        );
    }

    #[test]
    fn test_drain_takes_everything() {
        let queue = ItemQueue::new();
        for i in 0..3 {
            queue.push(i).unwrap();
        }
        assert_eq!(queue.drain(), vec![0, 1, 2]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_multiple_producers_single_consumer() {
        let queue = Arc::new(ItemQueue::new());
        let producers: Vec<_> = (0..4)
            .map(|p| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    for i in 0..250 {
                        queue.push((p, i)).unwrap();
                    }
                })
            })
            .collect();

        for producer in producers {
            producer.join().expect("producer panicked");
        }

        let items = queue.drain();
        assert_eq!(items.len(), 1000);

        // Per-producer order is preserved
        for p in 0..4 {
            let seq: Vec<_> = items
                .iter()
                .filter(|(producer, _)| *producer == p)
                .map(|(_, i)| *i)
                .collect();
            assert_eq!(seq, (0..250).collect::<Vec<_>>());
        }
    }
}
