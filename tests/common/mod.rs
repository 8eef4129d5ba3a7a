//! Shared sinks for integration tests

#![allow(dead_code)]

use parking_lot::Mutex;
use rust_dispatch_pool::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Per-sink delivery logs; slot *i* belongs to the *i*-th sink instance
pub type Deliveries = Arc<Mutex<Vec<Vec<Vec<u8>>>>>;

/// Sink recording every payload into its own slot of a shared log.
///
/// The prototype writes to slot 0 and clones take slots 1, 2, ... in the
/// order they are created, which matches worker ids.
pub struct CollectingSink {
    slot: usize,
    next_slot: Arc<AtomicUsize>,
    deliveries: Deliveries,
}

impl CollectingSink {
    pub fn new() -> (Self, Deliveries) {
        let deliveries: Deliveries = Arc::new(Mutex::new(vec![Vec::new()]));
        let sink = Self {
            slot: 0,
            next_slot: Arc::new(AtomicUsize::new(1)),
            deliveries: Arc::clone(&deliveries),
        };
        (sink, deliveries)
    }
}

impl Sink for CollectingSink {
    fn on_item(&mut self, item: Item) -> std::result::Result<(), SinkError> {
        self.deliveries.lock()[self.slot].push(item.into_payload());
        Ok(())
    }

    fn try_clone(&self) -> std::result::Result<BoxedSink, SinkError> {
        let slot = self.next_slot.fetch_add(1, Ordering::SeqCst);
        {
            let mut deliveries = self.deliveries.lock();
            while deliveries.len() <= slot {
                deliveries.push(Vec::new());
            }
        }
        Ok(Box::new(Self {
            slot,
            next_slot: Arc::clone(&self.next_slot),
            deliveries: Arc::clone(&self.deliveries),
        }))
    }

    fn name(&self) -> &str {
        "CollectingSink"
    }
}

/// Payload encoding (worker, sequence) for order checks
pub fn tagged_item(worker_id: usize, seq: usize) -> Item {
    Item::new(format!("{}:{}", worker_id, seq).into_bytes())
}

pub fn tag(worker_id: usize, seq: usize) -> Vec<u8> {
    format!("{}:{}", worker_id, seq).into_bytes()
}

/// Install env_logger once; repeated calls are harmless
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
