//! Property-based tests for rust_dispatch_pool using proptest

mod common;

use common::CollectingSink;
use proptest::prelude::*;
use rust_dispatch_pool::prelude::*;
use rust_dispatch_pool::queue::ItemQueue;
use std::time::Duration;

// ============================================================================
// PoolConfig Tests
// ============================================================================

proptest! {
    /// Any positive worker count with a non-zero poll interval validates
    #[test]
    fn test_config_valid(
        workers in 1usize..64,
        poll_us in 1u64..10_000,
        prefix in "[a-z]{3,10}"
    ) {
        let config = PoolConfig::new(workers)
            .with_thread_name_prefix(&prefix)
            .with_poll_interval(Duration::from_micros(poll_us));

        prop_assert!(config.validate().is_ok());
        prop_assert_eq!(config.thread_name_prefix, prefix);
    }

    /// Config survives a JSON round trip through serde
    #[test]
    fn test_config_json(workers in 1usize..64, immediate in any::<bool>()) {
        let policy = if immediate { ShutdownPolicy::Immediate } else { ShutdownPolicy::Drain };
        let config = PoolConfig::new(workers).with_shutdown_policy(policy);

        let json = serde_json::to_string(&config).expect("serialize config");
        let parsed = PoolConfig::from_json(&json).expect("parse config");

        prop_assert_eq!(parsed.num_workers, workers);
        prop_assert_eq!(parsed.shutdown_policy, policy);
    }
}

// ============================================================================
// ItemQueue Tests
// ============================================================================

proptest! {
    /// Pops come out in push order, and close keeps queued items reachable
    #[test]
    fn test_queue_fifo(values in prop::collection::vec(any::<u32>(), 0..100)) {
        let queue = ItemQueue::new();
        for value in &values {
            queue.push(*value).expect("queue open");
        }
        queue.close();

        let mut popped = Vec::new();
        while let Some(value) = queue.pop() {
            popped.push(value);
        }
        prop_assert_eq!(popped, values);
        prop_assert!(queue.push(0).is_err());
    }
}

// ============================================================================
// Delivery Order Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Each worker sees exactly its own items, in submission order
    #[test]
    fn test_per_worker_fifo(
        workers in 1usize..6,
        targets in prop::collection::vec(0usize..6, 0..80)
    ) {
        let (sink, deliveries) = CollectingSink::new();
        let pool = DispatchPool::new(workers, sink).expect("Failed to create pool");

        let mut expected = vec![Vec::new(); workers];
        for (seq, target) in targets.iter().enumerate() {
            let worker_id = target % workers;
            let payload = format!("{}:{}", worker_id, seq).into_bytes();
            pool.submit(worker_id, Item::new(payload.clone())).expect("Failed to submit item");
            expected[worker_id].push(payload);
        }

        pool.shutdown().expect("Failed to shutdown pool");

        let deliveries = deliveries.lock();
        for worker_id in 0..workers {
            prop_assert_eq!(&deliveries[worker_id], &expected[worker_id]);
        }
        prop_assert_eq!(pool.total_items_delivered(), targets.len() as u64);
    }

    /// Out-of-range submissions never touch any queue
    #[test]
    fn test_out_of_range_never_mutates(
        workers in 1usize..6,
        overshoot in 0usize..100
    ) {
        let (sink, deliveries) = CollectingSink::new();
        let pool = DispatchPool::new(workers, sink).expect("Failed to create pool");

        let result = pool.submit(workers + overshoot, Item::from("nope"));
        let is_out_of_range = matches!(result, Err(PoolError::OutOfRange { .. }));
        prop_assert!(is_out_of_range);
        prop_assert_eq!(pool.total_items_submitted(), 0);
        prop_assert!(!pool.is_started());

        pool.shutdown().expect("Failed to shutdown pool");
        prop_assert!(deliveries.lock().iter().all(|log| log.is_empty()));
    }

    /// Shutdown is safe to repeat
    #[test]
    fn test_double_shutdown_safe(workers in 1usize..4) {
        let (sink, _deliveries) = CollectingSink::new();
        let pool = DispatchPool::new(workers, sink).expect("Failed to create pool");

        prop_assert!(pool.shutdown().is_ok());
        prop_assert!(pool.shutdown().is_ok());
        prop_assert!(!pool.is_running());
    }
}
