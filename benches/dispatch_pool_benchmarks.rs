use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use rust_dispatch_pool::prelude::*;
use rust_dispatch_pool::queue::ItemQueue;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn counting_sink(counter: Arc<AtomicU64>) -> impl Sink + 'static {
    sink_fn(move |item: Item| {
        black_box(item.payload());
        counter.fetch_add(1, Ordering::Relaxed);
        Ok(())
    })
}

fn random_payload(len: usize) -> Vec<u8> {
    (0..len).map(|_| fastrand::u8(..)).collect()
}

fn benchmark_pool_creation(c: &mut Criterion) {
    c.bench_function("dispatch_pool_creation", |b| {
        b.iter(|| {
            let pool = DispatchPool::new(4, sink_fn(|_item: Item| Ok(())))
                .expect("Failed to create pool");
            pool.shutdown().expect("Failed to shutdown pool");
        });
    });
}

fn benchmark_item_queue(c: &mut Criterion) {
    let mut group = c.benchmark_group("item_queue");
    group.throughput(Throughput::Elements(1000));

    group.bench_function("push_pop_1000", |b| {
        let queue = ItemQueue::new();
        b.iter(|| {
            for i in 0..1000u64 {
                queue.push(i).expect("queue open");
            }
            while let Some(value) = queue.pop() {
                black_box(value);
            }
        });
    });

    group.finish();
}

fn benchmark_submission(c: &mut Criterion) {
    let mut group = c.benchmark_group("submission");

    for payload_len in [16usize, 1024] {
        let payloads: Vec<Vec<u8>> = (0..100).map(|_| random_payload(payload_len)).collect();
        group.throughput(Throughput::Bytes((payload_len * payloads.len()) as u64));

        group.bench_function(format!("round_robin_100x{}b", payload_len), |b| {
            b.iter_batched(
                || {
                    let counter = Arc::new(AtomicU64::new(0));
                    let pool = DispatchPool::new(4, counting_sink(Arc::clone(&counter)))
                        .expect("Failed to create pool");
                    (pool, counter, payloads.clone())
                },
                |(pool, counter, payloads)| {
                    for payload in payloads {
                        pool.dispatch(Item::new(payload)).expect("Failed to dispatch");
                    }
                    pool.shutdown().expect("Failed to shutdown pool");
                    assert_eq!(counter.load(Ordering::Relaxed), 100);
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn benchmark_concurrent_submission(c: &mut Criterion) {
    c.bench_function("concurrent_submission_4_threads", |b| {
        b.iter_batched(
            || {
                let counter = Arc::new(AtomicU64::new(0));
                let pool = DispatchPool::new(4, counting_sink(Arc::clone(&counter)))
                    .expect("Failed to create pool");
                (Arc::new(pool), counter)
            },
            |(pool, counter)| {
                let handles: Vec<_> = (0..4)
                    .map(|worker_id| {
                        let pool = Arc::clone(&pool);
                        std::thread::spawn(move || {
                            for _ in 0..250 {
                                pool.submit(worker_id, Item::new(vec![0u8; 32]))
                                    .expect("Failed to submit item");
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().expect("submitter panicked");
                }
                pool.shutdown().expect("Failed to shutdown pool");
                assert_eq!(counter.load(Ordering::Relaxed), 1000);
            },
            BatchSize::SmallInput,
        );
    });
}

fn benchmark_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("throughput");
    group.measurement_time(Duration::from_secs(10));
    group.throughput(Throughput::Elements(10_000));

    group.bench_function("items_per_second", |b| {
        b.iter_batched(
            || {
                let counter = Arc::new(AtomicU64::new(0));
                let pool = DispatchPool::new(8, counting_sink(Arc::clone(&counter)))
                    .expect("Failed to create pool");
                (pool, counter)
            },
            |(pool, counter)| {
                for _ in 0..10_000 {
                    pool.dispatch(Item::new(vec![1u8; 8])).expect("Failed to dispatch");
                }
                pool.shutdown().expect("Failed to shutdown pool");
                assert_eq!(counter.load(Ordering::Relaxed), 10_000, "Not all items delivered");
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_pool_creation,
    benchmark_item_queue,
    benchmark_submission,
    benchmark_concurrent_submission,
    benchmark_throughput
);
criterion_main!(benches);
