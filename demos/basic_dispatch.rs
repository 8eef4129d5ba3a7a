//! Basic dispatch pool usage example
//!
//! Starts five workers and sends each of them ten random payloads, then
//! prints per-worker statistics.
//!
//! Run with: cargo run --example basic_dispatch

use rust_dispatch_pool::prelude::*;
use std::thread;

const WORKER_COUNT: usize = 5;
const ROUNDS: usize = 10;

fn generate_item() -> Item {
    let len = 64 + fastrand::usize(..1000);
    let payload: Vec<u8> = (0..len).map(|_| fastrand::u8(..127)).collect();
    Item::new(payload)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=== Rust Dispatch Pool - Basic Usage Example ===\n");

    let sink = sink_fn(|item: Item| {
        println!(
            "  {} received {} bytes",
            thread::current().name().unwrap_or("unnamed"),
            item.len()
        );
        Ok(())
    });

    let pool = DispatchPool::new(WORKER_COUNT, sink)?;
    println!("1. Created pool with {} workers", pool.num_workers());

    println!("\n2. Sending {} rounds of items:", ROUNDS);
    for _ in 0..ROUNDS {
        for worker_id in 0..WORKER_COUNT {
            pool.submit(worker_id, generate_item())?;
        }
    }

    println!("\n3. Shutting down (queued items are drained first)");
    pool.shutdown()?;

    println!("\n4. Per-worker statistics:");
    for (i, stat) in pool.get_stats().iter().enumerate() {
        println!(
            "   Worker {}: {} delivered, {} bytes, avg time: {:.2}μs",
            i,
            stat.get_items_delivered(),
            stat.get_bytes_delivered(),
            stat.get_average_processing_time_us()
        );
    }

    println!(
        "\n   Total: {} submitted, {} delivered",
        pool.total_items_submitted(),
        pool.total_items_delivered()
    );
    Ok(())
}
