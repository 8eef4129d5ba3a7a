//! File sink example
//!
//! Every worker writes the items it receives to its own log file in the
//! system temp directory.
//!
//! Run with: cargo run --example file_sink_demo

use rust_dispatch_pool::prelude::*;
use std::time::Duration;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let dir = std::env::temp_dir().join("rust_dispatch_pool_demo");
    std::fs::create_dir_all(&dir).map_err(|e| PoolError::other(e.to_string()))?;

    let sink = FileSink::create(&dir, "worker").map_err(|e| PoolError::other(e.to_string()))?;
    let config = PoolConfig::new(5)
        .with_thread_name_prefix("file-writer")
        .with_shutdown_timeout(Duration::from_secs(10));
    let pool = DispatchPool::with_config(config, sink)?;

    for _ in 0..10 {
        for worker_id in 0..pool.num_workers() {
            let len = 16 + fastrand::usize(..48);
            let payload: Vec<u8> = (0..len).map(|_| fastrand::u8(..127)).collect();
            pool.submit(worker_id, Item::new(payload))?;
        }
    }

    pool.shutdown()?;

    let snapshot = pool.stats_snapshot();
    println!(
        "{}",
        serde_json::to_string_pretty(&snapshot).map_err(|e| PoolError::other(e.to_string()))?
    );
    println!("Logs written to {}", dir.display());
    Ok(())
}
