//! Configuration for the dispatch pool.

use crate::core::{PoolError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What a worker does with queued items once shutdown is signalled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShutdownPolicy {
    /// Deliver everything already queued, then stop.
    ///
    /// Every item accepted by [`submit`](crate::DispatchPool::submit) reaches
    /// its sink unless that sink fails.
    #[default]
    Drain,
    /// Stop as soon as the end signal is observed.
    ///
    /// Items still queued are dropped and counted as discarded.
    Immediate,
}

/// Configuration for a dispatch pool
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of workers, each with its own queue and sink
    pub num_workers: usize,
    /// Thread name prefix
    pub thread_name_prefix: String,
    /// Upper bound on how long an idle worker can go without re-checking
    /// the end signal. Pushes and shutdown wake workers directly.
    /// Default: 500µs
    pub poll_interval: Duration,
    /// How long [`shutdown`](crate::DispatchPool::shutdown) waits for all
    /// workers to exit (`None`, or a duration too large to add to `Instant::now()`,
    /// waits forever). Default: 5s
    pub shutdown_timeout: Option<Duration>,
    /// Handling of queued items at shutdown. Default: [`ShutdownPolicy::Drain`]
    pub shutdown_policy: ShutdownPolicy,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            num_workers: num_cpus::get(),
            thread_name_prefix: "dispatch".to_string(),
            poll_interval: Duration::from_micros(500),
            shutdown_timeout: Some(Duration::from_secs(5)),
            shutdown_policy: ShutdownPolicy::Drain,
        }
    }
}

impl PoolConfig {
    /// Create a new configuration with the given number of workers.
    ///
    /// Zero is accepted here and rejected by [`validate`](Self::validate).
    #[must_use]
    pub fn new(num_workers: usize) -> Self {
        Self {
            num_workers,
            ..Default::default()
        }
    }

    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PoolError::invalid_config("json", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Set thread name prefix
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Set the worker poll interval.
    ///
    /// # Panics
    ///
    /// Panics if interval is zero.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        assert!(!interval.is_zero(), "poll interval must be non-zero");
        self.poll_interval = interval;
        self
    }

    /// Bound the time shutdown waits for workers to exit
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = Some(timeout);
        self
    }

    /// Let shutdown wait for workers without a time limit
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn without_shutdown_timeout(mut self) -> Self {
        self.shutdown_timeout = None;
        self
    }

    /// Set the shutdown policy
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_shutdown_policy(mut self, policy: ShutdownPolicy) -> Self {
        self.shutdown_policy = policy;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.num_workers == 0 {
            return Err(PoolError::invalid_config(
                "num_workers",
                "Number of workers must be greater than 0",
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(PoolError::invalid_config(
                "poll_interval",
                "Poll interval must be non-zero",
            ));
        }
        Ok(())
    }
}
