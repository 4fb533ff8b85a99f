//! # Runtime Configuration
//!
//! Coroutine runtime settings read from the environment.
//!
//! ### `POLYSERVE_STACK_SIZE`
//!
//! Stack size for request coroutines, decimal (`32768`) or hex (`0x8000`).
//! Default: `0x8000` (32 KB). Static delivery and the proxy's blocking client
//! both run on this stack.
//!
//! ### `POLYSERVE_WORKERS`
//!
//! Number of may worker threads. Unset keeps may's default.

use std::env;

const DEFAULT_STACK_SIZE: usize = 0x8000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes
    pub stack_size: usize,
    /// Worker thread count, if overridden
    pub workers: Option<usize>,
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_values(
            env::var("POLYSERVE_STACK_SIZE").ok().as_deref(),
            env::var("POLYSERVE_WORKERS").ok().as_deref(),
        )
    }

    fn from_values(stack_size: Option<&str>, workers: Option<&str>) -> Self {
        let stack_size = stack_size
            .and_then(|val| match val.strip_prefix("0x") {
                Some(hex) => usize::from_str_radix(hex, 16).ok(),
                None => val.parse().ok(),
            })
            .unwrap_or(DEFAULT_STACK_SIZE);
        let workers = workers
            .and_then(|val| val.parse().ok())
            .filter(|&n: &usize| n > 0);
        RuntimeConfig {
            stack_size,
            workers,
        }
    }

    /// Apply to the global may configuration. Call before starting the server.
    pub fn apply(&self) {
        let config = may::config();
        config.set_stack_size(self.stack_size);
        if let Some(workers) = self.workers {
            config.set_workers(workers);
        }
    }
}
