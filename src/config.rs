//! Worker configuration, resolved from the environment at startup.
//!
//! Every key is optional; malformed or inconsistent values are fatal so a
//! misconfigured fleet member dies loudly instead of searching the wrong
//! slice.

use std::env;
use std::path::PathBuf;

use crate::partition::WorkerSlice;

/// Startup configuration failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be an unsigned integer, got '{1}'")]
    BadInteger(&'static str, String),

    #[error("TOTAL_CONTAINERS must be at least 1")]
    ZeroWorkerCount,

    #[error("CONTAINER_ID {0} is out of range for TOTAL_CONTAINERS {1}")]
    WorkerIdOutOfRange(u64, u64),

    #[error("CHECK_INTERVAL must be at least 1")]
    ZeroCheckInterval,
}

/// Resolved worker configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// This worker's slice of the search space.
    pub slice: WorkerSlice,
    /// Cursor checkpoint owned by this worker.
    pub checkpoint_file: PathBuf,
    /// Shared append-only solution log.
    pub solutions_file: PathBuf,
    /// Steps between checkpoint flushes and progress lines.
    pub check_interval: u64,
    /// Base seed; each worker derives its own generator seed from it.
    pub random_seed: u64,
}

impl Config {
    /// Read configuration from the environment.
    ///
    /// Keys: CONTAINER_ID (default 0), TOTAL_CONTAINERS (1000),
    /// CHECKPOINT_FILE (checkpoint_<id>.json), SOLUTIONS_FILE
    /// (solutions.txt), CHECK_INTERVAL (5000), RANDOM_SEED (42).
    pub fn from_env() -> Result<Config, ConfigError> {
        let worker_id = env_u64("CONTAINER_ID", 0)?;
        let worker_count = env_u64("TOTAL_CONTAINERS", 1000)?;
        let slice = WorkerSlice::new(worker_id, worker_count)?;

        let check_interval = env_u64("CHECK_INTERVAL", 5000)?;
        if check_interval == 0 {
            return Err(ConfigError::ZeroCheckInterval);
        }
        let random_seed = env_u64("RANDOM_SEED", 42)?;

        let checkpoint_file = env::var("CHECKPOINT_FILE")
            .unwrap_or_else(|_| format!("checkpoint_{}.json", worker_id));
        let solutions_file =
            env::var("SOLUTIONS_FILE").unwrap_or_else(|_| "solutions.txt".to_string());

        Ok(Config {
            slice,
            checkpoint_file: PathBuf::from(checkpoint_file),
            solutions_file: PathBuf::from(solutions_file),
            check_interval,
            random_seed,
        })
    }

    /// Seed for this worker's generator: base seed plus worker id, so
    /// fleet members never share witness or rho parameter streams.
    pub fn worker_seed(&self) -> u64 {
        self.random_seed.wrapping_add(self.slice.worker_id())
    }
}

fn env_u64(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::BadInteger(key, raw)),
        Err(_) => Ok(default),
    }
}
