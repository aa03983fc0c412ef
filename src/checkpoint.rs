//! Durable worker state: the cursor checkpoint and the solution log.
//!
//! The checkpoint is a small JSON document overwritten on every flush; a
//! missing or corrupt file restarts the cursor at zero, so a crash costs
//! at most the steps since the last flush and re-examining those is
//! harmless. The solution log is shared, append-only and line oriented.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::candidates::Solution;

/// Checkpoint and solution-log I/O failures. Never fatal mid-run.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed checkpoint: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Cursor record serialized to JSON on every flush.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Next step of the walk.
    pub k: u64,
    /// Unix seconds at flush time.
    pub timestamp: u64,
    /// Worker that wrote the record.
    pub container_id: u64,
}

/// Owner of one worker's checkpoint file.
#[derive(Debug)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> CheckpointStore {
        CheckpointStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted cursor. Missing or unreadable records restart
    /// from step 0 with a warning rather than refusing to run.
    pub fn load(&self) -> u64 {
        if !self.path.exists() {
            return 0;
        }
        match self.try_load() {
            Ok(checkpoint) => checkpoint.k,
            Err(e) => {
                log::warn!(
                    "checkpoint {} unreadable ({}), restarting from step 0",
                    self.path.display(),
                    e
                );
                0
            }
        }
    }

    fn try_load(&self) -> Result<Checkpoint, PersistError> {
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Overwrite the record with the given cursor.
    pub fn save(&self, k: u64, container_id: u64) -> Result<(), PersistError> {
        let checkpoint = Checkpoint {
            k,
            timestamp: unix_now(),
            container_id,
        };
        let json = serde_json::to_string_pretty(&checkpoint)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Shared append-only record of found solutions.
///
/// One line per solution. Lines from different workers may interleave in
/// any order; each record is a single whole-line write.
#[derive(Debug)]
pub struct SolutionLog {
    path: PathBuf,
}

impl SolutionLog {
    pub fn new(path: impl Into<PathBuf>) -> SolutionLog {
        SolutionLog { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record:
    /// `<timestamp>,container=<id>,n=<n>,alpha=<a>,x=<x>,y=<y>,z=<z>`.
    pub fn append(&self, container_id: u64, solution: &Solution) -> Result<(), PersistError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let line = format!(
            "{},container={},n={},alpha={},x={},y={},z={}\n",
            iso_now(),
            container_id,
            solution.n,
            solution.alpha,
            solution.x,
            solution.y,
            solution.z
        );
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

/// Unix seconds now.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Current time as an ISO 8601 string (UTC).
///
/// Uses the `date` command on Unix; falls back to epoch seconds.
pub fn iso_now() -> String {
    #[cfg(unix)]
    {
        let output = std::process::Command::new("date")
            .args(["-u", "+%Y-%m-%dT%H:%M:%SZ"])
            .output();
        if let Ok(out) = output {
            if out.status.success() {
                return String::from_utf8_lossy(&out.stdout).trim().to_string();
            }
        }
    }
    format!("epoch:{}", unix_now())
}
