//! Deterministic partition of the search space across workers.
//!
//! Worker i of W owns the arithmetic progression n = i + k*W, k = 0, 1, 2,
//! and the driver examines the pair (n, -n) at each step. Across the whole
//! fleet every nonzero integer shows up exactly once per sign; the n = 0
//! step (worker 0, k = 0) is skipped by the driver.

use num_bigint::BigInt;

use crate::config::ConfigError;

/// Identity of one worker within the fleet: residue class and modulus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSlice {
    worker_id: u64,
    worker_count: u64,
}

impl WorkerSlice {
    /// A slice needs `worker_count >= 1` and `worker_id < worker_count`.
    pub fn new(worker_id: u64, worker_count: u64) -> Result<WorkerSlice, ConfigError> {
        if worker_count == 0 {
            return Err(ConfigError::ZeroWorkerCount);
        }
        if worker_id >= worker_count {
            return Err(ConfigError::WorkerIdOutOfRange(worker_id, worker_count));
        }
        Ok(WorkerSlice {
            worker_id,
            worker_count,
        })
    }

    pub fn worker_id(&self) -> u64 {
        self.worker_id
    }

    pub fn worker_count(&self) -> u64 {
        self.worker_count
    }
}

/// Infinite, resumable walk over a slice's share of the index line.
///
/// Yields (step, n) pairs with n = worker_id + step * worker_count. The
/// walk is a pure function of (slice, step), so resuming from a persisted
/// step reproduces exactly the sequence an uninterrupted run would have
/// produced from that point.
#[derive(Debug, Clone)]
pub struct StepSequence {
    slice: WorkerSlice,
    next_step: u64,
}

impl StepSequence {
    /// Walk the slice from step 0.
    pub fn new(slice: WorkerSlice) -> StepSequence {
        StepSequence::resume(slice, 0)
    }

    /// Walk the slice from a persisted step. The resumed step itself is
    /// yielded again; re-examining one step is harmless.
    pub fn resume(slice: WorkerSlice, step: u64) -> StepSequence {
        StepSequence {
            slice,
            next_step: step,
        }
    }

    /// Step the next call to `next` will yield.
    pub fn next_step(&self) -> u64 {
        self.next_step
    }
}

impl Iterator for StepSequence {
    type Item = (u64, BigInt);

    fn next(&mut self) -> Option<(u64, BigInt)> {
        let k = self.next_step;
        self.next_step += 1;
        let n = BigInt::from(self.slice.worker_id())
            + BigInt::from(k) * BigInt::from(self.slice.worker_count());
        Some((k, n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn slice_invariants() {
        assert!(WorkerSlice::new(0, 1).is_ok());
        assert!(WorkerSlice::new(3, 4).is_ok());
        assert!(WorkerSlice::new(4, 4).is_err());
        assert!(WorkerSlice::new(0, 0).is_err());
    }

    #[test]
    fn sequence_is_the_residue_class() {
        let slice = WorkerSlice::new(2, 5).expect("valid slice");
        let head: Vec<(u64, BigInt)> = StepSequence::new(slice).take(4).collect();
        assert_eq!(
            head,
            vec![
                (0, BigInt::from(2)),
                (1, BigInt::from(7)),
                (2, BigInt::from(12)),
                (3, BigInt::from(17)),
            ]
        );
    }

    #[test]
    fn fleet_covers_every_magnitude_exactly_once() {
        // W workers running K steps produce 0..W*K with no gaps and no
        // repeats; with the signs added by the driver that is every
        // nonzero n of magnitude below W*K, plus the skipped n = 0.
        for (w, k) in [(1u64, 12u64), (3, 8), (5, 5)] {
            let mut seen = BTreeSet::new();
            for id in 0..w {
                let slice = WorkerSlice::new(id, w).expect("valid slice");
                for (_, n) in StepSequence::new(slice).take(k as usize) {
                    assert!(seen.insert(n), "duplicate magnitude in worker {}", id);
                }
            }
            let expected: BTreeSet<BigInt> = (0..w * k).map(BigInt::from).collect();
            assert_eq!(seen, expected, "W = {}, K = {}", w, k);
        }
    }

    #[test]
    fn resume_continues_where_it_stopped() {
        let slice = WorkerSlice::new(1, 3).expect("valid slice");
        let full: Vec<(u64, BigInt)> = StepSequence::new(slice).take(10).collect();
        let resumed: Vec<(u64, BigInt)> = StepSequence::resume(slice, 6).take(4).collect();
        assert_eq!(resumed, full[6..].to_vec());
    }
}
