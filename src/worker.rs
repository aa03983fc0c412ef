//! The endless driver: resume the cursor, run steps, checkpoint.
//!
//! One worker owns one slice. A step examines n = id + k*count and its
//! negation: the four trivial alphas first, then the enumerated divisors
//! of |D| up to the per-index candidate cap. The loop runs until the stop
//! flag flips and always flushes a final checkpoint on the way out.
//! Persistence trouble mid-run is logged and survived; only startup
//! problems are fatal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::candidates::{CubeFamily, Solution};
use crate::checkpoint::{iso_now, CheckpointStore, PersistError, SolutionLog};
use crate::config::Config;
use crate::factor;
use crate::partition::StepSequence;

/// Enumerated-divisor candidates tried per index, counting both signs.
/// Divisor-rich D values get truncated rather than stall the walk.
const MAX_ALPHA_CANDIDATES: usize = 20_000;

/// Counters for one run. Reset on every process start.
#[derive(Debug, Default)]
pub struct RunStats {
    /// Steps completed this run.
    pub steps: u64,
    /// Candidate (n, alpha) pairs evaluated.
    pub candidates: u64,
    /// Solutions found this run.
    pub solutions: u64,
}

/// A search worker wired to its slice, files and generator.
pub struct Worker {
    config: Config,
    family: CubeFamily,
    store: CheckpointStore,
    solution_log: SolutionLog,
    sequence: StepSequence,
    rng: StdRng,
    stop: Arc<AtomicBool>,
    stats: RunStats,
}

impl Worker {
    /// Assemble a worker: seed the generator, resume the cursor, and
    /// probe the checkpoint file so an unwritable path fails at startup
    /// instead of after the first interval.
    pub fn new(
        config: Config,
        family: CubeFamily,
        stop: Arc<AtomicBool>,
    ) -> Result<Worker, PersistError> {
        let store = CheckpointStore::new(&config.checkpoint_file);
        let solution_log = SolutionLog::new(&config.solutions_file);
        let rng = StdRng::seed_from_u64(config.worker_seed());

        let cursor = store.load();
        store.save(cursor, config.slice.worker_id())?;
        let sequence = StepSequence::resume(config.slice, cursor);

        Ok(Worker {
            config,
            family,
            store,
            solution_log,
            sequence,
            rng,
            stop,
            stats: RunStats::default(),
        })
    }

    /// Counters for the current run.
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Next step of the walk (the value a flush would persist).
    pub fn cursor(&self) -> u64 {
        self.sequence.next_step()
    }

    /// Run until the stop flag flips.
    pub fn run(&mut self) {
        self.run_inner(None);
    }

    /// Run at most `max_steps` steps, or until the stop flag flips.
    pub fn run_steps(&mut self, max_steps: u64) {
        self.run_inner(Some(max_steps));
    }

    fn run_inner(&mut self, max_steps: Option<u64>) {
        let started = Instant::now();
        self.announce_start();

        let mut steps_this_run = 0u64;
        while !self.stop.load(Ordering::Relaxed) {
            if let Some(limit) = max_steps {
                if steps_this_run >= limit {
                    break;
                }
            }

            let (_, n) = match self.sequence.next() {
                Some(step) => step,
                None => break, // unreachable: the walk is infinite
            };

            if n.is_zero() {
                log::debug!("skipping n = 0");
            } else {
                self.examine_index(&n);
                self.examine_index(&(-&n));
            }

            steps_this_run += 1;
            self.stats.steps += 1;

            if self.sequence.next_step() % self.config.check_interval == 0 {
                self.flush(started);
            }
        }

        // A restart must resume exactly where this run stopped.
        self.flush(started);
    }

    /// Examine one signed index: trivial alphas, then enumerated divisors.
    fn examine_index(&mut self, n: &BigInt) {
        let d = self.family.d_value(n);
        if d.is_zero() {
            log::debug!("D({}) = 0, degenerate index skipped", n);
            return;
        }

        // +-1 and +-D need no factoring and survive even a rho failure.
        let trivial = [BigInt::one(), -BigInt::one(), d.clone(), -d.clone()];
        for alpha in &trivial {
            self.try_candidate(n, alpha);
        }

        // Everything else comes from the divisors of |D|, ascending.
        let d_mag: BigUint = d.magnitude().clone();
        let factors = factor::factor(&d_mag, &mut self.rng);
        let divs = factor::divisors(&factors);

        let mut tried = 0usize;
        for divisor in &divs {
            if tried >= MAX_ALPHA_CANDIDATES {
                log::debug!("alpha cap reached for n = {}", n);
                break;
            }
            if divisor.is_one() || divisor == &d_mag {
                continue; // already covered by the trivial four
            }
            let alpha = BigInt::from(divisor.clone());
            let neg = -&alpha;
            self.try_candidate(n, &alpha);
            self.try_candidate(n, &neg);
            tried += 2;
        }
    }

    fn try_candidate(&mut self, n: &BigInt, alpha: &BigInt) {
        self.stats.candidates += 1;
        if let Some(solution) = self.family.evaluate(n, alpha) {
            self.stats.solutions += 1;
            self.report(&solution);
        }
    }

    /// Persist and announce a hit. A write failure must not lose the
    /// triple, so the record also lands on stdout and the error log.
    fn report(&mut self, solution: &Solution) {
        let worker_id = self.config.slice.worker_id();

        println!();
        println!("{}", "!".repeat(64));
        println!("SOLUTION FOUND by worker {}: {}", worker_id, solution);
        println!("{}", "!".repeat(64));
        println!();
        log::info!("solution: {}", solution);

        if let Err(e) = self.solution_log.append(worker_id, solution) {
            log::error!(
                "could not append to {}: {}",
                self.solution_log.path().display(),
                e
            );
            println!("RECORD (log write failed, copy from console): {}", solution);
        }
    }

    fn flush(&mut self, started: Instant) {
        let cursor = self.sequence.next_step();
        let worker_id = self.config.slice.worker_id();
        if let Err(e) = self.store.save(cursor, worker_id) {
            // A lost flush costs only re-examined steps after a crash.
            log::warn!("checkpoint save failed: {}", e);
            return;
        }

        let elapsed = started.elapsed().as_secs_f64().max(0.001);
        println!(
            "[{}] worker {:>4}  step {:>10}  |n| <= {:>12}  {:>8.1} steps/s  {} solution(s)",
            iso_now(),
            worker_id,
            cursor,
            self.magnitude_reached(),
            self.stats.steps as f64 / elapsed,
            self.stats.solutions
        );
    }

    /// Largest |n| examined so far, derived from the cursor.
    fn magnitude_reached(&self) -> BigInt {
        let cursor = self.sequence.next_step();
        if cursor == 0 {
            return BigInt::zero();
        }
        BigInt::from(self.config.slice.worker_id())
            + BigInt::from(cursor - 1) * BigInt::from(self.config.slice.worker_count())
    }

    fn announce_start(&self) {
        let slice = self.config.slice;
        println!("=== cube-hunt worker ===");
        println!("  target          : x^3 + y^3 + z^3 = {}", self.family.target());
        println!("  worker          : {} of {}", slice.worker_id(), slice.worker_count());
        println!("  resume at step  : {}", self.sequence.next_step());
        println!("  checkpoint file : {}", self.store.path().display());
        println!("  solutions file  : {}", self.solution_log.path().display());
        println!("  check interval  : {}", self.config.check_interval);
    }
}
