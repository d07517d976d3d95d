// Proof of Work search

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::consensus::Target;
use crate::core::{BlockHeader, Hash256, HeaderHasher};
use crate::error::{GenesisError, Result};

/// Attempts between progress reports unless configured otherwise
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1_000_000;

/// Attempts between wall-clock budget checks, independent of progress reporting
pub const BUDGET_CHECK_INTERVAL: u64 = 1 << 16;

/// Progress callback: (attempts so far, nonce just tried)
pub type ProgressFn = Arc<dyn Fn(u64, u32) + Send + Sync>;

/// Something that can find a nonce for a header template.
///
/// Implementations search `start_nonce..=u32::MAX` in whatever order they
/// like and return a header identical to the template except for its nonce.
/// Callers still re-check the result with [`verify_solution`].
pub trait ProofOfWorkSearch {
    /// Short name for logs
    fn name(&self) -> &'static str;

    fn search(&self, template: &BlockHeader, target: &Target, start_nonce: u32) -> Result<MiningResult>;
}

/// Mining result
#[derive(Debug, Clone)]
pub struct MiningResult {
    /// The nonce that was found
    pub nonce: u32,
    /// Template with the winning nonce filled in
    pub header: BlockHeader,
    /// The resulting hash
    pub hash: Hash256,
    /// Number of attempts
    pub attempts: u64,
    /// Time taken
    pub duration: Duration,
}

impl MiningResult {
    /// Calculate hash rate (hashes per second)
    pub fn hash_rate(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 { self.attempts as f64 / secs } else { 0.0 }
    }
}

/// Check that `solved` is `template` with only the nonce changed and that its hash meets `target`
pub fn verify_solution(template: &BlockHeader, solved: &BlockHeader, target: &Target) -> Result<Hash256> {
    if solved.with_nonce(template.nonce) != *template {
        return Err(GenesisError::AcceleratorContractViolation(
            "solved header differs from the template in more than the nonce".to_string(),
        ));
    }

    let hash = solved.hash();
    if !target.is_met_by(&hash) {
        return Err(GenesisError::AcceleratorContractViolation(format!(
            "nonce {} gives hash {} above target {}",
            solved.nonce,
            hash,
            target.to_hex()
        )));
    }

    Ok(hash)
}

/// Budget is checked on its own cadence and at every progress report
fn budget_check_due(attempts: u64, progress_interval: u64) -> bool {
    attempts % BUDGET_CHECK_INTERVAL == 0 || (progress_interval > 0 && attempts % progress_interval == 0)
}

fn budget_spent(budget: Option<Duration>, started: Instant) -> bool {
    budget.is_some_and(|budget| started.elapsed() >= budget)
}

fn log_progress(attempts: u64, nonce: u32, started: Instant) {
    let elapsed = started.elapsed().as_secs_f64();
    let rate = if elapsed > 0.0 { attempts as f64 / elapsed / 1000.0 } else { 0.0 };
    log::debug!("Mining attempts: {} at nonce {} ({:.1} KH/s)", attempts, nonce, rate);
}

/// Single-threaded reference miner.
///
/// Tries nonces in increasing order, so the result is always the smallest
/// qualifying nonce at or above the start.
#[derive(Clone)]
pub struct Miner {
    progress_interval: u64,
    progress: Option<ProgressFn>,
    time_budget: Option<Duration>,
}

impl Default for Miner {
    fn default() -> Self {
        Self::new()
    }
}

impl Miner {
    pub fn new() -> Self {
        Self {
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            progress: None,
            time_budget: None,
        }
    }

    /// Report progress every `interval` attempts (0 disables reporting)
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Give up after `budget`, reported as nonce-space exhaustion
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Mine a block by finding a valid nonce
    pub fn mine(&self, template: &BlockHeader, target: &Target, start_nonce: u32) -> Result<MiningResult> {
        let started = Instant::now();
        let mut hasher = HeaderHasher::new(&template.serialize_to_array());
        let mut attempts = 0u64;

        for nonce in start_nonce..=u32::MAX {
            let hash = hasher.hash_with_nonce(nonce);
            attempts += 1;

            if target.is_met_by(&hash) {
                log::info!("Found nonce {} after {} attempts", nonce, attempts);
                return Ok(MiningResult {
                    nonce,
                    header: template.with_nonce(nonce),
                    hash,
                    attempts,
                    duration: started.elapsed(),
                });
            }

            if self.progress_interval > 0 && attempts % self.progress_interval == 0 {
                log_progress(attempts, nonce, started);
                if let Some(progress) = &self.progress {
                    progress(attempts, nonce);
                }
            }

            if budget_check_due(attempts, self.progress_interval) && budget_spent(self.time_budget, started) {
                log::warn!("Time budget exhausted after {} attempts", attempts);
                break;
            }
        }

        Err(GenesisError::NonceSpaceExhausted { start_nonce, attempts })
    }
}

impl ProofOfWorkSearch for Miner {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn search(&self, template: &BlockHeader, target: &Target, start_nonce: u32) -> Result<MiningResult> {
        self.mine(template, target, start_nonce)
    }
}

/// Multi-threaded miner.
///
/// Worker `i` of `n` tries `start + i`, `start + i + n`, ... Every worker
/// shares the smallest winning nonce seen so far and stops once its next
/// candidate is above it, so the answer matches [`Miner`] exactly.
#[derive(Clone)]
pub struct ParallelMiner {
    threads: usize,
    progress_interval: u64,
    progress: Option<ProgressFn>,
    time_budget: Option<Duration>,
}

/// No solution yet; any real nonce compares below it
const NO_SOLUTION: u64 = u64::MAX;

impl ParallelMiner {
    /// `threads == 0` uses every available core
    pub fn new(threads: usize) -> Self {
        let threads = if threads == 0 { num_cpus::get() } else { threads };
        Self {
            threads,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            progress: None,
            time_budget: None,
        }
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    pub fn mine(&self, template: &BlockHeader, target: &Target, start_nonce: u32) -> Result<MiningResult> {
        let started = Instant::now();
        let header_bytes = template.serialize_to_array();
        let best = AtomicU64::new(NO_SOLUTION);
        let attempts = AtomicU64::new(0);
        let timed_out = AtomicBool::new(false);
        let stride = self.threads as u64;

        log::info!("Starting {} mining threads from nonce {}", self.threads, start_nonce);

        thread::scope(|scope| {
            for worker in 0..stride {
                let (best, attempts, timed_out) = (&best, &attempts, &timed_out);
                let mut hasher = HeaderHasher::new(&header_bytes);

                scope.spawn(move || {
                    let mut nonce = start_nonce as u64 + worker;
                    let mut local = 0u64;

                    while nonce <= u32::MAX as u64 && nonce < best.load(Ordering::Relaxed) {
                        if timed_out.load(Ordering::Relaxed) {
                            break;
                        }

                        let hash = hasher.hash_with_nonce(nonce as u32);
                        local += 1;

                        if target.is_met_by(&hash) {
                            log::debug!("Worker {} found nonce {}", worker, nonce);
                            best.fetch_min(nonce, Ordering::Relaxed);
                            break;
                        }

                        if self.progress_interval > 0 && local % self.progress_interval == 0 {
                            let total = attempts.fetch_add(self.progress_interval, Ordering::Relaxed)
                                + self.progress_interval;
                            if worker == 0 {
                                log_progress(total, nonce as u32, started);
                                if let Some(progress) = &self.progress {
                                    progress(total, nonce as u32);
                                }
                            }
                        }

                        if budget_check_due(local, self.progress_interval) && budget_spent(self.time_budget, started) {
                            timed_out.store(true, Ordering::Relaxed);
                            break;
                        }

                        nonce += stride;
                    }

                    // Whole intervals were already added above
                    let reported = match self.progress_interval {
                        0 => 0,
                        interval => local / interval * interval,
                    };
                    attempts.fetch_add(local - reported, Ordering::Relaxed);
                });
            }
        });

        let attempts = attempts.load(Ordering::Relaxed);
        match best.load(Ordering::Relaxed) {
            NO_SOLUTION => {
                if timed_out.load(Ordering::Relaxed) {
                    log::warn!("Time budget exhausted after {} attempts", attempts);
                }
                Err(GenesisError::NonceSpaceExhausted { start_nonce, attempts })
            }
            nonce => {
                let header = template.with_nonce(nonce as u32);
                let hash = header.hash();
                log::info!("Found nonce {} after {} attempts", nonce, attempts);
                Ok(MiningResult {
                    nonce: nonce as u32,
                    header,
                    hash,
                    attempts,
                    duration: started.elapsed(),
                })
            }
        }
    }
}

impl ProofOfWorkSearch for ParallelMiner {
    fn name(&self) -> &'static str {
        "cpu-parallel"
    }

    fn search(&self, template: &BlockHeader, target: &Target, start_nonce: u32) -> Result<MiningResult> {
        self.mine(template, target, start_nonce)
    }
}
