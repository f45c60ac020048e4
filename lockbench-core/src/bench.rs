//! Throughput harness. Same drive loop as verification, no instrumentation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::bakery::BakeryLock;
use crate::delegation::DelegationLock;
use crate::error::LockError;
use crate::exclusion::Exclusion;
use crate::harness::{RunConfig, drive};
use crate::types::{BenchSample, LockKind, Workload};

/// Times one run of `config` against `lock`.
pub fn measure<L: Exclusion>(lock: &L, config: &RunConfig) -> Result<BenchSample, LockError> {
    config.validate_for(lock)?;

    let counter = Arc::new(AtomicU64::new(0));
    let workload = config.workload;

    let started = Instant::now();
    let outcomes = drive(lock, config, || {
        let counter = Arc::clone(&counter);
        move || {
            let current = counter.load(Ordering::Relaxed);
            counter.store(current + 1, Ordering::Relaxed);
            workload.run();
        }
    });
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

    // A partial run has no meaningful throughput.
    if let Some(err) = outcomes.into_iter().find_map(|p| p.error) {
        return Err(err);
    }

    Ok(BenchSample::new(
        lock.kind(),
        config.participants,
        config.iterations,
        workload,
        elapsed_ms,
    ))
}

/// Times one run against a freshly built lock of `kind`. Construction and
/// teardown are not part of the measurement.
pub fn measure_kind(kind: LockKind, config: &RunConfig) -> Result<BenchSample, LockError> {
    config.validate()?;

    match kind {
        LockKind::Bakery => {
            let lock = BakeryLock::new(config.participants)?;
            measure(&lock, config)
        }
        LockKind::Delegation => {
            let lock = DelegationLock::new(())?;
            let sample = measure(&lock, config);
            lock.shutdown();
            sample
        }
    }
}

/// Cartesian product of participant counts and workloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchGrid {
    pub participants: Vec<usize>,
    pub workloads: Vec<Workload>,
    pub iterations: u64,
}

impl Default for BenchGrid {
    fn default() -> Self {
        Self {
            participants: vec![1, 2, 4, 8],
            workloads: vec![
                Workload::Idle,
                Workload::Spin(10),
                Workload::Spin(100),
                Workload::Spin(1000),
            ],
            iterations: 10_000,
        }
    }
}

impl BenchGrid {
    /// Every grid point, workload-major.
    pub fn configs(&self) -> Vec<RunConfig> {
        self.workloads
            .iter()
            .flat_map(|&workload| {
                self.participants.iter().map(move |&participants| {
                    RunConfig::new(participants, self.iterations).with_workload(workload)
                })
            })
            .collect()
    }

    /// Measures every grid point against `kind`, stopping at the first error.
    pub fn run(&self, kind: LockKind) -> Result<Vec<BenchSample>, LockError> {
        self.configs()
            .iter()
            .map(|config| {
                let sample = measure_kind(kind, config)?;
                tracing::debug!(
                    lock = %kind,
                    participants = sample.participants,
                    workload = %sample.workload,
                    elapsed_ms = sample.elapsed_ms,
                    ops_per_sec = sample.ops_per_sec,
                    "benchmark sample"
                );
                Ok(sample)
            })
            .collect()
    }
}
