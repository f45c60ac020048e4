//! Verification harness: drives participants through a lock and checks that
//! the critical section was never shared and no update was lost.

use serde::{Deserialize, Serialize};
use std::panic;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

use crate::bakery::BakeryLock;
use crate::delegation::DelegationLock;
use crate::error::LockError;
use crate::exclusion::Exclusion;
use crate::types::{LockKind, MAX_PARTICIPANTS, VerificationReport, Workload};

/// Shape of one run: how many participants, how many sections each, and
/// what each section costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub participants: usize,
    pub iterations: u64,
    #[serde(default)]
    pub workload: Workload,
}

impl RunConfig {
    pub fn new(participants: usize, iterations: u64) -> Self {
        Self {
            participants,
            iterations,
            workload: Workload::Idle,
        }
    }

    pub fn with_workload(mut self, workload: Workload) -> Self {
        self.workload = workload;
        self
    }

    pub fn validate(&self) -> Result<(), LockError> {
        if self.participants == 0 {
            return Err(LockError::NoParticipants);
        }
        if self.participants > MAX_PARTICIPANTS {
            return Err(LockError::TooManyParticipants {
                requested: self.participants,
                max: MAX_PARTICIPANTS,
            });
        }
        if (self.participants as u64).checked_mul(self.iterations).is_none() {
            return Err(LockError::RunTooLarge {
                participants: self.participants,
                iterations: self.iterations,
            });
        }
        Ok(())
    }

    /// [`validate`](Self::validate), plus the participant bound of `lock`
    /// itself when it has one.
    pub fn validate_for<L: Exclusion>(&self, lock: &L) -> Result<(), LockError> {
        self.validate()?;
        match lock.capacity() {
            Some(max) if self.participants > max => Err(LockError::TooManyParticipants {
                requested: self.participants,
                max,
            }),
            _ => Ok(()),
        }
    }

    /// participants × iterations, saturating at `u64::MAX`
    pub fn total_ops(&self) -> u64 {
        (self.participants as u64).saturating_mul(self.iterations)
    }
}

/// Instrumentation shared by the sections of one run.
///
/// Written only from inside critical sections and read only after every
/// participant has been joined.
#[derive(Debug, Default)]
pub struct SectionMonitor {
    occupancy: AtomicUsize,
    peak: AtomicUsize,
    violation: AtomicBool,
    counter: AtomicU64,
}

/// Values of a [`SectionMonitor`] after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorReading {
    pub violation: bool,
    pub peak_occupancy: usize,
    pub counter: u64,
}

impl SectionMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&self) {
        self.occupancy.store(0, Ordering::SeqCst);
        self.peak.store(0, Ordering::SeqCst);
        self.violation.store(false, Ordering::SeqCst);
        self.counter.store(0, Ordering::SeqCst);
    }

    /// Records entry into the critical section. Any occupancy above one
    /// raises the violation flag, which is never cleared within a run.
    #[inline]
    pub fn enter(&self) {
        let inside = self.occupancy.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(inside, Ordering::SeqCst);
        if inside > 1 {
            self.violation.store(true, Ordering::SeqCst);
        }
    }

    /// Increments the shared counter as a separate load and store, so two
    /// overlapping sections lose an increment instead of hiding the overlap.
    #[inline]
    pub fn bump(&self) {
        let current = self.counter.load(Ordering::Relaxed);
        self.counter.store(current + 1, Ordering::Relaxed);
    }

    #[inline]
    pub fn exit(&self) {
        self.occupancy.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn read(&self) -> MonitorReading {
        MonitorReading {
            violation: self.violation.load(Ordering::SeqCst),
            peak_occupancy: self.peak.load(Ordering::SeqCst),
            counter: self.counter.load(Ordering::SeqCst),
        }
    }
}

/// How far one participant got through its sections.
#[derive(Debug)]
pub(crate) struct Participation {
    pub completed: u64,
    /// Why the participant stopped early, if it did
    pub error: Option<LockError>,
}

/// Spawns `config.participants` scoped threads with ids `0..participants`,
/// each running `config.iterations` sections built by `make_section`.
///
/// A participant stops at its first lock error; the others carry on. The
/// result is indexed by participant id.
pub(crate) fn drive<L, S, F>(lock: &L, config: &RunConfig, make_section: S) -> Vec<Participation>
where
    L: Exclusion,
    S: Fn() -> F + Sync,
    F: FnOnce() + Send + 'static,
{
    let make_section = &make_section;

    thread::scope(|scope| {
        let handles: Vec<_> = (0..config.participants)
            .map(|id| {
                scope.spawn(move || {
                    let mut completed = 0;
                    for _ in 0..config.iterations {
                        if let Err(err) = lock.run_exclusive(id, make_section()) {
                            tracing::debug!(participant = id, completed, error = %err, "participant stopped early");
                            return Participation {
                                completed,
                                error: Some(err),
                            };
                        }
                        completed += 1;
                    }
                    Participation {
                        completed,
                        error: None,
                    }
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|payload| panic::resume_unwind(payload))
            })
            .collect()
    })
}

/// Runs `config` against `lock` with occupancy instrumentation.
///
/// Only an invalid `config` is an error. A lock that fails part way through
/// still yields a report: the partial counts show up as starved participants
/// and the first error is kept in [`VerificationReport::interrupted`].
pub fn verify<L: Exclusion>(lock: &L, config: &RunConfig) -> Result<VerificationReport, LockError> {
    config.validate_for(lock)?;

    let monitor = Arc::new(SectionMonitor::new());
    monitor.reset();
    let workload = config.workload;

    let started = Instant::now();
    let outcomes = drive(lock, config, || {
        let monitor = Arc::clone(&monitor);
        move || {
            monitor.enter();
            monitor.bump();
            workload.run();
            monitor.exit();
        }
    });
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

    let completed = outcomes.iter().map(|p| p.completed).collect();
    let interrupted = outcomes
        .into_iter()
        .find_map(|p| p.error)
        .map(|err| err.to_string());

    let reading = monitor.read();
    let report = VerificationReport {
        lock: lock.kind(),
        participants: config.participants,
        iterations: config.iterations,
        workload,
        expected: config.total_ops(),
        observed: reading.counter,
        violation: reading.violation,
        peak_occupancy: reading.peak_occupancy,
        completed,
        interrupted,
        elapsed_ms,
    };

    if report.passed() {
        tracing::debug!(
            lock = %report.lock,
            participants = report.participants,
            workload = %workload,
            elapsed_ms,
            "verification passed"
        );
    } else {
        tracing::warn!(
            lock = %report.lock,
            participants = report.participants,
            workload = %workload,
            interrupted = report.interrupted.as_deref(),
            failures = ?report.failures(),
            "verification failed"
        );
    }

    Ok(report)
}

/// Builds a fresh lock of `kind` sized for `config`, verifies it and tears it
/// down again.
pub fn verify_kind(kind: LockKind, config: &RunConfig) -> Result<VerificationReport, LockError> {
    config.validate()?;

    match kind {
        LockKind::Bakery => {
            let lock = BakeryLock::new(config.participants)?;
            verify(&lock, config)
        }
        LockKind::Delegation => {
            let lock = DelegationLock::new(())?;
            let report = verify(&lock, config);
            lock.shutdown();
            report
        }
    }
}
