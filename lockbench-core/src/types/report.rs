use serde::{Deserialize, Serialize};

use super::{LockKind, Workload};

/// Delegation lock lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockState {
    /// Executor is alive and accepting submissions
    Running,
    /// Shutdown requested; queued items still run, new ones are refused
    Draining,
    /// Executor has exited
    Stopped,
}

/// A defect class found by a verification run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Failure {
    /// Two or more participants were inside the critical section at once
    ExclusionViolated { peak_occupancy: usize },
    /// The shared counter does not equal the number of completed sections
    LostUpdates { expected: u64, observed: u64 },
    /// A participant finished without completing all of its iterations
    Starved { participant: usize, completed: u64 },
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Failure::ExclusionViolated { peak_occupancy } => write!(
                f,
                "mutual exclusion violated ({} participants inside at once)",
                peak_occupancy
            ),
            Failure::LostUpdates { expected, observed } => write!(
                f,
                "lost updates (expected {}, observed {})",
                expected, observed
            ),
            Failure::Starved { participant, completed } => write!(
                f,
                "participant {} completed only {} iterations",
                participant, completed
            ),
        }
    }
}

/// Everything a verification run observed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub lock: LockKind,
    pub participants: usize,
    pub iterations: u64,
    pub workload: Workload,
    /// participants × iterations
    pub expected: u64,
    /// Final value of the shared counter
    pub observed: u64,
    /// Sticky flag, set if occupancy ever exceeded one
    pub violation: bool,
    pub peak_occupancy: usize,
    /// Completed iterations, indexed by participant id
    pub completed: Vec<u64>,
    /// First lock error that stopped a participant early, by participant id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interrupted: Option<String>,
    pub elapsed_ms: f64,
}

impl VerificationReport {
    /// Sections that returned to their participant. Equals `expected` unless
    /// some participant stopped early.
    pub fn sections_completed(&self) -> u64 {
        self.completed.iter().sum()
    }

    /// Lists every defect class the run exhibits, exclusion first.
    ///
    /// The counter is checked against the sections that actually completed,
    /// so an interrupted run shows up as starvation rather than lost updates.
    pub fn failures(&self) -> Vec<Failure> {
        let mut failures = Vec::new();

        if self.violation {
            failures.push(Failure::ExclusionViolated {
                peak_occupancy: self.peak_occupancy,
            });
        }
        let sections = self.sections_completed();
        if self.observed != sections {
            failures.push(Failure::LostUpdates {
                expected: sections,
                observed: self.observed,
            });
        }
        for (participant, &completed) in self.completed.iter().enumerate() {
            if completed != self.iterations {
                failures.push(Failure::Starved {
                    participant,
                    completed,
                });
            }
        }

        failures
    }

    pub fn passed(&self) -> bool {
        self.failures().is_empty()
    }
}

/// One point of a throughput grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchSample {
    pub lock: LockKind,
    pub participants: usize,
    pub iterations: u64,
    pub workload: Workload,
    pub elapsed_ms: f64,
    pub ops_per_sec: f64,
}

impl BenchSample {
    pub fn new(
        lock: LockKind,
        participants: usize,
        iterations: u64,
        workload: Workload,
        elapsed_ms: f64,
    ) -> Self {
        let total_ops = participants as f64 * iterations as f64;
        let ops_per_sec = if elapsed_ms > 0.0 {
            total_ops * 1000.0 / elapsed_ms
        } else {
            f64::INFINITY
        };

        Self {
            lock,
            participants,
            iterations,
            workload,
            elapsed_ms,
            ops_per_sec,
        }
    }
}
