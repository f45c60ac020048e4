use serde::{Deserialize, Serialize};
use std::hint::black_box;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ParseError;

/// Upper bound on participants a lock can be built for.
/// Sizes the bakery ticket arena.
pub const MAX_PARTICIPANTS: usize = 64;

/// The mutual-exclusion strategies this crate provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockKind {
    /// Ticket-ordered busy-wait lock
    Bakery,
    /// Single-executor combining lock
    Delegation,
}

impl LockKind {
    pub const ALL: [LockKind; 2] = [LockKind::Bakery, LockKind::Delegation];
}

impl std::fmt::Display for LockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockKind::Bakery => write!(f, "bakery"),
            LockKind::Delegation => write!(f, "delegation"),
        }
    }
}

impl FromStr for LockKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bakery" | "lamport" => Ok(LockKind::Bakery),
            "delegation" | "combining" => Ok(LockKind::Delegation),
            _ => Err(ParseError::UnknownLock(s.to_string())),
        }
    }
}

/// Simulated cost of one critical section
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Workload {
    /// Nothing beyond the counter update
    #[default]
    Idle,
    /// Busy loop of this many iterations
    Spin(u32),
    /// Sleep for this many microseconds while holding the lock
    Sleep { micros: u64 },
}

impl Workload {
    /// Performs the simulated work on the calling thread.
    #[inline]
    pub fn run(self) {
        match self {
            Workload::Idle => {}
            Workload::Spin(rounds) => {
                let mut acc = 0u64;
                for j in 0..rounds {
                    acc = black_box(acc.wrapping_add(u64::from(j)));
                }
                black_box(acc);
            }
            Workload::Sleep { micros } => std::thread::sleep(Duration::from_micros(micros)),
        }
    }
}

impl std::fmt::Display for Workload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Workload::Idle => write!(f, "idle"),
            Workload::Spin(rounds) => write!(f, "spin:{}", rounds),
            Workload::Sleep { micros } => write!(f, "sleep:{}us", micros),
        }
    }
}

impl FromStr for Workload {
    type Err = ParseError;

    /// Accepts `idle`, a bare spin count (`100`), `spin:<n>` or `sleep:<micros>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_lowercase();
        let invalid = || ParseError::InvalidWorkload(s.to_string());

        if text == "idle" || text == "0" {
            return Ok(Workload::Idle);
        }
        if let Some(rounds) = text.strip_prefix("spin:") {
            return rounds.parse().map(Workload::Spin).map_err(|_| invalid());
        }
        if let Some(micros) = text.strip_prefix("sleep:") {
            let micros = micros.strip_suffix("us").unwrap_or(micros);
            return micros
                .parse()
                .map(|micros| Workload::Sleep { micros })
                .map_err(|_| invalid());
        }
        text.parse().map(Workload::Spin).map_err(|_| invalid())
    }
}
