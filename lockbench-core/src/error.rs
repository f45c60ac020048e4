use thiserror::Error;

/// Errors surfaced by lock construction, delegation and the harnesses.
///
/// Exclusion violations and lost updates are not errors: a run that observes
/// them still completes and reports them as [`crate::types::Failure`] values.
#[derive(Debug, Error)]
pub enum LockError {
    /// A lock was requested for zero participants
    #[error("a lock needs at least one participant")]
    NoParticipants,

    /// More participants than the ticket arena can hold
    #[error("{requested} participants requested, at most {max} are supported")]
    TooManyParticipants { requested: usize, max: usize },

    /// participants × iterations does not fit the shared counter
    #[error("{participants} participants × {iterations} iterations overflows the operation count")]
    RunTooLarge { participants: usize, iterations: u64 },

    /// Submission to a delegation lock after shutdown was requested
    #[error("delegation lock is shut down")]
    ShutDown,

    /// A delegated closure panicked on the executor
    #[error("delegated task panicked: {0}")]
    TaskPanicked(String),

    /// The completion's work item was dropped before it ran
    #[error("work item was dropped before it ran")]
    Abandoned,

    /// The executor thread terminated abnormally
    #[error("executor thread terminated abnormally")]
    ExecutorLost,

    /// The executor thread could not be spawned
    #[error("failed to spawn executor thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Errors from parsing lock kinds and workloads out of text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown lock '{0}', expected one of: bakery, delegation")]
    UnknownLock(String),

    #[error("invalid workload '{0}', expected idle, <n>, spin:<n> or sleep:<micros>")]
    InvalidWorkload(String),
}
