//! # lockbench-core
//!
//! Two mutual-exclusion strategies for N participants and the harnesses
//! that check and time them:
//! Lamport's bakery lock (ticket-ordered busy wait), a delegation lock
//! (closures serialized through one executor thread), an occupancy-probing
//! verifier and a throughput grid.

pub mod bakery;
pub mod bench;
pub mod delegation;
pub mod error;
pub mod exclusion;
pub mod harness;
pub mod queue;
pub mod ticket;
pub mod types;

pub use bakery::{BakeryGuard, BakeryLock};
pub use delegation::{Completion, DelegationLock};
pub use error::{LockError, ParseError};
pub use exclusion::Exclusion;
pub use harness::{RunConfig, verify, verify_kind};

#[cfg(test)]
mod bakery_test;
#[cfg(test)]
mod bench_test;
#[cfg(test)]
mod delegation_test;
