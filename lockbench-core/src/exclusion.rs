use crate::bakery::BakeryLock;
use crate::delegation::DelegationLock;
use crate::error::LockError;
use crate::types::LockKind;

/// The seam the harnesses drive a lock through.
///
/// `run_exclusive` must not return before `section` has finished, and no two
/// sections passed to the same lock may overlap.
pub trait Exclusion: Sync {
    fn kind(&self) -> LockKind;

    /// Highest participant count the lock was built for, if it is bounded.
    /// Ids from `0` up to this value (exclusive) are valid.
    fn capacity(&self) -> Option<usize> {
        None
    }

    /// Runs `section` on behalf of `participant` while holding the lock.
    fn run_exclusive<F>(&self, participant: usize, section: F) -> Result<(), LockError>
    where
        F: FnOnce() + Send + 'static;
}

impl Exclusion for BakeryLock {
    fn kind(&self) -> LockKind {
        LockKind::Bakery
    }

    fn capacity(&self) -> Option<usize> {
        Some(self.participants())
    }

    fn run_exclusive<F>(&self, participant: usize, section: F) -> Result<(), LockError>
    where
        F: FnOnce() + Send + 'static,
    {
        let _guard = self.lock(participant);
        section();
        Ok(())
    }
}

impl<T: Send + 'static> Exclusion for DelegationLock<T> {
    fn kind(&self) -> LockKind {
        LockKind::Delegation
    }

    // The participant id is irrelevant here: the executor is the only thread
    // that ever runs a section.
    fn run_exclusive<F>(&self, _participant: usize, section: F) -> Result<(), LockError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.run(move |_: &mut T| section())
    }
}
