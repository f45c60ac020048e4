//! Delegation (combining) lock.
//!
//! Critical sections are shipped as closures to one executor thread, which
//! owns the protected state and runs them one at a time in submission order.
//! Submitters block on a capacity-one channel until their closure has run.

use parking_lot::Mutex;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::error::LockError;
use crate::queue::WorkQueue;
use crate::types::LockState;

type Job<T> = Box<dyn FnOnce(&mut T) + Send>;

pub struct DelegationLock<T: Send + 'static> {
    queue: Arc<WorkQueue<Job<T>>>,
    executor: Mutex<Option<JoinHandle<T>>>,
}

impl<T: Send + 'static> DelegationLock<T> {
    /// Spawns the executor, handing it ownership of `state`.
    pub fn new(state: T) -> Result<Self, LockError> {
        let queue = Arc::new(WorkQueue::new());
        let executor_queue = Arc::clone(&queue);

        let handle = thread::Builder::new()
            .name("delegation-executor".to_string())
            .spawn(move || drain(&executor_queue, state))?;

        tracing::debug!("delegation executor started");

        Ok(Self {
            queue,
            executor: Mutex::new(Some(handle)),
        })
    }

    /// Queues `work` behind everything already submitted.
    ///
    /// If `work` panics, the panic is caught on the executor and handed to the
    /// completion as [`LockError::TaskPanicked`]; the executor keeps serving.
    pub fn submit<F, R>(&self, work: F) -> Result<Completion<R>, LockError>
    where
        F: FnOnce(&mut T) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = flume::bounded(1);

        let job: Job<T> = Box::new(move |state: &mut T| {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| work(state)))
                .map_err(|payload| LockError::TaskPanicked(panic_message(&*payload)));

            if let Err(err) = &outcome {
                tracing::warn!(error = %err, "delegated task failed");
            }

            // The submitter may have dropped its completion already.
            let _ = tx.send(outcome);
        });

        self.queue.push(job)?;
        Ok(Completion { rx })
    }

    /// Submits `work` and waits for its result.
    pub fn run<F, R>(&self, work: F) -> Result<R, LockError>
    where
        F: FnOnce(&mut T) -> R + Send + 'static,
        R: Send + 'static,
    {
        self.submit(work)?.wait()
    }

    pub fn state(&self) -> LockState {
        self.queue.phase()
    }

    /// Number of submitted items the executor has not picked up yet.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Refuses new submissions, lets queued items finish and joins the
    /// executor. Safe to call repeatedly and from several threads; every call
    /// returns only after the executor has exited.
    ///
    /// Must not be called from inside a delegated closure.
    pub fn shutdown(&self) {
        if let Some(Err(err)) = self.stop() {
            tracing::error!(error = %err, "delegation executor did not stop cleanly");
        }
    }

    /// Shuts down and returns the protected state.
    pub fn into_inner(self) -> Result<T, LockError> {
        self.stop().unwrap_or(Err(LockError::ShutDown))
    }

    fn stop(&self) -> Option<Result<T, LockError>> {
        let mut executor = self.executor.lock();
        let handle = executor.take()?;

        if self.queue.close() {
            tracing::debug!(pending = self.queue.len(), "delegation lock draining");
        }

        let joined = handle.join().map_err(|_| LockError::ExecutorLost);
        self.queue.mark_stopped();
        Some(joined)
    }
}

impl<T: Send + 'static> Drop for DelegationLock<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<T: Send + 'static> std::fmt::Debug for DelegationLock<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelegationLock")
            .field("state", &self.state())
            .field("pending", &self.pending())
            .finish()
    }
}

fn drain<T>(queue: &WorkQueue<Job<T>>, mut state: T) -> T {
    let mut executed: u64 = 0;
    while let Some(job) = queue.pop() {
        job(&mut state);
        executed += 1;
    }
    queue.mark_stopped();

    tracing::debug!(executed, "delegation executor stopped");
    state
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Resolves once the executor has run the corresponding closure.
#[must_use = "dropping a completion discards the closure's result"]
pub struct Completion<R> {
    rx: flume::Receiver<Result<R, LockError>>,
}

impl<R> Completion<R> {
    /// Blocks until the closure has run and returns its result.
    pub fn wait(self) -> Result<R, LockError> {
        self.rx.recv().unwrap_or(Err(LockError::Abandoned))
    }

    /// Returns the outcome if it is already available. The outcome is handed
    /// out once; later calls report [`LockError::Abandoned`].
    pub fn try_wait(&self) -> Option<Result<R, LockError>> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(flume::TryRecvError::Empty) => None,
            Err(flume::TryRecvError::Disconnected) => Some(Err(LockError::Abandoned)),
        }
    }
}
