#[cfg(test)]
mod tests {
    use crate::delegation::DelegationLock;
    use crate::error::LockError;
    use crate::exclusion::Exclusion;
    use crate::types::{LockKind, LockState};
    use std::thread;
    use std::time::Duration;

    // =========================================================================
    // Basic delegation
    // =========================================================================

    #[test]
    fn run_returns_closure_result_and_mutates_state() {
        let lock = DelegationLock::new(10_u64).unwrap();
        let seen = lock
            .run(|state| {
                *state += 5;
                *state
            })
            .unwrap();

        assert_eq!(seen, 15);
        assert_eq!(lock.into_inner().unwrap(), 15);
    }

    #[test]
    fn closures_run_on_the_executor_thread() {
        let lock = DelegationLock::new(()).unwrap();
        let name = lock
            .run(|_| thread::current().name().map(str::to_string))
            .unwrap();
        assert_eq!(name.as_deref(), Some("delegation-executor"));
    }

    #[test]
    fn submissions_from_one_thread_run_in_order() {
        let lock = DelegationLock::new(Vec::new()).unwrap();

        let completions: Vec<_> = (0..100)
            .map(|i| lock.submit(move |order: &mut Vec<u32>| order.push(i)).unwrap())
            .collect();
        for completion in completions {
            completion.wait().unwrap();
        }

        assert_eq!(lock.into_inner().unwrap(), (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn contended_submitters_lose_no_updates() {
        const SUBMITTERS: u64 = 8;
        const ITERATIONS: u64 = 1_000;

        let lock = DelegationLock::new(0_u64).unwrap();
        thread::scope(|s| {
            for _ in 0..SUBMITTERS {
                s.spawn(|| {
                    for _ in 0..ITERATIONS {
                        lock.run(|counter| *counter += 1).unwrap();
                    }
                });
            }
        });

        assert_eq!(lock.into_inner().unwrap(), SUBMITTERS * ITERATIONS);
    }

    #[test]
    fn exclusion_seam_reports_delegation() {
        let lock = DelegationLock::new(()).unwrap();
        assert_eq!(lock.kind(), LockKind::Delegation);
        lock.run_exclusive(3, || {}).unwrap();
    }

    // =========================================================================
    // Task failures
    // =========================================================================

    #[test]
    fn panicking_closure_resolves_with_error() {
        let lock = DelegationLock::new(0_u32).unwrap();

        let err = lock.run(|_| -> u32 { panic!("boom") }).unwrap_err();
        match err {
            LockError::TaskPanicked(msg) => assert!(msg.contains("boom")),
            other => panic!("expected TaskPanicked, got {:?}", other),
        }

        // Executor survives and keeps serving
        assert_eq!(lock.state(), LockState::Running);
        assert_eq!(lock.run(|n| { *n += 1; *n }).unwrap(), 1);
    }

    #[test]
    fn dropped_completion_does_not_stall_the_executor() {
        let lock = DelegationLock::new(0_u32).unwrap();
        drop(lock.submit(|n| *n += 1).unwrap());
        assert_eq!(lock.run(|n| *n).unwrap(), 1);
    }

    // =========================================================================
    // Queue observation
    // =========================================================================

    #[test]
    fn pending_and_try_wait_observe_a_gated_executor() {
        let lock = DelegationLock::new(()).unwrap();
        let (started_tx, started_rx) = flume::bounded(1);
        let (gate_tx, gate_rx) = flume::bounded::<()>(1);

        let gate = lock
            .submit(move |_| {
                started_tx.send(()).unwrap();
                gate_rx.recv().unwrap();
            })
            .unwrap();
        started_rx.recv().unwrap();

        let queued: Vec<_> = (0..3).map(|i| lock.submit(move |_| i).unwrap()).collect();
        assert_eq!(lock.pending(), 3);
        assert!(queued[0].try_wait().is_none());

        gate_tx.send(()).unwrap();
        gate.wait().unwrap();
        let results: Vec<i32> = queued.into_iter().map(|c| c.wait().unwrap()).collect();
        assert_eq!(results, vec![0, 1, 2]);
        assert_eq!(lock.pending(), 0);
    }

    // =========================================================================
    // Shutdown
    // =========================================================================

    #[test]
    fn submit_after_shutdown_is_refused() {
        let lock = DelegationLock::new(()).unwrap();
        lock.shutdown();

        assert_eq!(lock.state(), LockState::Stopped);
        assert!(matches!(lock.submit(|_| ()), Err(LockError::ShutDown)));
    }

    #[test]
    fn shutdown_is_idempotent() {
        let lock = DelegationLock::new(()).unwrap();
        lock.shutdown();
        lock.shutdown();
        assert_eq!(lock.state(), LockState::Stopped);
        drop(lock);
    }

    #[test]
    fn into_inner_after_shutdown_reports_shut_down() {
        let lock = DelegationLock::new(7_u8).unwrap();
        lock.shutdown();
        assert!(matches!(lock.into_inner(), Err(LockError::ShutDown)));
    }

    #[test]
    fn concurrent_shutdowns_all_return_after_stop() {
        let lock = DelegationLock::new(()).unwrap();
        let _slow = lock.submit(|_| thread::sleep(Duration::from_millis(20))).unwrap();

        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    lock.shutdown();
                    assert_eq!(lock.state(), LockState::Stopped);
                });
            }
        });
    }

    #[test]
    fn drop_drains_queued_items() {
        let lock = DelegationLock::new(0_u32).unwrap();
        let _slow = lock.submit(|_| thread::sleep(Duration::from_millis(20))).unwrap();

        let completions: Vec<_> = (0..100)
            .map(|_| {
                lock.submit(|n| {
                    *n += 1;
                    *n
                })
                .unwrap()
            })
            .collect();
        drop(lock);

        let results: Vec<u32> = completions.into_iter().map(|c| c.wait().unwrap()).collect();
        assert_eq!(results, (1..=100).collect::<Vec<_>>());
    }
}
