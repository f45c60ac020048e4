#[cfg(test)]
mod tests {
    use crate::bakery::BakeryLock;
    use crate::error::LockError;
    use crate::ticket::TicketArena;
    use crate::types::MAX_PARTICIPANTS;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::thread;
    use std::time::Duration;

    // =========================================================================
    // Construction
    // =========================================================================

    #[test]
    fn rejects_zero_participants() {
        assert!(matches!(BakeryLock::new(0), Err(LockError::NoParticipants)));
    }

    #[test]
    fn accepts_maximum_participants() {
        let lock = BakeryLock::new(MAX_PARTICIPANTS).unwrap();
        assert_eq!(lock.participants(), MAX_PARTICIPANTS);
    }

    #[test]
    fn rejects_one_past_maximum() {
        let err = BakeryLock::new(MAX_PARTICIPANTS + 1).unwrap_err();
        assert!(matches!(
            err,
            LockError::TooManyParticipants { requested, max }
                if requested == MAX_PARTICIPANTS + 1 && max == MAX_PARTICIPANTS
        ));
    }

    // =========================================================================
    // Ticket bookkeeping
    // =========================================================================

    #[test]
    fn ticket_is_set_while_held_and_cleared_on_release() {
        let lock = BakeryLock::new(2).unwrap();
        assert_eq!(lock.ticket(0), 0);

        lock.acquire(0);
        assert_eq!(lock.ticket(0), 1);
        assert!(!lock.is_choosing(0));

        lock.release(0);
        assert_eq!(lock.ticket(0), 0);
    }

    #[test]
    fn uncontended_reacquire_reuses_low_tickets() {
        let lock = BakeryLock::new(1).unwrap();
        for _ in 0..1000 {
            lock.acquire(0);
            // Nobody else holds a ticket, so the maximum seen is always 0
            assert_eq!(lock.ticket(0), 1);
            lock.release(0);
        }
    }

    #[test]
    fn guard_releases_on_drop() {
        let lock = BakeryLock::new(2).unwrap();
        {
            let guard = lock.lock(1);
            assert_eq!(guard.participant(), 1);
            assert_ne!(lock.ticket(1), 0);
        }
        assert_eq!(lock.ticket(1), 0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_participant_panics() {
        let lock = BakeryLock::new(2).unwrap();
        lock.acquire(2);
    }

    #[test]
    fn arena_max_ticket_scans_every_slot() {
        let arena = TicketArena::new(4);
        assert_eq!(arena.max_ticket(), 0);
        arena.slot(2).set_ticket(7);
        arena.slot(3).set_ticket(3);
        assert_eq!(arena.max_ticket(), 7);
        assert_eq!(arena.len(), 4);
    }

    // =========================================================================
    // Blocking and ordering
    // =========================================================================

    #[test]
    fn holder_blocks_other_participants() {
        let lock = BakeryLock::new(2).unwrap();
        let entered = AtomicBool::new(false);

        lock.acquire(0);
        thread::scope(|s| {
            s.spawn(|| {
                lock.acquire(1);
                entered.store(true, Ordering::SeqCst);
                lock.release(1);
            });

            thread::sleep(Duration::from_millis(50));
            assert!(!entered.load(Ordering::SeqCst));

            lock.release(0);
        });

        assert!(entered.load(Ordering::SeqCst));
    }

    #[test]
    fn earlier_ticket_enters_first() {
        let lock = BakeryLock::new(3).unwrap();
        let order = Mutex::new(Vec::new());

        lock.acquire(0);
        thread::scope(|s| {
            s.spawn(|| {
                lock.acquire(1);
                order.lock().push(1);
                lock.release(1);
            });
            while lock.ticket(1) == 0 {
                thread::yield_now();
            }

            s.spawn(|| {
                lock.acquire(2);
                order.lock().push(2);
                lock.release(2);
            });
            while lock.ticket(2) == 0 {
                thread::yield_now();
            }

            assert!(lock.ticket(2) > lock.ticket(1));
            lock.release(0);
        });

        assert_eq!(*order.lock(), vec![1, 2]);
    }

    // =========================================================================
    // Concurrent stress
    // =========================================================================

    #[test]
    fn contended_increments_are_never_lost() {
        const PARTICIPANTS: usize = 8;
        const ITERATIONS: u64 = 10_000;

        let lock = BakeryLock::new(PARTICIPANTS).unwrap();
        let counter = AtomicU64::new(0);

        thread::scope(|s| {
            for id in 0..PARTICIPANTS {
                let lock = &lock;
                let counter = &counter;
                s.spawn(move || {
                    for _ in 0..ITERATIONS {
                        let _guard = lock.lock(id);
                        let current = counter.load(Ordering::Relaxed);
                        counter.store(current + 1, Ordering::Relaxed);
                    }
                });
            }
        });

        assert_eq!(counter.load(Ordering::SeqCst), PARTICIPANTS as u64 * ITERATIONS);
        for id in 0..PARTICIPANTS {
            assert_eq!(lock.ticket(id), 0, "participant {} still holds a ticket", id);
        }
    }
}
