//! Lamport's bakery lock.
//!
//! A participant takes a ticket one larger than every ticket it can see and
//! then waits for everyone holding a smaller `(ticket, id)` pair. Waiting is a
//! busy poll with `yield_now` between checks; the lock never parks a thread.

use std::thread;

use crate::error::LockError;
use crate::ticket::TicketArena;
use crate::types::MAX_PARTICIPANTS;

pub struct BakeryLock {
    tickets: TicketArena,
}

impl BakeryLock {
    /// Builds a lock for participants `0..participants`.
    pub fn new(participants: usize) -> Result<Self, LockError> {
        if participants == 0 {
            return Err(LockError::NoParticipants);
        }
        if participants > MAX_PARTICIPANTS {
            return Err(LockError::TooManyParticipants {
                requested: participants,
                max: MAX_PARTICIPANTS,
            });
        }

        Ok(Self {
            tickets: TicketArena::new(participants),
        })
    }

    pub fn participants(&self) -> usize {
        self.tickets.len()
    }

    /// Blocks until `id` holds the lock.
    ///
    /// # Panics
    ///
    /// Panics if `id >= participants()`.
    pub fn acquire(&self, id: usize) {
        let me = self.tickets.slot(id);

        // Doorway
        me.set_choosing(true);
        let ticket = self.tickets.max_ticket() + 1;
        me.set_ticket(ticket);
        me.set_choosing(false);

        for (other, slot) in self.tickets.iter() {
            if other == id {
                continue;
            }

            while slot.is_choosing() {
                thread::yield_now();
            }

            loop {
                let theirs = slot.ticket();
                if theirs == 0 || (ticket, id) < (theirs, other) {
                    break;
                }
                thread::yield_now();
            }
        }
    }

    /// Gives up the lock held by `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id >= participants()`.
    pub fn release(&self, id: usize) {
        self.tickets.slot(id).set_ticket(0);
    }

    /// Acquires for `id` and returns a guard that releases on drop.
    pub fn lock(&self, id: usize) -> BakeryGuard<'_> {
        self.acquire(id);
        BakeryGuard { lock: self, id }
    }

    /// Current ticket of `id`; 0 when it is not requesting the lock.
    pub fn ticket(&self, id: usize) -> u64 {
        self.tickets.slot(id).ticket()
    }

    pub fn is_choosing(&self, id: usize) -> bool {
        self.tickets.slot(id).is_choosing()
    }
}

impl std::fmt::Debug for BakeryLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BakeryLock")
            .field("participants", &self.participants())
            .finish()
    }
}

/// Holds a [`BakeryLock`] for one participant until dropped.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct BakeryGuard<'a> {
    lock: &'a BakeryLock,
    id: usize,
}

impl BakeryGuard<'_> {
    pub fn participant(&self) -> usize {
        self.id
    }
}

impl Drop for BakeryGuard<'_> {
    fn drop(&mut self) {
        self.lock.release(self.id);
    }
}
