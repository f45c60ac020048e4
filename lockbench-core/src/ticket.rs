//! Per-participant ticket state for the bakery lock.
//!
//! Each participant owns one slot, indexed by its id. Slots are allocated once
//! when the arena is built and never resized, so acquiring never allocates.
//! Every access is `SeqCst`: the bakery argument needs the `choosing` and
//! `ticket` writes of racing participants to appear in one total order.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// One participant's `choosing` flag and ticket.
///
/// Cache-line aligned so participants spinning on different slots do not
/// false-share.
#[repr(C, align(64))]
#[derive(Debug)]
pub struct TicketSlot {
    choosing: AtomicBool,
    ticket: AtomicU64,
}

impl TicketSlot {
    const fn new() -> Self {
        Self {
            choosing: AtomicBool::new(false),
            ticket: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn is_choosing(&self) -> bool {
        self.choosing.load(Ordering::SeqCst)
    }

    #[inline]
    pub fn set_choosing(&self, choosing: bool) {
        self.choosing.store(choosing, Ordering::SeqCst);
    }

    /// 0 means the participant is not requesting the lock
    #[inline]
    pub fn ticket(&self) -> u64 {
        self.ticket.load(Ordering::SeqCst)
    }

    #[inline]
    pub fn set_ticket(&self, ticket: u64) {
        self.ticket.store(ticket, Ordering::SeqCst);
    }
}

/// Fixed-capacity array of [`TicketSlot`]s.
#[derive(Debug)]
pub struct TicketArena {
    slots: Box<[TicketSlot]>,
}

impl TicketArena {
    pub fn new(participants: usize) -> Self {
        Self {
            slots: (0..participants).map(|_| TicketSlot::new()).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// # Panics
    ///
    /// Panics if `id` is not a participant of this arena.
    #[inline]
    pub fn slot(&self, id: usize) -> &TicketSlot {
        assert!(
            id < self.slots.len(),
            "participant id {} out of range for {} participants",
            id,
            self.slots.len()
        );
        &self.slots[id]
    }

    /// Largest ticket currently held by any participant.
    pub fn max_ticket(&self) -> u64 {
        self.slots.iter().map(TicketSlot::ticket).max().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &TicketSlot)> {
        self.slots.iter().enumerate()
    }
}
