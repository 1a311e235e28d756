//! Cancellable one-shot deadlines.
//!
//! The core never sleeps or reads a clock. A delayed action is a deadline
//! stored in a [`Countdown`]; the runner calls `poll(now)` on the owner, which
//! fires whatever is due. Cancelling is clearing the slot.

use embassy_time::{Duration, Instant};

/// A single cancellable deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Countdown {
    deadline: Option<Instant>,
}

impl Countdown {
    pub const fn idle() -> Self {
        Self { deadline: None }
    }

    /// Arm (or re-arm) the countdown to expire `after` from `now`.
    pub fn arm(&mut self, now: Instant, after: Duration) {
        self.deadline = Some(now + after);
    }

    /// Disarm. Returns true if a deadline was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Consume the deadline if it has expired at `now`.
    pub fn take_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Bounded queue of deferred actions, each with its own deadline.
///
/// Used for delayed re-dispatches. Entries fire in deadline order.
#[derive(Debug, Clone, Default)]
pub struct DeferredQueue<const N: usize> {
    deadlines: heapless::Vec<Instant, N>,
}

impl<const N: usize> DeferredQueue<N> {
    pub const fn new() -> Self {
        Self {
            deadlines: heapless::Vec::new(),
        }
    }

    /// Schedule an action at `now + after`. Returns false if the queue is full.
    pub fn schedule(&mut self, now: Instant, after: Duration) -> bool {
        self.deadlines.push(now + after).is_ok()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.iter().min().copied()
    }

    /// Remove and return the earliest deadline if it is due at `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<Instant> {
        let (index, deadline) = self
            .deadlines
            .iter()
            .copied()
            .enumerate()
            .min_by_key(|(_, deadline)| *deadline)?;
        if deadline <= now {
            self.deadlines.swap_remove(index);
            Some(deadline)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    pub fn clear(&mut self) {
        self.deadlines.clear();
    }
}
