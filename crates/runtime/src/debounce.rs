use std::time::Duration;

use foundation::time::Time;

/// Identifies one arming of a [`Debounce`] timer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

/// Single-slot cancellable timer.
///
/// At most one deadline is pending. Re-arming replaces the pending deadline,
/// so a stale arming can never fire after a newer one was requested.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    next_id: u64,
    armed: Option<(TimerId, Time)>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_id: 0,
            armed: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arms the timer to fire `delay` after `now`, cancelling any pending arming.
    pub fn arm(&mut self, now: Time) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.armed = Some((id, now + self.delay));
        id
    }

    /// Returns `true` if a pending arming was cancelled.
    pub fn cancel(&mut self) -> bool {
        self.armed.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn deadline(&self) -> Option<Time> {
        self.armed.map(|(_, due)| due)
    }

    /// Fires the pending arming if its deadline has been reached.
    ///
    /// A timer fires at most once; afterwards it is disarmed.
    pub fn poll(&mut self, now: Time) -> Option<TimerId> {
        let (id, due) = self.armed?;
        if now < due {
            return None;
        }
        self.armed = None;
        Some(id)
    }
}
