use std::cell::Cell;
use std::time::Instant;

use foundation::time::Time;

/// Source of session time, injected into whatever needs to read "now".
pub trait Clock {
    fn now(&self) -> Time;
}

/// Wall clock anchored at construction.
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    start: Instant,
}

impl SessionClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Converts a session time back into an `Instant` for async sleeps.
    pub fn instant_at(&self, t: Time) -> Instant {
        self.start + std::time::Duration::from_millis(t.as_millis())
    }
}

impl Clock for SessionClock {
    fn now(&self) -> Time {
        let ms = u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX);
        Time(ms)
    }
}

/// Hand-advanced clock for deterministic tests and replays.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Time>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, t: Time) {
        self.now.set(t);
    }

    pub fn advance_ms(&self, ms: u64) -> Time {
        let t = Time(self.now.get().0.saturating_add(ms));
        self.now.set(t);
        t
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Time {
        self.now.get()
    }
}
