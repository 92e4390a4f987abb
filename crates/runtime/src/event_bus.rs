use foundation::time::Time;

/// An event stamped with the session time it was emitted at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event<E> {
    pub at: Time,
    pub payload: E,
}

/// Ordered outbox of events, drained by whoever executes them.
///
/// State machines push their outgoing requests here instead of calling
/// collaborators directly; the driver drains the bus and performs the I/O.
#[derive(Debug)]
pub struct EventBus<E> {
    events: Vec<Event<E>>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, at: Time, payload: E) {
        self.events.push(Event { at, payload });
    }

    pub fn events(&self) -> &[Event<E>] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drops queued events matching `pred`, returning how many were removed.
    pub fn retract(&mut self, mut pred: impl FnMut(&E) -> bool) -> usize {
        let before = self.events.len();
        self.events.retain(|e| !pred(&e.payload));
        before - self.events.len()
    }

    pub fn drain(&mut self) -> Vec<Event<E>> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::EventBus;
    use foundation::time::Time;

    #[test]
    fn records_events_with_time() {
        let mut bus = EventBus::new();
        bus.emit(Time(2), "hello");
        assert_eq!(bus.len(), 1);
        assert_eq!(bus.events()[0].at, Time(2));
        assert_eq!(bus.events()[0].payload, "hello");
    }

    #[test]
    fn drain_clears_events_in_order() {
        let mut bus = EventBus::new();
        bus.emit(Time(0), 1);
        bus.emit(Time(0), 2);
        let drained: Vec<i32> = bus.drain().into_iter().map(|e| e.payload).collect();
        assert_eq!(drained, vec![1, 2]);
        assert!(bus.is_empty());
    }

    #[test]
    fn retract_removes_matching_only() {
        let mut bus = EventBus::new();
        bus.emit(Time(0), 1);
        bus.emit(Time(1), 2);
        bus.emit(Time(2), 3);
        assert_eq!(bus.retract(|v| v % 2 == 1), 2);
        assert_eq!(bus.events()[0].payload, 2);
    }
}
