use std::collections::BTreeMap;
use std::time::Duration;

/// Handle to one scheduled event: its queue key, so cancelling is a direct
/// lookup.  Sequence numbers are never reused within a timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId {
    at:  Duration,
    seq: u64,
}

/// Cooperative timer queue.
///
/// Nothing here runs on its own: the owner drains due events with `pop_due`
/// from the same loop that handles input, so firing a timer can never race
/// with a key press.  Events due at the same instant come out in the order
/// they were scheduled.
pub struct Timeline<E> {
    next_id: u64,
    pending: BTreeMap<(Duration, u64), E>,
}

impl<E> Timeline<E> {
    pub fn new() -> Self {
        Self { next_id: 0, pending: BTreeMap::new() }
    }

    pub fn schedule(&mut self, at: Duration, event: E) -> TimerId {
        let seq = self.next_id;
        self.next_id += 1;
        self.pending.insert((at, seq), event);
        TimerId { at, seq }
    }

    /// Returns `false` if the event already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.pending.remove(&(id.at, id.seq)).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    /// Removes and returns the earliest event due at or before `now`, along
    /// with the instant it was scheduled for.
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, E)> {
        let (&(at, _), _) = self.pending.first_key_value()?;
        if at > now { return None; }
        self.pending.pop_first().map(|((at, _), event)| (at, event))
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.pending.keys().next().map(|(at, _)| *at)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize { self.pending.len() }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool { self.pending.is_empty() }
}

impl<E> Default for Timeline<E> {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration { Duration::from_millis(v) }

    #[test]
    fn pops_in_time_order_then_schedule_order() {
        let mut t = Timeline::new();
        t.schedule(ms(20), "c");
        t.schedule(ms(10), "a");
        t.schedule(ms(10), "b");

        assert_eq!(t.pop_due(ms(5)), None);
        assert_eq!(t.pop_due(ms(30)), Some((ms(10), "a")));
        assert_eq!(t.pop_due(ms(30)), Some((ms(10), "b")));
        assert_eq!(t.pop_due(ms(30)), Some((ms(20), "c")));
        assert!(t.is_empty());
    }

    #[test]
    fn cancelled_events_never_fire() {
        let mut t = Timeline::new();
        let a = t.schedule(ms(10), 1);
        t.schedule(ms(20), 2);

        assert!(t.cancel(a));
        assert!(!t.cancel(a));
        assert_eq!(t.next_due(), Some(ms(20)));
        assert_eq!(t.pop_due(ms(100)), Some((ms(20), 2)));

        t.schedule(ms(30), 3);
        t.cancel_all();
        assert_eq!(t.pop_due(ms(100)), None);
        assert_eq!(t.len(), 0);
    }

    #[test]
    fn cancel_hits_only_its_own_event_at_a_shared_instant() {
        let mut t = Timeline::new();
        let a = t.schedule(ms(10), "a");
        let b = t.schedule(ms(10), "b");
        t.schedule(ms(10), "c");

        assert!(t.cancel(b));
        assert_eq!(t.len(), 2);
        assert_eq!(t.pop_due(ms(10)), Some((ms(10), "a")));
        assert!(!t.cancel(a));
        assert_eq!(t.pop_due(ms(10)), Some((ms(10), "c")));
    }
}
