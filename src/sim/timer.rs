//! Virtual-clock timer scheduler
//!
//! Every delayed behaviour in a scene (spawns, expiries, popups, transitions)
//! is an entry here. Time is a plain millisecond counter supplied by the
//! caller, so tests drive the clock directly.

/// Cancellation token for a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Entry<E> {
    id: TimerId,
    due_ms: u64,
    /// Re-arm period for repeating timers
    period_ms: Option<u64>,
    event: E,
}

/// Pending timers for one scene
#[derive(Debug, Clone)]
pub struct Timers<E> {
    entries: Vec<Entry<E>>,
    next_id: u64,
}

impl<E: Clone> Default for Timers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone> Timers<E> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Fire `event` once, `delay_ms` after `now_ms`
    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64, event: E) -> TimerId {
        let id = self.allocate_id();
        self.entries.push(Entry {
            id,
            due_ms: now_ms + delay_ms,
            period_ms: None,
            event,
        });
        id
    }

    /// Fire `event` every `period_ms`, first at `now_ms + period_ms`
    pub fn schedule_every(&mut self, now_ms: u64, period_ms: u64, event: E) -> TimerId {
        let id = self.allocate_id();
        self.entries.push(Entry {
            id,
            due_ms: now_ms + period_ms.max(1),
            period_ms: Some(period_ms.max(1)),
            event,
        });
        id
    }

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Cancel everything (scene teardown). Returns how many were pending.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.entries.len();
        self.entries.clear();
        n
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pop the earliest timer due at or before `now_ms`.
    ///
    /// Ties fire in scheduling order. Repeating timers are re-armed from
    /// their due time, so a late poll catches up one period at a time.
    /// Handlers should pop one event, handle it (possibly cancelling or
    /// scheduling timers), then pop again.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(u64, E)> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_ms <= now_ms)
            .min_by_key(|(_, e)| (e.due_ms, e.id.0))
            .map(|(i, _)| i)?;

        let entry = &self.entries[idx];
        let (due, period, event) = (entry.due_ms, entry.period_ms, entry.event.clone());
        match period {
            Some(period) => self.entries[idx].due_ms += period,
            None => {
                self.entries.remove(idx);
            }
        }
        Some((due, event))
    }

    /// Pop every due event in firing order
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<(u64, E)> {
        let mut fired = Vec::new();
        while let Some(item) = self.pop_due(now_ms) {
            fired.push(item);
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shot_fires_once() {
        let mut timers = Timers::new();
        timers.schedule(0, 100, "a");
        assert!(timers.pop_due(99).is_none());
        assert_eq!(timers.pop_due(100), Some((100, "a")));
        assert!(timers.pop_due(1000).is_none());
        assert!(timers.is_empty());
    }

    #[test]
    fn test_firing_order() {
        let mut timers = Timers::new();
        timers.schedule(0, 300, "late");
        timers.schedule(0, 100, "early");
        timers.schedule(0, 100, "early-second");
        let fired: Vec<_> = timers.drain_due(500).into_iter().map(|(_, e)| e).collect();
        assert_eq!(fired, vec!["early", "early-second", "late"]);
    }

    #[test]
    fn test_repeating_catches_up() {
        let mut timers = Timers::new();
        let id = timers.schedule_every(0, 100, "tick");
        let fired = timers.drain_due(350);
        assert_eq!(fired.iter().map(|(t, _)| *t).collect::<Vec<_>>(), vec![100, 200, 300]);
        assert!(timers.is_pending(id));
    }

    #[test]
    fn test_cancel() {
        let mut timers = Timers::new();
        let a = timers.schedule(0, 100, 1);
        let b = timers.schedule(0, 100, 2);
        assert!(timers.cancel(a));
        assert!(!timers.cancel(a));
        assert_eq!(timers.drain_due(100), vec![(100, 2)]);
        assert!(!timers.cancel(b));
    }

    #[test]
    fn test_cancel_all() {
        let mut timers = Timers::new();
        timers.schedule(0, 10, ());
        timers.schedule_every(0, 10, ());
        assert_eq!(timers.cancel_all(), 2);
        assert!(timers.drain_due(u64::MAX / 2).is_empty());
    }
}
