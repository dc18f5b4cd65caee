//! Session clock
//!
//! The core counts whole milliseconds from the start of the session. The
//! browser hands out `f64` timestamps (rAF / `Date.now()`), which are
//! anchored on the first reading.

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionClock {
    origin: Option<f64>,
    last_ms: u64,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds since the first call. Never goes backwards.
    pub fn now_ms(&mut self, timestamp: f64) -> u64 {
        let origin = *self.origin.get_or_insert(timestamp);
        let elapsed = (timestamp - origin).max(0.0) as u64;
        self.last_ms = self.last_ms.max(elapsed);
        self.last_ms
    }

    /// Last value handed out
    pub fn last_ms(&self) -> u64 {
        self.last_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchored_on_first_reading() {
        let mut clock = SessionClock::new();
        assert_eq!(clock.now_ms(1_700_000_000_000.0), 0);
        assert_eq!(clock.now_ms(1_700_000_000_250.7), 250);
    }

    #[test]
    fn test_monotonic() {
        let mut clock = SessionClock::new();
        clock.now_ms(1000.0);
        assert_eq!(clock.now_ms(1500.0), 500);
        assert_eq!(clock.now_ms(1200.0), 500);
        assert_eq!(clock.last_ms(), 500);
    }
}
