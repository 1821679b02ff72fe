//! Contact debouncing
//!
//! A raw reading must hold its new level for the whole window before the
//! stable level follows it. Any bounce back to the stable level restarts
//! the wait.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    stable: bool,
    /// When the raw level first differed from `stable`
    pending_since: Option<Instant>,
}

impl Debouncer {
    pub fn new(initial: bool, window: Duration) -> Self {
        Self {
            window,
            stable: initial,
            pending_since: None,
        }
    }

    pub fn stable(&self) -> bool {
        self.stable
    }

    /// Feed one raw sample; returns the new stable level when it changes
    pub fn update(&mut self, raw: bool, now: Instant) -> Option<bool> {
        if raw == self.stable {
            self.pending_since = None;
            return None;
        }

        let since = *self.pending_since.get_or_insert(now);
        if now.duration_since(since) >= self.window {
            self.stable = raw;
            self.pending_since = None;
            Some(raw)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(50);

    fn ms(start: Instant, offset: u64) -> Instant {
        start + Duration::from_millis(offset)
    }

    #[test]
    fn test_zero_window_is_immediate() {
        let start = Instant::now();
        let mut d = Debouncer::new(false, Duration::ZERO);
        assert_eq!(d.update(true, start), Some(true));
        assert_eq!(d.update(true, start), None);
        assert_eq!(d.update(false, start), Some(false));
    }

    #[test]
    fn test_change_after_window() {
        let start = Instant::now();
        let mut d = Debouncer::new(false, WINDOW);

        assert_eq!(d.update(true, start), None);
        assert_eq!(d.update(true, ms(start, 20)), None);
        assert_eq!(d.update(true, ms(start, 50)), Some(true));
        assert!(d.stable());
        assert_eq!(d.update(true, ms(start, 60)), None);
    }

    #[test]
    fn test_bounce_restarts_window() {
        let start = Instant::now();
        let mut d = Debouncer::new(false, WINDOW);

        assert_eq!(d.update(true, start), None);
        assert_eq!(d.update(false, ms(start, 10)), None);
        assert_eq!(d.update(true, ms(start, 20)), None);
        // 50ms after the first edge but only 30ms after the bounce
        assert_eq!(d.update(true, ms(start, 50)), None);
        assert_eq!(d.update(true, ms(start, 70)), Some(true));
    }

    #[test]
    fn test_glitch_is_ignored() {
        let start = Instant::now();
        let mut d = Debouncer::new(true, WINDOW);

        assert_eq!(d.update(false, start), None);
        assert_eq!(d.update(true, ms(start, 5)), None);
        assert_eq!(d.update(true, ms(start, 100)), None);
        assert!(d.stable());
    }
}
