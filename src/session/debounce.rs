use std::time::{Duration, Instant};

/// Trailing-edge debouncer with an explicit clock.
///
/// Each `schedule` replaces the pending value and restarts the quiet
/// period; `poll` hands the value out once the period has elapsed.
#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn schedule(&mut self, now: Instant, value: T) {
        self.pending = Some((value, now + self.window));
    }

    /// Release the pending value if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(v, _)| v),
            _ => None,
        }
    }

    /// Release the pending value immediately.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(v, _)| v)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(300);

    #[test]
    fn test_burst_coalesces_to_last_value() {
        let start = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        for (i, text) in ["x", "x^", "x^2"].iter().enumerate() {
            d.schedule(start + Duration::from_millis(100 * i as u64), *text);
        }
        // 300ms after the first keystroke but only 100ms after the last
        assert_eq!(d.poll(start + Duration::from_millis(300)), None);
        assert_eq!(d.poll(start + Duration::from_millis(500)), Some("x^2"));
        assert_eq!(d.poll(start + Duration::from_millis(900)), None);
    }

    #[test]
    fn test_flush_and_cancel() {
        let now = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        d.schedule(now, 1);
        assert!(d.is_pending());
        assert_eq!(d.flush(), Some(1));
        assert!(!d.is_pending());
        d.schedule(now, 2);
        d.cancel();
        assert_eq!(d.poll(now + WINDOW * 2), None);
    }
}
