//! Phase timing for parse and reconciliation runs.

use std::time::{Duration, Instant};

/// Adds the time between its creation and its drop to `slot`.
///
/// ```rust,ignore
/// let mut parse = Duration::ZERO;
/// {
///     let _timer = PhaseTimer::new(&mut parse);
///     parser.parse(text);
/// }
/// ```
pub struct PhaseTimer<'a> {
    start: Instant,
    slot: &'a mut Duration,
}

impl<'a> PhaseTimer<'a> {
    pub fn new(slot: &'a mut Duration) -> Self {
        Self {
            start: Instant::now(),
            slot,
        }
    }
}

impl Drop for PhaseTimer<'_> {
    fn drop(&mut self) {
        *self.slot += self.start.elapsed();
    }
}

/// `duration` in fractional milliseconds.
pub fn as_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
