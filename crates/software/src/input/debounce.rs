use crate::{elapsed, io::Level};
use embassy_time::{Duration, Instant};

/// Non-blocking, time-based filter for a bouncy digital input.
///
/// Every change of the raw level restarts the window; the debounced level only follows the raw level once it has
/// held still for longer than the window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Debouncer {
    raw: Level,
    stable: Level,
    last_change: Instant,
    window: Duration,
}

impl Debouncer {
    /// Constructs a [`Debouncer`] whose input has rested at `level` since `now`.
    pub fn new(level: Level, window: Duration, now: Instant) -> Self {
        Self {
            raw: level,
            stable: level,
            last_change: now,
            window,
        }
    }

    /// Feeds a raw reading taken at `now`. Returns the new debounced level if it changed.
    pub fn update(&mut self, level: Level, now: Instant) -> Option<Level> {
        if level != self.raw {
            self.raw = level;
            self.last_change = now;
        }

        if self.raw != self.stable && elapsed(self.last_change, now) > self.window {
            self.stable = self.raw;
            Some(self.stable)
        } else {
            None
        }
    }

    /// Returns the debounced level.
    pub fn level(&self) -> Level {
        self.stable
    }

    /// Returns the most recent raw level.
    pub fn raw(&self) -> Level {
        self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    #[test]
    fn follows_level_after_window() {
        let mut debouncer = Debouncer::new(Level::High, Duration::from_millis(50), at(0));

        assert_eq!(None, debouncer.update(Level::Low, at(10)));
        assert_eq!(Level::High, debouncer.level());
        assert_eq!(Level::Low, debouncer.raw());

        assert_eq!(None, debouncer.update(Level::Low, at(60)), "Window has only just elapsed");
        assert_eq!(Some(Level::Low), debouncer.update(Level::Low, at(61)));
        assert_eq!(Level::Low, debouncer.level());

        assert_eq!(None, debouncer.update(Level::Low, at(200)), "Should only report once");
    }

    #[test]
    fn bounce_restarts_window() {
        let mut debouncer = Debouncer::new(Level::High, Duration::from_millis(50), at(0));
        debouncer.update(Level::Low, at(10));
        debouncer.update(Level::High, at(40));
        debouncer.update(Level::Low, at(55));

        assert_eq!(None, debouncer.update(Level::Low, at(100)));
        assert_eq!(Some(Level::Low), debouncer.update(Level::Low, at(106)));
    }

    #[test]
    fn glitch_back_to_stable_level_is_not_reported() {
        let mut debouncer = Debouncer::new(Level::High, Duration::from_millis(50), at(0));
        debouncer.update(Level::Low, at(10));
        debouncer.update(Level::High, at(20));
        for ms in 21..200 {
            assert_eq!(None, debouncer.update(Level::High, at(ms)));
        }
        assert_eq!(Level::High, debouncer.level());
    }

    #[test]
    fn zero_window_follows_on_next_tick() {
        let mut debouncer = Debouncer::new(Level::High, Duration::from_millis(0), at(0));
        assert_eq!(None, debouncer.update(Level::Low, at(5)));
        assert_eq!(Some(Level::Low), debouncer.update(Level::Low, at(6)));
    }

    #[test]
    fn window_spans_clock_wrap() {
        let window = Duration::from_millis(50);
        let pressed_at = Instant::from_ticks(u64::MAX - 10);
        let mut debouncer = Debouncer::new(Level::High, window, pressed_at);
        assert_eq!(None, debouncer.update(Level::Low, pressed_at));

        let almost = Instant::from_ticks(window.as_ticks() - 11);
        assert_eq!(None, debouncer.update(Level::Low, almost), "Window has only just elapsed");
        let past = Instant::from_ticks(window.as_ticks() - 10);
        assert_eq!(Some(Level::Low), debouncer.update(Level::Low, past));
    }
}
