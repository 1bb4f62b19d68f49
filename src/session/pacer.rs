use std::time::{Duration, Instant};

/// Clock that paces a stream capture.
pub trait Pacer: Send {
    /// Current time.
    fn now(&mut self) -> Instant;
    /// Block until `deadline`. Returns immediately when it has already passed.
    fn sleep_until(&mut self, deadline: Instant);
}

/// The real wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct WallClockPacer;

impl Pacer for WallClockPacer {
    fn now(&mut self) -> Instant {
        Instant::now()
    }

    fn sleep_until(&mut self, deadline: Instant) {
        let wait = deadline.saturating_duration_since(Instant::now());
        if !wait.is_zero() {
            std::thread::sleep(wait);
        }
    }
}

/// Virtual clock that only moves when told to, for tests and offline capture.
///
/// `lag` is added after every sleep to simulate a capture that cannot keep up.
#[derive(Clone, Debug)]
pub struct ManualPacer {
    now: Instant,
    lag: Duration,
}

impl ManualPacer {
    /// Start the virtual clock at `start`.
    pub fn new(start: Instant) -> Self {
        Self {
            now: start,
            lag: Duration::ZERO,
        }
    }

    /// Add `lag` after every sleep.
    pub fn with_lag(mut self, lag: Duration) -> Self {
        self.lag = lag;
        self
    }

    /// Move the clock forward.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }
}

impl Pacer for ManualPacer {
    fn now(&mut self) -> Instant {
        self.now
    }

    fn sleep_until(&mut self, deadline: Instant) {
        if deadline > self.now {
            self.now = deadline;
        }
        self.now += self.lag;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/pacer.rs"]
mod tests;
