use std::time::Duration;

/// Identifies one scheduled countdown; ticks from a replaced countdown carry a stale id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CountdownId(u64);

impl CountdownId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// A repeating one-second task counting down to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Countdown {
    id: CountdownId,
    remaining_secs: u32,
    interval: Duration,
    carry: Duration,
}

impl Countdown {
    pub fn new(id: CountdownId, secs: u32) -> Self {
        Self::with_interval(id, secs, Duration::from_secs(1))
    }

    pub fn with_interval(id: CountdownId, secs: u32, interval: Duration) -> Self {
        Self {
            id,
            remaining_secs: secs,
            interval,
            carry: Duration::ZERO,
        }
    }

    pub fn id(&self) -> CountdownId {
        self.id
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_secs == 0
    }

    /// Accumulates `dt` and returns how many whole intervals became due.
    ///
    /// Never reports more ticks than seconds remain.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        if self.is_expired() || self.interval.is_zero() {
            return 0;
        }
        self.carry += dt;
        let mut due = 0;
        while self.carry >= self.interval && due < self.remaining_secs {
            self.carry -= self.interval;
            due += 1;
        }
        due
    }

    /// Counts down one second; returns true when zero is reached.
    pub fn tick(&mut self) -> bool {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        self.is_expired()
    }

    /// Fraction of the current second already elapsed, for smooth display.
    pub fn sub_second_progress(&self) -> f64 {
        if self.interval.is_zero() {
            return 0.0;
        }
        (self.carry.as_secs_f64() / self.interval.as_secs_f64()).min(1.0)
    }
}
