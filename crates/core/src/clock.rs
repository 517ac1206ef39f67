//! Time sources, ticks and per-concern throttles.
//!
//! All time in the core is a `Duration` since an arbitrary origin, read from a
//! `Clock`. The host owns the clock; tests inject a `ManualClock` and advance
//! it explicitly instead of sleeping.

use crate::constants::DEFAULT_TICK_INTERVAL;
use log::trace;
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Period of a rate in Hz.
///
/// None unless the rate is positive and finite and its period fits a
/// non-zero `Duration`.
pub fn period_of(rate_hz: f64) -> Option<Duration> {
    if !(rate_hz.is_finite() && rate_hz > 0.0) {
        return None;
    }
    Duration::try_from_secs_f64(1.0 / rate_hz)
        .ok()
        .filter(|period| !period.is_zero())
}

/// Monotonic time source
pub trait Clock {
    /// Time elapsed since the clock's origin
    fn now(&self) -> Duration;
}

/// Wall clock backed by `Instant`
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and give
/// another to a `Ticker`.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// One evaluation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Sequence number, starting at 0
    pub index: u64,
    /// Clock time of this tick
    pub now: Duration,
    /// Time since the previous tick (zero for the first)
    pub delta: Duration,
}

impl Tick {
    /// Tick at an absolute time, for callers that do not use a `Ticker`
    pub fn at(index: u64, now: Duration, previous: Option<Duration>) -> Self {
        Self {
            index,
            now,
            delta: previous.map(|p| now.saturating_sub(p)).unwrap_or_default(),
        }
    }
}

/// Rate limiter comparing elapsed time against a stored interval.
///
/// The first call to `ready` always passes.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last: Option<Duration>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Returns true (and records `now`) if the interval has elapsed
    pub fn ready(&mut self, now: Duration) -> bool {
        match self.last {
            Some(last) if now.saturating_sub(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// Forget the last firing so the next `ready` passes
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Produces ticks from a clock at a configurable rate
pub struct Ticker {
    clock: Box<dyn Clock>,
    throttle: Throttle,
    index: u64,
    last: Option<Duration>,
}

impl Ticker {
    pub fn new(clock: Box<dyn Clock>, interval: Duration) -> Self {
        Self {
            clock,
            throttle: Throttle::new(interval),
            index: 0,
            last: None,
        }
    }

    /// Ticker at `rate_hz` ticks per second; unusable rates fall back to 10 Hz
    pub fn with_rate(clock: Box<dyn Clock>, rate_hz: f64) -> Self {
        Self::new(clock, period_of(rate_hz).unwrap_or(DEFAULT_TICK_INTERVAL))
    }

    pub fn interval(&self) -> Duration {
        self.throttle.interval()
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Produce a tick unconditionally (host already paced the call)
    pub fn tick(&mut self) -> Tick {
        let now = self.clock.now();
        let tick = Tick::at(self.index, now, self.last);
        self.index += 1;
        self.last = Some(now);
        tick
    }

    /// Produce a tick only if the interval has elapsed.
    ///
    /// Suitable for hosts with a faster frame loop than the tick rate.
    pub fn poll(&mut self) -> Option<Tick> {
        let now = self.clock.now();
        if self.throttle.ready(now) {
            Some(self.tick())
        } else {
            trace!("Ticker: {:?} not due yet", now);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new();
        let other = clock.clone();
        clock.advance_ms(250);
        assert_eq!(other.now(), Duration::from_millis(250));
    }

    #[test]
    fn test_throttle_first_call_passes() {
        let mut throttle = Throttle::new(Duration::from_millis(100));
        assert!(throttle.ready(Duration::from_millis(5)));
        assert!(!throttle.ready(Duration::from_millis(50)));
        assert!(!throttle.ready(Duration::from_millis(104)));
        assert!(throttle.ready(Duration::from_millis(105)));
    }

    #[test]
    fn test_throttle_reset() {
        let mut throttle = Throttle::new(Duration::from_secs(10));
        assert!(throttle.ready(Duration::ZERO));
        assert!(!throttle.ready(Duration::from_secs(1)));
        throttle.reset();
        assert!(throttle.ready(Duration::from_secs(1)));
    }

    #[test]
    fn test_period_of_bounds() {
        assert_eq!(period_of(10.0), Some(Duration::from_millis(100)));
        assert_eq!(period_of(0.0), None);
        assert_eq!(period_of(-2.0), None);
        assert_eq!(period_of(f64::NAN), None);
        assert_eq!(period_of(f64::INFINITY), None);
        // Period too long for a Duration
        assert_eq!(period_of(1e-20), None);
        // Period rounds to zero
        assert_eq!(period_of(1e10), None);
    }

    #[test]
    fn test_ticker_with_unusable_rate() {
        let ticker = Ticker::with_rate(Box::new(ManualClock::new()), 1e-20);
        assert_eq!(ticker.interval(), DEFAULT_TICK_INTERVAL);
    }

    #[test]
    fn test_ticker_deltas() {
        let clock = ManualClock::new();
        let mut ticker = Ticker::new(Box::new(clock.clone()), Duration::from_millis(100));

        let first = ticker.tick();
        assert_eq!(first.index, 0);
        assert_eq!(first.delta, Duration::ZERO);

        clock.advance_ms(100);
        let second = ticker.tick();
        assert_eq!(second.index, 1);
        assert_eq!(second.delta, Duration::from_millis(100));
    }

    #[test]
    fn test_ticker_poll_respects_rate() {
        let clock = ManualClock::new();
        let mut ticker = Ticker::with_rate(Box::new(clock.clone()), 10.0);

        assert!(ticker.poll().is_some());
        clock.advance_ms(16);
        assert!(ticker.poll().is_none());
        clock.advance_ms(84);
        let tick = ticker.poll().expect("due after 100ms");
        assert_eq!(tick.index, 1);
        assert_eq!(tick.delta, Duration::from_millis(100));
    }
}
