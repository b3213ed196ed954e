//! Clock-driven rate limiting for input events.
//!
//! Nothing here spawns timers. Callers feed timestamps from a [`Clock`] and
//! poll for settled values, which keeps behavior deterministic under
//! [`ManualClock`] in tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Millisecond timestamps from an arbitrary origin.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Monotonic wall clock, measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    #[must_use]
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
    fn now(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Clock advanced by hand. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(millis(by), Ordering::SeqCst);
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

// =============================================================================
// Debouncer
// =============================================================================

/// Emits a value only after calls stop for `wait`.
///
/// In immediate mode the first call of a burst is emitted at once and the
/// rest of the burst is swallowed.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    wait: u64,
    immediate: bool,
    deadline: Option<u64>,
    pending: Option<T>,
}

impl<T> Debouncer<T> {
    /// Trailing-edge debouncer.
    #[must_use]
    pub fn new(wait: Duration) -> Self {
        Self {
            wait: millis(wait),
            immediate: false,
            deadline: None,
            pending: None,
        }
    }

    /// Leading-edge debouncer.
    #[must_use]
    pub fn immediate(wait: Duration) -> Self {
        Self {
            immediate: true,
            ..Self::new(wait)
        }
    }

    /// Record a call at `now`. Returns the value straight back only for the
    /// leading call of a burst in immediate mode.
    pub fn call(&mut self, value: T, now: u64) -> Option<T> {
        let quiet = self.deadline.is_none_or(|d| now >= d);
        self.deadline = Some(now.saturating_add(self.wait));

        if self.immediate {
            return quiet.then_some(value);
        }
        self.pending = Some(value);
        None
    }

    /// The settled value, once the quiet period has elapsed.
    pub fn poll(&mut self, now: u64) -> Option<T> {
        match self.deadline {
            Some(d) if now >= d => {
                self.deadline = None;
                self.pending.take()
            }
            _ => None,
        }
    }

    /// Drop any pending value and reset the window.
    pub fn cancel(&mut self) {
        self.deadline = None;
        self.pending = None;
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

// =============================================================================
// Throttles
// =============================================================================

/// Allows at most one call per interval.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: u64,
    last: Option<u64>,
}

impl Throttle {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: millis(interval),
            last: None,
        }
    }

    /// Whether a call at `now` may run. A permitted call starts a new interval.
    pub fn try_acquire(&mut self, now: u64) -> bool {
        let ready = self
            .last
            .is_none_or(|last| now.saturating_sub(last) >= self.interval);
        if ready {
            self.last = Some(now);
        }
        ready
    }
}

/// Coalesces triggers into one unit of work per frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameThrottle {
    pending: bool,
}

impl FrameThrottle {
    #[must_use]
    pub const fn new() -> Self {
        Self { pending: false }
    }

    /// Ask for a frame. True only for the first request since the last fire,
    /// meaning the caller should schedule one.
    pub const fn request(&mut self) -> bool {
        if self.pending {
            return false;
        }
        self.pending = true;
        true
    }

    /// The frame arrived. Returns whether anything was waiting on it.
    pub const fn fire(&mut self) -> bool {
        let was_pending = self.pending;
        self.pending = false;
        was_pending
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAIT: Duration = Duration::from_millis(300);

    #[test]
    fn test_debounce_emits_once_after_quiet_period() {
        let clock = ManualClock::new();
        let mut debouncer = Debouncer::new(WAIT);

        for term in ["s", "sh", "shi", "shirt"] {
            assert_eq!(debouncer.call(term, clock.now()), None);
            clock.advance(Duration::from_millis(100));
        }
        assert_eq!(debouncer.poll(clock.now()), None);

        clock.advance(Duration::from_millis(200));
        assert_eq!(debouncer.poll(clock.now()), Some("shirt"));
        assert_eq!(debouncer.poll(clock.now()), None);
    }

    #[test]
    fn test_debounce_immediate_emits_leading_call() {
        let mut debouncer = Debouncer::immediate(WAIT);
        assert_eq!(debouncer.call(1, 0), Some(1));
        assert_eq!(debouncer.call(2, 100), None);
        assert_eq!(debouncer.poll(500), None);
        assert_eq!(debouncer.call(3, 1000), Some(3));
    }

    #[test]
    fn test_debounce_cancel() {
        let mut debouncer = Debouncer::new(WAIT);
        debouncer.call("x", 0);
        assert!(debouncer.is_pending());
        debouncer.cancel();
        assert_eq!(debouncer.poll(1000), None);
    }

    #[test]
    fn test_throttle_once_per_interval() {
        let mut throttle = Throttle::new(Duration::from_millis(100));
        assert!(throttle.try_acquire(0));
        assert!(!throttle.try_acquire(50));
        assert!(throttle.try_acquire(100));
        assert!(!throttle.try_acquire(199));
    }

    #[test]
    fn test_frame_throttle_coalesces() {
        let mut frame = FrameThrottle::new();
        assert!(frame.request());
        assert!(!frame.request());
        assert!(!frame.request());
        assert!(frame.fire());
        assert!(!frame.fire());
        assert!(frame.request());
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let other = clock.clone();
        clock.advance(Duration::from_secs(1));
        assert_eq!(other.now(), 1000);
        other.set(5);
        assert_eq!(clock.now(), 5);
    }
}
