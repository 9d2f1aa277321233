//! Injected time source.
//!
//! Cache expiry and the minimum busy-indicator time both read the clock
//! through this trait so they can be driven deterministically in tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

/// Source of "now" plus the ability to wait.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
    fn sleep(&self, duration: Duration);
}

/// Shared handle to a clock.
pub type SharedClock = Arc<dyn Clock>;

/// Wall clock backed by `chrono::Utc::now` and `std::thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Return the process-wide system clock as a [`SharedClock`].
pub fn system() -> SharedClock {
    Arc::new(SystemClock)
}

/// Manually advanced clock. `sleep` advances time instead of blocking.
///
/// Clones share the same instant, so a test can hand one clone to the code
/// under test and advance the other.
#[derive(Debug, Clone)]
pub struct ManualClock {
    millis: Arc<AtomicI64>,
    slept_ms: Arc<AtomicI64>,
}

impl ManualClock {
    /// Start at the given instant.
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            millis: Arc::new(AtomicI64::new(start.timestamp_millis())),
            slept_ms: Arc::new(AtomicI64::new(0)),
        }
    }

    /// Move time forward.
    pub fn advance(&self, duration: Duration) {
        self.millis
            .fetch_add(duration.as_millis() as i64, Ordering::SeqCst);
    }

    /// Total time spent in [`Clock::sleep`] so far.
    pub fn total_slept(&self) -> Duration {
        Duration::from_millis(self.slept_ms.load(Ordering::SeqCst).max(0) as u64)
    }

    /// Wrap a clone as a [`SharedClock`].
    pub fn shared(&self) -> SharedClock {
        Arc::new(self.clone())
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::starting_at(
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
                .single()
                .unwrap_or_default(),
        )
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let ms = self.millis.load(Ordering::SeqCst);
        Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
    }

    fn sleep(&self, duration: Duration) {
        self.slept_ms
            .fetch_add(duration.as_millis() as i64, Ordering::SeqCst);
        self.advance(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::default();
        let handle = clock.shared();
        let before = handle.now();

        clock.advance(Duration::from_secs(60));

        assert_eq!((handle.now() - before).num_seconds(), 60);
    }

    #[test]
    fn manual_sleep_advances_and_records() {
        let clock = ManualClock::default();
        let before = clock.now();

        clock.sleep(Duration::from_millis(250));

        assert_eq!((clock.now() - before).num_milliseconds(), 250);
        assert_eq!(clock.total_slept(), Duration::from_millis(250));
    }
}
