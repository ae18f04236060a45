//! Wall-clock and monotonic time sources.
//!
//! Handlers never call `Utc::now()` or `Instant::now()` directly; they go
//! through a [`Clock`] held in the application state so tests can substitute
//! a manual clock and get deterministic timestamps.

use std::fmt;
#[cfg(test)]
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, SecondsFormat, Utc};

/// Source of current time for the application.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;

    /// Current monotonic instant.
    fn instant(&self) -> Instant;

    /// Monotonic time elapsed since `start`, saturating at zero.
    fn elapsed_since(&self, start: Instant) -> Duration {
        self.instant().saturating_duration_since(start)
    }
}

/// Clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
///
/// Wall-clock and monotonic readings advance together, so `now()` and
/// `instant()` stay consistent with each other.
#[cfg(test)]
#[derive(Debug)]
pub struct ManualClock {
    wall_base: DateTime<Utc>,
    instant_base: Instant,
    offset_nanos: AtomicU64,
}

#[cfg(test)]
impl ManualClock {
    /// Creates a clock frozen at `wall_base`.
    pub fn new(wall_base: DateTime<Utc>) -> Self {
        Self {
            wall_base,
            instant_base: Instant::now(),
            offset_nanos: AtomicU64::new(0),
        }
    }

    /// Moves both readings forward by `by`.
    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.offset_nanos.fetch_add(nanos, Ordering::SeqCst);
    }

    fn offset(&self) -> Duration {
        Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let offset = chrono::Duration::from_std(self.offset()).unwrap_or(chrono::Duration::MAX);
        self.wall_base + offset
    }

    fn instant(&self) -> Instant {
        self.instant_base + self.offset()
    }
}

/// Formats a timestamp as ISO-8601 with millisecond precision and a `Z` suffix,
/// e.g. `2026-10-16T09:30:00.123Z`.
pub fn format_iso8601(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}
