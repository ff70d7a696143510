use chrono::Utc;

use crate::Timestamp;

/// Source of the current time for envelope construction.
///
/// Every constructor that stamps `created_time` takes a clock, so tests can pin
/// timestamps with [`FixedClock`] instead of reading the system time.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall-clock UTC time, truncated to 100 ns ticks.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::saturating_from_datetime(Utc::now())
    }
}

/// A clock that always reports the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}
