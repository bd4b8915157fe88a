//! Injected "today" provider.
//!
//! Every derivation is relative to the current day. The tracker asks its
//! [`Clock`] instead of reading the system time directly, so tests can pin
//! or move the date without touching process-wide state.

use chrono::{NaiveDate, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use crate::models::Timestamp;

pub trait Clock: Send + Sync {
    fn today(&self) -> Timestamp;
}

/// Current UTC date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> Timestamp {
        Timestamp::from_datetime(Utc::now())
    }
}

/// A clock that reports a settable day.
#[derive(Debug)]
pub struct FixedClock {
    epoch_day: AtomicI64,
}

impl FixedClock {
    pub fn new(today: Timestamp) -> Self {
        Self {
            epoch_day: AtomicI64::new(Self::encode(today)),
        }
    }

    pub fn set(&self, today: Timestamp) {
        self.epoch_day.store(Self::encode(today), Ordering::SeqCst);
    }

    /// Move the clock by `days` (negative moves into the past).
    pub fn advance(&self, days: i64) {
        self.epoch_day.fetch_add(days, Ordering::SeqCst);
    }

    fn encode(day: Timestamp) -> i64 {
        epoch().days_until(day)
    }
}

/// 1970-01-01.
fn epoch() -> Timestamp {
    Timestamp::from_date(NaiveDate::default())
}

impl Clock for FixedClock {
    fn today(&self) -> Timestamp {
        epoch().plus(self.epoch_day.load(Ordering::SeqCst))
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> Timestamp {
        (**self).today()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn today(&self) -> Timestamp {
        (**self).today()
    }
}
