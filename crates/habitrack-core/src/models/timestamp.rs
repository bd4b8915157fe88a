//! Day-granular timestamps.
//!
//! A [`Timestamp`] names one calendar day at midnight UTC. All arithmetic is
//! in whole days; there is no way to build one with a time-of-day component.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::calendar::TruncateField;
use crate::error::ValidationError;

/// One calendar day, normalized to midnight UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(NaiveDate);

impl Timestamp {
    pub const MIN: Timestamp = Timestamp(NaiveDate::MIN);
    pub const MAX: Timestamp = Timestamp(NaiveDate::MAX);

    /// Build from a calendar date. Returns `None` for impossible dates.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Day containing the given instant (UTC).
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at.date_naive())
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    /// The day `days` days later. Saturates at the calendar limit.
    pub fn plus(&self, days: i64) -> Self {
        if days < 0 {
            return self.minus(-days);
        }
        Self(
            self.0
                .checked_add_days(Days::new(days as u64))
                .unwrap_or(NaiveDate::MAX),
        )
    }

    /// The day `days` days earlier. Saturates at the calendar limit.
    pub fn minus(&self, days: i64) -> Self {
        if days < 0 {
            return self.plus(-days);
        }
        Self(
            self.0
                .checked_sub_days(Days::new(days as u64))
                .unwrap_or(NaiveDate::MIN),
        )
    }

    /// Signed number of days from `self` to `other` (positive when `other`
    /// is newer).
    pub fn days_until(&self, other: Timestamp) -> i64 {
        (other.0 - self.0).num_days()
    }

    pub fn is_newer_than(&self, other: Timestamp) -> bool {
        self.0 > other.0
    }

    pub fn is_older_than(&self, other: Timestamp) -> bool {
        self.0 < other.0
    }

    pub fn oldest(a: Timestamp, b: Timestamp) -> Timestamp {
        a.min(b)
    }

    /// First day of the calendar bucket containing this day.
    pub fn truncate(&self, field: TruncateField, first_weekday: Weekday) -> Timestamp {
        Self(crate::calendar::truncate(field, self.0, first_weekday))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for Timestamp {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Self)
            .map_err(|e| ValidationError::InvalidValue {
                field: "date".into(),
                message: format!("'{s}' is not a YYYY-MM-DD date: {e}"),
            })
    }
}

impl From<NaiveDate> for Timestamp {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}
