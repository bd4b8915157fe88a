use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::Timestamp;

/// A maximal run of consecutive done days, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Streak {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Streak {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Number of days covered.
    pub fn length(&self) -> i64 {
        self.start.days_until(self.end) + 1
    }

    /// Longer first, ties broken by the newer end.
    pub fn compare_longer(&self, other: &Streak) -> Ordering {
        self.length()
            .cmp(&other.length())
            .then_with(|| self.compare_newer(other))
    }

    pub fn compare_newer(&self, other: &Streak) -> Ordering {
        self.end.cmp(&other.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> Timestamp {
        Timestamp::from_ymd(2024, 3, d).unwrap()
    }

    #[test]
    fn length_is_inclusive() {
        assert_eq!(Streak::new(day(1), day(1)).length(), 1);
        assert_eq!(Streak::new(day(1), day(10)).length(), 10);
    }

    #[test]
    fn longer_wins_then_newer() {
        let long = Streak::new(day(1), day(5));
        let short_new = Streak::new(day(10), day(12));
        let short_old = Streak::new(day(6), day(8));
        assert_eq!(long.compare_longer(&short_new), Ordering::Greater);
        assert_eq!(short_new.compare_longer(&short_old), Ordering::Greater);
    }
}
