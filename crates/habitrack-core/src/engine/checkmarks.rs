//! Checkmark derivation.
//!
//! For non-daily habits one group of repetitions produces many checkmarks:
//! a weekly repetition satisfies the seven days starting on it, and two
//! repetitions close enough together satisfy a twice-a-week habit for a
//! whole week. Each such group is represented by an [`Interval`].
//!
//! The pipeline is three pure passes:
//!
//! 1. [`build_intervals`] turns sorted hits into one interval per window of
//!    `numerator` consecutive hits spanning fewer than `denominator` days.
//! 2. [`snap_intervals`] slides overlapping intervals back in time so that
//!    back-to-back windows join up instead of leaving gaps.
//! 3. [`build_checkmarks_from_intervals`] paints the dense per-day series.
//!
//! Every day whose trailing `denominator`-day window holds at least
//! `numerator` hits ends up at least [`CheckmarkValue::YesAuto`]. Snapping
//! can additionally mark days just before a group's first hit, but never
//! days before the oldest repetition.

use serde::{Deserialize, Serialize};

use crate::models::{Checkmark, CheckmarkValue, Frequency, Repetition, Timestamp};

/// Days implicitly satisfied by one group of hits.
///
/// `begin` is the first hit of the group (or earlier, after snapping),
/// `center` the last hit, `end` the last day the group covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub begin: Timestamp,
    pub center: Timestamp,
    pub end: Timestamp,
}

impl Interval {
    pub fn new(begin: Timestamp, center: Timestamp, end: Timestamp) -> Self {
        Self { begin, center, end }
    }
}

/// Build one interval per run of `numerator` consecutive hits that fits in
/// a `denominator`-day window. `reps` must be sorted oldest first; only
/// manual repetitions count as hits.
pub fn build_intervals(frequency: Frequency, reps: &[Repetition]) -> Vec<Interval> {
    let num = frequency.numerator() as usize;
    let den = frequency.denominator() as i64;

    let hits: Vec<Timestamp> = reps
        .iter()
        .filter(|r| r.is_hit())
        .map(|r| r.timestamp)
        .collect();

    hits.windows(num)
        .filter_map(|group| {
            let first = group[0];
            let last = group[num - 1];
            if first.days_until(last) >= den {
                return None;
            }
            Some(Interval::new(first, last, first.plus(den - 1)))
        })
        .collect()
}

/// Starting from the second newest interval, slide each interval back in
/// time when it reaches into its (already snapped) successor, so gaps close
/// and streaks are as long as the hits allow. An interval never slides past
/// its own center.
pub fn snap_intervals(intervals: &[Interval]) -> Vec<Interval> {
    let mut snapped = intervals.to_vec();
    for i in (0..snapped.len().saturating_sub(1)).rev() {
        let curr = snapped[i];
        let next = snapped[i + 1];

        let gap_next_to_current = next.begin.days_until(curr.end);
        let gap_center_to_end = curr.center.days_until(curr.end);

        if gap_next_to_current >= 0 {
            let shift = gap_center_to_end.min(gap_next_to_current + 1);
            snapped[i] = Interval::new(curr.begin.minus(shift), curr.center, curr.end.minus(shift));
        }
    }
    snapped
}

/// Dense checkmarks from the oldest repetition to `today`, newest first.
///
/// Days default to [`CheckmarkValue::Unknown`], interval days inside that
/// span become [`CheckmarkValue::YesAuto`] and days with a manual repetition
/// become [`CheckmarkValue::YesManual`]. Skips and other statuses leave the
/// derived value untouched. Only the part of each interval inside the span
/// is visited, so the cost does not depend on the denominator.
pub fn build_checkmarks_from_intervals(
    reps: &[Repetition],
    intervals: &[Interval],
    today: Timestamp,
) -> Vec<Checkmark> {
    let Some(oldest_rep) = reps.first() else {
        return Vec::new();
    };
    let begin = oldest_rep.timestamp;

    let n_days = begin.days_until(today) + 1;
    if n_days <= 0 {
        return Vec::new();
    }

    let mut checkmarks: Vec<Checkmark> = (0..n_days)
        .map(|offset| Checkmark::new(today.minus(offset), CheckmarkValue::Unknown))
        .collect();

    for interval in intervals {
        let newest = interval.end.days_until(today).max(0);
        let oldest = interval.begin.days_until(today).min(n_days - 1);
        for offset in newest..=oldest {
            checkmarks[offset as usize].value = CheckmarkValue::YesAuto;
        }
    }

    for rep in reps.iter().filter(|r| r.is_hit()) {
        let offset = rep.timestamp.days_until(today);
        if offset < 0 || offset >= n_days {
            continue;
        }
        checkmarks[offset as usize].value = CheckmarkValue::YesManual;
    }

    checkmarks
}

/// Dense checkmark history of one habit, stored oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckmarkSeries {
    begin: Option<Timestamp>,
    values: Vec<CheckmarkValue>,
}

impl CheckmarkSeries {
    /// Build from newest-first checkmarks covering consecutive days.
    pub fn from_newest_first(checkmarks: &[Checkmark]) -> Self {
        Self {
            begin: checkmarks.last().map(|c| c.timestamp),
            values: checkmarks.iter().rev().map(|c| c.value).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Oldest day of the history.
    pub fn begin(&self) -> Option<Timestamp> {
        self.begin
    }

    /// Newest day of the history.
    pub fn end(&self) -> Option<Timestamp> {
        self.begin
            .filter(|_| !self.values.is_empty())
            .map(|b| b.plus(self.values.len() as i64 - 1))
    }

    /// Values, oldest first.
    pub fn values(&self) -> &[CheckmarkValue] {
        &self.values
    }

    /// Value on `day`; days outside the history are unknown.
    pub fn value_at(&self, day: Timestamp) -> CheckmarkValue {
        let Some(begin) = self.begin else {
            return CheckmarkValue::Unknown;
        };
        let offset = begin.days_until(day);
        if offset < 0 {
            return CheckmarkValue::Unknown;
        }
        self.values
            .get(offset as usize)
            .copied()
            .unwrap_or(CheckmarkValue::Unknown)
    }

    /// One checkmark per day in `[from, to]`, newest first. Empty when
    /// `from` is after `to`.
    pub fn range(&self, from: Timestamp, to: Timestamp) -> Vec<Checkmark> {
        if from.is_newer_than(to) {
            return Vec::new();
        }
        (0..=from.days_until(to))
            .map(|i| {
                let day = to.minus(i);
                Checkmark::new(day, self.value_at(day))
            })
            .collect()
    }

    /// Drop every value on or after `day`.
    pub fn truncate_from(&mut self, day: Timestamp) {
        let Some(begin) = self.begin else {
            return;
        };
        let keep = begin.days_until(day).max(0) as usize;
        self.values.truncate(keep);
        if self.values.is_empty() {
            self.begin = None;
        }
    }

    /// Oldest day whose value differs between `self` and `other`, including
    /// days present in only one of them.
    pub fn first_difference(&self, other: &CheckmarkSeries) -> Option<Timestamp> {
        let (a_begin, b_begin) = match (self.begin, other.begin) {
            (None, None) => return None,
            (Some(a), None) => return Some(a),
            (None, Some(b)) => return Some(b),
            (Some(a), Some(b)) => (a, b),
        };
        let start = Timestamp::oldest(a_begin, b_begin);
        let stop = match (self.end(), other.end()) {
            (Some(a), Some(b)) => a.max(b),
            (a, b) => a.or(b)?,
        };
        let mut day = start;
        while !day.is_newer_than(stop) {
            let in_a = self.covers(day);
            let in_b = other.covers(day);
            if in_a != in_b || self.value_at(day) != other.value_at(day) {
                return Some(day);
            }
            day = day.plus(1);
        }
        None
    }

    fn covers(&self, day: Timestamp) -> bool {
        match (self.begin, self.end()) {
            (Some(b), Some(e)) => !day.is_older_than(b) && !day.is_newer_than(e),
            _ => false,
        }
    }
}

/// Full checkmark history for `reps` (sorted oldest first) as of `today`.
pub fn compute_checkmarks(
    reps: &[Repetition],
    frequency: Frequency,
    today: Timestamp,
) -> CheckmarkSeries {
    let intervals = snap_intervals(&build_intervals(frequency, reps));
    CheckmarkSeries::from_newest_first(&build_checkmarks_from_intervals(reps, &intervals, today))
}
