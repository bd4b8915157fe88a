//! Streak extraction from a checkmark history.

use super::checkmarks::CheckmarkSeries;
use crate::models::{CheckmarkValue, Streak, Timestamp};

/// One streak per maximal run of done days in `values` (oldest first, the
/// first entry being `beginning`). A run still open at the last value ends
/// on that day.
pub fn checkmarks_to_streaks(beginning: Timestamp, values: &[CheckmarkValue]) -> Vec<Streak> {
    let mut streaks = Vec::new();
    let mut open: Option<Timestamp> = None;

    for (offset, value) in values.iter().enumerate() {
        let day = beginning.plus(offset as i64);
        match (open, value.is_done()) {
            (None, true) => open = Some(day),
            (Some(start), false) => {
                streaks.push(Streak::new(start, day.minus(1)));
                open = None;
            }
            _ => {}
        }
    }
    if let Some(start) = open {
        streaks.push(Streak::new(start, beginning.plus(values.len() as i64 - 1)));
    }
    streaks
}

/// Streaks of `checkmarks` from `from` (or the start of the history) on.
pub fn compute_streaks(checkmarks: &CheckmarkSeries, from: Option<Timestamp>) -> Vec<Streak> {
    let Some(begin) = checkmarks.begin() else {
        return Vec::new();
    };
    let start = from.map_or(begin, |f| f.max(begin));
    let skip = begin.days_until(start) as usize;
    match checkmarks.values().get(skip..) {
        Some(values) => checkmarks_to_streaks(start, values),
        None => Vec::new(),
    }
}

/// Up to `limit` streaks: the one ending `today` first, then longest, then
/// most recent.
pub fn best_streaks(streaks: &[Streak], today: Timestamp, limit: usize) -> Vec<Streak> {
    let mut ranked = streaks.to_vec();
    ranked.sort_by(|a, b| {
        (b.end == today)
            .cmp(&(a.end == today))
            .then_with(|| b.compare_longer(a))
    });
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::checkmarks::compute_checkmarks;
    use crate::models::{Frequency, Repetition, RepetitionStatus};
    use proptest::prelude::*;
    use CheckmarkValue::{Unknown, YesAuto, YesManual};

    fn today() -> Timestamp {
        Timestamp::from_ymd(2015, 1, 25).unwrap()
    }

    fn day(offset: i64) -> Timestamp {
        today().minus(offset)
    }

    #[test]
    fn runs_become_streaks() {
        let begin = day(9);
        let values = [
            YesManual, YesAuto, Unknown, Unknown, YesManual, Unknown, YesAuto, YesAuto, YesManual,
            YesManual,
        ];
        let streaks = checkmarks_to_streaks(begin, &values);
        assert_eq!(
            streaks,
            vec![
                Streak::new(day(9), day(8)),
                Streak::new(day(5), day(5)),
                Streak::new(day(3), day(0)),
            ]
        );
    }

    #[test]
    fn run_open_at_beginning_starts_there() {
        let streaks = checkmarks_to_streaks(day(2), &[YesAuto, Unknown, Unknown]);
        assert_eq!(streaks, vec![Streak::new(day(2), day(2))]);
        assert!(checkmarks_to_streaks(day(2), &[]).is_empty());
    }

    #[test]
    fn compute_resumes_mid_history() {
        let reps: Vec<Repetition> = [6, 5, 2, 1]
            .iter()
            .map(|&o| Repetition::new(1, day(o), RepetitionStatus::YesManual))
            .collect();
        let checkmarks = compute_checkmarks(&reps, Frequency::DAILY, today());
        assert_eq!(
            compute_streaks(&checkmarks, None),
            vec![Streak::new(day(6), day(5)), Streak::new(day(2), day(1))]
        );
        assert_eq!(
            compute_streaks(&checkmarks, Some(day(2))),
            vec![Streak::new(day(2), day(1))]
        );
        assert_eq!(
            compute_streaks(&checkmarks, Some(day(100))),
            compute_streaks(&checkmarks, None)
        );
        assert!(compute_streaks(&checkmarks, Some(day(-1))).is_empty());
    }

    #[test]
    fn current_streak_ranks_first() {
        let streaks = vec![
            Streak::new(day(40), day(20)),
            Streak::new(day(18), day(15)),
            Streak::new(day(12), day(9)),
            Streak::new(day(1), day(0)),
        ];
        let best = best_streaks(&streaks, today(), 3);
        assert_eq!(
            best,
            vec![
                Streak::new(day(1), day(0)),
                Streak::new(day(40), day(20)),
                Streak::new(day(12), day(9)),
            ]
        );
        assert!(best_streaks(&streaks, today(), 0).is_empty());
    }

    proptest! {
        #[test]
        fn streaks_and_gaps_partition_history(raw in proptest::collection::vec(0u8..3, 0..80)) {
            let values: Vec<CheckmarkValue> = raw
                .iter()
                .map(|v| CheckmarkValue::from_i64(*v as i64).unwrap_or_default())
                .collect();
            let begin = day(values.len() as i64);
            let streaks = checkmarks_to_streaks(begin, &values);

            let mut rebuilt = vec![false; values.len()];
            let mut last_end: Option<Timestamp> = None;
            for streak in &streaks {
                prop_assert!(streak.length() >= 1);
                if let Some(end) = last_end {
                    // Maximal runs are separated by at least one gap day.
                    prop_assert!(end.days_until(streak.start) >= 2);
                }
                for i in 0..streak.length() {
                    let offset = begin.days_until(streak.start.plus(i)) as usize;
                    prop_assert!(!rebuilt[offset]);
                    rebuilt[offset] = true;
                }
                last_end = Some(streak.end);
            }
            let done: Vec<bool> = values.iter().map(|v| v.is_done()).collect();
            prop_assert_eq!(rebuilt, done);
        }
    }
}
