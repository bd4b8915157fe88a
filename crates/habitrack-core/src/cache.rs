//! Per-habit memoization of derived values.
//!
//! A [`HabitCache`] is never authoritative. Mutations record the oldest
//! touched day through [`HabitCache::invalidate_from`]; the next read calls
//! [`HabitCache::rebuild_if_stale`] with the habit's repetitions, which
//! recomputes checkmarks, compares them with the previous series and
//! resumes scores and streaks from the last still-valid entry.

use tracing::debug;

use crate::engine::{
    compute_checkmarks, compute_scores, compute_streaks, CheckmarkSeries, ScoreModel,
    ScoreSeries,
};
use crate::models::{Frequency, Repetition, Streak, Timestamp};

#[derive(Debug, Default)]
pub struct HabitCache {
    checkmarks: CheckmarkSeries,
    scores: ScoreSeries,
    /// Oldest first.
    streaks: Vec<Streak>,
    /// Day the cache was last rebuilt for.
    built_for: Option<Timestamp>,
    /// Oldest day touched by a mutation since the last rebuild.
    dirty_from: Option<Timestamp>,
    /// Inputs the cached values were derived from.
    frequency: Option<Frequency>,
    model: Option<ScoreModel>,
}

impl HabitCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a repetition change on `day`.
    ///
    /// Scores from `day` and streaks ending on or after the day before are
    /// dropped at the next rebuild, together with anything the recomputed
    /// checkmarks show to have changed.
    pub fn invalidate_from(&mut self, day: Timestamp) {
        self.dirty_from = Some(match self.dirty_from {
            Some(prev) => Timestamp::oldest(prev, day),
            None => day,
        });
        debug!(%day, "habit cache invalidated");
    }

    /// Forget everything, e.g. after a frequency change.
    pub fn clear(&mut self) {
        *self = Self::default();
        debug!("habit cache cleared");
    }

    pub fn is_stale(&self, today: Timestamp, frequency: Frequency, model: ScoreModel) -> bool {
        self.dirty_from.is_some()
            || self.built_for != Some(today)
            || self.frequency != Some(frequency)
            || self.model != Some(model)
    }

    /// Bring every derived value up to `today`. `reps` must hold all of the
    /// habit's repetitions, oldest first.
    ///
    /// Days that exist in only one of the old and new checkmark series
    /// count as changed, so moving `today` in either direction is handled
    /// like any other edit.
    pub fn rebuild_if_stale(
        &mut self,
        reps: &[Repetition],
        frequency: Frequency,
        model: ScoreModel,
        today: Timestamp,
    ) {
        if !self.is_stale(today, frequency, model) {
            return;
        }
        if self.frequency != Some(frequency) || self.model != Some(model) {
            self.clear();
        }

        let checkmarks = compute_checkmarks(reps, frequency, today);
        let changed_from = self.checkmarks.first_difference(&checkmarks);
        let invalid_from = match (self.dirty_from, changed_from) {
            (Some(a), Some(b)) => Some(Timestamp::oldest(a, b)),
            (a, b) => a.or(b),
        };

        if let Some(day) = invalid_from {
            self.scores.truncate_from(day);
            let cutoff = day.minus(1);
            self.streaks.retain(|s| s.end.is_older_than(cutoff));
        }
        self.checkmarks = checkmarks;

        let resume = self.scores.last();
        let fresh = compute_scores(&self.checkmarks, frequency, model, resume, today);
        self.scores.extend(&fresh);

        let resume_streak = self.streaks.pop().map(|s| s.start);
        let fresh_streaks = compute_streaks(&self.checkmarks, resume_streak);
        self.streaks.extend(fresh_streaks);

        debug!(
            %today,
            invalid_from = ?invalid_from,
            checkmarks = self.checkmarks.len(),
            new_scores = fresh.len(),
            streaks = self.streaks.len(),
            "habit cache rebuilt"
        );

        self.built_for = Some(today);
        self.dirty_from = None;
        self.frequency = Some(frequency);
        self.model = Some(model);
    }

    pub fn checkmarks(&self) -> &CheckmarkSeries {
        &self.checkmarks
    }

    pub fn scores(&self) -> &ScoreSeries {
        &self.scores
    }

    /// Oldest first.
    pub fn streaks(&self) -> &[Streak] {
        &self.streaks
    }
}
