//! Habit strength scores.
//!
//! A score is an exponentially decayed count of manual hits. Every day the
//! previous score is multiplied by a frequency-dependent factor; a day with
//! a manual repetition then adds a bonus, capped at the maximum. Implicit
//! (auto) days and skips decay like any other non-hit day.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::checkmarks::CheckmarkSeries;
use crate::error::ValidationError;
use crate::models::{CheckmarkValue, Frequency, Score, Timestamp};

/// Fixed-point ceiling of the legacy model.
pub const LEGACY_MAX_SCORE: i64 = 19_259_500;
/// Fixed-point bonus of the legacy model.
pub const LEGACY_HIT_BONUS: i64 = 1_000_000;

/// Calibration of the score recurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreModel {
    /// Floating point, tuned so that weekly and monthly habits saturate as
    /// fast as daily ones.
    #[default]
    Balanced,
    /// Integer fixed point with a `0.5^(1/(14/f - 1))` decay. Reproduces
    /// scores exported by older releases.
    Legacy,
}

impl ScoreModel {
    /// Daily decay factor for `frequency`.
    pub fn multiplier(&self, frequency: Frequency) -> f64 {
        let f = frequency.to_f64();
        match self {
            ScoreModel::Balanced => 0.5f64.powf(f.sqrt() / 13.0),
            ScoreModel::Legacy => 0.5f64.powf(1.0 / (14.0 / f - 1.0)),
        }
    }

    /// Normalized amount a hit adds before capping.
    pub fn hit_bonus(&self, frequency: Frequency) -> f64 {
        match self {
            ScoreModel::Balanced => {
                1.0 - self.multiplier(frequency).powf(1.0 / frequency.to_f64())
            }
            ScoreModel::Legacy => LEGACY_HIT_BONUS as f64 / LEGACY_MAX_SCORE as f64,
        }
    }

    /// Score of a day given the previous day's score and the day's
    /// checkmark. Both scores are normalized to `0.0..=1.0`.
    pub fn next(&self, previous: f64, value: CheckmarkValue, frequency: Frequency) -> f64 {
        let multiplier = self.multiplier(frequency);
        let hit = value == CheckmarkValue::YesManual;
        match self {
            ScoreModel::Balanced => {
                let mut score = previous * multiplier;
                if hit {
                    score = (score + self.hit_bonus(frequency)).min(1.0);
                }
                score
            }
            ScoreModel::Legacy => {
                let fixed = (previous * LEGACY_MAX_SCORE as f64).round() as i64;
                let mut fixed = (fixed as f64 * multiplier) as i64;
                if hit {
                    fixed = (fixed + LEGACY_HIT_BONUS).min(LEGACY_MAX_SCORE);
                }
                fixed as f64 / LEGACY_MAX_SCORE as f64
            }
        }
    }
}

impl fmt::Display for ScoreModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreModel::Balanced => write!(f, "balanced"),
            ScoreModel::Legacy => write!(f, "legacy"),
        }
    }
}

impl FromStr for ScoreModel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "balanced" => Ok(ScoreModel::Balanced),
            "legacy" => Ok(ScoreModel::Legacy),
            other => Err(ValidationError::InvalidValue {
                field: "scoring.model".into(),
                message: format!("unknown score model '{other}'"),
            }),
        }
    }
}

/// Dense daily scores, stored oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreSeries {
    begin: Option<Timestamp>,
    values: Vec<f64>,
}

impl ScoreSeries {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn begin(&self) -> Option<Timestamp> {
        self.begin
    }

    /// Newest computed score.
    pub fn last(&self) -> Option<Score> {
        let begin = self.begin?;
        let value = *self.values.last()?;
        Some(Score::new(begin.plus(self.values.len() as i64 - 1), value))
    }

    /// Score on `day`. Days outside the computed range score zero.
    pub fn value_at(&self, day: Timestamp) -> f64 {
        let Some(begin) = self.begin else {
            return 0.0;
        };
        let offset = begin.days_until(day);
        if offset < 0 {
            return 0.0;
        }
        self.values.get(offset as usize).copied().unwrap_or(0.0)
    }

    /// One score per day in `[from, to]`, newest first.
    pub fn range(&self, from: Timestamp, to: Timestamp) -> Vec<Score> {
        if from.is_newer_than(to) {
            return Vec::new();
        }
        (0..=from.days_until(to))
            .map(|i| {
                let day = to.minus(i);
                Score::new(day, self.value_at(day))
            })
            .collect()
    }

    /// Append consecutive scores. The first must be the day after
    /// [`ScoreSeries::last`], or any day when the series is empty.
    pub fn extend(&mut self, scores: &[Score]) {
        let Some(first) = scores.first() else {
            return;
        };
        if self.begin.is_none() || self.values.is_empty() {
            self.begin = Some(first.timestamp);
        }
        self.values.extend(scores.iter().map(|s| s.value));
    }

    /// Drop every score on or after `day`.
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
}

/// Scores for every day after `resume` (or from the start of `checkmarks`
/// when nothing is cached) through `to`, oldest first.
pub fn compute_scores(
    checkmarks: &CheckmarkSeries,
    frequency: Frequency,
    model: ScoreModel,
    resume: Option<Score>,
    to: Timestamp,
) -> Vec<Score> {
    let (mut day, mut previous) = match resume {
        Some(score) => (score.timestamp.plus(1), score.value),
        None => match checkmarks.begin() {
            Some(begin) => (begin, 0.0),
            None => return Vec::new(),
        },
    };

    let mut scores = Vec::new();
    while !day.is_newer_than(to) {
        previous = model.next(previous, checkmarks.value_at(day), frequency);
        scores.push(Score::new(day, previous));
        day = day.plus(1);
    }
    scores
}
