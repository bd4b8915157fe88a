//! In-process API over a [`HabitStore`].
//!
//! [`HabitTracker`] owns the store, the clock and one [`HabitCache`] per
//! habit. Reads rebuild the habit's cache if it is stale and answer from it;
//! writes go to the store and invalidate the cache while holding the same
//! per-habit lock, so a reader never sees a write without its invalidation.
//! Different habits never contend on anything but the short store calls.

use chrono::{Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

use crate::cache::HabitCache;
use crate::calendar::TruncateField;
use crate::clock::{Clock, SystemClock};
use crate::engine::{best_streaks, ScoreModel};
use crate::error::{CoreError, Result, ValidationError};
use crate::models::{
    Checkmark, CheckmarkValue, Frequency, Habit, HabitId, NewHabit, Repetition,
    RepetitionStatus, Score, Streak, Timestamp,
};
use crate::storage::HabitStore;

/// Settings that change derived values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// First day of the week for weekly buckets.
    pub first_weekday: Weekday,
    pub score_model: ScoreModel,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            first_weekday: Weekday::Sat,
            score_model: ScoreModel::default(),
        }
    }
}

/// Snapshot of one habit as of today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitSummary {
    pub habit: Habit,
    pub today: Timestamp,
    pub checkmark: CheckmarkValue,
    pub score: f64,
    /// Streak ending today, if any.
    pub current_streak: Option<Streak>,
    pub best_streak: Option<Streak>,
    pub this_week: u32,
    pub this_month: u32,
    pub this_year: u32,
}

type SharedCache = Arc<Mutex<HabitCache>>;

pub struct HabitTracker<S, C = SystemClock> {
    store: Mutex<S>,
    clock: C,
    config: TrackerConfig,
    caches: Mutex<HashMap<HabitId, SharedCache>>,
}

impl<S: HabitStore> HabitTracker<S, SystemClock> {
    /// Tracker on the system clock with default settings.
    pub fn with_store(store: S) -> Self {
        Self::new(store, SystemClock)
    }
}

impl<S: HabitStore, C: Clock> HabitTracker<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self::with_config(store, clock, TrackerConfig::default())
    }

    pub fn with_config(store: S, clock: C, config: TrackerConfig) -> Self {
        Self {
            store: Mutex::new(store),
            clock,
            config,
            caches: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn today(&self) -> Timestamp {
        self.clock.today()
    }

    /// Give back the store, dropping all caches.
    pub fn into_store(self) -> Result<S> {
        self.store
            .into_inner()
            .map_err(|_| CoreError::Database(crate::error::DatabaseError::Poisoned))
    }

    fn store(&self) -> Result<MutexGuard<'_, S>> {
        Ok(self.store.lock()?)
    }

    fn cache_for(&self, id: HabitId) -> Result<SharedCache> {
        let mut caches = self.caches.lock()?;
        Ok(Arc::clone(caches.entry(id).or_default()))
    }

    fn require_habit(&self, id: HabitId) -> Result<Habit> {
        self.store()?
            .get_habit(id)?
            .ok_or(CoreError::HabitNotFound(id))
    }

    /// Run `f` on the habit's cache after bringing it up to date.
    fn with_fresh_cache<R>(
        &self,
        id: HabitId,
        f: impl FnOnce(&Habit, &HabitCache, Timestamp) -> R,
    ) -> Result<R> {
        self.require_habit(id)?;
        let shared = self.cache_for(id)?;
        let mut cache = shared.lock()?;
        // Re-read under the cache lock so a concurrent frequency change is
        // either fully visible or not at all.
        let habit = self.require_habit(id)?;
        let today = self.today();
        let model = self.config.score_model;
        if cache.is_stale(today, habit.frequency, model) {
            let reps = self.store()?.repetitions(id, None, None)?;
            cache.rebuild_if_stale(&reps, habit.frequency, model, today);
        }
        Ok(f(&habit, &cache, today))
    }

    /// Run a store mutation for `id` under the habit's cache lock.
    fn mutate<R>(
        &self,
        id: HabitId,
        f: impl FnOnce(&mut S, &mut HabitCache) -> Result<R>,
    ) -> Result<R> {
        self.require_habit(id)?;
        let shared = self.cache_for(id)?;
        let mut cache = shared.lock()?;
        let mut store = self.store()?;
        f(&mut store, &mut cache)
    }

    // === Habits ===

    pub fn create_habit(&self, habit: NewHabit) -> Result<Habit> {
        let created = self.store()?.create_habit(&habit, Utc::now())?;
        info!(id = created.id, name = %created.name, frequency = %created.frequency, "habit created");
        Ok(created)
    }

    pub fn habit(&self, id: HabitId) -> Result<Habit> {
        self.require_habit(id)
    }

    /// All habits ordered by position, archived ones included.
    pub fn habits(&self) -> Result<Vec<Habit>> {
        self.store()?.list_habits()
    }

    /// Change the target frequency. All derived values are recomputed on
    /// the next read.
    pub fn set_frequency(&self, id: HabitId, frequency: Frequency) -> Result<Habit> {
        self.mutate(id, |store, cache| {
            let mut habit = store.get_habit(id)?.ok_or(CoreError::HabitNotFound(id))?;
            habit.frequency = frequency;
            store.update_habit(&habit)?;
            cache.clear();
            debug!(id, %frequency, "habit frequency changed");
            Ok(habit)
        })
    }

    pub fn archive_habit(&self, id: HabitId, archived: bool) -> Result<Habit> {
        self.mutate(id, |store, _| {
            let mut habit = store.get_habit(id)?.ok_or(CoreError::HabitNotFound(id))?;
            habit.archived = archived;
            store.update_habit(&habit)?;
            Ok(habit)
        })
    }

    pub fn delete_habit(&self, id: HabitId) -> Result<()> {
        self.mutate(id, |store, cache| {
            store.delete_habit(id)?;
            cache.clear();
            Ok(())
        })?;
        self.caches.lock()?.remove(&id);
        info!(id, "habit deleted");
        Ok(())
    }

    // === Repetitions ===

    /// Flip `day` between a manual repetition and none. Any other status on
    /// that day becomes a manual repetition. Returns the new status.
    pub fn toggle_repetition(
        &self,
        id: HabitId,
        day: Timestamp,
    ) -> Result<Option<RepetitionStatus>> {
        self.mutate(id, |store, cache| {
            let existing = store.repetition_at(id, day)?;
            let status = match existing {
                Some(rep) if rep.status == RepetitionStatus::YesManual => {
                    store.delete_repetition(id, day)?;
                    None
                }
                _ => {
                    store.upsert_repetition(&Repetition::manual(id, day))?;
                    Some(RepetitionStatus::YesManual)
                }
            };
            cache.invalidate_from(day);
            debug!(id, %day, ?status, "repetition toggled");
            Ok(status)
        })
    }

    /// Record `status` on `day`. [`RepetitionStatus::Unknown`] removes the
    /// repetition.
    ///
    /// # Errors
    /// [`RepetitionStatus::YesAuto`] is derived-only and is rejected with a
    /// validation error.
    pub fn set_repetition(
        &self,
        id: HabitId,
        day: Timestamp,
        status: RepetitionStatus,
    ) -> Result<()> {
        if status == RepetitionStatus::YesAuto {
            return Err(ValidationError::InvalidValue {
                field: "status".into(),
                message: "yes_auto is derived and cannot be recorded".into(),
            }
            .into());
        }
        self.mutate(id, |store, cache| {
            if status == RepetitionStatus::Unknown {
                store.delete_repetition(id, day)?;
            } else {
                store.upsert_repetition(&Repetition::new(id, day, status))?;
            }
            cache.invalidate_from(day);
            debug!(id, %day, %status, "repetition set");
            Ok(())
        })
    }

    /// Repetitions in `[from, to]`, oldest first.
    pub fn repetitions(&self, id: HabitId, from: Timestamp, to: Timestamp) -> Result<Vec<Repetition>> {
        self.require_habit(id)?;
        if from.is_newer_than(to) {
            return Ok(Vec::new());
        }
        self.store()?.repetitions(id, Some(from), Some(to))
    }

    // === Checkmarks ===

    /// One checkmark per day in `[from, to]`, newest first.
    pub fn checkmarks(&self, id: HabitId, from: Timestamp, to: Timestamp) -> Result<Vec<Checkmark>> {
        self.with_fresh_cache(id, |_, cache, _| cache.checkmarks().range(from, to))
    }

    pub fn checkmark_values(
        &self,
        id: HabitId,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<CheckmarkValue>> {
        Ok(self
            .checkmarks(id, from, to)?
            .into_iter()
            .map(|c| c.value)
            .collect())
    }

    /// Whole history up to today, newest first.
    pub fn all_checkmarks(&self, id: HabitId) -> Result<Vec<Checkmark>> {
        self.with_fresh_cache(id, |_, cache, today| {
            let series = cache.checkmarks();
            match series.begin() {
                Some(begin) => series.range(begin, today),
                None => Vec::new(),
            }
        })
    }

    // === Scores ===

    /// Score on `day`; zero before the first repetition and after today.
    pub fn score(&self, id: HabitId, day: Timestamp) -> Result<f64> {
        self.with_fresh_cache(id, |_, cache, _| cache.scores().value_at(day))
    }

    /// One score per day in `[from, to]`, newest first.
    pub fn scores(&self, id: HabitId, from: Timestamp, to: Timestamp) -> Result<Vec<Score>> {
        self.with_fresh_cache(id, |_, cache, _| cache.scores().range(from, to))
    }

    pub fn today_score(&self, id: HabitId) -> Result<f64> {
        self.with_fresh_cache(id, |_, cache, today| cache.scores().value_at(today))
    }

    // === Streaks ===

    /// All streaks, newest first.
    pub fn streaks(&self, id: HabitId) -> Result<Vec<Streak>> {
        self.with_fresh_cache(id, |_, cache, _| {
            cache.streaks().iter().rev().copied().collect()
        })
    }

    /// See [`crate::engine::best_streaks`].
    pub fn best_streaks(&self, id: HabitId, limit: usize) -> Result<Vec<Streak>> {
        self.with_fresh_cache(id, |_, cache, today| {
            best_streaks(cache.streaks(), today, limit)
        })
    }

    // === Aggregations ===

    /// Today's checkmark.
    pub fn today_value(&self, id: HabitId) -> Result<CheckmarkValue> {
        self.with_fresh_cache(id, |_, cache, today| cache.checkmarks().value_at(today))
    }

    /// Manual repetitions since the start of the current week.
    pub fn this_week_value(&self, id: HabitId) -> Result<u32> {
        self.bucket_value(id, TruncateField::Week)
    }

    pub fn this_month_value(&self, id: HabitId) -> Result<u32> {
        self.bucket_value(id, TruncateField::Month)
    }

    pub fn this_quarter_value(&self, id: HabitId) -> Result<u32> {
        self.bucket_value(id, TruncateField::Quarter)
    }

    pub fn this_year_value(&self, id: HabitId) -> Result<u32> {
        self.bucket_value(id, TruncateField::Year)
    }

    fn bucket_value(&self, id: HabitId, field: TruncateField) -> Result<u32> {
        let first_weekday = self.config.first_weekday;
        self.with_fresh_cache(id, |_, cache, today| {
            manual_count(cache, today.truncate(field, first_weekday), today)
        })
    }

    /// Manual repetitions per calendar bucket, newest bucket first, at
    /// most `max_groups` buckets. Each entry is keyed by the bucket's first
    /// day.
    pub fn checkmark_groups(
        &self,
        id: HabitId,
        field: TruncateField,
        max_groups: usize,
    ) -> Result<Vec<(Timestamp, u32)>> {
        let first_weekday = self.config.first_weekday;
        self.with_fresh_cache(id, |_, cache, today| {
            group_history(cache, today, field, first_weekday, max_groups)
                .into_iter()
                .map(|(bucket, days)| {
                    let count = days
                        .iter()
                        .filter(|d| cache.checkmarks().value_at(**d) == CheckmarkValue::YesManual)
                        .count();
                    (bucket, count as u32)
                })
                .collect()
        })
    }

    /// Average daily score per calendar bucket, newest bucket first.
    pub fn score_groups(&self, id: HabitId, field: TruncateField) -> Result<Vec<Score>> {
        let first_weekday = self.config.first_weekday;
        self.with_fresh_cache(id, |_, cache, today| {
            group_history(cache, today, field, first_weekday, usize::MAX)
                .into_iter()
                .map(|(bucket, days)| {
                    let total: f64 = days.iter().map(|d| cache.scores().value_at(*d)).sum();
                    Score::new(bucket, total / days.len() as f64)
                })
                .collect()
        })
    }

    /// Manual repetitions per weekday, one row per month keyed by the
    /// month's first day. Index 0 is Saturday, 1 Sunday, through 6 Friday.
    pub fn weekday_frequency(&self, id: HabitId) -> Result<BTreeMap<Timestamp, [u32; 7]>> {
        let first_weekday = self.config.first_weekday;
        self.with_fresh_cache(id, |_, cache, _| {
            let mut frequency: BTreeMap<Timestamp, [u32; 7]> = BTreeMap::new();
            let Some(begin) = cache.checkmarks().begin() else {
                return frequency;
            };
            for (offset, value) in cache.checkmarks().values().iter().enumerate() {
                if *value != CheckmarkValue::YesManual {
                    continue;
                }
                let day = begin.plus(offset as i64);
                let month = day.truncate(TruncateField::Month, first_weekday);
                let weekday = (day.weekday().num_days_from_sunday() + 1) % 7;
                frequency.entry(month).or_default()[weekday as usize] += 1;
            }
            frequency
        })
    }

    pub fn summary(&self, id: HabitId) -> Result<HabitSummary> {
        let first_weekday = self.config.first_weekday;
        self.with_fresh_cache(id, |habit, cache, today| {
            let current_streak = cache.streaks().last().filter(|s| s.end == today).copied();
            let best_streak = cache
                .streaks()
                .iter()
                .max_by(|a, b| a.compare_longer(b))
                .copied();
            let since = |field| manual_count(cache, today.truncate(field, first_weekday), today);
            HabitSummary {
                habit: habit.clone(),
                today,
                checkmark: cache.checkmarks().value_at(today),
                score: cache.scores().value_at(today),
                current_streak,
                best_streak,
                this_week: since(TruncateField::Week),
                this_month: since(TruncateField::Month),
                this_year: since(TruncateField::Year),
            }
        })
    }
}

fn manual_count(cache: &HabitCache, from: Timestamp, to: Timestamp) -> u32 {
    cache
        .checkmarks()
        .range(from, to)
        .iter()
        .filter(|c| c.value == CheckmarkValue::YesManual)
        .count() as u32
}

/// History days from today back to the start of the history, grouped by
/// bucket, newest first.
fn group_history(
    cache: &HabitCache,
    today: Timestamp,
    field: TruncateField,
    first_weekday: Weekday,
    max_groups: usize,
) -> Vec<(Timestamp, Vec<Timestamp>)> {
    let Some(begin) = cache.checkmarks().begin() else {
        return Vec::new();
    };
    let mut groups: Vec<(Timestamp, Vec<Timestamp>)> = Vec::new();
    let mut day = today;
    while !day.is_older_than(begin) {
        let bucket = day.truncate(field, first_weekday);
        if groups.last().map(|(b, _)| *b) != Some(bucket) {
            if groups.len() == max_groups {
                break;
            }
            groups.push((bucket, Vec::new()));
        }
        if let Some((_, days)) = groups.last_mut() {
            days.push(day);
        }
        day = day.minus(1);
    }
    groups
}
