//! Persistence collaborator consumed by the tracker.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Habit, HabitId, NewHabit, Repetition, Timestamp};

/// Source of truth for habits and their repetitions.
///
/// At most one repetition exists per (habit, day). Range queries are
/// inclusive and return repetitions oldest first.
pub trait HabitStore: Send {
    fn create_habit(&mut self, habit: &NewHabit, created_at: DateTime<Utc>) -> Result<Habit>;

    fn get_habit(&self, id: HabitId) -> Result<Option<Habit>>;

    /// All habits ordered by position.
    fn list_habits(&self) -> Result<Vec<Habit>>;

    /// Overwrite name, description, frequency, archived flag and position.
    fn update_habit(&mut self, habit: &Habit) -> Result<()>;

    /// Remove a habit and its repetitions. Returns whether it existed.
    fn delete_habit(&mut self, id: HabitId) -> Result<bool>;

    /// Repetitions in `[from, to]`; `None` leaves that side open.
    fn repetitions(
        &self,
        id: HabitId,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    ) -> Result<Vec<Repetition>>;

    fn repetition_at(&self, id: HabitId, day: Timestamp) -> Result<Option<Repetition>>;

    /// Insert or replace the repetition on `rep.timestamp`.
    fn upsert_repetition(&mut self, rep: &Repetition) -> Result<()>;

    /// Returns whether a repetition was removed.
    fn delete_repetition(&mut self, id: HabitId, day: Timestamp) -> Result<bool>;
}
