//! SQLite-based habit storage.
//!
//! Provides persistent storage for:
//! - Habits and their frequency
//! - Repetitions, one per habit and day

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::info;

use super::{data_dir, migrations, HabitStore};
use crate::error::{CoreError, DatabaseError, Result};
use crate::models::{Frequency, Habit, HabitId, NewHabit, Repetition, RepetitionStatus, Timestamp};

// === Helper Functions ===

fn conversion_error<E>(idx: usize, ty: Type, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, ty, Box::new(err))
}

/// Parse a `YYYY-MM-DD` day column.
fn parse_day(idx: usize, text: &str) -> Result<Timestamp, rusqlite::Error> {
    text.parse().map_err(|e| conversion_error(idx, Type::Text, e))
}

fn parse_status(idx: usize, code: i64) -> Result<RepetitionStatus, rusqlite::Error> {
    RepetitionStatus::from_code(code).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, code))
}

fn row_to_habit(row: &rusqlite::Row) -> Result<Habit, rusqlite::Error> {
    let numerator: i64 = row.get(3)?;
    let denominator: i64 = row.get(4)?;
    let frequency =
        Frequency::new(numerator, denominator).map_err(|e| conversion_error(3, Type::Integer, e))?;
    let created_at: String = row.get(7)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| conversion_error(7, Type::Text, e))?
        .with_timezone(&Utc);

    Ok(Habit {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        frequency,
        archived: row.get(5)?,
        position: row.get(6)?,
        created_at,
    })
}

fn row_to_repetition(row: &rusqlite::Row) -> Result<Repetition, rusqlite::Error> {
    let day: String = row.get(1)?;
    Ok(Repetition::new(
        row.get(0)?,
        parse_day(1, &day)?,
        parse_status(2, row.get(2)?)?,
    ))
}

const HABIT_COLUMNS: &str =
    "id, name, description, freq_num, freq_den, archived, position, created_at";

/// SQLite database for habits and repetitions.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/habitrack/habitrack.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("habitrack.db");
        Self::open_at(&path)
    }

    /// Open (or create) the database at `path`.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        info!(path = %path.display(), "opened habit database");
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| DatabaseError::OpenFailed {
            path: ":memory:".into(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        migrations::migrate(&self.conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    /// Run `f` inside an immediate transaction, rolling back on error.
    fn transaction<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        self.conn.execute_batch("BEGIN IMMEDIATE TRANSACTION;")?;
        match f(&self.conn) {
            Ok(value) => {
                self.conn.execute_batch("COMMIT;")?;
                Ok(value)
            }
            Err(err) => {
                let _ = self.conn.execute_batch("ROLLBACK;");
                Err(err)
            }
        }
    }

    fn habit_exists(&self, id: HabitId) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM habits WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

impl HabitStore for Database {
    fn create_habit(&mut self, habit: &NewHabit, created_at: DateTime<Utc>) -> Result<Habit> {
        habit.validate()?;
        self.transaction(|conn| {
            let position: u32 =
                conn.query_row("SELECT COUNT(*) FROM habits", [], |row| row.get(0))?;
            conn.execute(
                "INSERT INTO habits (name, description, freq_num, freq_den, archived, position, created_at)
                 VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6)",
                params![
                    habit.name,
                    habit.description,
                    habit.frequency.numerator(),
                    habit.frequency.denominator(),
                    position,
                    created_at.to_rfc3339(),
                ],
            )?;
            Ok(Habit {
                id: conn.last_insert_rowid(),
                name: habit.name.clone(),
                description: habit.description.clone(),
                frequency: habit.frequency,
                archived: false,
                position,
                created_at,
            })
        })
    }

    fn get_habit(&self, id: HabitId) -> Result<Option<Habit>> {
        let habit = self
            .conn
            .query_row(
                &format!("SELECT {HABIT_COLUMNS} FROM habits WHERE id = ?1"),
                params![id],
                row_to_habit,
            )
            .optional()?;
        Ok(habit)
    }

    fn list_habits(&self) -> Result<Vec<Habit>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {HABIT_COLUMNS} FROM habits ORDER BY position, id"))?;
        let habits = stmt
            .query_map([], row_to_habit)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(habits)
    }

    fn update_habit(&mut self, habit: &Habit) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE habits
             SET name = ?2, description = ?3, freq_num = ?4, freq_den = ?5,
                 archived = ?6, position = ?7
             WHERE id = ?1",
            params![
                habit.id,
                habit.name,
                habit.description,
                habit.frequency.numerator(),
                habit.frequency.denominator(),
                habit.archived,
                habit.position,
            ],
        )?;
        if changed == 0 {
            return Err(CoreError::HabitNotFound(habit.id));
        }
        Ok(())
    }

    fn delete_habit(&mut self, id: HabitId) -> Result<bool> {
        self.transaction(|conn| {
            let position: Option<u32> = conn
                .query_row(
                    "SELECT position FROM habits WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(position) = position else {
                return Ok(false);
            };
            conn.execute("DELETE FROM repetitions WHERE habit_id = ?1", params![id])?;
            conn.execute("DELETE FROM habits WHERE id = ?1", params![id])?;
            conn.execute(
                "UPDATE habits SET position = position - 1 WHERE position > ?1",
                params![position],
            )?;
            Ok(true)
        })
    }

    fn repetitions(
        &self,
        id: HabitId,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    ) -> Result<Vec<Repetition>> {
        let mut stmt = self.conn.prepare(
            "SELECT habit_id, day, status FROM repetitions
             WHERE habit_id = ?1
               AND (?2 IS NULL OR day >= ?2)
               AND (?3 IS NULL OR day <= ?3)
             ORDER BY day",
        )?;
        let reps = stmt
            .query_map(
                params![id, from.map(|d| d.to_string()), to.map(|d| d.to_string())],
                row_to_repetition,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(reps)
    }

    fn repetition_at(&self, id: HabitId, day: Timestamp) -> Result<Option<Repetition>> {
        let rep = self
            .conn
            .query_row(
                "SELECT habit_id, day, status FROM repetitions WHERE habit_id = ?1 AND day = ?2",
                params![id, day.to_string()],
                row_to_repetition,
            )
            .optional()?;
        Ok(rep)
    }

    fn upsert_repetition(&mut self, rep: &Repetition) -> Result<()> {
        if !self.habit_exists(rep.habit_id)? {
            return Err(CoreError::HabitNotFound(rep.habit_id));
        }
        self.conn.execute(
            "INSERT OR REPLACE INTO repetitions (habit_id, day, status) VALUES (?1, ?2, ?3)",
            params![rep.habit_id, rep.timestamp.to_string(), rep.status.code()],
        )?;
        Ok(())
    }

    fn delete_repetition(&mut self, id: HabitId, day: Timestamp) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM repetitions WHERE habit_id = ?1 AND day = ?2",
            params![id, day.to_string()],
        )?;
        Ok(removed > 0)
    }
}
