//! # Habitrack Core Library
//!
//! This library provides the core logic for the habitrack habit tracker.
//! A habit has a target frequency ("3 times per 7 days"); the user records
//! repetitions on individual days and the library derives everything else.
//! The `habitrack` CLI is a thin layer over the same API.
//!
//! ## Architecture
//!
//! - **Models**: day-granular [`Timestamp`], [`Frequency`], repetitions and
//!   the derived checkmark, score and streak values
//! - **Engine**: pure functions from repetitions to checkmarks, and from
//!   checkmarks to scores and streaks
//! - **Cache**: per-habit memoization, invalidated by writes and rebuilt
//!   lazily on the next read
//! - **Storage**: the [`HabitStore`] trait with in-memory and SQLite
//!   implementations, plus TOML-based configuration
//! - **Export**: CSV files per habit and combined
//!
//! ## Key Components
//!
//! - [`HabitTracker`]: thread-safe facade over a store and a clock
//! - [`Database`]: SQLite persistence
//! - [`Config`]: Application configuration management
//! - [`Clock`]: injected notion of "today"

pub mod cache;
pub mod calendar;
pub mod clock;
pub mod engine;
pub mod error;
pub mod export;
pub mod models;
pub mod storage;
pub mod tracker;

pub use cache::HabitCache;
pub use calendar::TruncateField;
pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{CheckmarkSeries, Interval, ScoreModel, ScoreSeries};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use export::{export_all, ExportReport};
pub use models::{
    Checkmark, CheckmarkValue, Frequency, Habit, HabitId, NewHabit, Repetition, RepetitionStatus,
    Score, Streak, Timestamp,
};
pub use storage::{Config, Database, HabitStore, MemoryStore};
pub use tracker::{HabitSummary, HabitTracker, TrackerConfig};
