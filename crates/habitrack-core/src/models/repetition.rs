use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{HabitId, Timestamp};
use crate::error::ValidationError;

/// Status recorded by the user for one day.
///
/// Only [`RepetitionStatus::YesManual`] counts as a hit for checkmarks and
/// scores. `YesAuto` is reserved for derived data and is never written by
/// the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepetitionStatus {
    YesManual,
    YesAuto,
    No,
    Skip,
    Unknown,
}

impl RepetitionStatus {
    /// Integer code used in storage.
    pub fn code(&self) -> i64 {
        match self {
            RepetitionStatus::Unknown => -1,
            RepetitionStatus::No => 0,
            RepetitionStatus::YesAuto => 1,
            RepetitionStatus::YesManual => 2,
            RepetitionStatus::Skip => 3,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            -1 => Some(RepetitionStatus::Unknown),
            0 => Some(RepetitionStatus::No),
            1 => Some(RepetitionStatus::YesAuto),
            2 => Some(RepetitionStatus::YesManual),
            3 => Some(RepetitionStatus::Skip),
            _ => None,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, RepetitionStatus::YesManual)
    }

    fn as_str(&self) -> &'static str {
        match self {
            RepetitionStatus::YesManual => "yes_manual",
            RepetitionStatus::YesAuto => "yes_auto",
            RepetitionStatus::No => "no",
            RepetitionStatus::Skip => "skip",
            RepetitionStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RepetitionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepetitionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "yes_manual" | "done" => Ok(RepetitionStatus::YesManual),
            "no" => Ok(RepetitionStatus::No),
            "skip" => Ok(RepetitionStatus::Skip),
            "unknown" | "clear" => Ok(RepetitionStatus::Unknown),
            other => Err(ValidationError::InvalidValue {
                field: "status".into(),
                message: format!("expected yes, no, skip or unknown, got '{other}'"),
            }),
        }
    }
}

/// One user-recorded entry. At most one exists per (habit, day).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repetition {
    pub habit_id: HabitId,
    pub timestamp: Timestamp,
    pub status: RepetitionStatus,
}

impl Repetition {
    pub fn new(habit_id: HabitId, timestamp: Timestamp, status: RepetitionStatus) -> Self {
        Self {
            habit_id,
            timestamp,
            status,
        }
    }

    pub fn manual(habit_id: HabitId, timestamp: Timestamp) -> Self {
        Self::new(habit_id, timestamp, RepetitionStatus::YesManual)
    }

    pub fn is_hit(&self) -> bool {
        self.status.is_hit()
    }
}
