//! Canonical data model: habits, repetitions and the derived checkmark,
//! score and streak values.

mod checkmark;
mod frequency;
mod habit;
mod repetition;
mod score;
mod streak;
mod timestamp;

pub use checkmark::{Checkmark, CheckmarkValue};
pub use frequency::Frequency;
pub use habit::{Habit, HabitId, NewHabit};
pub use repetition::{Repetition, RepetitionStatus};
pub use score::Score;
pub use streak::Streak;
pub use timestamp::Timestamp;
