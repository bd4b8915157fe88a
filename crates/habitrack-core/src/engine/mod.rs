//! Pure derivation: repetitions to checkmarks, checkmarks to scores and
//! streaks. Nothing here touches storage or the clock.

pub mod checkmarks;
pub mod scores;
pub mod streaks;

pub use checkmarks::{
    build_checkmarks_from_intervals, build_intervals, compute_checkmarks, snap_intervals,
    CheckmarkSeries, Interval,
};
pub use scores::{compute_scores, ScoreModel, ScoreSeries};
pub use streaks::{best_streaks, checkmarks_to_streaks, compute_streaks};
