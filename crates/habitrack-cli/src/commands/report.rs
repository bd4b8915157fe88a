use clap::{Args, ValueEnum};
use habitrack_core::{Timestamp, TruncateField};
use serde::Serialize;

use super::{open_tracker, print_json, CliResult};

const DEFAULT_RANGE_DAYS: i64 = 30;

#[derive(Args)]
pub struct RangeArgs {
    /// Habit ID
    pub id: i64,
    /// First day (defaults to 30 days before --to)
    #[arg(long)]
    pub from: Option<Timestamp>,
    /// Last day (defaults to today)
    #[arg(long)]
    pub to: Option<Timestamp>,
}

impl RangeArgs {
    fn resolve(&self, today: Timestamp) -> (Timestamp, Timestamp) {
        let to = self.to.unwrap_or(today);
        let from = self.from.unwrap_or_else(|| to.minus(DEFAULT_RANGE_DAYS - 1));
        (from, to)
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Bucket {
    Week,
    Month,
    Quarter,
    Year,
}

impl From<Bucket> for TruncateField {
    fn from(bucket: Bucket) -> Self {
        match bucket {
            Bucket::Week => TruncateField::Week,
            Bucket::Month => TruncateField::Month,
            Bucket::Quarter => TruncateField::Quarter,
            Bucket::Year => TruncateField::Year,
        }
    }
}

#[derive(Serialize)]
struct GroupRow {
    start: Timestamp,
    count: u32,
    score: f64,
}

pub fn checkmarks(args: RangeArgs) -> CliResult {
    let tracker = open_tracker()?;
    let (from, to) = args.resolve(tracker.today());
    print_json(&tracker.checkmarks(args.id, from, to)?)
}

pub fn scores(args: RangeArgs) -> CliResult {
    let tracker = open_tracker()?;
    let (from, to) = args.resolve(tracker.today());
    print_json(&tracker.scores(args.id, from, to)?)
}

pub fn streaks(id: i64, limit: usize) -> CliResult {
    let tracker = open_tracker()?;
    print_json(&tracker.best_streaks(id, limit)?)
}

pub fn groups(id: i64, by: Bucket, limit: usize) -> CliResult {
    let tracker = open_tracker()?;
    let field = TruncateField::from(by);
    let counts = tracker.checkmark_groups(id, field, limit)?;
    let scores = tracker.score_groups(id, field)?;
    let rows: Vec<GroupRow> = counts
        .into_iter()
        .map(|(start, count)| GroupRow {
            start,
            count,
            score: scores
                .iter()
                .find(|s| s.timestamp == start)
                .map_or(0.0, |s| s.value),
        })
        .collect();
    print_json(&rows)
}

pub fn summary(id: i64) -> CliResult {
    let tracker = open_tracker()?;
    print_json(&tracker.summary(id)?)
}

#[derive(Serialize)]
struct WeekdayRow {
    month: Timestamp,
    /// Saturday first, Friday last
    counts: [u32; 7],
}

pub fn weekdays(id: i64) -> CliResult {
    let tracker = open_tracker()?;
    let rows: Vec<WeekdayRow> = tracker
        .weekday_frequency(id)?
        .into_iter()
        .rev()
        .map(|(month, counts)| WeekdayRow { month, counts })
        .collect();
    print_json(&rows)
}
