pub mod config;
pub mod export;
pub mod habit;
pub mod report;
pub mod repetition;

use habitrack_core::{Config, Database, HabitTracker, SystemClock};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Tracker over the on-disk database, configured from `config.toml`.
pub fn open_tracker() -> Result<HabitTracker<Database, SystemClock>, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    Ok(HabitTracker::with_config(
        db,
        SystemClock,
        config.tracker_config(),
    ))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
