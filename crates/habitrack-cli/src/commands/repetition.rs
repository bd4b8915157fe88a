use habitrack_core::{RepetitionStatus, Timestamp};

use super::{open_tracker, CliResult};

pub fn toggle(id: i64, date: Option<Timestamp>) -> CliResult {
    let tracker = open_tracker()?;
    let day = date.unwrap_or_else(|| tracker.today());
    match tracker.toggle_repetition(id, day)? {
        Some(status) => println!("{day}: {status}"),
        None => println!("{day}: cleared"),
    }
    Ok(())
}

pub fn set(id: i64, status: RepetitionStatus, date: Option<Timestamp>) -> CliResult {
    let tracker = open_tracker()?;
    let day = date.unwrap_or_else(|| tracker.today());
    tracker.set_repetition(id, day, status)?;
    println!("{day}: {status}");
    Ok(())
}
