//! CSV export.
//!
//! Layout of an export directory:
//!
//! ```text
//! Habits.csv                  one row per habit
//! Checkmarks.csv              date + one column per habit
//! Scores.csv                  date + one column per habit
//! 001 Meditate/Checkmarks.csv
//! 001 Meditate/Scores.csv
//! ```
//!
//! Every date column is `YYYY-MM-DD` and rows run newest first.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::clock::Clock;
use crate::error::Result;
use crate::models::{Checkmark, Habit, HabitId, Score, Timestamp};
use crate::storage::HabitStore;
use crate::tracker::HabitTracker;

const MAX_DIR_NAME_LEN: usize = 100;

/// Files written by [`export_all`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportReport {
    pub directory: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Quote a field if it contains a delimiter, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// One `YYYY-MM-DD,<value>` row per checkmark, in the given order.
pub fn write_checkmarks_csv<W: Write>(out: &mut W, checkmarks: &[Checkmark]) -> io::Result<()> {
    for checkmark in checkmarks {
        writeln!(out, "{},{}", checkmark.timestamp, checkmark.value.as_i64())?;
    }
    Ok(())
}

/// One `YYYY-MM-DD,<score>` row per score, four decimals.
pub fn write_scores_csv<W: Write>(out: &mut W, scores: &[Score]) -> io::Result<()> {
    for score in scores {
        writeln!(out, "{},{:.4}", score.timestamp, score.value)?;
    }
    Ok(())
}

/// Habit list with a header row. Positions are 1-based and zero padded.
pub fn write_habits_csv<W: Write>(out: &mut W, habits: &[Habit]) -> io::Result<()> {
    writeln!(out, "Position,Name,Description,NumRepetitions,Interval")?;
    for (index, habit) in habits.iter().enumerate() {
        writeln!(
            out,
            "{:03},{},{},{},{}",
            index + 1,
            csv_field(&habit.name),
            csv_field(&habit.description),
            habit.frequency.numerator(),
            habit.frequency.denominator(),
        )?;
    }
    Ok(())
}

/// Keep only `[ a-zA-Z0-9._-]`, at most 100 characters.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '.' | '_' | '-'))
        .take(MAX_DIR_NAME_LEN)
        .collect()
}

/// Directory name for the habit at 0-based `index`, e.g. `003 Read`.
pub fn habit_dir_name(index: usize, name: &str) -> String {
    format!("{:03} {}", index + 1, sanitize_filename(name))
        .trim()
        .to_string()
}

fn create_file(path: &Path, report: &mut ExportReport) -> Result<BufWriter<File>> {
    let file = File::create(path)?;
    report.files.push(path.to_path_buf());
    Ok(BufWriter::new(file))
}

fn write_combined_header<W: Write>(out: &mut W, habits: &[&Habit]) -> io::Result<()> {
    write!(out, "Date,")?;
    for habit in habits {
        write!(out, "{},", csv_field(&habit.name))?;
    }
    writeln!(out)
}

/// Export every habit in `selected` (all habits when `None`) to `dir`.
///
/// # Errors
/// Returns an error if a habit is unknown or a file cannot be written.
pub fn export_all<S: HabitStore, C: Clock>(
    tracker: &HabitTracker<S, C>,
    dir: &Path,
    selected: Option<&[HabitId]>,
) -> Result<ExportReport> {
    fs::create_dir_all(dir)?;
    let mut report = ExportReport {
        directory: dir.to_path_buf(),
        files: Vec::new(),
    };

    let all = tracker.habits()?;
    let mut out = create_file(&dir.join("Habits.csv"), &mut report)?;
    write_habits_csv(&mut out, &all)?;
    out.flush()?;

    let chosen: Vec<(usize, &Habit)> = all
        .iter()
        .enumerate()
        .filter(|(_, h)| selected.map_or(true, |ids| ids.contains(&h.id)))
        .collect();

    let today = tracker.today();
    let mut oldest = today;
    for (index, habit) in &chosen {
        let habit_dir = dir.join(habit_dir_name(*index, &habit.name));
        fs::create_dir_all(&habit_dir)?;

        let checkmarks = tracker.all_checkmarks(habit.id)?;
        let begin = checkmarks.last().map_or(today, |c| c.timestamp);
        oldest = Timestamp::oldest(oldest, begin);

        let mut out = create_file(&habit_dir.join("Checkmarks.csv"), &mut report)?;
        write_checkmarks_csv(&mut out, &checkmarks)?;
        out.flush()?;

        let scores = tracker.scores(habit.id, begin, today)?;
        let mut out = create_file(&habit_dir.join("Scores.csv"), &mut report)?;
        write_scores_csv(&mut out, &scores)?;
        out.flush()?;
    }

    let habits: Vec<&Habit> = chosen.iter().map(|(_, h)| *h).collect();
    let mut columns_checks = Vec::with_capacity(habits.len());
    let mut columns_scores = Vec::with_capacity(habits.len());
    for habit in &habits {
        columns_checks.push(tracker.checkmarks(habit.id, oldest, today)?);
        columns_scores.push(tracker.scores(habit.id, oldest, today)?);
    }

    let mut checks_out = create_file(&dir.join("Checkmarks.csv"), &mut report)?;
    let mut scores_out = create_file(&dir.join("Scores.csv"), &mut report)?;
    write_combined_header(&mut checks_out, &habits)?;
    write_combined_header(&mut scores_out, &habits)?;
    let days = oldest.days_until(today) as usize;
    for row in 0..=days {
        let date = today.minus(row as i64);
        write!(checks_out, "{date},")?;
        write!(scores_out, "{date},")?;
        for (checks, scores) in columns_checks.iter().zip(&columns_scores) {
            let value = checks.get(row).map_or(0, |c| c.value.as_i64());
            let score = scores.get(row).map_or(0.0, |s| s.value);
            write!(checks_out, "{value},")?;
            write!(scores_out, "{score:.4},")?;
        }
        writeln!(checks_out)?;
        writeln!(scores_out)?;
    }
    checks_out.flush()?;
    scores_out.flush()?;

    info!(
        dir = %dir.display(),
        habits = habits.len(),
        files = report.files.len(),
        "export finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::{CheckmarkValue, Frequency, NewHabit};
    use crate::storage::MemoryStore;

    fn today() -> Timestamp {
        Timestamp::from_ymd(2015, 1, 25).unwrap()
    }

    #[test]
    fn checkmark_rows_are_newest_first() {
        let t = HabitTracker::new(MemoryStore::new(), FixedClock::new(today()));
        let habit = t.create_habit(NewHabit::new("Run", Frequency::WEEKLY)).unwrap();
        t.toggle_repetition(habit.id, today().minus(9)).unwrap();

        let mut buf = Vec::new();
        write_checkmarks_csv(&mut buf, &t.all_checkmarks(habit.id).unwrap()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "2015-01-25,0");
        assert_eq!(lines[3], "2015-01-22,1");
        assert_eq!(lines[9], "2015-01-16,2");
        assert!(text.ends_with('\n'));
        for pair in lines.windows(2) {
            assert!(pair[0] > pair[1]);
        }
        assert_eq!(lines.iter().filter(|l| l.ends_with(",1")).count(), 6);
    }

    #[test]
    fn score_rows_use_four_decimals() {
        let scores = vec![
            Score::new(today(), 0.655747),
            Score::new(today().minus(1), 0.0),
        ];
        let mut buf = Vec::new();
        write_scores_csv(&mut buf, &scores).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "2015-01-25,0.6557\n2015-01-24,0.0000\n"
        );
    }

    #[test]
    fn checkmark_row_format() {
        let rows = vec![
            Checkmark::new(today(), CheckmarkValue::YesAuto),
            Checkmark::new(today().minus(1), CheckmarkValue::Unknown),
        ];
        let mut buf = Vec::new();
        write_checkmarks_csv(&mut buf, &rows).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "2015-01-25,1\n2015-01-24,0\n");
    }

    #[test]
    fn names_are_sanitized() {
        assert_eq!(sanitize_filename("Read: 30 min/day!"), "Read 30 minday");
        assert_eq!(sanitize_filename(&"x".repeat(150)).len(), 100);
        assert_eq!(habit_dir_name(2, "Meditate"), "003 Meditate");
        assert_eq!(habit_dir_name(0, "???"), "001");
    }

    #[test]
    fn habits_csv_quotes_fields() {
        let t = HabitTracker::new(MemoryStore::new(), FixedClock::new(today()));
        t.create_habit(
            NewHabit::new("Wake up, early", Frequency::THREE_TIMES_PER_WEEK)
                .with_description("say \"hi\""),
        )
        .unwrap();
        let mut buf = Vec::new();
        write_habits_csv(&mut buf, &t.habits().unwrap()).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Position,Name,Description,NumRepetitions,Interval\n\
             001,\"Wake up, early\",\"say \"\"hi\"\"\",3,7\n"
        );
    }

    #[test]
    fn export_writes_directory_tree() {
        let dir = tempfile::tempdir().unwrap();
        let t = HabitTracker::new(MemoryStore::new(), FixedClock::new(today()));
        let a = t.create_habit(NewHabit::new("Meditate", Frequency::DAILY)).unwrap();
        let b = t.create_habit(NewHabit::new("Gym", Frequency::WEEKLY)).unwrap();
        t.toggle_repetition(a.id, today().minus(2)).unwrap();
        t.toggle_repetition(b.id, today()).unwrap();

        let report = export_all(&t, dir.path(), None).unwrap();
        assert_eq!(report.files.len(), 7);

        let root = dir.path();
        assert!(root.join("001 Meditate").join("Checkmarks.csv").exists());
        assert!(root.join("002 Gym").join("Scores.csv").exists());

        let combined = fs::read_to_string(root.join("Checkmarks.csv")).unwrap();
        assert_eq!(
            combined,
            "Date,Meditate,Gym,\n2015-01-25,0,2,\n2015-01-24,0,0,\n2015-01-23,2,0,\n"
        );
        let scores = fs::read_to_string(root.join("Scores.csv")).unwrap();
        assert_eq!(scores.lines().count(), 4);

        let only_gym = tempfile::tempdir().unwrap();
        let report = export_all(&t, only_gym.path(), Some(&[b.id])).unwrap();
        assert_eq!(report.files.len(), 5);
        assert!(only_gym.path().join("002 Gym").exists());
        assert!(!only_gym.path().join("001 Meditate").exists());
    }
}
