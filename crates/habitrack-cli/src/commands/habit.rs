use clap::Subcommand;
use habitrack_core::{Frequency, NewHabit};

use super::{open_tracker, print_json, CliResult};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a habit
    Add {
        /// Habit name
        name: String,
        /// Target frequency, e.g. "3/7", "daily" or "weekly"
        #[arg(long, default_value = "daily")]
        freq: Frequency,
        /// Free-form description
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List habits in position order
    List {
        /// Include archived habits
        #[arg(long)]
        all: bool,
    },
    /// Change a habit's target frequency
    Freq {
        /// Habit ID
        id: i64,
        /// New frequency
        freq: Frequency,
    },
    /// Archive a habit (or restore it with --undo)
    Archive {
        /// Habit ID
        id: i64,
        #[arg(long)]
        undo: bool,
    },
    /// Delete a habit and all its repetitions
    Delete {
        /// Habit ID
        id: i64,
    },
}

pub fn run(action: HabitAction) -> CliResult {
    let tracker = open_tracker()?;
    match action {
        HabitAction::Add {
            name,
            freq,
            description,
        } => {
            let habit =
                tracker.create_habit(NewHabit::new(name, freq).with_description(description))?;
            eprintln!("Habit created: {}", habit.name);
            print_json(&habit)?;
        }
        HabitAction::List { all } => {
            let habits: Vec<_> = tracker
                .habits()?
                .into_iter()
                .filter(|h| all || !h.archived)
                .collect();
            print_json(&habits)?;
        }
        HabitAction::Freq { id, freq } => {
            let habit = tracker.set_frequency(id, freq)?;
            println!("{}: {}", habit.name, habit.frequency);
        }
        HabitAction::Archive { id, undo } => {
            let habit = tracker.archive_habit(id, !undo)?;
            let state = if habit.archived { "archived" } else { "restored" };
            println!("{}: {state}", habit.name);
        }
        HabitAction::Delete { id } => {
            tracker.delete_habit(id)?;
            println!("deleted");
        }
    }
    Ok(())
}
