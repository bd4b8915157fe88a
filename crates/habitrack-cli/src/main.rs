use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "habitrack", version, about = "Habitrack CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Habit management
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Toggle the repetition on a day (today by default)
    Toggle {
        /// Habit ID
        id: i64,
        /// Day to toggle (YYYY-MM-DD)
        #[arg(long)]
        date: Option<habitrack_core::Timestamp>,
    },
    /// Record an explicit status on a day
    Set {
        /// Habit ID
        id: i64,
        /// yes, no, skip or unknown (unknown clears the day)
        status: habitrack_core::RepetitionStatus,
        /// Day to set (YYYY-MM-DD)
        #[arg(long)]
        date: Option<habitrack_core::Timestamp>,
    },
    /// Derived checkmarks, newest first
    Checkmarks(commands::report::RangeArgs),
    /// Habit strength scores, newest first
    Scores(commands::report::RangeArgs),
    /// Best streaks, the current one first
    Streaks {
        /// Habit ID
        id: i64,
        /// Maximum number of streaks
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Checkmark totals per calendar bucket
    Groups {
        /// Habit ID
        id: i64,
        /// Bucket size
        #[arg(long, value_enum, default_value_t = commands::report::Bucket::Week)]
        by: commands::report::Bucket,
        /// Maximum number of buckets
        #[arg(long, default_value_t = 12)]
        limit: usize,
    },
    /// Manual repetitions per weekday for each month, newest month first
    Weekdays {
        /// Habit ID
        id: i64,
    },
    /// Today's value, score and streaks in one object
    Summary {
        /// Habit ID
        id: i64,
    },
    /// Write CSV files for all habits
    Export {
        /// Target directory (defaults to export.directory)
        dir: Option<std::path::PathBuf>,
        /// Only export these habit IDs
        #[arg(long = "habit")]
        habits: Vec<i64>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("HABITRACK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Habit { action } => commands::habit::run(action),
        Commands::Toggle { id, date } => commands::repetition::toggle(id, date),
        Commands::Set { id, status, date } => commands::repetition::set(id, status, date),
        Commands::Checkmarks(args) => commands::report::checkmarks(args),
        Commands::Scores(args) => commands::report::scores(args),
        Commands::Streaks { id, limit } => commands::report::streaks(id, limit),
        Commands::Groups { id, by, limit } => commands::report::groups(id, by, limit),
        Commands::Summary { id } => commands::report::summary(id),
        Commands::Weekdays { id } => commands::report::weekdays(id),
        Commands::Export { dir, habits } => commands::export::run(dir, habits),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
