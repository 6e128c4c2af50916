use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "habits")]
#[command(about = "Track daily habits, streaks and completion rates", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding the habit store (overrides HABITS_DATA_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a new daily habit
    Add {
        /// Habit name (1-50 characters, unique per user)
        name: String,
    },
    /// Mark a habit complete for today, or undo today's completion
    Toggle {
        #[arg(value_name = "HABIT_ID")]
        id: String,
    },
    /// Delete a habit and its history
    Delete {
        #[arg(value_name = "HABIT_ID")]
        id: String,
    },
    /// List habits with streak and completion rate
    List,
    /// Show today's totals
    Stats,
    /// Show a day-by-day completion strip for one habit
    History {
        #[arg(value_name = "HABIT_ID")]
        id: String,

        /// Number of days to show (defaults to HABITS_HISTORY_DAYS)
        #[arg(short, long)]
        days: Option<usize>,
    },
    /// Write a JSON backup of the signed-in user's habits
    Export {
        /// Target directory (defaults to the current directory)
        #[arg(short, long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },
    /// Forget the signed-in user
    Logout,
}
