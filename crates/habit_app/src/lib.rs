pub mod cli;
pub mod config;
pub mod notifier;

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use habit_domain::{stats::MAX_HISTORY_DAYS, HabitService, ToggleOutcome};
use habit_store::FileStore;
use tracing::debug;

use crate::cli::Command;
pub use crate::config::AppConfig;
use crate::notifier::TerminalNotifier;

pub fn open_service(config: &AppConfig) -> Result<HabitService> {
    let store = FileStore::open(&config.data_dir).with_context(|| {
        format!(
            "unable to open habit store at {}",
            config.data_dir.display()
        )
    })?;
    debug!(path = %store.root().display(), "opened habit store");
    let mut builder = HabitService::builder()
        .with_store(Arc::new(store))
        .with_streak_rule(config.streak_rule)
        .with_notification_sink(Box::new(TerminalNotifier));
    if let Some(user) = &config.user {
        builder = builder.with_user(user.clone());
    }
    builder.build()
}

/// Executes one command against `service`, writing its report to `out`.
pub fn execute(
    service: &HabitService,
    config: &AppConfig,
    command: Command,
    out: &mut impl Write,
) -> Result<()> {
    debug!(?command, "executing command");
    match command {
        Command::Add { name } => {
            let habit = service.add_habit(&name)?;
            writeln!(out, "{}\t{}", habit.id, habit.name)?;
        }
        Command::Toggle { id } => {
            let outcome = service.toggle_habit(&id)?;
            let streak = service.habit(&id).map(|habit| habit.streak).unwrap_or(0);
            let label = match outcome {
                ToggleOutcome::Completed => "completed",
                ToggleOutcome::Uncompleted => "not completed",
            };
            writeln!(out, "{id}\t{label}\t{streak} day streak")?;
        }
        Command::Delete { id } => {
            if !service.delete_habit(&id)? {
                writeln!(out, "no habit with id {id}")?;
            }
        }
        Command::List => {
            let cards = service.cards();
            if cards.is_empty() {
                writeln!(out, "No habits yet. Add one with `habits add <name>`.")?;
            }
            for card in cards {
                let status = if card.completed_today {
                    "Completed Today"
                } else {
                    "Open"
                };
                writeln!(
                    out,
                    "{}\t{}\t{} day streak\t{}% completion rate\tTotal: {} completions\t{}",
                    card.id,
                    card.name,
                    card.streak,
                    card.completion_rate,
                    card.total_completions,
                    status
                )?;
            }
        }
        Command::Stats => {
            let stats = service.stats();
            writeln!(out, "Total habits: {}", stats.total_habits)?;
            writeln!(out, "Completed today: {}", stats.completed_today)?;
            writeln!(out, "Completion rate: {}%", stats.completion_rate)?;
        }
        Command::History { id, days } => {
            let days = days
                .filter(|d| *d > 0)
                .unwrap_or(config.history_days)
                .min(MAX_HISTORY_DAYS);
            let strip = service.history(&id, days)?;
            writeln!(out, "{strip}")?;
        }
        Command::Export { dir } => {
            let dir = dir.unwrap_or_else(|| ".".into());
            let path = service.export_to(&dir)?;
            writeln!(out, "{}", path.display())?;
        }
        Command::Logout => {
            service.sign_out();
        }
    }
    Ok(())
}
