use std::process::ExitCode;

use clap::Parser;
use habit_app::{cli::Cli, execute, open_service, AppConfig};
use habit_domain::HabitError;

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let mut config = AppConfig::from_env().unwrap_or_default();
    if let Some(dir) = cli.data_dir {
        config = config.with_data_dir(dir);
    }

    let result = open_service(&config)
        .and_then(|service| execute(&service, &config, cli.command, &mut std::io::stdout()));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(?err, "command failed");
            // Validation rejections were already shown by the notifier.
            if !matches!(err.downcast_ref::<HabitError>(), Some(HabitError::Validation(_))) {
                eprintln!("habits: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}
