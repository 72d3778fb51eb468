//! Dispatches a parsed command to its handler

use super::handlers::{CheckCommandHandler, ReplayCommandHandler, WatchCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::settings::Settings;
use crate::error::AppResult;

/// Run the command `cli` names with the merged `settings`.
///
/// No subcommand means `watch`.
pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<()> {
    match cli.command_or_default() {
        Commands::Watch { sound, .. } => WatchCommandHandler::new(settings, sound).execute().await,
        Commands::Replay { source, json, .. } => {
            ReplayCommandHandler::new(settings, source, json).execute().await
        }
        Commands::Check => CheckCommandHandler::new(settings).execute().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_execute_check() {
        let cli = Cli::try_parse_from(["tablefeed", "check"]).unwrap();
        assert!(execute_command(&cli, Settings::default()).await.is_ok());
    }

    #[tokio::test]
    async fn test_execute_check_rejects_invalid_settings() {
        let cli = Cli::try_parse_from(["tablefeed", "check"]).unwrap();
        let mut settings = Settings::default();
        settings.stream.url = String::new();

        let err = execute_command(&cli, settings).await.unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_execute_replay_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"event":"chat-history","data":[{{"tableNo":2,"message":"Menu please"}}]}}"#
        )
        .unwrap();

        let cli = Cli::try_parse_from(["tablefeed", "replay", file.path().to_str().unwrap()]).unwrap();
        assert!(execute_command(&cli, Settings::default()).await.is_ok());
    }
}
