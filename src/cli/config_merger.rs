//! Merges command-line overrides into file-based configuration
//!
//! Flags always win over files and `TABLEFEED_*` variables.

use std::path::Path;

use super::parser::{Cli, Commands};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, settings::Settings};

pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Load the base configuration the way `cli` asks for it: a single
    /// `--config` file or the layered directory, for `--env` if given.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut loader = match cli.config.as_deref() {
            // An explicit file makes TABLEFEED_CONFIG_DIR irrelevant, so a
            // conflict between the two variables is not an error here.
            Some(path) => Self::file_loader(path)?,
            None => ConfigLoader::new()?,
        };
        if let Some(env) = cli.env {
            loader = loader.with_environment(env.into());
        }

        Ok(Self::new(loader.load()?))
    }

    fn file_loader(path: &Path) -> Result<ConfigLoader, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::ValidationError {
                field: "config_file".to_string(),
                message: format!("Configuration path is not a readable file: '{}'", path.display()),
            });
        }
        Ok(ConfigLoader::default().with_config_file(path))
    }

    /// Apply `cli` on top of the base configuration and validate the result.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }

        match cli.command_or_default() {
            Commands::Watch {
                url, table, text, ..
            } => {
                if let Some(url) = url {
                    config.stream.url = url;
                }
                apply_filters(&mut config, table, text);
            }
            Commands::Replay { table, text, .. } => apply_filters(&mut config, table, text),
            Commands::Check => {}
        }

        config.validate()?;
        Ok(config)
    }

    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}

fn apply_filters(config: &mut Settings, table: Option<String>, text: Option<String>) {
    if let Some(table) = table {
        config.feed.table_filter = table;
    }
    if let Some(text) = text {
        config.feed.text_filter = text;
    }
}
