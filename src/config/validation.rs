//! Settings validation
//!
//! Each section checks its own ranges and formats. The first failure wins
//! and names the offending field by its TOML path.

use reqwest::Url;

use crate::config::error::ConfigError;
use crate::config::settings::{
    FeedConfig, FileSettings, LoggerSettings, Settings, SoundBackend, SoundConfig, StreamConfig,
};

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

const VALID_ROTATION_STRATEGIES: &[&str] =
    &["size", "time", "hourly", "daily", "weekly", "combined"];

const VALID_STREAM_SCHEMES: &[&str] = &["http", "https"];

/// Parse a feed URL, accepting only http(s) with a host.
pub fn parse_stream_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| format!("Invalid stream URL '{raw}': {e}"))?;

    if !VALID_STREAM_SCHEMES.contains(&url.scheme()) {
        return Err(format!(
            "Stream URL must use http or https, got '{}': '{raw}'",
            url.scheme()
        ));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(format!("Stream URL has no host: '{raw}'"));
    }

    Ok(url)
}

impl StreamConfig {
    /// # Validation Rules
    /// - URL must be non-empty and use http or https
    /// - Reconnect delay and connect timeout must be greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(ConfigError::validation(
                "stream.url",
                "Stream URL is required. Point it at the feed's NDJSON endpoint.",
            ));
        }

        parse_stream_url(url).map_err(|message| ConfigError::ValidationError {
            field: "stream.url".to_string(),
            message,
        })?;

        if self.reconnect_delay_secs == 0 {
            return Err(ConfigError::validation(
                "stream.reconnect_delay_secs",
                "Reconnect delay must be greater than 0 seconds.",
            ));
        }

        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::validation(
                "stream.connect_timeout_secs",
                "Connect timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl SoundConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.backend == SoundBackend::Command && self.command.trim().is_empty() {
            return Err(ConfigError::validation(
                "sound.command",
                "A command is required when the sound backend is 'command'.",
            ));
        }
        Ok(())
    }
}

impl FeedConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.time_zone().map(|_| ())
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        if !VALID_ROTATION_STRATEGIES.contains(&self.rotation.strategy.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.file.rotation.strategy".to_string(),
                message: format!(
                    "Invalid rotation strategy '{}'. Valid strategies are: {}",
                    self.rotation.strategy,
                    VALID_ROTATION_STRATEGIES.join(", ")
                ),
            });
        }

        if self.rotation.max_size == 0 {
            return Err(ConfigError::validation(
                "logger.file.rotation.max_size",
                "Max size must be greater than 0 bytes.",
            ));
        }

        if self.rotation.max_files == 0 {
            return Err(ConfigError::validation(
                "logger.file.rotation.max_files",
                "At least one rotated file must be kept.",
            ));
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// # Validation Rules
    /// - Level must be one of: trace, debug, info, warn, error
    /// - File settings must be consistent (see [`FileSettings`])
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        self.file.validate()
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.stream.validate()?;
        self.sound.validate()?;
        self.feed.validate()?;
        self.logger.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::RotationSettings;

    fn field_of(err: ConfigError) -> String {
        match err {
            ConfigError::ValidationError { field, .. } => field,
            other => panic!("Expected ValidationError, got {other:?}"),
        }
    }

    // ========================================================================
    // StreamConfig
    // ========================================================================

    #[test]
    fn test_stream_config_default_is_valid() {
        assert!(StreamConfig::default().validate().is_ok());
    }

    #[test]
    fn test_stream_config_url_schemes() {
        for url in ["http://feed.local", "https://venue.example:8443/notifications"] {
            let config = StreamConfig {
                url: url.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_ok(), "URL should be valid: {url}");
        }

        for url in ["", "   ", "feed.local", "ws://feed.local", "http://", "http://feed.local:99999/"] {
            let config = StreamConfig {
                url: url.to_string(),
                ..Default::default()
            };
            assert_eq!(field_of(config.validate().unwrap_err()), "stream.url", "{url:?}");
        }
    }

    #[test]
    fn test_parse_stream_url() {
        let url = parse_stream_url(" https://venue.example/feed?token=1 ").unwrap();
        assert_eq!(url.host_str(), Some("venue.example"));

        assert!(parse_stream_url("file:///tmp/feed.ndjson").is_err());
        assert!(parse_stream_url("http://bad host/").is_err());
        assert!(parse_stream_url("https://venue.example:70000").is_err());
    }

    #[test]
    fn test_stream_config_zero_durations() {
        let config = StreamConfig {
            reconnect_delay_secs: 0,
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "stream.reconnect_delay_secs");

        let config = StreamConfig {
            connect_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "stream.connect_timeout_secs");
    }

    // ========================================================================
    // SoundConfig
    // ========================================================================

    #[test]
    fn test_sound_command_backend_needs_command() {
        let config = SoundConfig {
            backend: SoundBackend::Command,
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "sound.command");

        let disabled = SoundConfig {
            enabled: false,
            ..config.clone()
        };
        assert!(disabled.validate().is_ok());

        let configured = SoundConfig {
            command: "paplay".to_string(),
            ..config
        };
        assert!(configured.validate().is_ok());
    }

    // ========================================================================
    // FeedConfig
    // ========================================================================

    #[test]
    fn test_feed_timezone() {
        let config = FeedConfig {
            timezone: "Europe/Berlin".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        let config = FeedConfig {
            timezone: "Not/AZone".to_string(),
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "feed.timezone");
    }

    // ========================================================================
    // LoggerSettings
    // ========================================================================

    #[test]
    fn test_logger_settings_levels() {
        for level in ["trace", "debug", "info", "warn", "error", "INFO", "Debug"] {
            let settings = LoggerSettings {
                level: level.to_string(),
                ..Default::default()
            };
            assert!(settings.validate().is_ok(), "Level should be valid: {level}");
        }

        let settings = LoggerSettings {
            level: "verbose".to_string(),
            ..Default::default()
        };
        assert_eq!(field_of(settings.validate().unwrap_err()), "logger.level");
    }

    #[test]
    fn test_file_settings_checks() {
        let base = LoggerSettings::default();

        let mut settings = base.clone();
        settings.file.enabled = true;
        settings.file.path = " ".to_string();
        assert_eq!(field_of(settings.validate().unwrap_err()), "logger.file.path");

        let mut settings = base.clone();
        settings.file.format = "xml".to_string();
        assert_eq!(field_of(settings.validate().unwrap_err()), "logger.file.format");

        let mut settings = base.clone();
        settings.file.rotation = RotationSettings {
            strategy: "monthly".to_string(),
            ..Default::default()
        };
        assert_eq!(
            field_of(settings.validate().unwrap_err()),
            "logger.file.rotation.strategy"
        );

        let mut settings = base.clone();
        settings.file.rotation.max_files = 0;
        assert_eq!(
            field_of(settings.validate().unwrap_err()),
            "logger.file.rotation.max_files"
        );

        let mut settings = base;
        settings.file.rotation.max_size = 0;
        assert_eq!(
            field_of(settings.validate().unwrap_err()),
            "logger.file.rotation.max_size"
        );
    }

    // ========================================================================
    // Settings
    // ========================================================================

    #[test]
    fn test_settings_default_is_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_settings_reports_first_failure() {
        let mut settings = Settings::default();
        settings.stream.url = String::new();
        settings.logger.level = "loud".to_string();
        assert_eq!(field_of(settings.validate().unwrap_err()), "stream.url");
    }
}
