//! Configuration settings structures
//!
//! Everything here can be loaded from TOML files and `TABLEFEED_*`
//! environment variables. Every field has a default, so an empty file (or no
//! file at all) yields a working configuration.

use std::path::PathBuf;
use std::time::Duration;

use jiff::tz::TimeZone;
use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig, RotationConfig, RotationStrategy};
use crate::services::{DedupPolicy, FilterCriteria};

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "tablefeed".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_stream_url() -> String {
    "http://127.0.0.1:4000/notifications".to_string()
}

fn default_reconnect_delay_secs() -> u64 {
    5
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_path() -> String {
    "logs/tablefeed.log".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_rotation_strategy() -> String {
    "size".to_string()
}

fn default_max_size() -> u64 {
    10 * 1024 * 1024 // 10MB
}

fn default_max_files() -> usize {
    5
}

// ============================================================================
// Application Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    #[serde(default = "default_app_name")]
    pub name: String,

    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

// ============================================================================
// Stream Configuration
// ============================================================================

/// Live feed endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// NDJSON endpoint streaming feed frames
    #[serde(default = "default_stream_url")]
    pub url: String,

    /// Fixed delay before reconnecting after a disconnect, in seconds
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,

    /// TCP connect timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl StreamConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: default_stream_url(),
            reconnect_delay_secs: default_reconnect_delay_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

// ============================================================================
// Sound Configuration
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundBackend {
    /// Terminal bell (BEL)
    #[default]
    Bell,
    /// External player process, e.g. `paplay noti.wav`
    Command,
    /// Never plays; the gate can not be unlocked
    None,
}

impl SoundBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundBackend::Bell => "bell",
            SoundBackend::Command => "command",
            SoundBackend::None => "none",
        }
    }
}

/// Notification sound output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundConfig {
    /// When false the sound gate can never arm
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub backend: SoundBackend,

    /// Program to run for the `command` backend
    #[serde(default)]
    pub command: String,

    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            backend: SoundBackend::default(),
            command: String::new(),
            args: Vec::new(),
        }
    }
}

// ============================================================================
// Feed Configuration
// ============================================================================

/// Store policy and initial view settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// `none` keeps re-sent events, `source_id` drops repeats of a known id
    #[serde(default)]
    pub dedup: DedupPolicy,

    /// Initial table filter
    #[serde(default)]
    pub table_filter: String,

    /// Initial text filter
    #[serde(default)]
    pub text_filter: String,

    /// IANA time zone for rendering times; empty means the system zone
    #[serde(default)]
    pub timezone: String,
}

impl FeedConfig {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria::new(self.table_filter.clone(), self.text_filter.clone())
    }

    pub fn time_zone(&self) -> Result<TimeZone, ConfigError> {
        if self.timezone.trim().is_empty() {
            return Ok(TimeZone::system());
        }
        TimeZone::get(self.timezone.trim()).map_err(|e| ConfigError::ValidationError {
            field: "feed.timezone".to_string(),
            message: format!("Unknown time zone '{}': {}", self.timezone, e),
        })
    }
}

// ============================================================================
// Logger Settings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            colored: default_true(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationSettings {
    /// "size", "time", "hourly", "daily", "weekly" or "combined"
    #[serde(default = "default_rotation_strategy")]
    pub strategy: String,

    /// Maximum file size in bytes before rotation
    #[serde(default = "default_max_size")]
    pub max_size: u64,

    /// Maximum number of rotated files to keep
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            strategy: default_rotation_strategy(),
            max_size: default_max_size(),
            max_files: default_max_files(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_log_path")]
    pub path: String,

    #[serde(default = "default_true")]
    pub append: bool,

    /// "full", "compact" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,

    #[serde(default)]
    pub rotation: RotationSettings,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
            append: default_true(),
            format: default_log_format(),
            rotation: RotationSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// "trace", "debug", "info", "warn" or "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub console: ConsoleSettings,

    #[serde(default)]
    pub file: FileSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: ConsoleSettings::default(),
            file: FileSettings::default(),
        }
    }
}

impl LoggerSettings {
    /// Convert the file representation into the runtime logger configuration.
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let console = ConsoleConfig::new(self.console.enabled, self.console.colored);
        let file = self.file.into_file_config()?;

        LoggerConfig::new(console, file, self.level).map_err(|e| ConfigError::ValidationError {
            field: "logger".to_string(),
            message: e.to_string(),
        })
    }
}

impl FileSettings {
    pub fn into_file_config(self) -> Result<FileConfig, ConfigError> {
        let format = self
            .format
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: e.to_string(),
            })?;
        let rotation = self.rotation.into_rotation_config()?;

        FileConfig::new(self.enabled, PathBuf::from(self.path), self.append, format, rotation)
            .map_err(|e| ConfigError::ValidationError {
                field: "logger.file".to_string(),
                message: e.to_string(),
            })
    }
}

impl RotationSettings {
    pub fn into_rotation_config(self) -> Result<RotationConfig, ConfigError> {
        let strategy = self
            .strategy
            .parse::<RotationStrategy>()
            .map_err(|e| ConfigError::ValidationError {
                field: "logger.file.rotation.strategy".to_string(),
                message: e.to_string(),
            })?;

        RotationConfig::new(strategy, self.max_size, self.max_files).map_err(|e| {
            ConfigError::ValidationError {
                field: "logger.file.rotation".to_string(),
                message: e.to_string(),
            }
        })
    }
}

// ============================================================================
// Main Settings Structure
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub application: ApplicationConfig,

    #[serde(default)]
    pub logger: LoggerSettings,

    #[serde(default)]
    pub stream: StreamConfig,

    #[serde(default)]
    pub sound: SoundConfig,

    #[serde(default)]
    pub feed: FeedConfig,
}
