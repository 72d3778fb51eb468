//! Check command handler
//!
//! Validates the merged configuration and prints what would be used.

use std::io::Write;

use crate::config::settings::{Settings, SoundBackend};
use crate::error::AppResult;

pub struct CheckCommandHandler {
    config: Settings,
}

impl CheckCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    pub async fn execute(&self) -> AppResult<()> {
        self.report(&mut std::io::stdout().lock())
    }

    /// Validate, then write a summary of the effective settings to `out`.
    pub fn report<W: Write>(&self, out: &mut W) -> AppResult<()> {
        self.config.validate()?;
        let zone = self.config.feed.time_zone()?;
        let settings = &self.config;

        writeln!(out, "✓ Configuration is valid")?;
        writeln!(out, "  stream     {}", settings.stream.url)?;
        writeln!(
            out,
            "  reconnect  every {}s, connect timeout {}s",
            settings.stream.reconnect_delay_secs, settings.stream.connect_timeout_secs
        )?;
        writeln!(out, "  sound      {}", describe_sound(settings))?;
        writeln!(out, "  dedup      {}", settings.feed.dedup.as_str())?;
        writeln!(out, "  filters    {}", describe_filters(settings))?;
        writeln!(out, "  time zone  {}", zone.iana_name().unwrap_or("system"))?;
        writeln!(
            out,
            "  logging    level {}, console {}, file {}",
            settings.logger.level,
            on_off(settings.logger.console.enabled),
            if settings.logger.file.enabled {
                format!("{} ({})", settings.logger.file.path, settings.logger.file.format)
            } else {
                "off".to_string()
            }
        )?;

        tracing::debug!(stream = %settings.stream.url, "Configuration check passed");
        Ok(())
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}

fn describe_sound(settings: &Settings) -> String {
    let sound = &settings.sound;
    if !sound.enabled {
        return "disabled".to_string();
    }
    match sound.backend {
        SoundBackend::Command if sound.args.is_empty() => format!("command `{}`", sound.command),
        SoundBackend::Command => format!("command `{} {}`", sound.command, sound.args.join(" ")),
        backend => backend.as_str().to_string(),
    }
}

fn describe_filters(settings: &Settings) -> String {
    let criteria = settings.feed.criteria();
    if criteria.is_unconstrained() {
        return "none".to_string();
    }
    let mut parts = Vec::new();
    if !criteria.table_filter.is_empty() {
        parts.push(format!("table = {}", criteria.table_filter));
    }
    if !criteria.text_filter.is_empty() {
        parts.push(format!("text contains \"{}\"", criteria.text_filter));
    }
    parts.join(", ")
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn report(config: Settings) -> AppResult<String> {
        let mut out = Vec::new();
        CheckCommandHandler::new(config).report(&mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_report_for_defaults() {
        let text = report(Settings::default()).unwrap();
        assert!(text.starts_with("✓ Configuration is valid"));
        assert!(text.contains("http://127.0.0.1:4000/notifications"));
        assert!(text.contains("sound      bell"));
        assert!(text.contains("dedup      none"));
        assert!(text.contains("filters    none"));
    }

    #[test]
    fn test_report_describes_overrides() {
        let mut config = Settings::default();
        config.sound.backend = SoundBackend::Command;
        config.sound.command = "paplay".to_string();
        config.sound.args = vec!["ding.oga".to_string()];
        config.feed.table_filter = "4".to_string();
        config.feed.text_filter = "menu".to_string();
        config.feed.timezone = "UTC".to_string();

        let text = report(config).unwrap();
        assert!(text.contains("command `paplay ding.oga`"));
        assert!(text.contains("table = 4, text contains \"menu\""));
        assert!(text.contains("time zone  UTC"));
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let mut config = Settings::default();
        config.stream.reconnect_delay_secs = 0;
        let err = report(config).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_execute_valid_config() {
        let handler = CheckCommandHandler::new(Settings::default());
        assert_eq!(handler.config(), &Settings::default());
        assert!(handler.execute().await.is_ok());
    }
}
