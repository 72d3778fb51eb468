//! Audio resource handles used for notification sounds.
//!
//! The core only ever asks a sink to `play` or `stop`. What that means is
//! up to the sink: ring the terminal bell, spawn a player process, or refuse
//! outright. Every failure is a [`PlaybackError`] that callers are free to
//! swallow.

mod bell;
mod command;
mod sink;

pub use bell::TerminalBell;
pub use command::CommandSink;
pub use sink::{AudioSink, NullSink, PlaybackError};

use std::sync::Arc;

use crate::config::settings::{SoundBackend, SoundConfig};

/// Build the shared audio handle described by the sound settings.
pub fn build_sink(config: &SoundConfig) -> Arc<dyn AudioSink> {
    if !config.enabled {
        return Arc::new(NullSink);
    }

    match config.backend {
        SoundBackend::Bell => Arc::new(TerminalBell::new()),
        SoundBackend::Command => Arc::new(CommandSink::new(
            config.command.clone(),
            config.args.clone(),
        )),
        SoundBackend::None => Arc::new(NullSink),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_sink_respects_backend() {
        let mut config = SoundConfig::default();
        config.enabled = true;

        config.backend = SoundBackend::Bell;
        assert_eq!(build_sink(&config).name(), "bell");

        config.backend = SoundBackend::Command;
        config.command = "paplay".to_string();
        assert_eq!(build_sink(&config).name(), "command");

        config.backend = SoundBackend::None;
        assert_eq!(build_sink(&config).name(), "none");
    }

    #[test]
    fn test_build_sink_disabled_is_null() {
        let config = SoundConfig {
            enabled: false,
            backend: SoundBackend::Bell,
            ..Default::default()
        };
        assert_eq!(build_sink(&config).name(), "none");
    }
}
