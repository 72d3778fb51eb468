use std::io::IsTerminal;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use super::sink::{AudioSink, PlaybackError};

const BEL: &[u8] = b"\x07";

/// Rings the terminal bell on stdout.
///
/// Refuses to play when stdout is not a terminal, which is the closest
/// thing a CLI has to an autoplay restriction.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl TerminalBell {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AudioSink for TerminalBell {
    async fn play(&self) -> Result<(), PlaybackError> {
        if !std::io::stdout().is_terminal() {
            return Err(PlaybackError::rejected("stdout is not a terminal"));
        }

        let mut stdout = tokio::io::stdout();
        stdout.write_all(BEL).await?;
        stdout.flush().await?;
        Ok(())
    }

    async fn stop(&self) -> Result<(), PlaybackError> {
        // A bell cannot be interrupted
        Ok(())
    }

    fn name(&self) -> &'static str {
        "bell"
    }
}
