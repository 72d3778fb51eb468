use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

use super::sink::{AudioSink, PlaybackError};

/// Plays the notification sound by spawning an external player,
/// e.g. `paplay /usr/share/sounds/freedesktop/stereo/message.oga`.
///
/// Only one player process is tracked. A new `play` kills the previous one,
/// `stop` kills the current one.
pub struct CommandSink {
    program: String,
    args: Vec<String>,
    current: Mutex<Option<Child>>,
}

impl CommandSink {
    pub fn new(program: String, args: Vec<String>) -> Self {
        Self {
            program,
            args,
            current: Mutex::new(None),
        }
    }
}

impl std::fmt::Debug for CommandSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSink")
            .field("program", &self.program)
            .field("args", &self.args)
            .finish()
    }
}

#[async_trait]
impl AudioSink for CommandSink {
    async fn play(&self) -> Result<(), PlaybackError> {
        if self.program.trim().is_empty() {
            return Err(PlaybackError::rejected("no player command configured"));
        }

        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PlaybackError::rejected(format!("cannot start '{}': {}", self.program, e)))?;

        let mut current = self.current.lock().await;
        if let Some(mut previous) = current.replace(child) {
            let _ = previous.start_kill();
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), PlaybackError> {
        let mut current = self.current.lock().await;
        if let Some(mut child) = current.take() {
            // Already exited is fine
            if let Err(e) = child.start_kill() {
                tracing::trace!(error = %e, "Player process already gone");
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "command"
    }
}
