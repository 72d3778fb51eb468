use async_trait::async_trait;
use thiserror::Error;

/// Reasons a playback request was not honoured.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The platform refused to play (no terminal, policy, device busy)
    #[error("Playback rejected: {reason}")]
    Rejected { reason: String },

    /// Sound is switched off for this sink
    #[error("Playback disabled")]
    Disabled,

    #[error("Playback I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlaybackError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        PlaybackError::Rejected {
            reason: reason.into(),
        }
    }
}

/// A single shared audio resource.
///
/// Both calls are fire-and-forget from the caller's point of view: they
/// must return promptly and never wait for playback to finish. Overlapping
/// `play` calls may restart or be ignored.
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Start playing the notification sound
    async fn play(&self) -> Result<(), PlaybackError>;

    /// Stop playback and rewind
    async fn stop(&self) -> Result<(), PlaybackError>;

    /// Sink name for logging
    fn name(&self) -> &'static str;
}

/// Sink that refuses every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

#[async_trait]
impl AudioSink for NullSink {
    async fn play(&self) -> Result<(), PlaybackError> {
        Err(PlaybackError::Disabled)
    }

    async fn stop(&self) -> Result<(), PlaybackError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "none"
    }
}
