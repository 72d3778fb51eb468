use thiserror::Error;

use crate::config::error::ConfigError;

/// Application-wide error type.
///
/// None of these are fatal to a running feed: the session logs and drops
/// malformed payloads, playback failures are swallowed by the sound gate and
/// stream failures surface as a disconnect. Only startup paths (config,
/// logger, CLI) propagate them to the process boundary.
#[derive(Error, Debug)]
pub enum AppError {
    /// A backlog or live payload missing a field required for grouping or display
    #[error("Malformed notification: missing or invalid `{field}`")]
    MalformedNotification { field: &'static str },

    /// A live event whose source id is already held (dedup policy `source_id`)
    #[error("Duplicate notification: id '{id}' is already in the feed")]
    DuplicateNotification { id: String },

    /// A wire frame that could not be decoded into a stream signal
    #[error("Invalid stream frame: {message}")]
    InvalidFrame { message: String },

    /// The stream transport failed to connect or broke mid-connection
    #[error("Stream error: {message}")]
    Stream {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Validation error with field-specific details
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Configuration error
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// Filesystem or terminal I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn stream(message: impl Into<String>) -> Self {
        AppError::Stream {
            message: message.into(),
            source: None,
        }
    }

    pub fn stream_with_source(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        AppError::Stream {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn invalid_frame(message: impl Into<String>) -> Self {
        AppError::InvalidFrame {
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

/// Encoding failures only. Undecodable input goes through
/// [`AppError::invalid_frame`] at the decoding site.
impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        match error.classify() {
            serde_json::error::Category::Io => AppError::Io(error.into()),
            _ => AppError::Internal {
                source: error.into(),
            },
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;
