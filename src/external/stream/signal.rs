//! Stream signals and their wire encoding.
//!
//! The feed is newline-delimited JSON. Each line is one envelope:
//!
//! ```text
//! {"event":"connect"}
//! {"event":"chat-history","data":[{"tableNo":5,"message":"Water"}]}
//! {"event":"new-notification","data":{"tableNo":"Patio","message":"Bill"}}
//! {"event":"disconnect"}
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::RawNotification;

/// One of the four lifecycle signals a feed can raise.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamSignal {
    Connected,
    /// Full recent history, expected once per connection
    Backlog(Vec<RawNotification>),
    /// One newly created notification
    Event(RawNotification),
    Disconnected,
}

impl StreamSignal {
    pub fn kind(&self) -> &'static str {
        match self {
            StreamSignal::Connected => "connected",
            StreamSignal::Backlog(_) => "backlog",
            StreamSignal::Event(_) => "event",
            StreamSignal::Disconnected => "disconnected",
        }
    }
}

/// Wire envelope of a single feed line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum WireFrame {
    #[serde(rename = "connect")]
    Connect,
    #[serde(rename = "chat-history")]
    ChatHistory(Vec<RawNotification>),
    #[serde(rename = "new-notification")]
    NewNotification(RawNotification),
    #[serde(rename = "disconnect")]
    Disconnect,
}

impl From<WireFrame> for StreamSignal {
    fn from(frame: WireFrame) -> Self {
        match frame {
            WireFrame::Connect => StreamSignal::Connected,
            WireFrame::ChatHistory(items) => StreamSignal::Backlog(items),
            WireFrame::NewNotification(item) => StreamSignal::Event(item),
            WireFrame::Disconnect => StreamSignal::Disconnected,
        }
    }
}

impl From<StreamSignal> for WireFrame {
    fn from(signal: StreamSignal) -> Self {
        match signal {
            StreamSignal::Connected => WireFrame::Connect,
            StreamSignal::Backlog(items) => WireFrame::ChatHistory(items),
            StreamSignal::Event(item) => WireFrame::NewNotification(item),
            StreamSignal::Disconnected => WireFrame::Disconnect,
        }
    }
}

/// Decode one line. Blank lines and `#` comments yield `None`.
pub fn decode_frame(line: &str) -> AppResult<Option<WireFrame>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    serde_json::from_str(line)
        .map(Some)
        .map_err(|e| AppError::invalid_frame(format!("{e}")))
}

pub fn encode_frame(frame: &WireFrame) -> AppResult<String> {
    Ok(serde_json::to_string(frame)?)
}

/// Splits a chunked byte stream into lines.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(position) = self.pending.iter().position(|&b| b == b'\n') {
            let rest = self.pending.split_off(position + 1);
            let mut line = std::mem::replace(&mut self.pending, rest);
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// Whatever is left once the stream has ended.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.pending);
        Some(String::from_utf8_lossy(&line).into_owned())
    }
}
