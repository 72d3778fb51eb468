//! Notification model and its wire representation.
//!
//! `RawNotification` is what the stream delivers (loosely typed, every field
//! optional). `Notification` is what the store holds: it can only be built
//! through validation, so a stored item always has a table and a message.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};

/// Grouping key of a notification: a JSON number or a JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableNo {
    Number(serde_json::Number),
    Text(String),
}

impl TableNo {
    /// Rendered text of the table number; `5` and `"5"` share the key `5`.
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// Case-insensitive exact comparison against a filter value.
    pub fn matches(&self, filter: &str) -> bool {
        self.key().to_lowercase() == filter.to_lowercase()
    }
}

impl fmt::Display for TableNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableNo::Number(n) => write_number(f, n),
            TableNo::Text(s) => f.write_str(s),
        }
    }
}

/// Integral floats print without a fraction, so `5.0` keys like `5`.
fn write_number(f: &mut fmt::Formatter<'_>, n: &serde_json::Number) -> fmt::Result {
    match n.as_f64() {
        Some(v) if !n.is_i64() && !n.is_u64() && v.fract() == 0.0 && v.abs() < 1e21 => {
            write!(f, "{}", v as i128)
        }
        _ => write!(f, "{}", n),
    }
}

impl From<i64> for TableNo {
    fn from(value: i64) -> Self {
        TableNo::Number(value.into())
    }
}

impl From<&str> for TableNo {
    fn from(value: &str) -> Self {
        TableNo::Text(value.to_string())
    }
}

/// Stable identity of a stored notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum NotificationId {
    /// Identifier supplied by the event source (`id` or `_id`)
    Source(String),
    /// Sequence number assigned by the store when the source sent none
    Synthetic(u64),
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationId::Source(id) => f.write_str(id),
            NotificationId::Synthetic(seq) => write!(f, "#{}", seq),
        }
    }
}

/// A validated notification. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: Option<NotificationId>,
    #[serde(rename = "tableNo")]
    pub table_no: TableNo,
    pub message: String,
    pub timestamp: Option<Timestamp>,
}

impl Notification {
    pub fn new(table_no: impl Into<TableNo>, message: impl Into<String>) -> Self {
        Self {
            id: None,
            table_no: table_no.into(),
            message: message.into(),
            timestamp: None,
        }
    }

    pub fn with_id(mut self, id: NotificationId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Source-supplied id, if any. Synthetic ids are not source identity.
    pub fn source_id(&self) -> Option<&str> {
        match &self.id {
            Some(NotificationId::Source(id)) => Some(id),
            _ => None,
        }
    }

    /// Same notification content, ignoring the id.
    pub fn same_content(&self, other: &Notification) -> bool {
        self.table_no == other.table_no
            && self.message == other.message
            && self.timestamp == other.timestamp
    }
}

/// Notification exactly as it arrives on the wire.
///
/// Field names follow the event source (`tableNo`, `message`, `timestamp`,
/// `id` or `_id`). Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNotification {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, rename = "tableNo", skip_serializing_if = "Option::is_none")]
    pub table_no: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
}

impl RawNotification {
    pub fn new(table_no: impl Into<Value>, message: impl Into<String>) -> Self {
        Self {
            table_no: Some(table_no.into()),
            message: Some(Value::String(message.into())),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<Value>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Validate into a storable notification.
    ///
    /// # Errors
    /// `AppError::MalformedNotification` when `tableNo` or `message` is
    /// missing, null, or of a type that cannot be displayed.
    pub fn validate(&self) -> AppResult<Notification> {
        let table_no = match &self.table_no {
            Some(Value::Number(n)) => TableNo::Number(n.clone()),
            Some(Value::String(s)) if !s.trim().is_empty() => TableNo::Text(s.clone()),
            _ => return Err(AppError::MalformedNotification { field: "tableNo" }),
        };

        let message = match &self.message {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => return Err(AppError::MalformedNotification { field: "message" }),
        };

        let id = match &self.id {
            Some(Value::String(s)) if !s.is_empty() => Some(NotificationId::Source(s.clone())),
            Some(Value::Number(n)) => Some(NotificationId::Source(n.to_string())),
            _ => None,
        };

        Ok(Notification {
            id,
            table_no,
            message,
            timestamp: self.timestamp.as_ref().and_then(parse_timestamp),
        })
    }
}

impl From<&Notification> for RawNotification {
    fn from(notification: &Notification) -> Self {
        let table_no = match &notification.table_no {
            TableNo::Number(n) => Value::Number(n.clone()),
            TableNo::Text(s) => Value::String(s.clone()),
        };
        Self {
            id: notification
                .source_id()
                .map(|id| Value::String(id.to_string())),
            table_no: Some(table_no),
            message: Some(Value::String(notification.message.clone())),
            timestamp: notification
                .timestamp
                .map(|ts| Value::String(ts.to_string())),
        }
    }
}

/// RFC 3339 strings and epoch milliseconds are accepted. Anything else is
/// treated as "no time".
fn parse_timestamp(value: &Value) -> Option<Timestamp> {
    let parsed = match value {
        Value::Null => return None,
        Value::String(s) => s.parse::<Timestamp>().ok(),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Timestamp::from_millisecond(ms).ok()),
        _ => None,
    };

    if parsed.is_none() {
        tracing::warn!(timestamp = %value, "Unparseable notification timestamp, showing as no time");
    }
    parsed
}
