//! Plain-text rendering of the grouped view.

use std::fmt::Write;

use jiff::Timestamp;
use jiff::tz::TimeZone;

use crate::services::{ConnectionStatus, FeedSession, GateState, GroupedView};

pub const TITLE: &str = "Live Table Notifications";
pub const EMPTY_FEED: &str = "No notifications yet.";
pub const NO_TIME: &str = "No time";
pub const SOUND_PROMPT: &str = "Sound is off. Type `sound` to enable notification sound.";

/// Wall-clock time of a notification in `tz`, or "No time".
pub fn format_time(timestamp: Option<Timestamp>, tz: &TimeZone) -> String {
    match timestamp {
        Some(ts) => ts.to_zoned(tz.clone()).strftime("%H:%M:%S").to_string(),
        None => NO_TIME.to_string(),
    }
}

/// Render the groups only, one `Table <key>` block each.
pub fn render_view(view: &GroupedView<'_>, tz: &TimeZone) -> String {
    let mut out = String::new();

    if view.is_empty() {
        out.push_str(EMPTY_FEED);
        out.push('\n');
        return out;
    }

    for (index, group) in view.groups().iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "Table {}", group.key);
        for entry in &group.entries {
            let _ = writeln!(out, "  {:<8}  {}", format_time(entry.timestamp, tz), entry.message);
        }
    }
    out
}

/// Render the whole screen: header, status, sound prompt, filters and view.
pub fn render_feed(session: &FeedSession, tz: &TimeZone) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{TITLE}");
    let _ = writeln!(out, "{}", "=".repeat(TITLE.len()));

    let status = match session.status() {
        ConnectionStatus::Connecting => "connecting...".to_string(),
        ConnectionStatus::Connected => "connected".to_string(),
        ConnectionStatus::Disconnected => {
            format!("disconnected, showing last {} notifications", session.store().len())
        }
    };
    let _ = writeln!(out, "Status: {status}");

    if session.gate_state() == GateState::Locked {
        let _ = writeln!(out, "{SOUND_PROMPT}");
    }

    let criteria = session.criteria();
    if !criteria.is_unconstrained() {
        let mut parts = Vec::new();
        if !criteria.table_filter.is_empty() {
            parts.push(format!("table = {}", criteria.table_filter));
        }
        if !criteria.text_filter.is_empty() {
            parts.push(format!("text contains \"{}\"", criteria.text_filter));
        }
        let _ = writeln!(out, "Filter: {}", parts.join(", "));
    }

    out.push('\n');
    out.push_str(&render_view(&session.view(), tz));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::audio::NullSink;
    use crate::external::stream::StreamSignal;
    use crate::models::{Notification, RawNotification};
    use crate::services::{DedupPolicy, FilterCriteria, SoundGate, project};
    use std::sync::Arc;

    fn session() -> FeedSession {
        FeedSession::new(
            DedupPolicy::None,
            FilterCriteria::default(),
            SoundGate::new(Arc::new(NullSink)),
        )
    }

    #[test]
    fn test_format_time() {
        let ts: Timestamp = "2024-06-01T12:34:56Z".parse().unwrap();
        assert_eq!(format_time(Some(ts), &TimeZone::UTC), "12:34:56");
        assert_eq!(format_time(None, &TimeZone::UTC), "No time");
    }

    #[test]
    fn test_empty_view() {
        let items: Vec<Notification> = Vec::new();
        let view = project(&items, &FilterCriteria::default());
        assert_eq!(render_view(&view, &TimeZone::UTC), "No notifications yet.\n");
    }

    #[test]
    fn test_grouped_output() {
        let ts: Timestamp = "2024-06-01T08:00:05Z".parse().unwrap();
        let items = vec![
            Notification::new(3, "Water").with_timestamp(ts),
            Notification::new("Patio", "Bill"),
            Notification::new(3, "Menu"),
        ];
        let view = project(&items, &FilterCriteria::default());
        let text = render_view(&view, &TimeZone::UTC);

        assert_eq!(
            text,
            "Table 3\n  08:00:05  Water\n  No time   Menu\n\nTable Patio\n  No time   Bill\n"
        );
    }

    #[test]
    fn test_feed_header_shows_prompt_status_and_filters() {
        let mut session = session();
        let text = render_feed(&session, &TimeZone::UTC);
        assert!(text.starts_with("Live Table Notifications\n"));
        assert!(text.contains("Status: connecting..."));
        assert!(text.contains(SOUND_PROMPT));
        assert!(text.contains(EMPTY_FEED));
        assert!(!text.contains("Filter:"));

        session.apply(StreamSignal::Backlog(vec![RawNotification::new(1, "Two coffees")]));
        session.apply(StreamSignal::Disconnected);
        session.set_text_filter("coffee");
        let text = render_feed(&session, &TimeZone::UTC);
        assert!(text.contains("disconnected, showing last 1 notifications"));
        assert!(text.contains("Filter: text contains \"coffee\""));
        assert!(text.contains("Table 1"));
    }
}
