//! Terminal presentation of the feed.

pub mod commands;
pub mod render;

pub use commands::{HELP, UserCommand, parse_command};
pub use render::{format_time, render_feed, render_view};
