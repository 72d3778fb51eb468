//! Replay command handler
//!
//! Runs a recorded NDJSON session through a [`FeedSession`] and prints the
//! final grouped view. Sound is never armed during a replay.

use std::io::Write;
use std::sync::Arc;

use serde::Serialize;

use crate::config::settings::Settings;
use crate::error::AppResult;
use crate::external::audio::NullSink;
use crate::external::stream::{NdjsonAdapter, StreamAdapter};
use crate::presentation::render_feed;
use crate::services::{
    ConnectionStatus, FeedSession, FilterCriteria, GroupedView, SessionStats, SoundGate,
};

pub struct ReplayCommandHandler {
    config: Settings,
    source: String,
    json: bool,
}

#[derive(Serialize)]
struct ReplayReport<'a> {
    status: ConnectionStatus,
    filter: &'a FilterCriteria,
    stats: SessionStats,
    groups: GroupedView<'a>,
}

impl ReplayCommandHandler {
    /// `source` is a file path, or `-` for stdin.
    pub fn new(config: Settings, source: impl Into<String>, json: bool) -> Self {
        Self {
            config,
            source: source.into(),
            json,
        }
    }

    pub async fn execute(&self) -> AppResult<()> {
        let adapter = if self.source == "-" {
            NdjsonAdapter::stdin()
        } else {
            NdjsonAdapter::from_path(&self.source)
        };

        let stats = self.run(adapter, std::io::stdout()).await?;
        tracing::info!(
            source = %self.source,
            connections = stats.connections,
            events = stats.events_added,
            dropped = stats.events_dropped,
            "Replay finished"
        );
        Ok(())
    }

    /// Drain `adapter` into a fresh session and write the result to `out`.
    pub async fn run<A, W>(&self, mut adapter: A, mut out: W) -> AppResult<SessionStats>
    where
        A: StreamAdapter,
        W: Write,
    {
        let tz = self.config.feed.time_zone()?;
        let gate = SoundGate::new(Arc::new(NullSink));
        let mut session = FeedSession::new(self.config.feed.dedup, self.config.feed.criteria(), gate);

        adapter.open().await?;
        while let Some(signal) = adapter.next_signal().await {
            session.apply(signal);
        }
        adapter.close().await;

        if self.json {
            let report = ReplayReport {
                status: session.status(),
                filter: session.criteria(),
                stats: session.stats(),
                groups: session.view(),
            };
            serde_json::to_writer_pretty(&mut out, &report)?;
            writeln!(out)?;
        } else {
            out.write_all(render_feed(&session, &tz).as_bytes())?;
        }
        out.flush()?;

        Ok(session.stats())
    }
}
