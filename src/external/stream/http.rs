//! Adapter over a long-lived HTTP response streaming NDJSON frames.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;

use super::adapter::StreamAdapter;
use super::sequencer::SignalSequencer;
use super::signal::{LineBuffer, StreamSignal, decode_frame};
use crate::error::{AppError, AppResult};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

type ByteStream = BoxStream<'static, reqwest::Result<Vec<u8>>>;

pub struct HttpStreamAdapter {
    client: reqwest::Client,
    url: String,
    body: Option<ByteStream>,
    buffer: LineBuffer,
    sequencer: SignalSequencer,
    ready: VecDeque<StreamSignal>,
    exhausted: bool,
}

impl HttpStreamAdapter {
    pub fn new(url: impl Into<String>, connect_timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .zstd(true)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::stream_with_source("failed to build HTTP client", e))?;

        Ok(Self {
            client,
            url: url.into(),
            body: None,
            buffer: LineBuffer::new(),
            sequencer: SignalSequencer::new(),
            ready: VecDeque::new(),
            exhausted: false,
        })
    }

    fn admit_line(&mut self, line: &str) {
        match decode_frame(line) {
            Ok(Some(frame)) => self.ready.extend(self.sequencer.admit(frame.into())),
            Ok(None) => {}
            Err(e) => tracing::warn!(url = %self.url, error = %e, "Skipping undecodable frame"),
        }
    }

    fn end(&mut self) {
        if let Some(rest) = self.buffer.finish() {
            self.admit_line(&rest);
        }
        self.body = None;
        self.exhausted = true;
        self.ready.extend(self.sequencer.finish());
    }
}

#[async_trait]
impl StreamAdapter for HttpStreamAdapter {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn open(&mut self) -> AppResult<()> {
        tracing::debug!(url = %self.url, "Opening feed");

        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/x-ndjson")
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| AppError::stream_with_source(format!("cannot reach {}", self.url), e))?;

        self.body = Some(
            response
                .bytes_stream()
                .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
                .boxed(),
        );
        self.exhausted = false;
        // The transport is up even if the server never sends a connect frame.
        self.ready.extend(self.sequencer.admit(StreamSignal::Connected));
        Ok(())
    }

    async fn next_signal(&mut self) -> Option<StreamSignal> {
        loop {
            if let Some(signal) = self.ready.pop_front() {
                return Some(signal);
            }
            if self.exhausted {
                return None;
            }

            let Some(body) = self.body.as_mut() else {
                self.end();
                continue;
            };

            match body.next().await {
                Some(Ok(chunk)) => {
                    for line in self.buffer.push(&chunk) {
                        self.admit_line(&line);
                    }
                }
                Some(Err(e)) => {
                    tracing::warn!(url = %self.url, error = %e, "Feed connection broke");
                    self.end();
                }
                None => {
                    tracing::info!(url = %self.url, "Feed closed by server");
                    self.end();
                }
            }
        }
    }

    async fn close(&mut self) {
        self.body = None;
        self.exhausted = true;
        self.ready.clear();
    }
}
