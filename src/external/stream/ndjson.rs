//! Adapter over a newline-delimited JSON recording (a file or stdin).

use std::collections::VecDeque;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use super::adapter::StreamAdapter;
use super::sequencer::SignalSequencer;
use super::signal::{StreamSignal, decode_frame};
use crate::error::{AppError, AppResult};

type BoxedReader = Box<dyn AsyncBufRead + Unpin + Send>;

enum Source {
    Path(PathBuf),
    Stdin,
    Reader(BoxedReader),
}

impl Source {
    fn describe(&self) -> String {
        match self {
            Source::Path(path) => path.display().to_string(),
            Source::Stdin => "<stdin>".to_string(),
            Source::Reader(_) => "<reader>".to_string(),
        }
    }
}

pub struct NdjsonAdapter {
    source: Option<Source>,
    origin: String,
    lines: Option<Lines<BoxedReader>>,
    line_no: usize,
    sequencer: SignalSequencer,
    ready: VecDeque<StreamSignal>,
    exhausted: bool,
}

impl NdjsonAdapter {
    fn with_source(source: Source) -> Self {
        Self {
            origin: source.describe(),
            source: Some(source),
            lines: None,
            line_no: 0,
            sequencer: SignalSequencer::new(),
            ready: VecDeque::new(),
            exhausted: false,
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::with_source(Source::Path(path.into()))
    }

    pub fn stdin() -> Self {
        Self::with_source(Source::Stdin)
    }

    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        Self::with_source(Source::Reader(Box::new(reader)))
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    async fn read_frame(&mut self) -> Option<StreamSignal> {
        let lines = self.lines.as_mut()?;

        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => return None,
                Err(e) => {
                    tracing::warn!(source = %self.origin, error = %e, "Recording read failed");
                    return None;
                }
            };
            self.line_no += 1;

            match decode_frame(&line) {
                Ok(Some(frame)) => return Some(frame.into()),
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(
                        source = %self.origin,
                        line = self.line_no,
                        error = %e,
                        "Skipping undecodable frame"
                    );
                }
            }
        }
    }
}

#[async_trait]
impl StreamAdapter for NdjsonAdapter {
    fn name(&self) -> &'static str {
        "ndjson"
    }

    async fn open(&mut self) -> AppResult<()> {
        let Some(source) = self.source.take() else {
            return Ok(());
        };

        let reader: BoxedReader = match source {
            Source::Path(path) => {
                let file = tokio::fs::File::open(&path).await.map_err(|e| {
                    AppError::stream_with_source(format!("cannot open recording {}", path.display()), e)
                })?;
                Box::new(BufReader::new(file))
            }
            Source::Stdin => Box::new(BufReader::new(tokio::io::stdin())),
            Source::Reader(reader) => reader,
        };

        tracing::debug!(source = %self.origin, "Recording opened");
        self.lines = Some(reader.lines());
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

            match self.read_frame().await {
                Some(signal) => self.ready.extend(self.sequencer.admit(signal)),
                None => {
                    self.exhausted = true;
                    self.ready.extend(self.sequencer.finish());
                    tracing::debug!(source = %self.origin, lines = self.line_no, "Recording exhausted");
                }
            }
        }
    }

    async fn close(&mut self) {
        self.lines = None;
        self.exhausted = true;
        self.ready.clear();
    }
}
