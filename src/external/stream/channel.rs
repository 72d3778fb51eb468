//! In-process adapter fed through a channel.
//!
//! Used to drive a session from code: tests, demos, or an embedding
//! application that owns its own transport.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::adapter::StreamAdapter;
use super::sequencer::SignalSequencer;
use super::signal::StreamSignal;
use crate::error::AppResult;
use crate::models::RawNotification;

pub struct ChannelAdapter {
    rx: mpsc::UnboundedReceiver<StreamSignal>,
    sequencer: SignalSequencer,
    ready: VecDeque<StreamSignal>,
    exhausted: bool,
}

/// Sending half of a [`ChannelAdapter`]. Dropping it ends the stream.
#[derive(Debug, Clone)]
pub struct ChannelFeeder {
    tx: mpsc::UnboundedSender<StreamSignal>,
}

impl ChannelAdapter {
    pub fn new() -> (Self, ChannelFeeder) {
        let (tx, rx) = mpsc::unbounded_channel();
        let adapter = Self {
            rx,
            sequencer: SignalSequencer::new(),
            ready: VecDeque::new(),
            exhausted: false,
        };
        (adapter, ChannelFeeder { tx })
    }
}

impl ChannelFeeder {
    /// Returns `false` once the adapter side is gone.
    pub fn send(&self, signal: StreamSignal) -> bool {
        self.tx.send(signal).is_ok()
    }

    pub fn connect(&self) -> bool {
        self.send(StreamSignal::Connected)
    }

    pub fn backlog(&self, items: Vec<RawNotification>) -> bool {
        self.send(StreamSignal::Backlog(items))
    }

    pub fn event(&self, item: RawNotification) -> bool {
        self.send(StreamSignal::Event(item))
    }

    pub fn disconnect(&self) -> bool {
        self.send(StreamSignal::Disconnected)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[async_trait]
impl StreamAdapter for ChannelAdapter {
    fn name(&self) -> &'static str {
        "channel"
    }

    async fn open(&mut self) -> AppResult<()> {
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

            match self.rx.recv().await {
                Some(signal) => self.ready.extend(self.sequencer.admit(signal)),
                None => {
                    self.exhausted = true;
                    self.ready.extend(self.sequencer.finish());
                }
            }
        }
    }

    async fn close(&mut self) {
        self.rx.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_signals_arrive_in_order_and_end_with_disconnect() {
        let (mut adapter, feeder) = ChannelAdapter::new();
        adapter.open().await.unwrap();

        feeder.connect();
        feeder.backlog(vec![RawNotification::new(1, "a")]);
        feeder.event(RawNotification::new(2, "b"));
        drop(feeder);

        let mut kinds = Vec::new();
        while let Some(signal) = adapter.next_signal().await {
            kinds.push(signal.kind());
        }
        assert_eq!(kinds, vec!["connected", "backlog", "event", "disconnected"]);
        assert!(adapter.next_signal().await.is_none());
    }

    #[tokio::test]
    async fn test_close_is_visible_to_feeder() {
        let (mut adapter, feeder) = ChannelAdapter::new();
        adapter.close().await;
        adapter.close().await;
        assert!(feeder.is_closed());
        assert!(!feeder.connect());
    }
}
