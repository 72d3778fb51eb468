//! Normalizes raw transport frames into a well-formed signal sequence.
//!
//! Whatever the transport sends, downstream consumers see
//! `Connected, Backlog?, Event*, Disconnected` per connection:
//! a missing `Connected` is synthesized before the first frame. A repeated
//! `Connected` on a connection that has not delivered anything yet is
//! absorbed; after a backlog or event it is split into
//! `Disconnected, Connected`. Extra backlogs within one connection are
//! dropped and `Disconnected` is only emitted once.

use super::signal::StreamSignal;

#[derive(Debug, Default)]
pub struct SignalSequencer {
    connected: bool,
    backlog_seen: bool,
    /// Nothing delivered on the current connection yet
    pristine: bool,
    connections: u64,
}

impl SignalSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Connections opened so far
    pub fn connections(&self) -> u64 {
        self.connections
    }

    pub fn admit(&mut self, signal: StreamSignal) -> Vec<StreamSignal> {
        let mut out = Vec::with_capacity(2);

        match signal {
            StreamSignal::Connected => {
                if self.connected && self.pristine {
                    // transport open already announced this connection
                    return out;
                }
                if self.connected {
                    tracing::debug!("Connect while already connected, treating as reconnect");
                    out.push(StreamSignal::Disconnected);
                }
                self.open(&mut out);
            }
            StreamSignal::Disconnected => {
                if self.connected {
                    self.connected = false;
                    out.push(StreamSignal::Disconnected);
                }
            }
            StreamSignal::Backlog(items) => {
                if !self.connected {
                    self.open(&mut out);
                }
                if self.backlog_seen {
                    tracing::warn!(
                        items = items.len(),
                        connection = self.connections,
                        "Ignoring repeated backlog within one connection"
                    );
                } else {
                    self.backlog_seen = true;
                    self.pristine = false;
                    out.push(StreamSignal::Backlog(items));
                }
            }
            StreamSignal::Event(item) => {
                if !self.connected {
                    self.open(&mut out);
                }
                self.pristine = false;
                out.push(StreamSignal::Event(item));
            }
        }

        out
    }

    /// Close out the sequence when the transport ends.
    pub fn finish(&mut self) -> Option<StreamSignal> {
        if self.connected {
            self.connected = false;
            Some(StreamSignal::Disconnected)
        } else {
            None
        }
    }

    fn open(&mut self, out: &mut Vec<StreamSignal>) {
        self.connected = true;
        self.backlog_seen = false;
        self.pristine = true;
        self.connections += 1;
        out.push(StreamSignal::Connected);
    }
}
