//! Feed session.
//!
//! Applies stream signals to the store in receipt order, consults the sound
//! gate after every successful live prepend, and owns the current filter
//! criteria. Every transition runs to completion before the next signal.

use serde::Serialize;

use crate::error::AppError;
use crate::external::stream::StreamSignal;
use crate::models::{Notification, RawNotification};
use crate::services::projection::{FilterCriteria, GroupedView, project};
use crate::services::sound_gate::{GateState, SoundGate};
use crate::services::store::{DedupPolicy, NotificationStore, ReplaceOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Disconnected => "disconnected",
        }
    }
}

/// What applying one signal did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalOutcome {
    Connected,
    BacklogReplaced(ReplaceOutcome),
    EventAdded { sound_requested: bool },
    EventDropped,
    Disconnected,
}

impl SignalOutcome {
    /// Whether the visible feed may have changed.
    pub fn changes_view(&self) -> bool {
        !matches!(self, SignalOutcome::EventDropped)
    }
}

/// Running totals, reported on shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub connections: u64,
    pub backlogs: u64,
    pub events_added: u64,
    pub events_dropped: u64,
    pub sounds_requested: u64,
}

#[derive(Debug)]
pub struct FeedSession {
    store: NotificationStore,
    criteria: FilterCriteria,
    gate: SoundGate,
    status: ConnectionStatus,
    stats: SessionStats,
}

impl FeedSession {
    pub fn new(dedup: DedupPolicy, criteria: FilterCriteria, gate: SoundGate) -> Self {
        Self {
            store: NotificationStore::new(dedup),
            criteria,
            gate,
            status: ConnectionStatus::Connecting,
            stats: SessionStats::default(),
        }
    }

    pub fn apply(&mut self, signal: StreamSignal) -> SignalOutcome {
        match signal {
            StreamSignal::Connected => self.on_connected(),
            StreamSignal::Backlog(items) => self.on_backlog(items),
            StreamSignal::Event(item) => self.on_event(item),
            StreamSignal::Disconnected => self.on_disconnected(),
        }
    }

    fn on_connected(&mut self) -> SignalOutcome {
        self.status = ConnectionStatus::Connected;
        self.stats.connections += 1;
        tracing::info!(connection = self.stats.connections, "Feed connected");
        SignalOutcome::Connected
    }

    fn on_backlog(&mut self, items: Vec<RawNotification>) -> SignalOutcome {
        let outcome = self.store.replace_all(items);
        self.stats.backlogs += 1;
        tracing::info!(
            accepted = outcome.accepted,
            malformed = outcome.malformed,
            duplicates = outcome.duplicates,
            "Backlog applied"
        );
        SignalOutcome::BacklogReplaced(outcome)
    }

    fn on_event(&mut self, item: RawNotification) -> SignalOutcome {
        match self.store.prepend(item) {
            Ok(notification) => {
                tracing::debug!(table = %notification.table_no, id = ?notification.id, "Notification added");
                self.stats.events_added += 1;

                let sound_requested = self.gate.notify();
                if sound_requested {
                    self.stats.sounds_requested += 1;
                }
                SignalOutcome::EventAdded { sound_requested }
            }
            Err(error) => {
                self.stats.events_dropped += 1;
                match &error {
                    AppError::DuplicateNotification { .. } => {
                        tracing::debug!(error = %error, "Dropping live event");
                    }
                    _ => tracing::warn!(error = %error, "Dropping live event"),
                }
                SignalOutcome::EventDropped
            }
        }
    }

    /// The store is kept as-is until the next backlog replaces it.
    fn on_disconnected(&mut self) -> SignalOutcome {
        self.status = ConnectionStatus::Disconnected;
        tracing::warn!(held = self.store.len(), "Feed disconnected, keeping last known notifications");
        SignalOutcome::Disconnected
    }

    // ========================================================================
    // Read side
    // ========================================================================

    pub fn view(&self) -> GroupedView<'_> {
        project(self.store.snapshot(), &self.criteria)
    }

    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.store.snapshot()
    }

    pub fn store(&self) -> &NotificationStore {
        &self.store
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn gate(&self) -> &SoundGate {
        &self.gate
    }

    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    // ========================================================================
    // Filter criteria
    // ========================================================================

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn set_table_filter(&mut self, value: impl Into<String>) {
        self.criteria.table_filter = value.into();
    }

    pub fn set_text_filter(&mut self, value: impl Into<String>) {
        self.criteria.text_filter = value.into();
    }

    pub fn clear_filters(&mut self) {
        self.criteria = FilterCriteria::default();
    }
}
