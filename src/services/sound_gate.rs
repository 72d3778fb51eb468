//! Sound gate.
//!
//! Two states, `Locked` and `Armed`. The only transition is
//! `Locked -> Armed`, taken when a user-initiated trial playback succeeds.
//! The stream never changes the state; it only asks the gate to `notify`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::external::audio::AudioSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GateState {
    Locked,
    Armed,
}

/// Permission to play notification sounds.
///
/// Clones share state, so an unlock can run on its own task while the
/// event path keeps consulting the gate.
#[derive(Clone)]
pub struct SoundGate {
    armed: Arc<AtomicBool>,
    sink: Arc<dyn AudioSink>,
}

impl SoundGate {
    pub fn new(sink: Arc<dyn AudioSink>) -> Self {
        Self {
            armed: Arc::new(AtomicBool::new(false)),
            sink,
        }
    }

    pub fn state(&self) -> GateState {
        if self.is_armed() {
            GateState::Armed
        } else {
            GateState::Locked
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// User-initiated unlock: play the sound once and stop it straight away.
    ///
    /// Returns whether the gate is armed afterwards. A rejected trial leaves
    /// the gate locked and is not reported as an error.
    pub async fn try_unlock(&self) -> bool {
        if self.is_armed() {
            return true;
        }

        if let Err(error) = self.sink.play().await {
            tracing::debug!(sink = self.sink.name(), error = %error, "Unlock trial rejected, sound stays locked");
            return false;
        }
        if let Err(error) = self.sink.stop().await {
            tracing::debug!(sink = self.sink.name(), error = %error, "Stopping unlock trial failed");
        }

        self.armed.store(true, Ordering::Release);
        tracing::info!(sink = self.sink.name(), "Notification sound enabled");
        true
    }

    /// Run [`try_unlock`](Self::try_unlock) on its own task.
    pub fn spawn_unlock(&self) -> JoinHandle<bool> {
        let gate = self.clone();
        tokio::spawn(async move { gate.try_unlock().await })
    }

    /// Called after every genuinely new live notification.
    ///
    /// When armed, a play request is spawned and not awaited. Returns whether
    /// a request was issued. Playback failures are logged and dropped.
    pub fn notify(&self) -> bool {
        if !self.is_armed() {
            return false;
        }

        let Ok(runtime) = Handle::try_current() else {
            tracing::debug!("No async runtime available, skipping notification sound");
            return false;
        };

        let sink = Arc::clone(&self.sink);
        runtime.spawn(async move {
            if let Err(error) = sink.play().await {
                tracing::debug!(sink = sink.name(), error = %error, "Notification sound failed");
            }
        });
        true
    }
}

impl std::fmt::Debug for SoundGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundGate")
            .field("state", &self.state())
            .field("sink", &self.sink.name())
            .finish()
    }
}
