//! Binding an adapter to signal handlers.
//!
//! [`subscribe`] opens the adapter on its own task and forwards every signal
//! to the handler. The returned [`Subscription`] is the only way to stop it;
//! once `cancel` returns, the handler is never invoked again.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::adapter::StreamAdapter;
use super::signal::StreamSignal;

/// Receiver of stream signals.
///
/// Called from the subscription task, one signal at a time.
pub trait SignalHandler: Send + 'static {
    fn handle(&mut self, signal: StreamSignal);
}

impl SignalHandler for mpsc::UnboundedSender<StreamSignal> {
    fn handle(&mut self, signal: StreamSignal) {
        // A dropped receiver means nobody is listening any more.
        let _ = self.send(signal);
    }
}

type HandlerSlot<H> = Arc<Mutex<Option<H>>>;

/// Handle to a running subscription. Dropping it cancels.
pub struct Subscription {
    token: CancellationToken,
    detach: Box<dyn Fn() + Send + Sync>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Stop delivery and release the adapter.
    ///
    /// Idempotent. No handler invocation starts after this returns.
    pub fn cancel(&self) {
        self.token.cancel();
        (self.detach)();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the subscription task to end, either because the stream was
    /// exhausted or because it was cancelled.
    pub async fn finished(&mut self) {
        if let Some(task) = self.task.as_mut() {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Subscription task failed");
            }
            self.task = None;
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("cancelled", &self.is_cancelled())
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Start delivering `adapter`'s signals to `handler`.
///
/// Must be called from within a tokio runtime. An adapter that fails to open
/// produces no signals; the failure is logged and the task ends.
pub fn subscribe<A, H>(mut adapter: A, handler: H) -> Subscription
where
    A: StreamAdapter + 'static,
    H: SignalHandler,
{
    let token = CancellationToken::new();
    let slot: HandlerSlot<H> = Arc::new(Mutex::new(Some(handler)));

    let task = {
        let token = token.clone();
        let slot = Arc::clone(&slot);

        tokio::spawn(async move {
            let name = adapter.name();

            let opened = tokio::select! {
                biased;
                _ = token.cancelled() => false,
                result = adapter.open() => match result {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!(adapter = name, error = %e, "Stream failed to open");
                        false
                    }
                },
            };

            if opened {
                tracing::debug!(adapter = name, "Subscription started");
                loop {
                    let signal = tokio::select! {
                        biased;
                        _ = token.cancelled() => break,
                        signal = adapter.next_signal() => signal,
                    };
                    let Some(signal) = signal else {
                        break;
                    };
                    if !deliver(&slot, signal) {
                        break;
                    }
                }
            }

            adapter.close().await;
            // Release the handler so channel receivers observe the end.
            take_handler(&slot);
            tracing::debug!(adapter = name, cancelled = token.is_cancelled(), "Subscription ended");
        })
    };

    let detach = {
        let slot = Arc::clone(&slot);
        Box::new(move || {
            take_handler(&slot);
        })
    };

    Subscription {
        token,
        detach,
        task: Some(task),
    }
}

fn deliver<H: SignalHandler>(slot: &HandlerSlot<H>, signal: StreamSignal) -> bool {
    let mut guard = match slot.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    match guard.as_mut() {
        Some(handler) => {
            handler.handle(signal);
            true
        }
        None => false,
    }
}

fn take_handler<H>(slot: &HandlerSlot<H>) -> Option<H> {
    match slot.lock() {
        Ok(mut guard) => guard.take(),
        Err(poisoned) => poisoned.into_inner().take(),
    }
}
