use async_trait::async_trait;

use super::signal::StreamSignal;
use crate::error::AppResult;

/// Source of feed signals.
///
/// Implementations yield a sequence shaped like
/// `Connected, Backlog?, Event*, Disconnected` per connection and return
/// `None` once the transport is exhausted.
#[async_trait]
pub trait StreamAdapter: Send {
    fn name(&self) -> &'static str;

    /// Establish the transport. Called once before the first `next_signal`.
    async fn open(&mut self) -> AppResult<()>;

    async fn next_signal(&mut self) -> Option<StreamSignal>;

    /// Release the transport. Must be safe to call more than once.
    async fn close(&mut self);
}

#[async_trait]
impl<A: StreamAdapter + ?Sized> StreamAdapter for Box<A> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn open(&mut self) -> AppResult<()> {
        (**self).open().await
    }

    async fn next_signal(&mut self) -> Option<StreamSignal> {
        (**self).next_signal().await
    }

    async fn close(&mut self) {
        (**self).close().await
    }
}
