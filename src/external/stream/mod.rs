//! Stream adapters.
//!
//! An adapter owns a transport and turns it into [`StreamSignal`]s. The
//! session never talks to a transport directly; it receives signals through
//! a [`Subscription`] created by [`subscribe`].

mod adapter;
mod channel;
mod http;
mod ndjson;
mod sequencer;
mod signal;
mod subscription;

pub use adapter::StreamAdapter;
pub use channel::{ChannelAdapter, ChannelFeeder};
pub use http::HttpStreamAdapter;
pub use ndjson::NdjsonAdapter;
pub use sequencer::SignalSequencer;
pub use signal::{LineBuffer, StreamSignal, WireFrame, decode_frame, encode_frame};
pub use subscription::{SignalHandler, Subscription, subscribe};
