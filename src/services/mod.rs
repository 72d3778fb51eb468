//! Feed engine.
//!
//! The store holds the canonical collection, projection turns it into the
//! grouped view, the sound gate decides whether live events make noise, and
//! the session ties the three to incoming stream signals.

pub mod projection;
pub mod session;
pub mod sound_gate;
pub mod store;

pub use projection::{FilterCriteria, GroupedView, TableGroup, project};
pub use session::{ConnectionStatus, FeedSession, SessionStats, SignalOutcome};
pub use sound_gate::{GateState, SoundGate};
pub use store::{DedupPolicy, NotificationStore, ReplaceOutcome};
