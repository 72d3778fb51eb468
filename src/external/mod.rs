//! Boundaries to the outside world: the notification stream and audio output.

pub mod audio;
pub mod stream;
