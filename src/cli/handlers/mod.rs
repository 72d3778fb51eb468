//! Command handlers, one per subcommand

pub mod check;
pub mod replay;
pub mod watch;

pub use check::CheckCommandHandler;
pub use replay::ReplayCommandHandler;
pub use watch::WatchCommandHandler;
