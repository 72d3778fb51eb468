//! tablefeed
//!
//! Live table notifications: a stream adapter feeding an in-memory store,
//! grouped and filtered views over it, and a sound gate that only rings
//! once the user has enabled sound.

use shadow_rs::shadow;
shadow!(build);

pub mod cli;
pub mod config;
pub mod error;
pub mod external;
pub mod logger;
pub mod models;
pub mod presentation;
pub mod services;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}

pub fn clap_long_version() -> &'static str {
    build::CLAP_LONG_VERSION
}
