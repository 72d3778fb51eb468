//! Subscriber assembly tests.
//!
//! These build the same layers `init_logger` installs but scope them with
//! `with_default`, so tests never fight over the global subscriber.

use super::*;
use proptest::prelude::*;
use std::path::PathBuf;
use tempfile::tempdir;
use tracing_subscriber::layer::SubscriberExt;

fn file_only(path: PathBuf, format: LogFormat, level: &str) -> LoggerConfig {
    LoggerConfig {
        console: ConsoleConfig::new(false, false),
        file: FileConfig {
            enabled: true,
            path,
            append: false,
            format,
            rotation: RotationConfig::default(),
        },
        level: level.to_string(),
    }
}

/// Scoped subscriber plus the level handle, as `init_logger` would build them.
fn scoped(config: &LoggerConfig) -> (impl tracing::Subscriber + Send + Sync + use<>, LogLevelHandle) {
    let (filter, handle) = reload::Layer::new(EnvFilter::new(&config.level));
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(build_layers(config).unwrap());
    (subscriber, LogLevelHandle { inner: handle })
}

#[test]
fn test_json_file_output_carries_fields() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("feed.log");
    let (subscriber, _handle) = scoped(&file_only(path.clone(), LogFormat::Json, "info"));

    tracing::subscriber::with_default(subscriber, || {
        tracing::info!(table = "5", accepted = 3, "Backlog applied");
    });

    let contents = std::fs::read_to_string(&path).unwrap();
    let line: serde_json::Value = serde_json::from_str(contents.lines().next().unwrap()).unwrap();
    assert_eq!(line["fields"]["message"], "Backlog applied");
    assert_eq!(line["fields"]["accepted"], 3);
    assert_eq!(line["level"], "INFO");
}

#[test]
fn test_file_output_has_no_ansi_codes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("feed.log");
    let mut config = file_only(path.clone(), LogFormat::Full, "debug");
    config.console = ConsoleConfig::new(true, true);
    let (subscriber, _handle) = scoped(&config);

    tracing::subscriber::with_default(subscriber, || {
        tracing::debug!(id = 7, "Notification added");
    });

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("Notification added"));
    assert!(!contents.contains('\u{1b}'));
}

#[test]
fn test_level_handle_changes_filtering() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("feed.log");
    let (subscriber, handle) = scoped(&file_only(path.clone(), LogFormat::Compact, "warn"));

    tracing::subscriber::with_default(subscriber, || {
        tracing::info!("hidden before reload");
        handle.set_level("debug").unwrap();
        tracing::debug!("visible after reload");
    });

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(!contents.contains("hidden before reload"));
    assert!(contents.contains("visible after reload"));
}

#[test]
fn test_level_handle_rejects_bad_directive() {
    let (_subscriber, handle) = scoped(&LoggerConfig {
        console: ConsoleConfig::new(true, false),
        ..Default::default()
    });
    let err = handle.set_level("tablefeed=loudest").unwrap_err();
    assert!(matches!(err, LoggerError::Config { .. }));
}

#[test]
fn test_init_rejects_invalid_config() {
    let config = LoggerConfig {
        level: "chatty".to_string(),
        ..Default::default()
    };
    assert!(init_logger(config).is_err());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn prop_valid_levels_build_and_filter(level_idx in 0usize..5) {
        let levels = ["trace", "debug", "info", "warn", "error"];
        let dir = tempdir().unwrap();
        let path = dir.path().join("feed.log");
        let (subscriber, _handle) = scoped(&file_only(path.clone(), LogFormat::Full, levels[level_idx]));

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!("always written");
            tracing::trace!("only at trace");
        });

        let contents = std::fs::read_to_string(&path).unwrap();
        prop_assert!(contents.contains("always written"));
        prop_assert_eq!(contents.contains("only at trace"), level_idx == 0);
    }

    #[test]
    fn prop_zero_rotation_values_fail(max_size in 0u64..2, max_files in 0usize..2) {
        let result = RotationConfig::new(RotationStrategy::Size, max_size, max_files);
        prop_assert_eq!(result.is_ok(), max_size > 0 && max_files > 0);
    }
}
