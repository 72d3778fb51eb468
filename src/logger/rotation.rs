//! Log file rotation

use std::fs;
use std::path::{Path, PathBuf};

use jiff::{Timestamp, Zoned};

use crate::logger::config::{RotationConfig, RotationStrategy, TimeUnit};
use crate::logger::error::LoggerError;

/// Decides when the active log file rolls over and prunes old ones.
pub struct RotationManager {
    config: RotationConfig,
    last_rotation: Timestamp,
}

impl RotationManager {
    pub fn new(config: RotationConfig) -> Self {
        Self {
            config,
            last_rotation: Timestamp::now(),
        }
    }

    pub fn should_rotate(&self, current_size: u64) -> bool {
        match self.config.strategy {
            RotationStrategy::Size => current_size >= self.config.max_size,
            RotationStrategy::Time(unit) => self.time_elapsed(unit),
            RotationStrategy::Combined => {
                current_size >= self.config.max_size || self.time_elapsed(TimeUnit::Daily)
            }
        }
    }

    fn time_elapsed(&self, unit: TimeUnit) -> bool {
        Timestamp::now().duration_since(self.last_rotation) >= unit.duration()
    }

    /// Move the active file aside and prune rotated files beyond `max_files`.
    pub fn rotate(&mut self, current: &Path) -> Result<PathBuf, LoggerError> {
        let rotated = self.rotated_path(current);

        if current.exists() {
            fs::rename(current, &rotated).map_err(|e| {
                LoggerError::rotation(format!(
                    "cannot move {} to {}: {}",
                    current.display(),
                    rotated.display(),
                    e
                ))
            })?;
        }

        self.last_rotation = Timestamp::now();
        self.prune(current)?;
        Ok(rotated)
    }

    /// `<stem>.<YYYYmmdd_HHMMSS_fff>.<ext>`; names sort oldest first.
    fn rotated_path(&self, base: &Path) -> PathBuf {
        let now = Zoned::now();
        let stamp = format!(
            "{}_{:03}",
            now.strftime("%Y%m%d_%H%M%S"),
            now.subsec_nanosecond() / 1_000_000
        );
        let stem = base.file_stem().unwrap_or_default().to_string_lossy();
        let ext = base.extension().unwrap_or_default().to_string_lossy();

        let mut name = if ext.is_empty() {
            format!("{stem}.{stamp}")
        } else {
            format!("{stem}.{stamp}.{ext}")
        };

        // Two rotations within the same millisecond
        let mut attempt = 1;
        while base.with_file_name(&name).exists() {
            name = if ext.is_empty() {
                format!("{stem}.{stamp}-{attempt}")
            } else {
                format!("{stem}.{stamp}-{attempt}.{ext}")
            };
            attempt += 1;
        }

        base.with_file_name(name)
    }

    fn prune(&self, base: &Path) -> Result<(), LoggerError> {
        let mut rotated = rotated_files(base)?;
        rotated.sort();

        while rotated.len() > self.config.max_files {
            let oldest = rotated.remove(0);
            fs::remove_file(&oldest)?;
        }
        Ok(())
    }
}

/// Rotated siblings of `base`, in no particular order.
pub(crate) fn rotated_files(base: &Path) -> Result<Vec<PathBuf>, LoggerError> {
    let parent = match base.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let prefix = format!("{}.", base.file_stem().unwrap_or_default().to_string_lossy());

    let files = fs::read_dir(parent)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().starts_with(&prefix))
                .unwrap_or(false)
                && path.file_name() != base.file_name()
        })
        .collect();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::tempdir;

    fn size_config(max_size: u64, max_files: usize) -> RotationConfig {
        RotationConfig {
            strategy: RotationStrategy::Size,
            max_size,
            max_files,
        }
    }

    #[test]
    fn test_should_rotate_by_size() {
        let manager = RotationManager::new(size_config(1024, 5));
        assert!(!manager.should_rotate(512));
        assert!(!manager.should_rotate(1023));
        assert!(manager.should_rotate(1024));
    }

    #[test]
    fn test_time_strategy_does_not_fire_immediately() {
        let manager = RotationManager::new(RotationConfig {
            strategy: RotationStrategy::Time(TimeUnit::Hourly),
            ..size_config(1, 5)
        });
        assert!(!manager.should_rotate(u64::MAX));
    }

    #[test]
    fn test_rotate_moves_file_aside() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("feed.log");
        fs::write(&base, "old lines").unwrap();

        let mut manager = RotationManager::new(size_config(10, 3));
        let rotated = manager.rotate(&base).unwrap();

        assert!(!base.exists());
        assert_eq!(fs::read_to_string(&rotated).unwrap(), "old lines");
        let name = rotated.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("feed.") && name.ends_with(".log"));
    }

    #[test]
    fn test_rotate_without_active_file() {
        let dir = tempdir().unwrap();
        let mut manager = RotationManager::new(size_config(10, 3));
        assert!(manager.rotate(&dir.path().join("absent.log")).is_ok());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_rotation_triggers_at_threshold(
            current_size in 0u64..10_000_000u64,
            max_size in 1u64..10_000_000u64,
        ) {
            let manager = RotationManager::new(size_config(max_size, 5));
            prop_assert_eq!(manager.should_rotate(current_size), current_size >= max_size);
        }

        #[test]
        fn prop_pruning_keeps_newest_files(
            max_files in 1usize..6,
            existing in 0usize..10,
        ) {
            let dir = tempdir().unwrap();
            let base = dir.path().join("feed.log");
            for i in 0..existing {
                fs::write(dir.path().join(format!("feed.20240101_0000{:02}_000.log", i)), "x").unwrap();
            }
            fs::write(&base, "current").unwrap();

            let mut manager = RotationManager::new(size_config(1, max_files));
            let newest = manager.rotate(&base).unwrap();

            let remaining = rotated_files(&base).unwrap();
            prop_assert_eq!(remaining.len(), (existing + 1).min(max_files));
            prop_assert!(remaining.contains(&newest));
        }
    }
}
