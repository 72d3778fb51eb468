//! clap value parsers for arguments that need more than a type check

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::validation::parse_stream_url;

/// The file must exist, be a regular file and be readable.
pub fn validate_config_file_path(path_str: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path_str);
    check_readable_file(&path, "Configuration")?;
    Ok(path)
}

/// `-` (stdin) or a readable file.
pub fn validate_replay_source(source: &str) -> Result<String, String> {
    if source == "-" {
        return Ok(source.to_string());
    }
    check_readable_file(Path::new(source), "Recording")?;
    Ok(source.to_string())
}

/// Absolute http(s) URL with a host.
pub fn validate_stream_url(url_str: &str) -> Result<String, String> {
    parse_stream_url(url_str)?;
    Ok(url_str.trim().to_string())
}

fn check_readable_file(path: &Path, what: &str) -> Result<(), String> {
    if !path.exists() {
        return Err(format!("{what} file does not exist: '{}'", path.display()));
    }
    if !path.is_file() {
        return Err(format!("{what} path is not a file: '{}'", path.display()));
    }
    fs::File::open(path)
        .map(|_| ())
        .map_err(|e| format!("Cannot read {} file '{}': {}", what.to_lowercase(), path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, tempdir};

    #[test]
    fn test_validate_stream_url() {
        assert_eq!(
            validate_stream_url(" http://127.0.0.1:4000/notifications ").unwrap(),
            "http://127.0.0.1:4000/notifications"
        );
        assert!(validate_stream_url("https://venue.example?token=1").is_ok());

        assert!(validate_stream_url("venue.example/feed").is_err());
        assert!(validate_stream_url("ws://venue.example").is_err());
        assert!(validate_stream_url("http://").is_err());
        assert!(validate_stream_url("http://bad host/feed").is_err());
        assert!(validate_stream_url("mailto:staff@venue.example").is_err());

        let err = validate_stream_url("http://venue.example:99999/feed").unwrap_err();
        assert!(err.starts_with("Invalid stream URL"));
    }

    #[test]
    fn test_validate_config_file_path() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();
        assert_eq!(validate_config_file_path(path).unwrap(), PathBuf::from(path));

        let dir = tempdir().unwrap();
        let err = validate_config_file_path(dir.path().to_str().unwrap()).unwrap_err();
        assert!(err.contains("not a file"));

        let err = validate_config_file_path("/nonexistent/tablefeed.toml").unwrap_err();
        assert!(err.contains("does not exist"));
    }

    #[test]
    fn test_validate_replay_source() {
        assert_eq!(validate_replay_source("-").unwrap(), "-");

        let file = NamedTempFile::new().unwrap();
        assert!(validate_replay_source(file.path().to_str().unwrap()).is_ok());

        let err = validate_replay_source("/nonexistent/session.ndjson").unwrap_err();
        assert!(err.starts_with("Recording file"));
    }
}
