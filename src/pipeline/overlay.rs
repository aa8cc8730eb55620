//! JSON configuration file overlay.
//!
//! Only `source_dir`, `target_dir` and `size` may be overridden from a file.
//! Any other key is reported and ignored.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

use super::config::Config;

/// Keys a config file is allowed to override.
pub const OVERRIDABLE_KEYS: [&str; 3] = ["source_dir", "target_dir", "size"];

/// Suffix appended to a one-time config file after it has been applied.
pub const CONSUMED_SUFFIX: &str = ".done";

#[derive(Debug, Deserialize)]
struct ConfigFile {
    source_dir: Option<PathBuf>,
    target_dir: Option<PathBuf>,
    size: Option<u32>,
    #[serde(flatten)]
    unknown: BTreeMap<String, Value>,
}

/// What an overlay changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayReport {
    /// Recognized keys whose values were applied.
    pub applied: Vec<String>,
    /// Unrecognized keys, ignored.
    pub ignored: Vec<String>,
    /// Where the file was moved to in one-time mode.
    pub consumed: Option<PathBuf>,
}

/// Override `config` with the values in the JSON file at `path`.
///
/// A missing file leaves `config` unchanged. With `one_time`, the file is
/// renamed to `<path>.done` after it has been applied.
///
/// # Errors
///
/// Returns an error if the file cannot be read or renamed, is not a JSON
/// object, or a recognized key has a value of the wrong type.
pub fn overlay(mut config: Config, path: &Path, one_time: bool) -> Result<(Config, OverlayReport)> {
    let mut report = OverlayReport::default();

    if !path.is_file() {
        tracing::debug!("File {} not seen, skipping.", path.display());
        return Ok((config, report));
    }

    let text = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let file: ConfigFile = serde_json::from_str(&text).map_err(|source| Error::ConfigParse {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(source_dir) = file.source_dir {
        log_change(path, "source_dir", &config.source_dir, &source_dir);
        config.source_dir = source_dir;
        report.applied.push("source_dir".to_string());
    }
    if let Some(target_dir) = file.target_dir {
        log_change(path, "target_dir", &config.target_dir, &target_dir);
        config.target_dir = target_dir;
        report.applied.push("target_dir".to_string());
    }
    if let Some(size) = file.size {
        log_change(path, "size", &config.size, &size);
        config.size = size;
        report.applied.push("size".to_string());
    }

    for (key, value) in file.unknown {
        tracing::warn!(
            "File {} key {key:?} does not exist (value={value}), ignoring.",
            path.display()
        );
        report.ignored.push(key);
    }

    if one_time {
        let mut done = OsString::from(path.as_os_str());
        done.push(CONSUMED_SUFFIX);
        let done = PathBuf::from(done);
        fs::rename(path, &done).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Moved {} to {}", path.display(), done.display());
        report.consumed = Some(done);
    }

    Ok((config, report))
}

fn log_change<T: std::fmt::Debug>(path: &Path, key: &str, old: &T, new: &T) {
    tracing::debug!(
        "File {} key {key:?} changed from {old:?} to {new:?}",
        path.display()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("tilecutter.cfg");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_missing_file_is_noop() {
        let dir = tempfile::tempdir().unwrap();

        let (config, report) =
            overlay(Config::default(), &dir.path().join("absent.cfg"), false).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(report, OverlayReport::default());
    }

    #[test]
    fn test_known_key_applied_unknown_key_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), r#"{"size": 256, "bogus_key": 1}"#);

        let (config, report) = overlay(Config::default(), &path, false).unwrap();

        assert_eq!(config.size, 256);
        assert_eq!(report.applied, vec!["size"]);
        assert_eq!(report.ignored, vec!["bogus_key"]);
        assert!(path.is_file());
    }

    #[test]
    fn test_all_recognized_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"{"source_dir": "/in", "target_dir": "/out", "size": 64}"#,
        );

        let (config, report) = overlay(Config::default(), &path, false).unwrap();

        assert_eq!(config.source_dir, PathBuf::from("/in"));
        assert_eq!(config.target_dir, PathBuf::from("/out"));
        assert_eq!(config.size, 64);
        assert_eq!(report.applied.len(), OVERRIDABLE_KEYS.len());
    }

    #[test]
    fn test_non_overridable_fields_stay_put() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), r#"{"target_extension": ".jpg", "quality": 10}"#);

        let (config, report) = overlay(Config::default(), &path, false).unwrap();

        assert_eq!(config.target_extension, ".png");
        assert_eq!(config.quality, Config::default().quality);
        assert_eq!(report.ignored, vec!["quality", "target_extension"]);
    }

    #[test]
    fn test_wrong_type_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), r#"{"size": "large"}"#);

        let err = overlay(Config::default(), &path, false).unwrap_err();

        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_non_object_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "[1, 2, 3]");

        let err = overlay(Config::default(), &path, false).unwrap_err();

        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_one_time_renames_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), r#"{"size": 128}"#);

        let (config, report) = overlay(Config::default(), &path, true).unwrap();

        let done = dir.path().join("tilecutter.cfg.done");
        assert_eq!(config.size, 128);
        assert_eq!(report.consumed.as_deref(), Some(done.as_path()));
        assert!(!path.exists());
        assert!(done.is_file());
    }
}
