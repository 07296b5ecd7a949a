//! Load configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::{Error, Result};

/// Heuristic average sidecar line width, used to estimate record counts
/// from the file size.
pub const AVERAGE_LINE_BYTES: usize = 32;

/// Starting capacity of the reusable line buffer.
pub const DEFAULT_INITIAL_LINE_CAPACITY: usize = 1024;

/// Lines longer than this are skipped.
pub const DEFAULT_MAX_LINE_BYTES: usize = 64 * 1024;

/// Configuration for building a sidecar index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Divisor for the capacity hint (`file_size / average_line_bytes`).
    pub average_line_bytes: usize,
    /// Initial capacity of the line buffer; it grows up to `max_line_bytes`.
    pub initial_line_capacity: usize,
    /// Maximum accepted line length in bytes, terminator included.
    pub max_line_bytes: usize,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            average_line_bytes: AVERAGE_LINE_BYTES,
            initial_line_capacity: DEFAULT_INITIAL_LINE_CAPACITY,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }
}

impl LoadConfig {
    /// Set the average line width used for the capacity hint.
    pub fn with_average_line_bytes(mut self, bytes: usize) -> Self {
        self.average_line_bytes = bytes;
        self
    }

    /// Set the maximum accepted line length.
    pub fn with_max_line_bytes(mut self, bytes: usize) -> Self {
        self.max_line_bytes = bytes;
        self
    }

    /// Set the initial line buffer capacity.
    pub fn with_initial_line_capacity(mut self, bytes: usize) -> Self {
        self.initial_line_capacity = bytes;
        self
    }

    /// Check that every knob is usable.
    pub fn validate(&self) -> Result<()> {
        if self.average_line_bytes == 0 {
            return Err(Error::Config(
                "average_line_bytes must be greater than zero".to_string(),
            ));
        }
        if self.max_line_bytes == 0 {
            return Err(Error::Config(
                "max_line_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Estimated record count for a sidecar of `file_size` bytes.
    pub fn capacity_hint(&self, file_size: u64) -> usize {
        let estimate = file_size / self.average_line_bytes.max(1) as u64;
        usize::try_from(estimate).unwrap_or(usize::MAX)
    }

    /// Load a configuration from a JSON file. Missing fields take their
    /// defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config: Self =
            serde_json::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoadConfig::default();
        assert_eq!(config.average_line_bytes, 32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_capacity_hint() {
        let config = LoadConfig::default();
        assert_eq!(config.capacity_hint(0), 0);
        assert_eq!(config.capacity_hint(31), 0);
        assert_eq!(config.capacity_hint(3200), 100);
    }

    #[test]
    fn test_invalid_config() {
        assert!(LoadConfig::default()
            .with_average_line_bytes(0)
            .validate()
            .is_err());
        assert!(LoadConfig::default()
            .with_max_line_bytes(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: LoadConfig = serde_json::from_str(r#"{"max_line_bytes": 256}"#).unwrap();
        assert_eq!(config.max_line_bytes, 256);
        assert_eq!(config.average_line_bytes, AVERAGE_LINE_BYTES);
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("load.json");
        fs::write(&path, r#"{"average_line_bytes": 16}"#).unwrap();

        let config = LoadConfig::from_json_file(&path).unwrap();
        assert_eq!(config.average_line_bytes, 16);

        fs::write(&path, r#"{"average_line_bytes": 0}"#).unwrap();
        assert!(matches!(
            LoadConfig::from_json_file(&path),
            Err(Error::Config(_))
        ));
    }
}
