//! Column-wise sidecar index and its load statistics.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::builder::IndexBuilder;
use super::config::LoadConfig;
use crate::{Error, Result};

/// Summary of one load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadStats {
    /// Records appended to the index
    pub records: usize,
    /// Non-blank lines skipped for missing tab separators
    pub malformed_lines: usize,
    /// Lines skipped for exceeding the configured maximum length
    pub overlong_lines: usize,
    /// Empty lines
    pub blank_lines: usize,
    /// Bytes consumed from the sidecar
    pub bytes_read: u64,
    /// Records reserved up front from the file size
    pub capacity_hint: usize,
    /// Wall time of the load
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
}

impl LoadStats {
    /// Total number of lines skipped for any reason except blankness.
    pub fn skipped_lines(&self) -> usize {
        self.malformed_lines + self.overlong_lines
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (d.as_secs_f64() * 1000.0).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = f64::deserialize(deserializer)?;
        Ok(Duration::from_secs_f64(millis.max(0.0) / 1000.0))
    }
}

/// A single record viewed through the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    pub key: &'a str,
    pub offset: u64,
    pub length: u32,
}

/// Positional index over a data file, stored as three parallel columns.
///
/// Built once by [`IndexBuilder`] and immutable afterwards. The three
/// columns always have the same length.
#[derive(Debug, Default)]
pub struct SidecarIndex {
    keys: Vec<String>,
    offsets: Vec<u64>,
    lengths: Vec<u32>,
    stats: LoadStats,
}

impl SidecarIndex {
    /// Load a sidecar file with the default configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        IndexBuilder::new(LoadConfig::default())?.load(path)
    }

    /// Load a sidecar file with a custom configuration.
    pub fn load_with_config(path: impl AsRef<Path>, config: LoadConfig) -> Result<Self> {
        IndexBuilder::new(config)?.load(path)
    }

    pub(crate) fn from_columns(
        keys: Vec<String>,
        offsets: Vec<u64>,
        lengths: Vec<u32>,
        stats: LoadStats,
    ) -> Self {
        debug_assert_eq!(keys.len(), offsets.len());
        debug_assert_eq!(keys.len(), lengths.len());
        Self {
            keys,
            offsets,
            lengths,
            stats,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Alias of [`len`](Self::len).
    pub fn size(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Statistics of the load that produced this index.
    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }

    fn check(&self, index: usize) -> Result<()> {
        if index >= self.len() {
            return Err(Error::IndexOutOfRange {
                index,
                size: self.len(),
            });
        }
        Ok(())
    }

    /// Key of record `index`.
    pub fn key_at(&self, index: usize) -> Result<&str> {
        self.check(index)?;
        Ok(&self.keys[index])
    }

    /// Payload offset of record `index`.
    pub fn offset_at(&self, index: usize) -> Result<u64> {
        self.check(index)?;
        Ok(self.offsets[index])
    }

    /// Payload length of record `index`.
    pub fn length_at(&self, index: usize) -> Result<u32> {
        self.check(index)?;
        Ok(self.lengths[index])
    }

    /// All three fields of record `index`.
    pub fn record_at(&self, index: usize) -> Result<Record<'_>> {
        self.check(index)?;
        Ok(Record {
            key: &self.keys[index],
            offset: self.offsets[index],
            length: self.lengths[index],
        })
    }

    /// Iterate over records in load order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Record<'_>> + '_ {
        self.keys
            .iter()
            .zip(&self.offsets)
            .zip(&self.lengths)
            .map(|((key, &offset), &length)| Record {
                key,
                offset,
                length,
            })
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    pub fn lengths(&self) -> &[u32] {
        &self.lengths
    }
}
