//! Payload access into the companion data file.
//!
//! The data file is memory-mapped once; a record's payload is the byte
//! range `[offset, offset + length)` taken from the sidecar index. Ranges
//! are checked when a payload is read, not when the index is loaded.
//!
//! Data files written for these sidecars terminate each entry with a NUL
//! byte that the sidecar length counts. [`DataFile::payload`] returns the
//! raw range, terminator included; [`DataFile::entry`] returns the entry
//! with its trailing NUL removed.

use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::sidecar::SidecarIndex;
use crate::{Error, Result};

/// Memory-mapped data file.
pub struct DataFile {
    path: PathBuf,
    /// `None` for empty files, which cannot be mapped on every platform
    mmap: Option<Mmap>,
}

impl DataFile {
    /// Open and map a data file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let len = file.metadata().map_err(|e| Error::io(path, e))?.len();

        let mmap = if len == 0 {
            None
        } else {
            // The mapping is read-only; the data file is not expected to be
            // truncated while open.
            Some(unsafe { Mmap::map(&file) }.map_err(|e| Error::io(path, e))?)
        };

        log::debug!("Mapped data file {:?} ({} bytes)", path, len);

        Ok(Self {
            path: path.to_path_buf(),
            mmap,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the mapped file in bytes.
    pub fn len(&self) -> u64 {
        self.bytes().len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes().is_empty()
    }

    fn bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or_default()
    }

    /// Bytes at `[offset, offset + length)`.
    pub fn slice(&self, offset: u64, length: u32) -> Option<&[u8]> {
        let end = offset.checked_add(length as u64)?;
        if end > self.len() {
            return None;
        }
        Some(&self.bytes()[offset as usize..end as usize])
    }

    /// Payload of record `index`.
    pub fn payload(&self, sidecar: &SidecarIndex, index: usize) -> Result<&[u8]> {
        let record = sidecar.record_at(index)?;
        self.slice(record.offset, record.length)
            .ok_or(Error::PayloadOutOfBounds {
                index,
                offset: record.offset,
                length: record.length,
                file_size: self.len(),
            })
    }

    /// Entry of record `index` without its trailing NUL terminator.
    ///
    /// A payload that does not end in NUL is returned unchanged.
    pub fn entry(&self, sidecar: &SidecarIndex, index: usize) -> Result<&[u8]> {
        let payload = self.payload(sidecar, index)?;
        Ok(payload.strip_suffix(b"\0").unwrap_or(payload))
    }
}
