//! Error types for sidecar-index.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for sidecar-index operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Sidecar or data file could not be opened, sized or read
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error without an associated path (stdin, custom readers)
    #[error("IO error: {0}")]
    Stream(#[from] std::io::Error),

    /// Positional accessor called past the end of the index
    #[error("index out of range: position {index}, size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    /// Load requested on a reader that already holds an index
    #[error("index already loaded")]
    AlreadyLoaded,

    /// Load requested while another load is running on the same reader
    #[error("a load is already in progress")]
    LoadInProgress,

    /// Accessor called while a load is running
    #[error("index is still loading")]
    NotReady,

    /// Accessor called after the last load failed
    #[error("index load failed: {0}")]
    LoadFailed(String),

    /// Record payload does not fit inside the data file
    #[error(
        "payload of record {index} out of bounds: offset {offset} + length {length} > file size {file_size}"
    )]
    PayloadOutOfBounds {
        index: usize,
        offset: u64,
        length: u32,
        file_size: u64,
    },

    /// Invalid load configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// The background load worker panicked
    #[error("load worker panicked")]
    WorkerPanicked,
}

/// Coarse error category, for binding layers that map failures onto their
/// own error classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Range,
    State,
    Config,
}

impl Error {
    /// Build an IO error carrying the path it happened on.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io { .. } | Error::Stream(_) => ErrorKind::Io,
            Error::IndexOutOfRange { .. } | Error::PayloadOutOfBounds { .. } => ErrorKind::Range,
            Error::AlreadyLoaded
            | Error::LoadInProgress
            | Error::NotReady
            | Error::LoadFailed(_)
            | Error::WorkerPanicked => ErrorKind::State,
            Error::Config(_) => ErrorKind::Config,
        }
    }
}

/// Result type alias for sidecar-index operations.
pub type Result<T> = std::result::Result<T, Error>;
