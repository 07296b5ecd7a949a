//! Single-load sidecar reader with background ingestion.
//!
//! [`SidecarReader`] owns one [`SidecarIndex`] for its whole lifetime and
//! moves through `Empty -> Loading -> Ready | Failed`. Loading happens
//! either on the calling thread ([`SidecarReader::load`]) or on a dedicated
//! worker thread ([`SidecarReader::load_async`]).
//!
//! The index is published in a single write once it is complete, so
//! accessors see either no data or the whole index. Accessors called while a
//! load is running fail with [`Error::NotReady`].
//!
//! # Example
//!
//! ```ignore
//! use sidecar_index::SidecarReader;
//!
//! let reader = SidecarReader::new();
//! let handle = reader.load_async("db.index", |outcome| {
//!     if let Ok(stats) = outcome {
//!         println!("{} records ready", stats.records);
//!     }
//! })?;
//!
//! // ... other work ...
//!
//! handle.wait()?;
//! println!("{}", reader.key_at(0)?);
//! ```

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::sidecar::{IndexBuilder, LoadConfig, LoadStats, SidecarIndex};
use crate::{Error, Result};

/// Shared empty index handed out before the first load.
static EMPTY_INDEX: Lazy<Arc<SidecarIndex>> = Lazy::new(|| Arc::new(SidecarIndex::default()));

/// Lifecycle state of a [`SidecarReader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    /// Nothing loaded yet
    Empty,
    /// A load is running
    Loading,
    /// Index loaded and immutable
    Ready,
    /// The last load failed; a new load may be attempted
    Failed,
}

enum LoadState {
    Empty,
    Loading,
    Ready(Arc<SidecarIndex>),
    Failed(String),
}

struct Shared {
    state: RwLock<LoadState>,
    config: LoadConfig,
}

/// Owner of a sidecar index with a single-load lifecycle.
///
/// Cloning is cheap and every clone refers to the same index.
#[derive(Clone)]
pub struct SidecarReader {
    shared: Arc<Shared>,
}

impl Default for SidecarReader {
    fn default() -> Self {
        Self::new()
    }
}

impl SidecarReader {
    /// Create an empty reader with the default configuration.
    pub fn new() -> Self {
        Self::from_parts(LoadConfig::default())
    }

    /// Create an empty reader with a custom configuration.
    pub fn with_config(config: LoadConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config))
    }

    fn from_parts(config: LoadConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(LoadState::Empty),
                config,
            }),
        }
    }

    /// Load the sidecar at `path` on the calling thread.
    ///
    /// Fails with [`Error::AlreadyLoaded`] if an index is already present
    /// and with [`Error::LoadInProgress`] if another load is running.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<LoadStats> {
        self.begin_load()?;
        self.run_load(path.as_ref())
    }

    /// Load the sidecar at `path` on a background thread.
    ///
    /// Returns as soon as the worker is started. When `load_async` returns
    /// `Ok`, `on_complete` is invoked exactly once on the worker thread,
    /// after the index has been published or the failure recorded. The same
    /// outcome is available from [`LoadHandle::wait`]; a panic inside
    /// `on_complete` is logged and does not change it.
    pub fn load_async<F>(&self, path: impl Into<PathBuf>, on_complete: F) -> Result<LoadHandle>
    where
        F: FnOnce(&Result<LoadStats>) + Send + 'static,
    {
        let previous = self.begin_load()?;

        let reader = self.clone();
        let path = path.into();
        let spawned = thread::Builder::new()
            .name("sidecar-load".to_string())
            .spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| reader.run_load(&path)))
                    .unwrap_or_else(|_| reader.finish_load(Err(Error::WorkerPanicked)));
                if let Err(ref e) = outcome {
                    log::error!("Background load of {:?} failed: {}", path, e);
                }
                if panic::catch_unwind(AssertUnwindSafe(|| on_complete(&outcome))).is_err() {
                    log::error!("Completion callback for {:?} panicked", path);
                }
                outcome
            });

        match spawned {
            Ok(handle) => Ok(LoadHandle { handle }),
            Err(e) => {
                self.abort_load(previous);
                Err(Error::Stream(e))
            }
        }
    }

    /// Claim the reader for a load, returning the state it replaced.
    fn begin_load(&self) -> Result<LoadState> {
        let mut state = self.shared.state.write();
        match *state {
            LoadState::Loading => Err(Error::LoadInProgress),
            LoadState::Ready(_) => Err(Error::AlreadyLoaded),
            LoadState::Empty | LoadState::Failed(_) => {
                Ok(std::mem::replace(&mut *state, LoadState::Loading))
            }
        }
    }

    /// Undo [`begin_load`](Self::begin_load) when no load was started.
    fn abort_load(&self, previous: LoadState) {
        *self.shared.state.write() = previous;
    }

    fn run_load(&self, path: &Path) -> Result<LoadStats> {
        let result = IndexBuilder::new(self.shared.config.clone()).and_then(|b| b.load(path));
        self.finish_load(result)
    }

    /// Publish the outcome of a load.
    fn finish_load(&self, result: Result<SidecarIndex>) -> Result<LoadStats> {
        let mut state = self.shared.state.write();
        match result {
            Ok(index) => {
                let stats = index.stats().clone();
                *state = LoadState::Ready(Arc::new(index));
                Ok(stats)
            }
            Err(e) => {
                *state = LoadState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ReaderState {
        match *self.shared.state.read() {
            LoadState::Empty => ReaderState::Empty,
            LoadState::Loading => ReaderState::Loading,
            LoadState::Ready(_) => ReaderState::Ready,
            LoadState::Failed(_) => ReaderState::Failed,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ReaderState::Ready
    }

    pub fn config(&self) -> &LoadConfig {
        &self.shared.config
    }

    /// The loaded index, if any.
    pub fn index(&self) -> Option<Arc<SidecarIndex>> {
        match *self.shared.state.read() {
            LoadState::Ready(ref index) => Some(Arc::clone(index)),
            _ => None,
        }
    }

    /// Statistics of the completed load, if any.
    pub fn stats(&self) -> Option<LoadStats> {
        self.index().map(|index| index.stats().clone())
    }

    /// Index to serve accessor calls from.
    fn snapshot(&self) -> Result<Arc<SidecarIndex>> {
        match *self.shared.state.read() {
            LoadState::Ready(ref index) => Ok(Arc::clone(index)),
            LoadState::Empty => Ok(Arc::clone(&EMPTY_INDEX)),
            LoadState::Loading => Err(Error::NotReady),
            LoadState::Failed(ref msg) => Err(Error::LoadFailed(msg.clone())),
        }
    }

    /// Number of loaded records; 0 unless the reader is ready.
    pub fn size(&self) -> usize {
        self.index().map_or(0, |index| index.len())
    }

    /// Key of record `index`.
    pub fn key_at(&self, index: usize) -> Result<String> {
        self.snapshot()?.key_at(index).map(str::to_owned)
    }

    /// Payload offset of record `index`.
    pub fn offset_at(&self, index: usize) -> Result<u64> {
        self.snapshot()?.offset_at(index)
    }

    /// Payload length of record `index`.
    pub fn length_at(&self, index: usize) -> Result<u32> {
        self.snapshot()?.length_at(index)
    }
}

impl fmt::Debug for SidecarReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SidecarReader")
            .field("state", &self.state())
            .field("size", &self.size())
            .field("config", &self.shared.config)
            .finish()
    }
}

/// Handle to a background load started by [`SidecarReader::load_async`].
#[derive(Debug)]
pub struct LoadHandle {
    handle: JoinHandle<Result<LoadStats>>,
}

impl LoadHandle {
    /// Block until the load finishes and return its outcome.
    ///
    /// [`Error::WorkerPanicked`] is returned only if the worker thread itself
    /// died; panics in the load and in the completion callback are caught
    /// on the worker.
    pub fn wait(self) -> Result<LoadStats> {
        self.handle.join().map_err(|_| Error::WorkerPanicked)?
    }

    /// Whether the worker has finished, including the completion callback.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
