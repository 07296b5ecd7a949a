//! sidecar-index - Fast positional index over a data blob.
//!
//! A sidecar file lists, one line per record, a key and the byte offset and
//! length of that key's payload inside a much larger data file. This crate
//! parses the sidecar once into three parallel columns so that record `i`'s
//! payload location is an O(1) lookup.
//!
//! # Features
//!
//! - **Direct decoding**: tab tokenization and digit-scanning numeric decode,
//!   no general-purpose number parsing
//! - **Pre-sized storage**: column capacity estimated from the file size
//! - **Background loading**: ingestion on a worker thread with a one-shot
//!   completion callback
//! - **Payload access**: memory-mapped data file, payloads resolved by position
//!
//! # Quick Start
//!
//! ```ignore
//! use sidecar_index::SidecarIndex;
//!
//! let index = SidecarIndex::load("afdb.index")?;
//! for i in 0..index.len() {
//!     let record = index.record_at(i)?;
//!     println!("{}\t{}\t{}", record.key, record.offset, record.length);
//! }
//! ```
//!
//! # Background Loading
//!
//! ```ignore
//! use sidecar_index::SidecarReader;
//!
//! let reader = SidecarReader::new();
//! let handle = reader.load_async("afdb.index", |outcome| match outcome {
//!     Ok(stats) => log::info!("{} records ready", stats.records),
//!     Err(e) => log::error!("load failed: {}", e),
//! })?;
//!
//! // The calling thread is free until the index is needed
//! handle.wait()?;
//! let offset = reader.offset_at(0)?;
//! ```
//!
//! # Parsing Rules
//!
//! - Lines without two tab separators are skipped silently
//! - Empty numeric fields decode to zero
//! - Numeric overflow wraps (values are assumed in range)
//! - Lines longer than [`LoadConfig::max_line_bytes`] are skipped whole

mod error;

pub mod payload;
pub mod reader;
pub mod sidecar;

// Re-export core types
pub use error::{Error, ErrorKind, Result};

// Re-export index types
pub use sidecar::{
    IndexBuilder, LoadConfig, LoadStats, Record, SidecarIndex, AVERAGE_LINE_BYTES,
};

// Re-export the background reader
pub use reader::{LoadHandle, ReaderState, SidecarReader};

// Re-export payload access
pub use payload::DataFile;
