//! Sidecar parsing and the column-wise positional index.
//!
//! # Sidecar Format
//!
//! One record per line, no header:
//!
//! ```text
//! <key> TAB <offset> TAB <length> LF
//! ```
//!
//! `offset` is a byte position in the companion data file (up to 64 bits)
//! and `length` the payload size in bytes (up to 32 bits). Keys may be empty
//! and must not contain tabs or newlines.

mod builder;
mod config;
pub mod decoder;
mod index;


pub use builder::IndexBuilder;
pub use config::*;
pub use decoder::{decode_line, RawRecord};
pub use index::{LoadStats, Record, SidecarIndex};
