//! Sidecar index builder.
//!
//! Reads a sidecar file line by line, decodes each line and appends the
//! record to three column vectors sized up front from the file length.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use super::config::LoadConfig;
use super::decoder::decode_line;
use super::index::{LoadStats, SidecarIndex};
use crate::{Error, Result};

/// Read buffer size for sidecar files.
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Outcome of one bounded line read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineRead {
    Eof,
    Line,
    Overlong,
}

/// Read one line (terminator included) into `buf`, consuming at most up to
/// the next `\n`.
///
/// A line longer than `max_len` is discarded through its terminator and
/// reported as [`LineRead::Overlong`]; `buf` is left empty and the next call
/// starts at the following line. Returns the outcome and the number of bytes
/// consumed.
fn read_bounded_line<R: BufRead>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max_len: usize,
) -> io::Result<(LineRead, u64)> {
    buf.clear();
    let mut consumed: u64 = 0;
    let mut overlong = false;

    loop {
        let available = match reader.fill_buf() {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if available.is_empty() {
            break;
        }

        let (chunk_len, found_newline) = match available.iter().position(|&b| b == b'\n') {
            Some(pos) => (pos + 1, true),
            None => (available.len(), false),
        };

        if !overlong {
            if buf.len() + chunk_len > max_len {
                overlong = true;
                buf.clear();
            } else {
                buf.extend_from_slice(&available[..chunk_len]);
            }
        }

        reader.consume(chunk_len);
        consumed += chunk_len as u64;

        if found_newline {
            break;
        }
    }

    let outcome = if consumed == 0 {
        LineRead::Eof
    } else if overlong {
        LineRead::Overlong
    } else {
        LineRead::Line
    };
    Ok((outcome, consumed))
}

/// Builds a [`SidecarIndex`] from a sidecar file or stream.
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    config: LoadConfig,
}

impl IndexBuilder {
    /// Create a builder, validating the configuration.
    pub fn new(config: LoadConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LoadConfig {
        &self.config
    }

    /// Build an index from the sidecar file at `path`.
    ///
    /// The file size drives the initial column capacity. Any open, metadata
    /// or read failure aborts the load; no partial index is returned.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<SidecarIndex> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let file_size = file.metadata().map_err(|e| Error::io(path, e))?.len();

        let reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
        let index = self
            .build_from_reader(reader, file_size)
            .map_err(|e| match e {
                Error::Stream(source) => Error::io(path, source),
                other => other,
            })?;

        let stats = index.stats();
        log::info!(
            "Loaded {} records from {:?} in {:?} ({} skipped)",
            stats.records,
            path,
            stats.elapsed,
            stats.skipped_lines()
        );
        Ok(index)
    }

    /// Build an index from any buffered reader.
    ///
    /// `size_hint` is the expected stream length in bytes, used only to
    /// pre-size the columns. Passing 0 disables pre-sizing.
    pub fn build_from_reader<R: BufRead>(
        &self,
        mut reader: R,
        size_hint: u64,
    ) -> Result<SidecarIndex> {
        let start = Instant::now();
        let capacity = self.config.capacity_hint(size_hint);
        log::debug!(
            "Reserving {} records for {} bytes ({} bytes/line)",
            capacity,
            size_hint,
            self.config.average_line_bytes
        );

        let mut keys: Vec<String> = Vec::with_capacity(capacity);
        let mut offsets: Vec<u64> = Vec::with_capacity(capacity);
        let mut lengths: Vec<u32> = Vec::with_capacity(capacity);

        let mut stats = LoadStats {
            capacity_hint: capacity,
            ..LoadStats::default()
        };
        let mut line = Vec::with_capacity(
            self.config
                .initial_line_capacity
                .min(self.config.max_line_bytes),
        );
        let mut line_no: u64 = 0;

        loop {
            let (outcome, consumed) =
                read_bounded_line(&mut reader, &mut line, self.config.max_line_bytes)?;
            stats.bytes_read += consumed;

            match outcome {
                LineRead::Eof => break,
                LineRead::Overlong => {
                    line_no += 1;
                    stats.overlong_lines += 1;
                    log::warn!(
                        "Skipping line {}: {} bytes exceeds limit of {}",
                        line_no,
                        consumed,
                        self.config.max_line_bytes
                    );
                }
                LineRead::Line => {
                    line_no += 1;
                    match decode_line(&line) {
                        Some(record) => {
                            keys.push(String::from_utf8_lossy(record.key).into_owned());
                            offsets.push(record.offset);
                            lengths.push(record.length);
                        }
                        None if is_blank(&line) => stats.blank_lines += 1,
                        None => {
                            stats.malformed_lines += 1;
                            log::trace!("Skipping malformed line {}", line_no);
                        }
                    }
                }
            }
        }

        stats.records = keys.len();
        stats.elapsed = start.elapsed();

        if stats.skipped_lines() > 0 {
            log::debug!(
                "Skipped {} malformed and {} overlong lines",
                stats.malformed_lines,
                stats.overlong_lines
            );
        }

        Ok(SidecarIndex::from_columns(keys, offsets, lengths, stats))
    }
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(|&b| b == b'\n' || b == b'\r')
}
