//! Typed streaming readers and writers over arena windows.
//!
//! Readers are constructed with `(path, start_byte, byte_limit)` and fill an
//! inclusive cell range per call, stopping at whichever comes first:
//! end-of-file, the byte limit, or the end of the range. Writers mirror them,
//! flushing a contiguous cell window to disk. Neither holds a reference to
//! the arena; the window is passed per call, which keeps ownership with the
//! orchestrating component.
//!
//! Files are opened at construction and closed when the reader or writer is
//! dropped; no handle outlives the stage that created it.

mod reader;
mod writer;

pub use reader::{ColumnReader, CsvRowReader};
pub use writer::{ColumnWriter, CsvRowWriter};

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Byte length of the first line of `path`, including its LF terminator.
///
/// Used to skip the raw CSV header by seeking, and to relate sorted-file
/// offsets back to raw-file offsets.
///
/// # Errors
/// Fails if the file cannot be opened or read.
pub fn count_header_bytes(path: impl AsRef<Path>) -> Result<u64> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut line = Vec::new();
    BufReader::new(f)
        .read_until(b'\n', &mut line)
        .with_context(|| format!("read header of {}", path.display()))?;
    Ok(line.len() as u64)
}
