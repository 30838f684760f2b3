//! Streaming writers: CSV rows and binary column values.

use anyhow::{Context, Result, bail};
use log::error;
use std::fs::{File, OpenOptions, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::arena::Cell;
use crate::rle::encoded_len;

fn open_append(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {} for append", path.display()))
}

/// Appends [`Cell::Record`] cells to a CSV file, one row per record, no
/// header. Rows are serialized through the canonical field formatter so that
/// their byte widths match the source file.
pub struct CsvRowWriter {
    writer: csv::Writer<File>,
}

impl CsvRowWriter {
    /// Open `path` for appending, creating parent directories as needed.
    ///
    /// # Errors
    /// Fails if the directory or file cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = open_append(path.as_ref())?;
        Ok(Self {
            writer: csv::WriterBuilder::new().has_headers(false).from_writer(file),
        })
    }

    /// Append cells `lo..=hi` as CSV rows and flush.
    ///
    /// # Errors
    /// Fails if a cell does not hold a record (an internal sequencing bug) or
    /// on an I/O error.
    pub fn write_from(&mut self, cells: &[Cell], lo: usize, hi: usize) -> Result<()> {
        for (i, cell) in cells[lo..=hi].iter().enumerate() {
            let Some(record) = cell.as_record() else {
                bail!("cell {} does not hold a record", lo + i);
            };
            self.writer
                .write_record(&record.to_row())
                .with_context(|| format!("write row from cell {}", lo + i))?;
        }
        self.writer.flush().context("flush CSV writer")?;
        Ok(())
    }
}

/// Appends binary column values, dispatching on the cell variant: i8 as one
/// byte, f64 as eight little-endian bytes, strings as UTF-8 plus LF.
pub struct ColumnWriter {
    writer: BufWriter<File>,
}

impl ColumnWriter {
    /// Open `path` for appending, creating parent directories as needed.
    ///
    /// # Errors
    /// Fails if the directory or file cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            writer: BufWriter::new(open_append(path.as_ref())?),
        })
    }

    /// Append cells `lo..=hi` and flush. Returns the number of bytes written.
    ///
    /// A failed write of one cell is logged and the write continues with the
    /// next cell; an empty cell in the window is an internal sequencing bug
    /// and fails the whole call.
    ///
    /// # Errors
    /// Fails on an empty cell or if the final flush fails.
    pub fn write_from(&mut self, cells: &[Cell], lo: usize, hi: usize) -> Result<u64> {
        let mut bytes = 0u64;
        for (i, cell) in cells[lo..=hi].iter().enumerate() {
            let written = match cell {
                Cell::I8(v) => self.writer.write_all(&[*v as u8]),
                Cell::F64(v) => self.writer.write_all(&v.to_le_bytes()),
                Cell::Str(s) => self
                    .writer
                    .write_all(s.as_bytes())
                    .and_then(|()| self.writer.write_all(b"\n")),
                other => bail!("cannot write cell {}: {other:?}", lo + i),
            };
            match written {
                Ok(()) => bytes += encoded_len(cell),
                Err(e) => error!("failed to write cell {}: {e}", lo + i),
            }
        }
        self.writer.flush().context("flush column writer")?;
        Ok(bytes)
    }
}
