//! Streaming readers: CSV rows and binary column values.

use anyhow::{Context, Result};
use csv::StringRecord;
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use crate::arena::Cell;
use crate::record::{Record, csv_row_bytes};
use crate::schema::ColumnKind;

/// Reads CSV rows into [`Cell::Record`] cells, tracking its byte position.
///
/// The byte position is computed from row widths rather than taken from the
/// underlying file (which reads ahead): downstream stages record chunk
/// boundaries as byte offsets, so the reader's notion of "how far am I" must
/// advance in exact row-width steps.
///
/// A row that fails validation is **skipped**: the destination index does not
/// advance and the byte position is rolled back by that row's width, so the
/// tracked offset keeps matching the bytes that survive into the next stage's
/// output. The filled window is therefore always dense.
pub struct CsvRowReader {
    reader: csv::Reader<File>,
    byte_offset: u64,
    byte_limit: Option<u64>,
}

impl CsvRowReader {
    /// Open `path` positioned at `start_byte`, bounded by `byte_limit`
    /// (`None` reads to end-of-file).
    ///
    /// # Errors
    /// Fails if the file cannot be opened or seeked.
    pub fn open(path: impl AsRef<Path>, start_byte: u64, byte_limit: Option<u64>) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
        file.seek(SeekFrom::Start(start_byte))
            .with_context(|| format!("seek to {start_byte} in {}", path.display()))?;
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);
        Ok(Self {
            reader,
            byte_offset: start_byte,
            byte_limit,
        })
    }

    /// Current byte position, in row-width steps from `start_byte`.
    pub fn byte_offset(&self) -> u64 {
        self.byte_offset
    }

    /// Fill `cells[lo..=hi]` with parsed records. Returns the number of cells
    /// written, which is less than the window size at end-of-file or at the
    /// byte limit.
    ///
    /// # Errors
    /// Fails on an underlying I/O error. Malformed rows are not errors; they
    /// are skipped and logged.
    pub fn read_to(&mut self, cells: &mut [Cell], lo: usize, hi: usize) -> Result<usize> {
        let mut read_cnt = 0;
        let mut row = StringRecord::new();
        let mut i = lo;
        while i <= hi {
            if !self.reader.read_record(&mut row)? {
                break;
            }
            let width = csv_row_bytes(&row);
            self.byte_offset += width;
            match Record::parse(&row) {
                Ok(record) => {
                    cells[i] = Cell::Record(record);
                    read_cnt += 1;
                    i += 1;
                }
                Err(e) => {
                    self.byte_offset -= width;
                    debug!("skipping row: {e}");
                }
            }
            if let Some(limit) = self.byte_limit
                && self.byte_offset >= limit
            {
                break;
            }
        }
        Ok(read_cnt)
    }
}

/// Reads one column file's homogeneous binary values.
///
/// The value layout follows [`ColumnKind`]: one byte per i8, eight
/// little-endian bytes per f64, LF-terminated UTF-8 per string.
pub struct ColumnReader {
    reader: BufReader<File>,
    kind: ColumnKind,
    byte_offset: u64,
    byte_limit: Option<u64>,
}

impl ColumnReader {
    /// Open `path` positioned at `start_byte`, bounded by `byte_limit`.
    ///
    /// # Errors
    /// Fails if the file cannot be opened or seeked.
    pub fn open(
        path: impl AsRef<Path>,
        start_byte: u64,
        byte_limit: Option<u64>,
        kind: ColumnKind,
    ) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
        file.seek(SeekFrom::Start(start_byte))
            .with_context(|| format!("seek to {start_byte} in {}", path.display()))?;
        Ok(Self {
            reader: BufReader::new(file),
            kind,
            byte_offset: start_byte,
            byte_limit,
        })
    }

    /// Fill `cells[lo..=hi]` with typed values. Returns the number of cells
    /// written.
    ///
    /// # Errors
    /// Fails on an underlying I/O error or invalid UTF-8 in a string column.
    /// A clean end-of-file simply stops the fill.
    pub fn read_to(&mut self, cells: &mut [Cell], lo: usize, hi: usize) -> Result<usize> {
        let mut read_cnt = 0;
        for i in lo..=hi {
            let cell = match self.kind {
                ColumnKind::I8 => {
                    let mut buf = [0u8; 1];
                    match self.reader.read_exact(&mut buf) {
                        Ok(()) => {
                            self.byte_offset += 1;
                            Cell::I8(buf[0] as i8)
                        }
                        Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
                        Err(e) => return Err(e).context("read i8 column value"),
                    }
                }
                ColumnKind::F64 => {
                    let mut buf = [0u8; 8];
                    match self.reader.read_exact(&mut buf) {
                        Ok(()) => {
                            self.byte_offset += 8;
                            Cell::F64(f64::from_le_bytes(buf))
                        }
                        Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
                        Err(e) => return Err(e).context("read f64 column value"),
                    }
                }
                ColumnKind::Str => {
                    let mut buf = Vec::new();
                    let n = self
                        .reader
                        .read_until(b'\n', &mut buf)
                        .context("read string column value")?;
                    if n == 0 {
                        break;
                    }
                    self.byte_offset += n as u64;
                    if buf.last() == Some(&b'\n') {
                        buf.pop();
                    }
                    Cell::Str(String::from_utf8(buf).context("string column is not UTF-8")?)
                }
            };
            cells[i] = cell;
            read_cnt += 1;
            if let Some(limit) = self.byte_limit
                && self.byte_offset >= limit
            {
                break;
            }
        }
        Ok(read_cnt)
    }
}
