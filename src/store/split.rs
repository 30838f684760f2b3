//! Row store to column store: split the sorted CSV into per-column files.
//!
//! The arena is partitioned into eleven equal windows: one writer window per
//! column and a reader window for the sorted rows. Each row is taken apart
//! into its ten column cells -- categorical columns dictionary-encoded to i8,
//! measures kept as f64, block and street name passed through as strings --
//! and each cell is appended to its column's window, which is flushed to
//! `raw_<column>` whenever it fills.

use anyhow::Result;
use std::path::Path;

use crate::arena::Arena;
use crate::io::{ColumnWriter, CsvRowReader};
use crate::schema::Catalog;

/// Stream `sorted_path` into ten `raw_<column>` files under `dir`.
///
/// # Errors
/// Fails on read or write errors, or on a row carrying a value missing from
/// its dictionary (which the sort stages cannot produce).
pub fn split_columns(
    arena: &mut Arena,
    sorted_path: &Path,
    dir: &Path,
    catalog: &Catalog,
) -> Result<()> {
    let columns = catalog.columns.len();
    let capacity = arena.capacity();
    let window = capacity / (columns + 1);
    let reader_lo = columns * window;
    let reader_hi = reader_lo + window - 1;

    arena.reset(0, capacity - 1);

    let mut writers = Vec::with_capacity(columns);
    for column in &catalog.columns {
        writers.push(ColumnWriter::open(dir.join(format!("raw_{}", column.name)))?);
    }

    let mut reader = CsvRowReader::open(sorted_path, 0, None)?;
    let mut cursor: Vec<usize> = (0..columns).map(|c| c * window).collect();

    loop {
        let read_cnt = reader.read_to(arena.as_mut_slice(), reader_lo, reader_hi)?;
        if read_cnt == 0 {
            break;
        }
        for r in 0..read_cnt {
            let record = arena
                .get(reader_lo + r)
                .as_record()
                .expect("reader window holds records")
                .clone();
            for (c, writer) in writers.iter_mut().enumerate() {
                arena.set(cursor[c], catalog.value_of(&record, c)?);
                cursor[c] += 1;
                if cursor[c] == (c + 1) * window {
                    writer.write_from(arena.as_slice(), c * window, cursor[c] - 1)?;
                    cursor[c] = c * window;
                }
            }
        }
    }

    // flush partial windows
    for (c, writer) in writers.iter_mut().enumerate() {
        if cursor[c] > c * window {
            writer.write_from(arena.as_slice(), c * window, cursor[c] - 1)?;
        }
    }
    Ok(())
}
