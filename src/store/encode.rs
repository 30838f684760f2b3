//! Per-column run-length encoding and index construction.
//!
//! Each `raw_<column>` file is streamed through the arena one batch at a
//! time. Encoded cells are written back into the same arena behind a lagging
//! write cursor (encoding never expands: a run of two equal values costs the
//! same two cells, a longer run costs less), then flushed to `rle_<column>`.
//!
//! Logical blocks of [`BLOCK_ROWS`] rows are processed linearly and runs
//! never span a block: any active run is closed at the boundary, and block
//! boundaries always fall inside one batch because the arena capacity is a
//! multiple of the block size (a short read only happens at end-of-file).
//!
//! At every block boundary the column's index entries for the new block are
//! initialized -- a zone map seeded at `(+inf, -inf)`, an all-false town
//! bitmap, the current output byte position for the offset map -- and every
//! value then extends them as it is encoded.

use anyhow::Result;
use std::path::Path;

use crate::BLOCK_ROWS;
use crate::arena::{Arena, Cell};
use crate::dict;
use crate::index::{Bitmap, ZoneMap};
use crate::io::{ColumnReader, ColumnWriter};
use crate::rle::{MAX_I8_RUN, count_cell, encoded_len};
use crate::schema::{Catalog, Column, ColumnKind};

/// Encode every column under `dir`, populating the catalog's indexes.
///
/// # Errors
/// Fails on any read or write error.
pub fn encode_columns(arena: &mut Arena, dir: &Path, catalog: &mut Catalog) -> Result<()> {
    debug_assert!(arena.capacity() % BLOCK_ROWS == 0);
    for column in &mut catalog.columns {
        encode_column(arena, dir, column)?;
    }
    Ok(())
}

fn encode_column(arena: &mut Arena, dir: &Path, column: &mut Column) -> Result<()> {
    let mut reader = ColumnReader::open(
        dir.join(format!("raw_{}", column.name)),
        0,
        None,
        column.kind,
    )?;
    let mut writer = ColumnWriter::open(dir.join(format!("rle_{}", column.name)))?;
    let capacity = arena.capacity();

    let mut encoder = RunEncoder::new(column.kind);
    let mut flushed: u64 = 0;
    let mut row: usize = 0;

    loop {
        arena.reset(0, capacity - 1);
        let read_cnt = reader.read_to(arena.as_mut_slice(), 0, capacity - 1)?;
        if read_cnt == 0 {
            break;
        }

        let mut write_cursor = 0usize;
        let cells = arena.as_mut_slice();
        for read_cursor in 0..read_cnt {
            let value = cells[read_cursor].clone();
            if row % BLOCK_ROWS == 0 {
                encoder.close_run();
                start_block(column, &cells[..write_cursor], flushed);
            }
            update_indexes(column, &value);
            encoder.push(cells, &mut write_cursor, row % BLOCK_ROWS, value);
            row += 1;
        }
        encoder.close_run();

        flushed += writer.write_from(arena.as_slice(), 0, write_cursor - 1)?;
    }
    Ok(())
}

/// Initialize the column's index entries for a new block. The offset entry is
/// the bytes already flushed plus the encoded size of cells still waiting in
/// the arena.
fn start_block(column: &mut Column, pending: &[Cell], flushed: u64) {
    if let Some(zones) = &mut column.zone_i8 {
        zones.push(ZoneMap::seed(i8::MAX, i8::MIN));
    }
    if let Some(zones) = &mut column.zone_f64 {
        zones.push(ZoneMap::seed(f64::INFINITY, f64::NEG_INFINITY));
    }
    if let Some(bitmaps) = &mut column.bitmaps {
        bitmaps.push(Bitmap::new(dict::TOWNS.len()));
    }
    if let Some(offsets) = &mut column.offsets {
        let pending_bytes: u64 = pending.iter().map(encoded_len).sum();
        offsets.push(flushed + pending_bytes);
    }
}

fn update_indexes(column: &mut Column, value: &Cell) {
    match value {
        Cell::I8(v) => {
            if let Some(zones) = &mut column.zone_i8 {
                zones.last_mut().expect("block started").extend(*v);
            }
            if let Some(bitmaps) = &mut column.bitmaps {
                bitmaps.last_mut().expect("block started").set(*v);
            }
        }
        Cell::F64(v) => {
            if let Some(zones) = &mut column.zone_f64 {
                zones.last_mut().expect("block started").extend(*v);
            }
        }
        _ => {}
    }
}

/// The run-length state machine.
///
/// Idle until two consecutive equal values appear within one block; at that
/// point the previous literal is rewritten in place as a `-2` count and the
/// run value cell follows it. Further equal values only decrement the count
/// cell. A run closes when the value changes, when the block ends, or -- for
/// i8 columns -- when the count reaches `-128`; after a forced close the
/// previous-value memory is dropped so the next equal value starts over from
/// a fresh literal.
struct RunEncoder {
    kind: ColumnKind,
    prev: Option<Cell>,
    run: Option<RunState>,
}

struct RunState {
    /// Index of the count cell in the current batch.
    head: usize,
    count: i32,
}

impl RunEncoder {
    fn new(kind: ColumnKind) -> Self {
        Self {
            kind,
            prev: None,
            run: None,
        }
    }

    fn close_run(&mut self) {
        self.run = None;
        self.prev = None;
    }

    fn push(&mut self, cells: &mut [Cell], write_cursor: &mut usize, block_row: usize, value: Cell) {
        match &mut self.run {
            Some(state) if self.prev.as_ref() == Some(&value) => {
                state.count -= 1;
                cells[state.head] = count_cell(self.kind, state.count);
                if self.kind == ColumnKind::I8 && state.count == -MAX_I8_RUN {
                    self.close_run();
                }
            }
            Some(_) => {
                self.run = None;
                cells[*write_cursor] = value.clone();
                *write_cursor += 1;
                self.prev = Some(value);
            }
            None => {
                if block_row != 0 && self.prev.as_ref() == Some(&value) {
                    // grow the previous literal into a run of two
                    cells[*write_cursor - 1] = count_cell(self.kind, -2);
                    cells[*write_cursor] = value;
                    self.run = Some(RunState {
                        head: *write_cursor - 1,
                        count: -2,
                    });
                    *write_cursor += 1;
                } else {
                    cells[*write_cursor] = value.clone();
                    *write_cursor += 1;
                    self.prev = Some(value);
                }
            }
        }
    }
}
