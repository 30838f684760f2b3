//! The fixed ten-column catalog and its per-column index storage.
//!
//! The schema never changes at runtime; what varies per column is the
//! physical type and which skip indexes are maintained:
//!
//! | column | physical | zone map | bitmap | offset map |
//! |---|---|---|---|---|
//! | month | i8 (dict) | ✓ (monotonic) | | ✓ |
//! | town | i8 (dict) | | ✓ | ✓ |
//! | flat_type | i8 (dict) | | | |
//! | block | string | | | |
//! | street_name | string | | | |
//! | storey_range | i8 (dict) | | | |
//! | floor_area_sqm | f64 | ✓ | | ✓ |
//! | flat_model | i8 (dict) | | | |
//! | lease_commence_date | i8 (dict) | | | |
//! | resale_price | f64 | ✓ | | ✓ |
//!
//! The table is globally sorted by month, so the month zone maps are
//! monotonic and a contiguous block range can be derived from them. Town is
//! the only column queried by exact match, hence the only bitmap.
//!
//! Indexes live in memory only and are rebuilt on every run by the encoder;
//! nothing mutates them after the build.

use anyhow::{Result, anyhow};

use crate::arena::Cell;
use crate::dict;
use crate::index::{Bitmap, ZoneMap};
use crate::record::Record;

/// Physical value type of a column file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    /// One byte per value (dictionary codes and RLE counts).
    I8,
    /// Eight little-endian bytes per value.
    F64,
    /// UTF-8 bytes terminated by LF.
    Str,
}

/// Column positions, in schema order.
pub mod col {
    pub const MONTH: usize = 0;
    pub const TOWN: usize = 1;
    pub const FLAT_TYPE: usize = 2;
    pub const BLOCK: usize = 3;
    pub const STREET_NAME: usize = 4;
    pub const STOREY_RANGE: usize = 5;
    pub const FLOOR_AREA: usize = 6;
    pub const FLAT_MODEL: usize = 7;
    pub const LEASE_COMMENCE: usize = 8;
    pub const RESALE_PRICE: usize = 9;
}

/// Metadata and index storage for one column.
#[derive(Clone, Debug)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    /// True only for month: the store is globally sorted on it.
    pub sorted: bool,
    /// Per-block zone maps for i8 columns, when indexed.
    pub zone_i8: Option<Vec<ZoneMap<i8>>>,
    /// Per-block zone maps for f64 columns, when indexed.
    pub zone_f64: Option<Vec<ZoneMap<f64>>>,
    /// Per-block presence bitmaps, when indexed.
    pub bitmaps: Option<Vec<Bitmap>>,
    /// Per-block byte offsets into the column's RLE file, when indexed.
    pub offsets: Option<Vec<u64>>,
}

impl Column {
    fn plain(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            sorted: false,
            zone_i8: None,
            zone_f64: None,
            bitmaps: None,
            offsets: None,
        }
    }

    /// Number of blocks this column has index entries for.
    pub fn blocks(&self) -> usize {
        self.offsets.as_ref().map_or(0, Vec::len)
    }
}

/// The fixed column table.
#[derive(Clone, Debug)]
pub struct Catalog {
    pub columns: Vec<Column>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        let mut month = Column::plain("month", ColumnKind::I8);
        month.sorted = true;
        month.zone_i8 = Some(Vec::new());
        month.offsets = Some(Vec::new());

        let mut town = Column::plain("town", ColumnKind::I8);
        town.bitmaps = Some(Vec::new());
        town.offsets = Some(Vec::new());

        let mut floor_area = Column::plain("floor_area_sqm", ColumnKind::F64);
        floor_area.zone_f64 = Some(Vec::new());
        floor_area.offsets = Some(Vec::new());

        let mut resale_price = Column::plain("resale_price", ColumnKind::F64);
        resale_price.zone_f64 = Some(Vec::new());
        resale_price.offsets = Some(Vec::new());

        Self {
            columns: vec![
                month,
                town,
                Column::plain("flat_type", ColumnKind::I8),
                Column::plain("block", ColumnKind::Str),
                Column::plain("street_name", ColumnKind::Str),
                Column::plain("storey_range", ColumnKind::I8),
                floor_area,
                Column::plain("flat_model", ColumnKind::I8),
                Column::plain("lease_commence_date", ColumnKind::I8),
                resale_price,
            ],
        }
    }

    /// Extract column `index` of a record as its stored cell, dictionary
    /// encoding categorical values.
    ///
    /// # Errors
    /// Fails on a value missing from its dictionary. Rows are validated at
    /// parse time, so hitting this during a build means the sorted file was
    /// produced by something else.
    pub fn value_of(&self, record: &Record, index: usize) -> Result<Cell> {
        let cell = match index {
            col::MONTH => Cell::I8(record.month_key),
            col::TOWN => Cell::I8(code(dict::town_code(&record.town), "town", &record.town)?),
            col::FLAT_TYPE => Cell::I8(code(
                dict::flat_type_code(&record.flat_type),
                "flat_type",
                &record.flat_type,
            )?),
            col::BLOCK => Cell::Str(record.block.clone()),
            col::STREET_NAME => Cell::Str(record.street_name.clone()),
            col::STOREY_RANGE => Cell::I8(code(
                dict::storey_range_code(&record.storey_range),
                "storey_range",
                &record.storey_range,
            )?),
            col::FLOOR_AREA => Cell::F64(record.floor_area),
            col::FLAT_MODEL => Cell::I8(code(
                dict::flat_model_code(&record.flat_model),
                "flat_model",
                &record.flat_model,
            )?),
            col::LEASE_COMMENCE => Cell::I8(code(
                dict::lease_commence_code(&record.lease_commence),
                "lease_commence_date",
                &record.lease_commence,
            )?),
            col::RESALE_PRICE => Cell::F64(record.resale_price),
            _ => return Err(anyhow!("no column at index {index}")),
        };
        Ok(cell)
    }
}

fn code(code: Option<i8>, column: &str, value: &str) -> Result<i8> {
    code.ok_or_else(|| anyhow!("value {value:?} missing from {column} dictionary"))
}
