//! The parsed row type and its CSV byte accounting.
//!
//! A [`Record`] is one housing resale transaction in row form, used only
//! during the sort phase (chunk sort and k-way merge) before the store goes
//! columnar. Parsing is strict: a row that cannot be fully validated is
//! rejected here and *skipped* by the ingesting reader -- the store never
//! carries placeholder rows.
//!
//! Byte accounting matters as much as field values: chunk boundaries in the
//! sorted-chunks file are tracked as byte offsets computed from row widths,
//! so [`Record::to_row`] must reproduce each field at exactly the width it
//! had in the source file. The float formatter below trims `%.2f` output back
//! to the source's shortest form for that reason.

use anyhow::{Result, anyhow, bail};
use csv::StringRecord;

use crate::dict;

/// Number of fields in every row.
pub const COLUMNS: usize = 10;

/// Per-row byte overhead in CSV form: 9 commas and one LF.
pub const CSV_ROW_OVERHEAD: u64 = 10;

/// One parsed resale transaction.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub month: String,
    pub town: String,
    pub flat_type: String,
    pub block: String,
    pub street_name: String,
    pub storey_range: String,
    pub floor_area: f64,
    pub flat_model: String,
    pub lease_commence: String,
    pub resale_price: f64,
    /// Dictionary code of `month`, precomputed because it is the global sort
    /// key and compared far more often than any other field.
    pub month_key: i8,
}

impl Record {
    /// Parse and validate a raw CSV row.
    ///
    /// # Errors
    /// Fails on a wrong column count, an un-parseable or negative
    /// `floor_area_sqm` / `resale_price`, or a categorical value missing from
    /// its dictionary. Callers treat any of these as "skip this row".
    pub fn parse(row: &StringRecord) -> Result<Self> {
        if row.len() != COLUMNS {
            bail!("expected {COLUMNS} columns per row, got {}", row.len());
        }

        let floor_area: f64 = row[6]
            .parse()
            .map_err(|_| anyhow!("invalid floor area {:?}", &row[6]))?;
        let resale_price: f64 = row[9]
            .parse()
            .map_err(|_| anyhow!("invalid resale price {:?}", &row[9]))?;
        if floor_area < 0.0 || resale_price < 0.0 {
            bail!("negative measure in row");
        }

        let month_key =
            dict::month_code(&row[0]).ok_or_else(|| anyhow!("month {:?} out of range", &row[0]))?;
        dict::town_code(&row[1]).ok_or_else(|| anyhow!("unknown town {:?}", &row[1]))?;
        dict::flat_type_code(&row[2]).ok_or_else(|| anyhow!("unknown flat type {:?}", &row[2]))?;
        dict::storey_range_code(&row[5])
            .ok_or_else(|| anyhow!("unknown storey range {:?}", &row[5]))?;
        dict::flat_model_code(&row[7])
            .ok_or_else(|| anyhow!("unknown flat model {:?}", &row[7]))?;
        dict::lease_commence_code(&row[8])
            .ok_or_else(|| anyhow!("lease year {:?} out of range", &row[8]))?;

        Ok(Self {
            month: row[0].to_string(),
            town: row[1].to_string(),
            flat_type: row[2].to_string(),
            block: row[3].to_string(),
            street_name: row[4].to_string(),
            storey_range: row[5].to_string(),
            floor_area,
            flat_model: row[7].to_string(),
            lease_commence: row[8].to_string(),
            resale_price,
            month_key,
        })
    }

    /// Serialize back into CSV fields, byte-identical to the source row.
    pub fn to_row(&self) -> [String; COLUMNS] {
        [
            self.month.clone(),
            self.town.clone(),
            self.flat_type.clone(),
            self.block.clone(),
            self.street_name.clone(),
            self.storey_range.clone(),
            format_measure(self.floor_area),
            self.flat_model.clone(),
            self.lease_commence.clone(),
            format_measure(self.resale_price),
        ]
    }
}

/// Byte width of a raw CSV row: field lengths plus separators.
pub fn csv_row_bytes(row: &StringRecord) -> u64 {
    row.iter().map(|f| f.len() as u64).sum::<u64>() + CSV_ROW_OVERHEAD
}

/// Canonical float formatter: `%.2f`, then strip one trailing zero, then a
/// second trailing zero together with the decimal point.
///
/// `12.34` stays `12.34`, `12.50` becomes `12.5`, `12.00` becomes `12` --
/// matching how the source dataset prints these measures, so rewritten rows
/// keep their original byte widths.
pub fn format_measure(v: f64) -> String {
    let mut s = format!("{v:.2}");
    if s.ends_with('0') {
        s.pop();
        if s.ends_with('0') {
            s.pop();
            s.pop(); // the decimal point
        }
    }
    s
}
