//! Shared fixtures: synthetic datasets and a one-call store build.
#![allow(dead_code)] // each test binary uses a different subset

use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use colstore::{ARENA_CAPACITY, Arena, Catalog, Store};

pub const HEADER: &str =
    "month,town,flat_type,block,street_name,storey_range,floor_area_sqm,flat_model,lease_commence_date,resale_price";

/// A data row with representative defaults for the columns a test does not
/// care about.
pub fn row(month: &str, town: &str, area: &str, price: &str) -> String {
    format!("{month},{town},4 ROOM,101,TAMPINES ST 81,04 TO 06,{area},Model A,1987,{price}")
}

/// A data row with every field explicit.
#[allow(clippy::too_many_arguments)]
pub fn full_row(
    month: &str,
    town: &str,
    flat_type: &str,
    block: &str,
    street: &str,
    storey: &str,
    area: &str,
    model: &str,
    lease: &str,
    price: &str,
) -> String {
    format!("{month},{town},{flat_type},{block},{street},{storey},{area},{model},{lease},{price}")
}

/// Write a dataset (header plus `rows`) into a fresh temp directory.
pub fn write_dataset(rows: &[String]) -> Result<(TempDir, PathBuf)> {
    let tmp = TempDir::new()?;
    let data_path = tmp.path().join("resale.csv");
    let mut contents = String::from(HEADER);
    contents.push('\n');
    for r in rows {
        contents.push_str(r);
        contents.push('\n');
    }
    fs::write(&data_path, contents)?;
    Ok((tmp, data_path))
}

/// Build a column store from `rows`; the temp dir keeps every artifact alive
/// for the test's duration.
pub fn build_store(rows: &[String]) -> Result<(TempDir, Store, Catalog)> {
    let (tmp, data_path) = write_dataset(rows)?;
    let store = Store::new(data_path, tmp.path().join("column_store"));
    let mut arena = Arena::with_capacity(ARENA_CAPACITY);
    let catalog = store.build(&mut arena)?;
    Ok((tmp, store, catalog))
}
