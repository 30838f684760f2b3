//! Result assembly and CSV emission.
//!
//! After the workers join, the plan is walked in order and every shared
//! scan's aggregates are read out, yielding the final vector
//! `[min price, avg price, stdev price, min price per sqm]`. The CSV report
//! is serde-serialized through the `csv` writer, one labeled row per
//! statistic, values formatted `%.2f`.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::create_dir_all;
use std::path::Path;

use super::plan::{Plan, Stage};

/// Labels for the four statistics, in plan order.
pub const CATEGORIES: [&str; 4] = [
    "Minimum Price",
    "Average Price",
    "Standard Deviation of Price",
    "Minimum Price per Square Meter",
];

/// Read every shared scan's aggregate results out of an executed plan, in
/// plan order.
pub fn collect(plan: &Plan) -> Vec<f64> {
    let mut out = Vec::new();
    for stage in &plan.stages {
        if let Stage::Scan(scan) = stage {
            out.extend(scan.aggregates.iter().map(|agg| agg.result()));
        }
    }
    out
}

#[derive(Serialize)]
struct ResultRow<'a> {
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "Month")]
    month: String,
    #[serde(rename = "Town")]
    town: &'a str,
    #[serde(rename = "Category")]
    category: &'a str,
    #[serde(rename = "Value")]
    value: String,
}

/// Write the query report to `path` (created along with its parent
/// directory), one row per statistic.
///
/// # Errors
/// Fails if the file cannot be created or a row cannot be written.
pub fn write_report(
    path: impl AsRef<Path>,
    year: i32,
    month: u32,
    town: &str,
    values: &[f64],
) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    for (category, value) in CATEGORIES.into_iter().zip(values) {
        writer
            .serialize(ResultRow {
                year,
                month: format!("{month:02}"),
                town,
                category,
                value: format!("{value:.2}"),
            })
            .with_context(|| format!("write result row {category:?}"))?;
    }
    writer.flush().context("flush result writer")?;
    Ok(())
}
