//! The command-line surface: flag definitions and matriculation-number
//! decoding.
//!
//! The query a run answers is derived from the student matriculation number:
//!
//! - the last digit (second-to-last character, before the checksum letter)
//!   picks the year: `4..=9` map into 201x, the rest into 202x;
//! - the digit before it picks the month, with `0` meaning October;
//! - the town id is read from the **same** character as the month digit.
//!   The historical decode scheme assigns distinct positions to month and
//!   town, but the deployed behavior reads one position for both; we
//!   reproduce the deployed behavior, quirk included, so results stay
//!   comparable.
//!
//! The floor-area threshold is fixed at [`MIN_AREA_SQM`] for every query.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::dict;
use crate::query::plan::QueryParams;
use crate::MIN_AREA_SQM;

/// Build the resale-price column store and answer the query encoded in a
/// matriculation number.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Matriculation number that encodes the queried year, month and town.
    #[arg(long)]
    pub matric: String,

    /// Location of the raw resale-prices CSV.
    #[arg(long)]
    pub data: PathBuf,
}

/// Rewrite the historic single-dash spellings (`-matric`, `-data`) into
/// their `--` forms before clap sees them.
///
/// clap parses a single dash as a cluster of one-character short flags, so
/// the old spellings cannot be registered as argument aliases; normalizing
/// the raw argv is the one place they can be accepted.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if arg == "-matric" {
                OsString::from("--matric")
            } else if arg == "-data" {
                OsString::from("--data")
            } else {
                arg
            }
        })
        .collect()
}

/// A fully decoded query request.
#[derive(Clone, Debug)]
pub struct QuerySpec {
    pub matric: String,
    pub year: i32,
    pub month: u32,
    pub town: i8,
}

impl QuerySpec {
    /// Decode a matriculation number.
    ///
    /// # Errors
    /// Fails when the string is shorter than nine characters or the expected
    /// positions do not hold digits.
    pub fn from_matric(matric: &str) -> Result<Self> {
        let chars: Vec<char> = matric.chars().collect();
        if chars.len() < 9 {
            bail!("matric number {matric:?} is too short");
        }

        let year_digit: i32 = chars[chars.len() - 2]
            .to_digit(10)
            .context("could not parse year digit")? as i32;
        let year = if (4..=9).contains(&year_digit) {
            2010 + year_digit
        } else {
            2020 + year_digit
        };

        let month_digit = chars[chars.len() - 3]
            .to_digit(10)
            .context("could not parse month digit")?;
        let month = if month_digit == 0 { 10 } else { month_digit };

        // town shares the month digit's position
        let town = month_digit as i8;

        Ok(Self {
            matric: matric.to_string(),
            year,
            month,
            town,
        })
    }

    /// The queried town's display name.
    pub fn town_name(&self) -> &'static str {
        dict::town_name(self.town).unwrap_or("UNKNOWN")
    }

    /// Dictionary code of the window's first month.
    ///
    /// # Errors
    /// Fails when the decoded year-month lands outside the store's month
    /// dictionary.
    pub fn month_code(&self) -> Result<i8> {
        dict::month_code(&format!("{}-{:02}", self.year, self.month))
            .with_context(|| format!("{}-{:02} is outside the supported range", self.year, self.month))
    }

    /// Planner parameters for this request.
    ///
    /// # Errors
    /// See [`Self::month_code`].
    pub fn params(&self) -> Result<QueryParams> {
        Ok(QueryParams {
            month: self.month_code()?,
            town: self.town,
            min_area: MIN_AREA_SQM,
        })
    }
}
