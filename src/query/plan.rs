//! Plan construction: filter ordering, shared scans, operation injection.
//!
//! A [`Plan`] is a linear list of stages every worker runs against each
//! qualified block:
//!
//! 1. the three filters (month window, exact town, minimum area), sorted by
//!    how many blocks each qualifies within the month range -- cheapest
//!    first, so the most selective index prunes work for the rest;
//! 2. one **shared scan** over `resale_price` carrying `Min`, `Avg` and
//!    `Stdev` -- three aggregates fed from a single pass over the column;
//! 3. a `Divide` operation against `floor_area_sqm`, turning the write half
//!    into price-per-area in place;
//! 4. a second shared scan with no column (`AggregateInPlace`): its `Min`
//!    reads the values the operation just materialized, with no further I/O.
//!
//! Filter order affects performance only; the final aggregates are
//! order-independent.

use std::fmt::{Display, Formatter, Result as FormatResult};

use crate::arena::Cell;
use crate::schema::{Catalog, col};

use super::aggregate::{AggKind, Aggregate};

/// Decoded query parameters: month window start, town code, minimum area.
#[derive(Clone, Copy, Debug)]
pub struct QueryParams {
    pub month: i8,
    pub town: i8,
    pub min_area: f64,
}

/// Row-level predicate of one filter.
#[derive(Clone, Copy, Debug)]
pub enum Predicate {
    /// Inclusive code range over an i8 column.
    RangeI8 { lo: i8, hi: i8 },
    /// Inclusive value range over an f64 column.
    RangeF64 { lo: f64, hi: f64 },
    /// Exact dictionary-code match.
    Exact { code: i8 },
}

/// One filter stage: a predicate bound to a column with a usable index.
#[derive(Clone, Copy, Debug)]
pub struct Filter {
    pub column: usize,
    pub predicate: Predicate,
}

impl Filter {
    /// Evaluate the predicate against one decoded cell. Cells of a foreign
    /// variant never match.
    pub fn eval(&self, cell: &Cell) -> bool {
        match self.predicate {
            Predicate::RangeI8 { lo, hi } => cell.as_i8().is_some_and(|v| v >= lo && v <= hi),
            Predicate::RangeF64 { lo, hi } => cell.as_f64().is_some_and(|v| v >= lo && v <= hi),
            Predicate::Exact { code } => cell.as_i8() == Some(code),
        }
    }

    /// Consult the column's block index: `(skippable, qualified)`.
    pub fn check_block(&self, catalog: &Catalog, block: usize) -> (bool, bool) {
        let column = &catalog.columns[self.column];
        match self.predicate {
            Predicate::RangeI8 { lo, hi } => column
                .zone_i8
                .as_ref()
                .map_or((false, true), |zones| zones[block].check(lo, hi)),
            Predicate::RangeF64 { lo, hi } => column
                .zone_f64
                .as_ref()
                .map_or((false, true), |zones| zones[block].check(lo, hi)),
            Predicate::Exact { code } => column
                .bitmaps
                .as_ref()
                .map_or((false, true), |bitmaps| bitmaps[block].check(code)),
        }
    }

    /// Blocks within `start..=end` the index cannot rule out.
    pub fn qualified_blocks(&self, catalog: &Catalog, start: usize, end: usize) -> Vec<usize> {
        (start..=end)
            .filter(|&b| self.check_block(catalog, b).1)
            .collect()
    }
}

/// Arithmetic applied between the write half and a freshly decoded column.
#[derive(Clone, Copy, Debug)]
pub enum OpKind {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl OpKind {
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            OpKind::Add => lhs + rhs,
            OpKind::Subtract => lhs - rhs,
            OpKind::Multiply => lhs * rhs,
            OpKind::Divide => lhs / rhs,
        }
    }
}

/// Operation stage: combine the live write half with `column` values.
#[derive(Clone, Copy, Debug)]
pub struct Operation {
    pub column: usize,
    pub op: OpKind,
}

/// Several aggregates fed from one pass over the same values.
///
/// With a column, the pass decodes that column from disk (honoring row
/// validity); with `column = None` it aggregates the write half in place,
/// reading whatever a prior operation stage materialized there.
#[derive(Debug)]
pub struct SharedScan {
    pub column: Option<usize>,
    pub aggregates: Vec<Aggregate>,
}

/// One step of the per-block pipeline.
#[derive(Debug)]
pub enum Stage {
    Filter(Filter),
    Scan(SharedScan),
    Op(Operation),
}

/// The compiled query: stages in execution order plus the initial
/// qualified-block queue.
#[derive(Debug)]
pub struct Plan {
    pub stages: Vec<Stage>,
    pub qualified_blocks: Vec<usize>,
}

impl Display for Plan {
    /// One line per stage, the form the CLI logs before execution.
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        writeln!(f, "plan ({} qualified blocks):", self.qualified_blocks.len())?;
        for (i, stage) in self.stages.iter().enumerate() {
            match stage {
                Stage::Filter(filter) => {
                    let what = match filter.predicate {
                        Predicate::RangeI8 { lo, hi } => format!("range [{lo}, {hi}]"),
                        Predicate::RangeF64 { lo, hi } if hi == f64::MAX => {
                            format!("range [{lo}, +inf)")
                        }
                        Predicate::RangeF64 { lo, hi } => format!("range [{lo}, {hi}]"),
                        Predicate::Exact { code } => format!("exact {code}"),
                    };
                    writeln!(f, "  {i}: filter column {} {what}", filter.column)?;
                }
                Stage::Scan(scan) => {
                    let aggs: Vec<&str> = scan
                        .aggregates
                        .iter()
                        .map(|a| match a.kind() {
                            AggKind::Min => "min",
                            AggKind::Avg => "avg",
                            AggKind::Stdev => "stdev",
                        })
                        .collect();
                    match scan.column {
                        Some(column) => {
                            writeln!(f, "  {i}: scan column {column} [{}]", aggs.join(", "))?
                        }
                        None => writeln!(f, "  {i}: scan in place [{}]", aggs.join(", "))?,
                    }
                }
                Stage::Op(op) => {
                    writeln!(f, "  {i}: {:?} against column {}", op.op, op.column)?;
                }
            }
        }
        Ok(())
    }
}

/// The contiguous block range the monotonic month zone maps admit for an
/// inclusive code range. `None` when no block overlaps.
fn month_block_range(catalog: &Catalog, lo: i8, hi: i8) -> Option<(usize, usize)> {
    let zones = catalog.columns[col::MONTH].zone_i8.as_ref()?;
    let mut range = None;
    for (b, zone) in zones.iter().enumerate() {
        let (_, qualified) = zone.check(lo, hi);
        if qualified {
            range = Some(match range {
                None => (b, b),
                Some((start, _)) => (start, b),
            });
        }
    }
    range
}

/// Compile the fixed aggregate query for `params`.
pub fn build_plan(catalog: &Catalog, params: &QueryParams) -> Plan {
    let month_filter = Filter {
        column: col::MONTH,
        predicate: Predicate::RangeI8 {
            lo: params.month,
            hi: params.month + 1,
        },
    };
    let town_filter = Filter {
        column: col::TOWN,
        predicate: Predicate::Exact { code: params.town },
    };
    let area_filter = Filter {
        column: col::FLOOR_AREA,
        predicate: Predicate::RangeF64 {
            lo: params.min_area,
            hi: f64::MAX,
        },
    };

    let range = month_block_range(catalog, params.month, params.month + 1);

    let mut filters = vec![month_filter, town_filter, area_filter];
    let qualified_blocks = match range {
        Some((start, end)) => {
            filters.sort_by_cached_key(|f| f.qualified_blocks(catalog, start, end).len());
            filters[0].qualified_blocks(catalog, start, end)
        }
        None => Vec::new(),
    };

    let mut stages: Vec<Stage> = filters.into_iter().map(Stage::Filter).collect();

    stages.push(Stage::Scan(SharedScan {
        column: Some(col::RESALE_PRICE),
        aggregates: vec![
            Aggregate::new(AggKind::Min),
            Aggregate::new(AggKind::Avg),
            Aggregate::new(AggKind::Stdev),
        ],
    }));
    stages.push(Stage::Op(Operation {
        column: col::FLOOR_AREA,
        op: OpKind::Divide,
    }));
    stages.push(Stage::Scan(SharedScan {
        column: None,
        aggregates: vec![Aggregate::new(AggKind::Min)],
    }));

    Plan {
        stages,
        qualified_blocks,
    }
}
