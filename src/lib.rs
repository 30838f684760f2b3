//! # Colstore
//!
//! A **disk-resident columnar store** with a memory-bounded aggregate query
//! engine over Singapore housing resale records.
//!
//! The crate ingests a raw CSV dataset and rebuilds, on every run, a
//! read-optimized column store on disk:
//!
//! 1. **External sort** -- the raw rows are sorted globally by month using a
//!    two-pass chunked sort + k-way merge ([`store::sort`]).
//! 2. **Column split** -- the sorted rows are partitioned into ten per-column
//!    binary files, with categorical columns dictionary-encoded ([`store::split`]).
//! 3. **Compression + indexing** -- each column file is run-length encoded in
//!    blocks of 250 rows, and per-block zone maps, a town bitmap, and byte
//!    offset maps are built in memory ([`store::encode`]).
//!
//! A parameterized aggregate query (minimum / average / standard deviation of
//! resale price, and minimum price per square meter, restricted by a
//! two-month window, an exact town and a minimum floor area) is then planned
//! ([`query::plan`]) and executed by a fixed pool of four workers that pull
//! qualified block ids from a bounded channel ([`query::exec`]).
//!
//! ## The work arena
//!
//! The defining constraint is memory: every bulk data movement -- sorting,
//! merging, splitting, encoding, and query evaluation -- happens inside a
//! single fixed-capacity scratch buffer of [`ARENA_CAPACITY`] tagged cells
//! (the [`Arena`]). No stage may allocate a collection that scales with the
//! dataset; per-block scratch is bounded by [`BLOCK_ROWS`]. Components share
//! the arena by carving it into disjoint index windows: chunk reader windows
//! and a writer window during the merge, ten column windows plus a reader
//! window during the split, and four 500-cell worker workspaces during query
//! execution.
//!
//! ## Quick start
//!
//! ```no_run
//! use colstore::{Arena, Store, Executor, QuerySpec, ARENA_CAPACITY};
//! use colstore::query::plan::build_plan;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let spec = QuerySpec::from_matric("U2102385B")?;
//! let mut arena = Arena::with_capacity(ARENA_CAPACITY);
//!
//! let store = Store::new("ResalePricesSingapore.csv", "column_store");
//! let catalog = store.build(&mut arena)?;
//!
//! let plan = build_plan(&catalog, &spec.params()?);
//! Executor::new(&plan, &catalog, store.dir()).run(&mut arena)?;
//!
//! let results = colstore::query::results::collect(&plan);
//! println!("{results:?}"); // [min, avg, stdev, min price per sqm]
//! # Ok(())
//! # }
//! ```
//!
//! ## Module overview
//!
//! - [`arena`] -- the fixed-capacity tagged-cell buffer
//! - [`dict`] -- static dictionaries for the categorical columns
//! - [`record`] -- the parsed row type and its CSV byte accounting
//! - [`schema`] -- the ten-column catalog and per-column index storage
//! - [`index`] -- zone maps and bitmaps with skip/qualify checks
//! - [`rle`] -- run-length framing shared by the encoder and decoders
//! - [`io`] -- typed streaming readers and writers over arena windows
//! - [`store`] -- the build orchestrator (sort, split, encode)
//! - [`query`] -- plan construction, aggregates, the block-parallel executor
//! - [`cli`] -- matriculation-number decoding into query parameters

pub mod arena;
pub mod cli;
pub mod dict;
pub mod index;
pub mod io;
pub mod query;
pub mod record;
pub mod rle;
pub mod schema;
pub mod store;

pub use arena::{Arena, Cell};
pub use cli::QuerySpec;
pub use query::exec::Executor;
pub use query::plan::{Plan, QueryParams};
pub use record::Record;
pub use schema::{Catalog, Column, ColumnKind};
pub use store::Store;

/// Capacity of the process-wide work arena, in cells.
///
/// Simulates a constrained environment: at most this many data points may be
/// resident at any time.
pub const ARENA_CAPACITY: usize = 2000;

/// Logical rows per block -- the unit of I/O, indexing and skip decisions.
pub const BLOCK_ROWS: usize = 250;

/// Number of parallel workers in the query executor.
pub const QUERY_WORKERS: usize = 4;

/// Cells in one worker workspace (250 read half + 250 write half).
pub const WORKSPACE_CELLS: usize = 2 * BLOCK_ROWS;

/// Fixed floor-area threshold (m²) applied by every query.
pub const MIN_AREA_SQM: f64 = 80.0;
