//! The block-parallel query executor.
//!
//! A fixed pool of [`QUERY_WORKERS`] workers shares the arena by static
//! partitioning: worker `w` owns cells `[500w, 500w + 499]` and nothing else,
//! so no synchronization guards the arena itself. Within a workspace the
//! first [`BLOCK_ROWS`] cells are the **read half** (fresh bytes from disk)
//! and the second [`BLOCK_ROWS`] are the **write half**, which carries the
//! live per-row validity-then-value buffer across plan stages.
//!
//! The main thread feeds every qualified block id into a bounded channel and
//! drops the sender; workers loop on `recv` until the channel drains. For
//! each block a worker resets its workspace and runs the plan stages in
//! order, stopping early as soon as a filter leaves no valid row.
//!
//! Row correspondence between the halves is delegated to
//! [`RunDecoder`](crate::rle::RunDecoder): it yields `(row, value)` pairs
//! with `row` already adjusted for run expansion, and the same decoding is
//! used by filter, operation and shared-scan stages, so validity and values
//! cannot drift apart.

use anyhow::{Context, Result, anyhow};
use crossbeam_channel::{Receiver, bounded};
use log::debug;
use std::path::Path;
use std::thread;

use crate::arena::{Arena, Cell};
use crate::rle::RunDecoder;
use crate::{BLOCK_ROWS, QUERY_WORKERS, WORKSPACE_CELLS};

use super::plan::{Filter, Operation, Plan, SharedScan, Stage};
use crate::io::ColumnReader;
use crate::schema::Catalog;

/// Runs a compiled plan against the store's RLE column files.
pub struct Executor<'a> {
    plan: &'a Plan,
    catalog: &'a Catalog,
    dir: &'a Path,
}

impl<'a> Executor<'a> {
    pub fn new(plan: &'a Plan, catalog: &'a Catalog, dir: &'a Path) -> Self {
        Self { plan, catalog, dir }
    }

    /// Execute the plan. Aggregate results accumulate inside the plan's
    /// shared scans; read them out with [`results::collect`](super::results::collect).
    ///
    /// # Errors
    /// Fails on any I/O error inside a worker; a worker panic is fatal.
    pub fn run(&self, arena: &mut Arena) -> Result<()> {
        let (sender, receiver) = bounded::<usize>(QUERY_WORKERS * 2);
        let workspaces = arena.workspaces_mut(QUERY_WORKERS, WORKSPACE_CELLS);

        thread::scope(|scope| -> Result<()> {
            let mut handles = Vec::with_capacity(QUERY_WORKERS);
            for workspace in workspaces {
                let receiver = receiver.clone();
                handles.push(scope.spawn(move || self.worker(workspace, receiver)));
            }
            drop(receiver);

            for &block in &self.plan.qualified_blocks {
                sender.send(block).context("block queue closed early")?;
            }
            drop(sender);

            for handle in handles {
                handle
                    .join()
                    .map_err(|_| anyhow!("query worker panicked"))??;
            }
            Ok(())
        })
    }

    fn worker(&self, workspace: &mut [Cell], blocks: Receiver<usize>) -> Result<()> {
        let (read_half, write_half) = workspace.split_at_mut(BLOCK_ROWS);
        while let Ok(block) = blocks.recv() {
            debug!("processing block {block}");
            for cell in read_half.iter_mut().chain(write_half.iter_mut()) {
                *cell = Cell::Nil;
            }

            let mut first_filter = true;
            for stage in &self.plan.stages {
                let done = match stage {
                    Stage::Filter(filter) => {
                        let done =
                            self.filter_block(filter, first_filter, block, read_half, write_half)?;
                        first_filter = false;
                        done
                    }
                    Stage::Scan(scan) => self.scan_block(scan, block, read_half, write_half)?,
                    Stage::Op(op) => self.op_block(op, block, read_half, write_half)?,
                };
                if done {
                    break;
                }
            }
        }
        Ok(())
    }

    /// Load one block's RLE slice into the read half. The slice is bounded by
    /// consecutive offset-map entries; the last block reads to end-of-file.
    fn read_block(&self, column: usize, block: usize, read_half: &mut [Cell]) -> Result<usize> {
        let meta = &self.catalog.columns[column];
        let offsets = meta
            .offsets
            .as_ref()
            .ok_or_else(|| anyhow!("column {} has no offset map", meta.name))?;
        let start = offsets[block];
        let limit = offsets.get(block + 1).copied();
        let path = self.dir.join(format!("rle_{}", meta.name));
        let mut reader = ColumnReader::open(&path, start, limit, meta.kind)?;
        reader.read_to(read_half, 0, BLOCK_ROWS - 1)
    }

    /// Returns `true` when the block is finished: either the index ruled it
    /// out entirely, or no row survived this filter.
    fn filter_block(
        &self,
        filter: &Filter,
        first_filter: bool,
        block: usize,
        read_half: &mut [Cell],
        write_half: &mut [Cell],
    ) -> Result<bool> {
        let (skippable, qualified) = filter.check_block(self.catalog, block);
        if skippable {
            if !qualified {
                return Ok(true);
            }
            if first_filter {
                // every row provisionally valid; later filters narrow it down
                for cell in write_half.iter_mut() {
                    *cell = Cell::Bool(true);
                }
            }
            return Ok(false);
        }

        let read_cnt = self.read_block(filter.column, block, read_half)?;
        let mut has_valid = false;
        for (row, value) in RunDecoder::new(&read_half[..read_cnt]) {
            let keep = filter.eval(value) && (first_filter || !write_half[row].is_nil());
            write_half[row] = if keep {
                has_valid = true;
                Cell::Bool(true)
            } else {
                Cell::Nil
            };
        }
        Ok(!has_valid)
    }

    /// Feed every valid row's value to all aggregates of the scan. With a
    /// column, the block is decoded into the write half first (only at valid
    /// positions); without one, the write half is read as-is.
    fn scan_block(
        &self,
        scan: &SharedScan,
        block: usize,
        read_half: &mut [Cell],
        write_half: &mut [Cell],
    ) -> Result<bool> {
        if let Some(column) = scan.column {
            let read_cnt = self.read_block(column, block, read_half)?;
            for (row, value) in RunDecoder::new(&read_half[..read_cnt]) {
                if !write_half[row].is_nil() {
                    write_half[row] = value.clone();
                }
            }
        }

        for cell in write_half.iter() {
            if let Some(v) = cell.as_f64() {
                for aggregate in &scan.aggregates {
                    aggregate.update(v);
                }
            }
        }
        Ok(false)
    }

    /// Replace every valid write-half value with `op(current, decoded)`.
    fn op_block(
        &self,
        op: &Operation,
        block: usize,
        read_half: &mut [Cell],
        write_half: &mut [Cell],
    ) -> Result<bool> {
        let read_cnt = self.read_block(op.column, block, read_half)?;
        for (row, value) in RunDecoder::new(&read_half[..read_cnt]) {
            if let (Some(current), Some(rhs)) = (write_half[row].as_f64(), value.as_f64()) {
                write_half[row] = Cell::F64(op.op.apply(current, rhs));
            }
        }
        Ok(false)
    }
}
