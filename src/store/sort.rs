//! Two-pass external sort on the month column.
//!
//! **Pass 1** ([`sort_chunks`]) reads up to one arena's worth of rows at a
//! time, sorts the populated prefix by month code, and appends it to the
//! sorted-chunks file, recording where each chunk starts.
//!
//! **Pass 2** ([`merge_chunks`]) partitions the arena into one reader window
//! per chunk plus a writer window, seeds a min-heap with each chunk's front
//! row, and repeatedly moves the smallest row into the writer window,
//! refilling a chunk's window from disk whenever its cursor exhausts it.
//!
//! The heap holds at most one live entry per chunk; a chunk may be
//! temporarily absent while its refill is in flight or permanently absent
//! once exhausted. The output is totally ordered by ascending month code.

use anyhow::Result;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::path::Path;

use crate::arena::{Arena, Cell};
use crate::io::{CsvRowReader, CsvRowWriter, count_header_bytes};
use crate::record::Record;

/// Sort arena-sized chunks of the raw CSV into `chunk_path`.
///
/// Returns the byte offset of every chunk within `chunk_path`, plus a
/// trailing sentinel equal to the total size, so chunk `i` spans
/// `offsets[i]..offsets[i + 1]`.
///
/// # Errors
/// Fails if the input cannot be read or a chunk cannot be written.
pub fn sort_chunks(arena: &mut Arena, data_path: &Path, chunk_path: &Path) -> Result<Vec<u64>> {
    let header_bytes = count_header_bytes(data_path)?;
    let mut reader = CsvRowReader::open(data_path, header_bytes, None)?;
    let mut writer = CsvRowWriter::open(chunk_path)?;
    let capacity = arena.capacity();

    let mut offsets = Vec::new();
    loop {
        offsets.push(reader.byte_offset() - header_bytes);
        arena.reset(0, capacity - 1);
        let read_cnt = reader.read_to(arena.as_mut_slice(), 0, capacity - 1)?;
        if read_cnt == 0 {
            break;
        }
        arena.sort_range(0, read_cnt - 1, compare_by_month);
        writer.write_from(arena.as_slice(), 0, read_cnt - 1)?;
    }
    Ok(offsets)
}

fn compare_by_month(a: &Cell, b: &Cell) -> Ordering {
    match (a.as_record(), b.as_record()) {
        (Some(a), Some(b)) => a.month_key.cmp(&b.month_key),
        // records sort before anything else; only hit if a window is underfull
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// An entry in the merge heap: the front row of one chunk. Ordered by month
/// code, with the chunk id as a deterministic tie-break.
struct MergeEntry {
    key: i8,
    chunk: usize,
    record: Record,
}

impl PartialEq for MergeEntry {
    fn eq(&self, other: &Self) -> bool {
        (self.key, self.chunk) == (other.key, other.chunk)
    }
}

impl Eq for MergeEntry {}

impl PartialOrd for MergeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MergeEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed: BinaryHeap is a max-heap, we pop the smallest key
        (other.key, other.chunk).cmp(&(self.key, self.chunk))
    }
}

/// Merge the sorted chunks described by `offsets` into `sorted_path`.
///
/// The arena is split into `k` chunk reader windows of `capacity / (k + 1)`
/// cells and one writer window covering the remaining tail.
///
/// # Errors
/// Fails on any read or write error.
pub fn merge_chunks(
    arena: &mut Arena,
    offsets: &[u64],
    chunk_path: &Path,
    sorted_path: &Path,
) -> Result<()> {
    let mut writer = CsvRowWriter::open(sorted_path)?;
    let chunks = offsets.len().saturating_sub(1);
    if chunks == 0 {
        // empty input: the sorted file still exists, just with no rows
        return Ok(());
    }

    let capacity = arena.capacity();
    arena.reset(0, capacity - 1);
    let window = capacity / (chunks + 1);

    let mut readers = Vec::with_capacity(chunks);
    for i in 0..chunks {
        readers.push(CsvRowReader::open(
            chunk_path,
            offsets[i],
            Some(offsets[i + 1]),
        )?);
    }

    // Per-chunk window cursor and count of rows buffered beyond the one that
    // currently sits in the heap.
    let mut cursor: Vec<usize> = (0..chunks).map(|i| i * window).collect();
    let mut buffered = vec![0usize; chunks];

    let mut heap = BinaryHeap::with_capacity(chunks);
    for i in 0..chunks {
        let read_cnt = readers[i].read_to(arena.as_mut_slice(), cursor[i], cursor[i] + window - 1)?;
        if read_cnt == 0 {
            continue;
        }
        buffered[i] = read_cnt - 1;
        let record = arena
            .get(cursor[i])
            .as_record()
            .expect("chunk window holds records")
            .clone();
        heap.push(MergeEntry {
            key: record.month_key,
            chunk: i,
            record,
        });
    }

    let writer_base = chunks * window;
    let mut write_idx = writer_base;

    while let Some(entry) = heap.pop() {
        let i = entry.chunk;

        cursor[i] += 1;
        if cursor[i] == (i + 1) * window {
            // window exhausted: refill from this chunk's byte range
            cursor[i] = i * window;
            buffered[i] = readers[i].read_to(arena.as_mut_slice(), cursor[i], cursor[i] + window - 1)?;
        }
        if buffered[i] > 0 {
            let record = arena
                .get(cursor[i])
                .as_record()
                .expect("chunk window holds records")
                .clone();
            heap.push(MergeEntry {
                key: record.month_key,
                chunk: i,
                record,
            });
            buffered[i] -= 1;
        }

        arena.set(write_idx, Cell::Record(entry.record));
        write_idx += 1;
        if write_idx == capacity {
            writer.write_from(arena.as_slice(), writer_base, capacity - 1)?;
            write_idx = writer_base;
        }
    }

    if write_idx > writer_base {
        writer.write_from(arena.as_slice(), writer_base, write_idx - 1)?;
    }
    Ok(())
}
