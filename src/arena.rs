//! The work arena: a fixed-capacity buffer of tagged cells.
//!
//! Every bulk data movement in the crate -- external sort, merge, column
//! split, run-length encoding and query evaluation -- stages its data through
//! one process-wide [`Arena`]. Components never grow it; they agree (by
//! convention, enforced at the call sites) on disjoint index windows:
//! the merge gives each chunk reader its own window, the splitter gives each
//! column writer one, and the query executor hands each worker a 500-cell
//! workspace via [`Arena::workspaces_mut`].
//!
//! A [`Cell`] is a tagged sum over the value shapes that flow through the
//! system: dictionary codes (`I8`), measures (`F64`), raw column strings,
//! row-validity booleans, and whole parsed records during the sort phase.
//! Component code pattern-matches on the variant it expects; a mismatch is a
//! bug, not a recoverable condition.

use crate::record::Record;
use std::cmp::Ordering;

/// A single tagged arena slot.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Cell {
    /// Empty slot. Readers treat it as "no value"; the query executor treats
    /// an empty write-half cell as "row filtered out".
    #[default]
    Nil,
    /// Dictionary code of a categorical column.
    I8(i8),
    /// A real-valued measure (floor area, resale price).
    F64(f64),
    /// A raw string column value (block, street name).
    Str(String),
    /// Row-validity marker written by filter stages.
    Bool(bool),
    /// A fully parsed row, used during the sort phase.
    Record(Record),
}

impl Cell {
    pub fn is_nil(&self) -> bool {
        matches!(self, Cell::Nil)
    }

    pub fn as_i8(&self) -> Option<i8> {
        match self {
            Cell::I8(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Cell::Record(r) => Some(r),
            _ => None,
        }
    }
}

/// Fixed-capacity indexed cell buffer.
///
/// All accessors take absolute cell indexes; out-of-range access panics, the
/// same way slice indexing does -- windows are a caller-side convention and a
/// stray index is a programmer error.
pub struct Arena {
    cells: Vec<Cell>,
}

impl Arena {
    /// Allocate an arena of `capacity` empty cells. This is the only
    /// allocation the arena ever makes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: vec![Cell::Nil; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    pub fn get(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    pub fn set(&mut self, index: usize, cell: Cell) {
        self.cells[index] = cell;
    }

    /// Reset cells `lo..=hi` to [`Cell::Nil`].
    pub fn reset(&mut self, lo: usize, hi: usize) {
        for cell in &mut self.cells[lo..=hi] {
            *cell = Cell::Nil;
        }
    }

    /// Sort cells `lo..=hi` in place. Stability is not required by any
    /// caller, so this uses an unstable sort.
    pub fn sort_range<F>(&mut self, lo: usize, hi: usize, mut compare: F)
    where
        F: FnMut(&Cell, &Cell) -> Ordering,
    {
        self.cells[lo..=hi].sort_unstable_by(&mut compare);
    }

    /// View the whole arena as a slice, for readers that fill windows.
    pub fn as_slice(&self) -> &[Cell] {
        &self.cells
    }

    /// Mutable view of the whole arena.
    pub fn as_mut_slice(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Split the arena into `count` disjoint workspaces of `width` cells,
    /// starting at cell 0. Used by the query executor to hand each worker an
    /// exclusive window without any locking.
    ///
    /// # Panics
    /// Panics if `count * width` exceeds the capacity.
    pub fn workspaces_mut(&mut self, count: usize, width: usize) -> Vec<&mut [Cell]> {
        assert!(count * width <= self.cells.len(), "workspaces exceed arena");
        let mut out = Vec::with_capacity(count);
        let mut rest = &mut self.cells[..count * width];
        for _ in 0..count {
            let (ws, tail) = rest.split_at_mut(width);
            out.push(ws);
            rest = tail;
        }
        out
    }
}
