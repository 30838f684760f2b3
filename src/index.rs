//! Per-block skip indexes: zone maps and bitmaps.
//!
//! Both index kinds answer the same question for a block: can the executor
//! *skip* loading it, and does it (or part of it) *qualify* for the filter?
//! The `(skippable, qualified)` pair decodes as:
//!
//! - `(true, false)` -- the block cannot contain a match; drop it.
//! - `(true, true)` -- every row in the block matches; no need to load it.
//! - `(false, true)` -- partial overlap; rows must be evaluated one by one.

/// Per-block `(min, max)` over an ordered column.
#[derive(Clone, Copy, Debug)]
pub struct ZoneMap<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> ZoneMap<T> {
    /// A fresh entry that any first value will overwrite.
    pub fn seed(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// Grow the zone to cover `v`.
    pub fn extend(&mut self, v: T) {
        if v < self.min {
            self.min = v;
        }
        if v > self.max {
            self.max = v;
        }
    }

    /// Check the zone against an inclusive query range.
    pub fn check(&self, query_min: T, query_max: T) -> (bool, bool) {
        if query_max < self.min || query_min > self.max {
            // zone entirely outside the filter range
            (true, false)
        } else if query_min <= self.min && query_max >= self.max {
            // zone entirely inside the filter range
            (true, true)
        } else {
            (false, true)
        }
    }
}

/// Per-block presence bitmap over a dictionary-encoded column, one bit per
/// dictionary value.
#[derive(Clone, Debug)]
pub struct Bitmap {
    bits: Vec<bool>,
}

impl Bitmap {
    pub fn new(width: usize) -> Self {
        Self {
            bits: vec![false; width],
        }
    }

    pub fn set(&mut self, code: i8) {
        self.bits[code as usize] = true;
    }

    pub fn is_set(&self, code: i8) -> bool {
        self.bits[code as usize]
    }

    /// Check an exact-match filter against the block.
    ///
    /// `(true, true)` iff `code` is the only value present, `(false, true)`
    /// if it is present alongside others, `(true, false)` if absent.
    pub fn check(&self, code: i8) -> (bool, bool) {
        if !self.bits[code as usize] {
            return (true, false);
        }
        let others = self
            .bits
            .iter()
            .enumerate()
            .any(|(i, set)| *set && i != code as usize);
        if others { (false, true) } else { (true, true) }
    }
}
