//! The store build orchestrator.
//!
//! Rebuilds the column store from the raw CSV in a strict sequence:
//!
//! 1. clean the output directory,
//! 2. sort fixed-size chunks of rows by month ([`sort::sort_chunks`]),
//! 3. k-way merge the chunks into one globally sorted CSV
//!    ([`sort::merge_chunks`]),
//! 4. split the sorted rows into ten per-column binary files
//!    ([`split::split_columns`]),
//! 5. run-length encode each column and build its in-memory indexes
//!    ([`encode::encode_columns`]).
//!
//! The whole build is single-threaded and owns the arena exclusively; each
//! stage resets the cells it uses and is deterministic for a given input.

pub mod encode;
pub mod sort;
pub mod split;

use anyhow::{Context, Result};
use log::info;
use std::fs::{create_dir_all, remove_file};
use std::path::{Path, PathBuf};

use crate::arena::Arena;
use crate::schema::Catalog;

/// Intermediate artifact: concatenation of individually sorted chunks.
pub const SORTED_CHUNK_FILE: &str = "sorted_chunk.csv";
/// Intermediate artifact: the globally month-sorted dataset.
pub const SORTED_FILE: &str = "sorted.csv";

/// Builds the on-disk column store and its in-memory indexes.
pub struct Store {
    data_path: PathBuf,
    dir: PathBuf,
}

impl Store {
    /// A store that ingests `data_path` and writes artifacts under `dir`.
    pub fn new(data_path: impl Into<PathBuf>, dir: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            dir: dir.into(),
        }
    }

    /// Directory holding the build artifacts.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Run the full build. Returns the catalog with every per-block index
    /// populated; nothing mutates it afterwards.
    ///
    /// # Errors
    /// Fails if the input file is missing, the output directory cannot be
    /// prepared, or any stage hits an I/O error.
    pub fn build(&self, arena: &mut Arena) -> Result<Catalog> {
        clean_dir(&self.dir)?;

        let chunk_path = self.dir.join(SORTED_CHUNK_FILE);
        let sorted_path = self.dir.join(SORTED_FILE);

        info!("sorting chunks of {}", self.data_path.display());
        let chunk_offsets = sort::sort_chunks(arena, &self.data_path, &chunk_path)?;

        info!("merging {} sorted chunks", chunk_offsets.len().saturating_sub(1));
        sort::merge_chunks(arena, &chunk_offsets, &chunk_path, &sorted_path)?;

        let mut catalog = Catalog::new();

        info!("splitting columns");
        split::split_columns(arena, &sorted_path, &self.dir, &catalog)?;

        info!("encoding columns and building indexes");
        encode::encode_columns(arena, &self.dir, &mut catalog)?;

        Ok(catalog)
    }
}

/// Remove every file directly under `dir`, creating the directory if it does
/// not exist yet. Subdirectories are left alone.
fn clean_dir(dir: &Path) -> Result<()> {
    create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let pattern = dir.join("*");
    for entry in glob::glob(&pattern.to_string_lossy()).context("list output directory")? {
        let path = entry.context("list output directory")?;
        if path.is_file() {
            remove_file(&path).with_context(|| format!("remove {}", path.display()))?;
        }
    }
    Ok(())
}
