//! External sorter internals: chunk offsets, per-chunk order, k-way merge.

mod common;

use anyhow::Result;
use std::fs;

use colstore::io::{CsvRowReader, count_header_bytes};
use colstore::store::sort::{merge_chunks, sort_chunks};
use colstore::{ARENA_CAPACITY, Arena, Cell, dict};
use common::{row, write_dataset};

fn months_of(path: &std::path::Path, skip_header: bool) -> Result<Vec<i8>> {
    let start = if skip_header {
        count_header_bytes(path)?
    } else {
        0
    };
    let mut reader = CsvRowReader::open(path, start, None)?;
    let mut cells = vec![Cell::Nil; ARENA_CAPACITY];
    let mut out = Vec::new();
    loop {
        let n = reader.read_to(&mut cells, 0, ARENA_CAPACITY - 1)?;
        if n == 0 {
            break;
        }
        out.extend(cells[..n].iter().map(|c| c.as_record().unwrap().month_key));
    }
    Ok(out)
}

#[test]
fn chunk_offsets_carry_a_trailing_sentinel() -> Result<()> {
    // 4700 rows: three chunks of 2000/2000/700
    let rows: Vec<String> = (0..4700)
        .map(|i| {
            row(
                ["2019-06", "2019-04", "2019-05"][i % 3],
                "BEDOK",
                "90",
                "400000",
            )
        })
        .collect();
    let (tmp, data_path) = write_dataset(&rows)?;
    let chunk_path = tmp.path().join("sorted_chunk.csv");

    let mut arena = Arena::with_capacity(ARENA_CAPACITY);
    let offsets = sort_chunks(&mut arena, &data_path, &chunk_path)?;

    assert_eq!(offsets.len(), 4);
    assert_eq!(offsets[0], 0);
    assert!(offsets.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(*offsets.last().unwrap(), fs::metadata(&chunk_path)?.len());
    Ok(())
}

#[test]
fn every_chunk_is_internally_sorted() -> Result<()> {
    let rows: Vec<String> = (0..4700)
        .map(|i| {
            row(
                ["2019-06", "2019-04", "2019-05"][i % 3],
                "BEDOK",
                "90",
                "400000",
            )
        })
        .collect();
    let (tmp, data_path) = write_dataset(&rows)?;
    let chunk_path = tmp.path().join("sorted_chunk.csv");

    let mut arena = Arena::with_capacity(ARENA_CAPACITY);
    let offsets = sort_chunks(&mut arena, &data_path, &chunk_path)?;

    for pair in offsets.windows(2) {
        let mut reader = CsvRowReader::open(&chunk_path, pair[0], Some(pair[1]))?;
        let mut cells = vec![Cell::Nil; ARENA_CAPACITY];
        let mut keys = Vec::new();
        loop {
            let n = reader.read_to(&mut cells, 0, ARENA_CAPACITY - 1)?;
            if n == 0 {
                break;
            }
            keys.extend(cells[..n].iter().map(|c| c.as_record().unwrap().month_key));
        }
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));
    }
    Ok(())
}

#[test]
fn merge_produces_a_total_order_over_all_chunks() -> Result<()> {
    let rows: Vec<String> = (0..5000)
        .map(|i| {
            row(
                dict::month_name((i % 24) as i8).unwrap().as_str(),
                "BEDOK",
                "90",
                "400000",
            )
        })
        .collect();
    let (tmp, data_path) = write_dataset(&rows)?;
    let chunk_path = tmp.path().join("sorted_chunk.csv");
    let sorted_path = tmp.path().join("sorted.csv");

    let mut arena = Arena::with_capacity(ARENA_CAPACITY);
    let offsets = sort_chunks(&mut arena, &data_path, &chunk_path)?;
    merge_chunks(&mut arena, &offsets, &chunk_path, &sorted_path)?;

    let merged = months_of(&sorted_path, false)?;
    assert_eq!(merged.len(), 5000);
    assert!(merged.windows(2).all(|w| w[0] <= w[1]));

    let mut expected = months_of(&data_path, true)?;
    expected.sort_unstable();
    assert_eq!(merged, expected);
    Ok(())
}

#[test]
fn merging_a_single_chunk_is_a_passthrough_sort() -> Result<()> {
    let rows = vec![
        row("2020-03", "BEDOK", "90", "400000"),
        row("2020-01", "BEDOK", "90", "410000"),
        row("2020-02", "BEDOK", "90", "420000"),
    ];
    let (tmp, data_path) = write_dataset(&rows)?;
    let chunk_path = tmp.path().join("sorted_chunk.csv");
    let sorted_path = tmp.path().join("sorted.csv");

    let mut arena = Arena::with_capacity(ARENA_CAPACITY);
    let offsets = sort_chunks(&mut arena, &data_path, &chunk_path)?;
    assert_eq!(offsets.len(), 2);
    merge_chunks(&mut arena, &offsets, &chunk_path, &sorted_path)?;

    let merged = months_of(&sorted_path, false)?;
    assert_eq!(
        merged,
        vec![
            dict::month_code("2020-01").unwrap(),
            dict::month_code("2020-02").unwrap(),
            dict::month_code("2020-03").unwrap(),
        ]
    );
    Ok(())
}

#[test]
fn empty_input_still_produces_the_sorted_artifacts() -> Result<()> {
    let (tmp, data_path) = write_dataset(&[])?;
    let chunk_path = tmp.path().join("sorted_chunk.csv");
    let sorted_path = tmp.path().join("sorted.csv");

    let mut arena = Arena::with_capacity(ARENA_CAPACITY);
    let offsets = sort_chunks(&mut arena, &data_path, &chunk_path)?;
    assert_eq!(offsets, vec![0]);
    merge_chunks(&mut arena, &offsets, &chunk_path, &sorted_path)?;

    assert!(chunk_path.is_file());
    assert!(sorted_path.is_file());
    assert_eq!(fs::metadata(&sorted_path)?.len(), 0);
    Ok(())
}
