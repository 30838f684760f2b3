//! Windowed reader/writer behavior: fill counts, byte limits, skip-with-
//! rollback, and binary round-trips.

mod common;

use anyhow::Result;
use std::fs;
use tempfile::TempDir;

use colstore::io::{ColumnReader, ColumnWriter, CsvRowReader, CsvRowWriter, count_header_bytes};
use colstore::{Cell, ColumnKind};
use common::{row, write_dataset};

#[test]
fn header_width_includes_the_newline() -> Result<()> {
    let (_tmp, data_path) = write_dataset(&[row("2020-01", "BEDOK", "90", "400000")])?;
    assert_eq!(count_header_bytes(&data_path)?, common::HEADER.len() as u64 + 1);
    Ok(())
}

#[test]
fn csv_reader_fills_at_most_the_window() -> Result<()> {
    let rows: Vec<String> = (0..10)
        .map(|i| row("2020-01", "BEDOK", "90", &format!("{}", 400000 + i)))
        .collect();
    let (_tmp, data_path) = write_dataset(&rows)?;

    let header = count_header_bytes(&data_path)?;
    let mut reader = CsvRowReader::open(&data_path, header, None)?;
    let mut cells = vec![Cell::Nil; 16];

    // window smaller than the file
    assert_eq!(reader.read_to(&mut cells, 0, 3)?, 4);
    assert!(cells[0..4].iter().all(|c| c.as_record().is_some()));
    assert!(cells[4].is_nil());

    // remaining rows, then a clean zero at end-of-file
    assert_eq!(reader.read_to(&mut cells, 4, 15)?, 6);
    assert_eq!(reader.read_to(&mut cells, 0, 15)?, 0);
    Ok(())
}

#[test]
fn csv_reader_respects_its_byte_limit() -> Result<()> {
    let rows: Vec<String> = (0..6)
        .map(|_| row("2020-01", "BEDOK", "90", "400000"))
        .collect();
    let (_tmp, data_path) = write_dataset(&rows)?;
    let header = count_header_bytes(&data_path)?;
    let row_width = rows[0].len() as u64 + 1;

    // limit after two rows: the third must not be delivered
    let limit = header + 2 * row_width;
    let mut reader = CsvRowReader::open(&data_path, header, Some(limit))?;
    let mut cells = vec![Cell::Nil; 8];
    assert_eq!(reader.read_to(&mut cells, 0, 7)?, 2);
    assert_eq!(reader.byte_offset(), limit);
    Ok(())
}

#[test]
fn csv_reader_skips_malformed_rows_and_rolls_back_their_width() -> Result<()> {
    let good = row("2020-01", "BEDOK", "90", "400000");
    let bad = row("2020-01", "BEDOK", "nope", "400000");
    let (_tmp, data_path) = write_dataset(&[good.clone(), bad, good.clone()])?;

    let header = count_header_bytes(&data_path)?;
    let mut reader = CsvRowReader::open(&data_path, header, None)?;
    let mut cells = vec![Cell::Nil; 8];

    // both good rows land densely; the bad one leaves no gap
    assert_eq!(reader.read_to(&mut cells, 0, 7)?, 2);
    assert!(cells[0].as_record().is_some());
    assert!(cells[1].as_record().is_some());
    assert!(cells[2].is_nil());

    // the tracked offset counts only the rows that were kept
    assert_eq!(reader.byte_offset() - header, 2 * (good.len() as u64 + 1));
    Ok(())
}

#[test]
fn csv_writer_round_trips_records() -> Result<()> {
    let (_tmp, data_path) = write_dataset(&[
        row("2020-02", "YISHUN", "67.5", "312000"),
        row("2020-01", "BEDOK", "90", "400000"),
    ])?;
    let header = count_header_bytes(&data_path)?;
    let mut reader = CsvRowReader::open(&data_path, header, None)?;
    let mut cells = vec![Cell::Nil; 4];
    assert_eq!(reader.read_to(&mut cells, 0, 3)?, 2);

    let tmp = TempDir::new()?;
    let out = tmp.path().join("rows.csv");
    let mut writer = CsvRowWriter::open(&out)?;
    writer.write_from(&cells, 0, 1)?;

    let contents = fs::read_to_string(&out)?;
    assert_eq!(
        contents,
        format!(
            "{}\n{}\n",
            row("2020-02", "YISHUN", "67.5", "312000"),
            row("2020-01", "BEDOK", "90", "400000")
        )
    );
    Ok(())
}

#[test]
fn csv_writer_rejects_non_record_cells() -> Result<()> {
    let tmp = TempDir::new()?;
    let mut writer = CsvRowWriter::open(tmp.path().join("rows.csv"))?;
    let cells = vec![Cell::I8(3)];
    assert!(writer.write_from(&cells, 0, 0).is_err());
    Ok(())
}

#[test]
fn binary_i8_round_trips_with_byte_offsets() -> Result<()> {
    let tmp = TempDir::new()?;
    let path = tmp.path().join("col");
    let cells: Vec<Cell> = [3i8, -2, 7, 0, 127, -128].iter().map(|v| Cell::I8(*v)).collect();

    let mut writer = ColumnWriter::open(&path)?;
    assert_eq!(writer.write_from(&cells, 0, 5)?, 6);

    let mut reader = ColumnReader::open(&path, 0, None, ColumnKind::I8)?;
    let mut out = vec![Cell::Nil; 8];
    assert_eq!(reader.read_to(&mut out, 0, 7)?, 6);
    assert_eq!(&out[..6], cells.as_slice());

    // seek into the middle and bound the read to two values
    let mut reader = ColumnReader::open(&path, 2, Some(4), ColumnKind::I8)?;
    let mut out = vec![Cell::Nil; 8];
    assert_eq!(reader.read_to(&mut out, 0, 7)?, 2);
    assert_eq!(out[0].as_i8(), Some(7));
    assert_eq!(out[1].as_i8(), Some(0));
    Ok(())
}

#[test]
fn binary_f64_round_trips_little_endian() -> Result<()> {
    let tmp = TempDir::new()?;
    let path = tmp.path().join("col");
    let values = [92.5f64, -2.0, 415000.0, 0.25];
    let cells: Vec<Cell> = values.iter().map(|v| Cell::F64(*v)).collect();

    let mut writer = ColumnWriter::open(&path)?;
    assert_eq!(writer.write_from(&cells, 0, 3)?, 32);
    assert_eq!(fs::metadata(&path)?.len(), 32);

    // the raw bytes really are little-endian
    let bytes = fs::read(&path)?;
    assert_eq!(&bytes[..8], &92.5f64.to_le_bytes());

    let mut reader = ColumnReader::open(&path, 8, Some(24), ColumnKind::F64)?;
    let mut out = vec![Cell::Nil; 4];
    assert_eq!(reader.read_to(&mut out, 0, 3)?, 2);
    assert_eq!(out[0].as_f64(), Some(-2.0));
    assert_eq!(out[1].as_f64(), Some(415000.0));
    Ok(())
}

#[test]
fn binary_strings_round_trip_with_lf_terminators() -> Result<()> {
    let tmp = TempDir::new()?;
    let path = tmp.path().join("col");
    let cells = vec![
        Cell::Str("101".into()),
        Cell::Str("-2".into()),
        Cell::Str("TAMPINES ST 81".into()),
        Cell::Str(String::new()),
    ];

    let mut writer = ColumnWriter::open(&path)?;
    let bytes = writer.write_from(&cells, 0, 3)?;
    assert_eq!(bytes, 4 + 3 + 15 + 1); // each value plus its LF

    let mut reader = ColumnReader::open(&path, 0, None, ColumnKind::Str)?;
    let mut out = vec![Cell::Nil; 8];
    assert_eq!(reader.read_to(&mut out, 0, 7)?, 4);
    assert_eq!(&out[..4], cells.as_slice());
    Ok(())
}

#[test]
fn column_writer_reports_written_bytes_per_kind() -> Result<()> {
    let tmp = TempDir::new()?;
    let path = tmp.path().join("col");
    let cells = vec![Cell::I8(1), Cell::I8(2)];
    let mut writer = ColumnWriter::open(&path)?;
    // inclusive window: a single-cell write is (i, i)
    assert_eq!(writer.write_from(&cells, 1, 1)?, 1);
    assert_eq!(fs::metadata(&path)?.len(), 1);
    Ok(())
}
