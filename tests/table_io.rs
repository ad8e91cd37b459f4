// tests/table_io.rs
use std::fs;

use bill_scrape::error::{Error, TableError};
use bill_scrape::file::{append_rows, read_table, write_table};
use bill_scrape::table::DataSet;
use bill_scrape::{cells, cols};

fn sample() -> DataSet {
    DataSet::new(
        cols!["bill_id", "short_title", "seat_counts"],
        vec![
            cells![1, "Alpha, Beta Bill", "{'Labour': 353, 'Conservative': 196}"],
            vec![Some("2".into()), None, Some("{}".into())],
        ],
    )
}

#[test]
fn csv_round_trip_keeps_unset_cells() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("bills.csv");
    let table = sample();

    write_table(&path, &table).unwrap();
    let back = read_table(&path).unwrap();
    assert_eq!(back, table);
}

#[test]
fn tsv_chosen_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bills.tsv");
    write_table(&path, &sample()).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("bill_id\tshort_title\tseat_counts\n"));
    assert_eq!(read_table(&path).unwrap().rows[0][1].as_deref(), Some("Alpha, Beta Bill"));
}

#[test]
fn append_requires_matching_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bills.csv");
    let table = sample();
    write_table(&path, &DataSet::with_headers(table.headers.clone())).unwrap();

    append_rows(&path, &table.headers, &table.rows[..1], b',').unwrap();
    append_rows(&path, &table.headers, &table.rows[1..], b',').unwrap();
    assert_eq!(read_table(&path).unwrap(), table);

    let err = append_rows(&path, &cols!["other"], &[cells![1]], b',').unwrap_err();
    assert!(matches!(err, Error::Table(TableError::HeaderMismatch)));
}

#[test]
fn append_to_missing_file_writes_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fresh.csv");
    let table = sample();
    append_rows(&path, &table.headers, &table.rows, b',').unwrap();
    assert_eq!(read_table(&path).unwrap(), table);
}

#[test]
fn short_rows_pad_and_long_rows_fail() {
    let dir = tempfile::tempdir().unwrap();
    let short = dir.path().join("short.csv");
    fs::write(&short, "a,b,c\n1,2\n").unwrap();
    let t = read_table(&short).unwrap();
    assert_eq!(t.rows[0], vec![Some("1".into()), Some("2".into()), None]);

    let long = dir.path().join("long.csv");
    fs::write(&long, "a,b\n1,2\n1,2,3\n").unwrap();
    let err = read_table(&long).unwrap_err();
    assert!(matches!(err, Error::Table(TableError::Ragged { row: 1, expected: 2, got: 3 })));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_table(&dir.path().join("nope.csv")).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}
