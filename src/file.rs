// src/file.rs
//! Whole-table CSV/TSV I/O. Unset cells are written empty and empty cells
//! read back as unset.

use std::{
    fs::{self, File, OpenOptions},
    path::Path,
};

use csv::{ReaderBuilder, WriterBuilder};

use crate::config::options::ExportFormat;
use crate::error::{Error, Result, TableError};
use crate::table::{DataSet, Row};

pub fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(Error::Invalid(format!("Path exists but is not a directory: {}", dir.display())));
    }
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }
    Ok(())
}

/// Create the parent directory of a file path if it has one.
pub fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_directory(parent),
        _ => Ok(()),
    }
}

/// Delimiter from the extension (`.tsv`/`.tab` → tab, else comma).
pub fn delim_for(path: &Path) -> u8 {
    ExportFormat::from_path(path).delim()
}

pub fn read_table(path: &Path) -> Result<DataSet> {
    read_table_with(path, delim_for(path))
}

/// Short rows are padded with unset cells; long rows are an error.
pub fn read_table_with(path: &Path, delim: u8) -> Result<DataSet> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut reader = ReaderBuilder::new().delimiter(delim).flexible(true).from_reader(file);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| s!(h.trim())).collect();
    let mut table = DataSet::with_headers(headers);
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() > table.headers.len() {
            return Err(TableError::Ragged { row: i, expected: table.headers.len(), got: record.len() }.into());
        }
        let row: Row = record
            .iter()
            .map(|c| if c.is_empty() { None } else { Some(s!(c)) })
            .collect();
        table.push_row(row);
    }
    logd!("read {} rows x {} columns from {}", table.len(), table.headers.len(), path.display());
    Ok(table)
}

/// Header row only; `None` when the file is missing or empty.
pub fn read_headers(path: &Path, delim: u8) -> Option<Vec<String>> {
    let file = File::open(path).ok()?;
    let mut reader = ReaderBuilder::new().delimiter(delim).from_reader(file);
    let headers = reader.headers().ok()?;
    if headers.is_empty() { None } else { Some(headers.iter().map(String::from).collect()) }
}

fn write_rows<W: std::io::Write>(w: &mut csv::Writer<W>, rows: &[Row]) -> Result<()> {
    for row in rows {
        w.write_record(row.iter().map(|c| c.as_deref().unwrap_or("")))?;
    }
    Ok(())
}

pub fn write_table(path: &Path, table: &DataSet) -> Result<()> {
    write_table_with(path, table, delim_for(path))
}

/// Create/truncate and write header + rows.
pub fn write_table_with(path: &Path, table: &DataSet, delim: u8) -> Result<()> {
    table.validate()?;
    ensure_parent(path)?;
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut w = WriterBuilder::new().delimiter(delim).from_writer(file);
    w.write_record(&table.headers)?;
    write_rows(&mut w, &table.rows)?;
    w.flush().map_err(|e| Error::io(path, e))?;
    logd!("wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Append rows to a file written by [`write_table_with`]. The file's header
/// must match `headers`.
pub fn append_rows(path: &Path, headers: &[String], rows: &[Row], delim: u8) -> Result<()> {
    match read_headers(path, delim) {
        Some(existing) if existing == headers => {}
        Some(_) => return Err(TableError::HeaderMismatch.into()),
        None => return write_table_with(path, &DataSet::new(headers.to_vec(), rows.to_vec()), delim),
    }
    let file = OpenOptions::new().append(true).open(path).map_err(|e| Error::io(path, e))?;
    let mut w = WriterBuilder::new().delimiter(delim).has_headers(false).from_writer(file);
    write_rows(&mut w, rows)?;
    w.flush().map_err(|e| Error::io(path, e))?;
    Ok(())
}
