// src/table.rs
//! In-memory tables and the relational operations the pipeline needs.
//!
//! Purpose:
//! - Hold a whole CSV/TSV file as `headers + rows`, `None` for an unset cell.
//! - Left/outer joins on an identifier column, dedup-by-first, tagged concat,
//!   partition by tag, column drop and row filter.
//!
//! Non-Responsibilities:
//! - No file I/O (see `file.rs`) and no typing of cells (see `bill.rs`).
//!
//! Join keys are compared in normal form (`core::sanitize::normalize_key`), so
//! `"12"`, `" 12 "` and `"12.0"` meet. Unset keys never match anything.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use crate::core::sanitize::normalize_key;
use crate::error::TableError;

pub type Row = Vec<Option<String>>;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataSet {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum JoinHow {
    /// Every left row, matched right columns or unset.
    Left,
    /// Left join plus right rows nobody matched, in right order.
    Outer,
}

impl DataSet {
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self { headers, rows }
    }

    pub fn with_headers(headers: Vec<String>) -> Self {
        Self { headers, rows: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn require(&self, name: &str) -> Result<usize, TableError> {
        self.column(name).ok_or_else(|| TableError::MissingColumn(s!(name)))
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }

    /// All rows must be as wide as the header.
    pub fn validate(&self) -> Result<(), TableError> {
        let expected = self.headers.len();
        match self.rows.iter().position(|r| r.len() != expected) {
            Some(row) => Err(TableError::Ragged { row, expected, got: self.rows[row].len() }),
            None => Ok(()),
        }
    }

    pub fn push_row(&mut self, mut row: Row) {
        row.resize(self.headers.len(), None);
        self.rows.push(row);
    }

    /// Append an always-set column.
    pub fn add_constant_column(&mut self, name: &str, value: &str) {
        self.headers.push(s!(name));
        for row in &mut self.rows {
            row.push(Some(s!(value)));
        }
    }

    pub fn drop_column(&mut self, name: &str) -> Result<(), TableError> {
        let ix = self.require(name)?;
        self.headers.remove(ix);
        for row in &mut self.rows {
            if ix < row.len() {
                row.remove(ix);
            }
        }
        Ok(())
    }

    pub fn rename_column(&mut self, from: &str, to: &str) -> Result<(), TableError> {
        let ix = self.require(from)?;
        self.headers[ix] = s!(to);
        Ok(())
    }

    /// Only the named columns, in the given order.
    pub fn select_columns(&self, names: &[&str]) -> Result<DataSet, TableError> {
        let ixs: Vec<usize> = names.iter().map(|n| self.require(n)).collect::<Result<_, _>>()?;
        let rows = self
            .rows
            .iter()
            .map(|r| ixs.iter().map(|&i| r.get(i).cloned().flatten()).collect())
            .collect();
        Ok(DataSet { headers: names.iter().map(|n| s!(*n)).collect(), rows })
    }

    pub fn filter<F: FnMut(&Row) -> bool>(&self, mut keep: F) -> DataSet {
        DataSet {
            headers: self.headers.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }

    /// Keep the first row per (normalized) value of `col`. Unset values count
    /// as one value.
    pub fn dedup_by(&mut self, col: &str) -> Result<usize, TableError> {
        let ix = self.require(col)?;
        let before = self.rows.len();
        let mut seen: HashSet<Option<String>> = HashSet::new();
        self.rows.retain(|row| {
            let key = row.get(ix).and_then(|c| c.as_deref()).map(normalize_key);
            seen.insert(key)
        });
        Ok(before - self.rows.len())
    }

    /// Join `self` (left) with `right` on `left_on` == `right_on`.
    ///
    /// With equal key names the key appears once (taken from whichever side
    /// has the row); otherwise both key columns are kept. Any other column
    /// name present on both sides becomes `<name>_x` / `<name>_y`.
    /// Many-to-many matches yield one row per pair.
    pub fn join(&self, right: &DataSet, left_on: &str, right_on: &str, how: JoinHow) -> Result<DataSet, TableError> {
        let lk = self.require(left_on)?;
        let rk = right.require(right_on)?;
        let shared_key = left_on == right_on;

        // right columns that make it into the output, by index
        let right_cols: Vec<usize> = (0..right.headers.len())
            .filter(|&i| !(shared_key && i == rk))
            .collect();

        let left_names: HashSet<&str> = self
            .headers
            .iter()
            .enumerate()
            .filter(|&(i, _)| !(shared_key && i == lk))
            .map(|(_, h)| h.as_str())
            .collect();
        let right_names: HashSet<&str> = right_cols.iter().map(|&i| right.headers[i].as_str()).collect();

        let mut headers: Vec<String> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                if !(shared_key && i == lk) && right_names.contains(h.as_str()) {
                    join!(h.as_str(), "_x")
                } else {
                    h.clone()
                }
            })
            .collect();
        headers.extend(right_cols.iter().map(|&i| {
            let h = &right.headers[i];
            if left_names.contains(h.as_str()) { join!(h.as_str(), "_y") } else { h.clone() }
        }));

        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, row) in right.rows.iter().enumerate() {
            if let Some(key) = row.get(rk).and_then(|c| c.as_deref()) {
                index.entry(normalize_key(key)).or_default().push(i);
            }
        }

        let width_left = self.headers.len();
        let mut matched = vec![false; right.rows.len()];
        let mut rows = Vec::with_capacity(self.rows.len());

        for lrow in &self.rows {
            let mut base = lrow.clone();
            base.resize(width_left, None);
            let hits = lrow
                .get(lk)
                .and_then(|c| c.as_deref())
                .and_then(|k| index.get(&normalize_key(k)));

            match hits {
                Some(hits) => {
                    for &ri in hits {
                        matched[ri] = true;
                        let rrow = &right.rows[ri];
                        let mut out = base.clone();
                        out.extend(right_cols.iter().map(|&c| rrow.get(c).cloned().flatten()));
                        rows.push(out);
                    }
                }
                None => {
                    let mut out = base;
                    out.extend(std::iter::repeat(None).take(right_cols.len()));
                    rows.push(out);
                }
            }
        }

        if how == JoinHow::Outer {
            for (ri, rrow) in right.rows.iter().enumerate() {
                if matched[ri] {
                    continue;
                }
                let mut out: Row = vec![None; width_left];
                if shared_key {
                    out[lk] = rrow.get(rk).cloned().flatten();
                }
                out.extend(right_cols.iter().map(|&c| rrow.get(c).cloned().flatten()));
                rows.push(out);
            }
        }

        Ok(DataSet { headers, rows })
    }

    /// Stack tables; columns are the union in first-seen order, cells of
    /// columns a part lacks stay unset.
    pub fn concat(parts: &[DataSet]) -> DataSet {
        let mut headers: Vec<String> = Vec::new();
        for part in parts {
            for h in &part.headers {
                if !headers.contains(h) {
                    headers.push(h.clone());
                }
            }
        }
        let mut out = DataSet::with_headers(headers);
        for part in parts {
            let map: Vec<usize> = part
                .headers
                .iter()
                .filter_map(|h| out.headers.iter().position(|o| o == h))
                .collect();
            for row in &part.rows {
                let mut new_row: Row = vec![None; out.headers.len()];
                for (src, &dst) in map.iter().enumerate() {
                    new_row[dst] = row.get(src).cloned().flatten();
                }
                out.rows.push(new_row);
            }
        }
        out
    }

    /// Split rows by the value of `col`, groups in first-seen order. The tag
    /// column is removed from every group.
    pub fn partition(&self, col: &str) -> Result<IndexMap<String, DataSet>, TableError> {
        let ix = self.require(col)?;
        let mut headers = self.headers.clone();
        headers.remove(ix);

        let mut groups: IndexMap<String, DataSet> = IndexMap::new();
        for row in &self.rows {
            let tag = row.get(ix).cloned().flatten().unwrap_or_default();
            let mut row = row.clone();
            if ix < row.len() {
                row.remove(ix);
            }
            groups
                .entry(tag)
                .or_insert_with(|| DataSet::with_headers(headers.clone()))
                .rows
                .push(row);
        }
        Ok(groups)
    }
}
