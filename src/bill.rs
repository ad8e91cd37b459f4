// src/bill.rs
//! Bill-level types shared by the collector and the assembler.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::consts::*;
use crate::core::sanitize::normalize_key;
use crate::error::{ParseError, TableError};
use crate::features::parse::{parse_probs, parse_seat_counts};
use crate::table::DataSet;

/// Legislative outcome label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgressStatus {
    /// Still in progress, or stopped.
    InProgress = 1,
    /// Became an Act.
    Act = 2,
    Unknown = 3,
}

impl ProgressStatus {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(ProgressStatus::InProgress),
            2 => Some(ProgressStatus::Act),
            3 => Some(ProgressStatus::Unknown),
            _ => None,
        }
    }

    /// Rows used for training: outcome known.
    pub fn is_labelled(self) -> bool {
        matches!(self, ProgressStatus::InProgress | ProgressStatus::Act)
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for ProgressStatus {
    type Err = ParseError;

    /// `"2"`, `" 2 "` and `"2.0"` all read as `Act`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_key(s);
        key.parse::<i64>()
            .ok()
            .and_then(ProgressStatus::from_code)
            .ok_or(ParseError::Number(key))
    }
}

/// Party name → Commons seats, in API order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatCounts(IndexMap<String, u32>);

impl SeatCounts {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Later inserts for the same party overwrite.
    pub fn insert(&mut self, party: impl Into<String>, seats: u32) {
        self.0.insert(party.into(), seats);
    }

    pub fn get(&self, party: &str) -> Option<u32> {
        self.0.get(party).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Python-literal form, as it appears in spreadsheet cells.
    pub fn to_literal(&self) -> String {
        let body: Vec<String> = self
            .0
            .iter()
            .map(|(party, seats)| format!("'{}': {seats}", party.replace('\\', "\\\\").replace('\'', "\\'")))
            .collect();
        join!("{", &body.join(", "), "}")
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for SeatCounts {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        let mut out = SeatCounts::new();
        for (party, seats) in iter {
            out.insert(party, seats);
        }
        out
    }
}

/// One bill as the assembler sees it. Every attribute may be absent;
/// zero-fill happens in the extractor, not here.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BillRecord {
    pub id: String,
    pub originating_house: Option<String>,
    pub status: Option<ProgressStatus>,
    pub sponsor_party: Option<String>,
    pub introduced_date: Option<String>,
    pub seat_counts: Option<SeatCounts>,
    pub doc_probs: Option<Vec<f64>>,
}

/// Where each record attribute lives in a table. Only `id` is required.
#[derive(Clone, Debug)]
pub struct RecordColumns {
    pub id: String,
    pub status: String,
    pub sponsor: String,
    pub seats: String,
    pub doc_probs: String,
}

impl Default for RecordColumns {
    fn default() -> Self {
        Self {
            id: s!(ID_COLUMN),
            status: s!(STATUS_COLUMN),
            sponsor: s!(SPONSOR_COLUMN),
            seats: s!(SEATS_COLUMN),
            doc_probs: s!(DOC_PROB_COLUMN),
        }
    }
}

impl BillRecord {
    /// Read every row of `table` as a record. Unreadable seat-count or
    /// probability cells become absent (logged at debug).
    pub fn from_table(table: &DataSet, cols: &RecordColumns) -> Result<Vec<BillRecord>, TableError> {
        let id_ix = table.require(&cols.id)?;
        let status_ix = table.column(&cols.status);
        let sponsor_ix = table.column(&cols.sponsor);
        let seats_ix = table.column(&cols.seats);
        let probs_ix = table.column(&cols.doc_probs);
        let house_ix = table.column("originating_house");
        let date_ix = table.column("introduced_date");

        let mut out = Vec::with_capacity(table.rows.len());
        for row in &table.rows {
            let cell = |ix: Option<usize>| ix.and_then(|i| row.get(i)).and_then(|c| c.as_deref());
            let id = cell(Some(id_ix)).map(normalize_key).unwrap_or_default();

            let status = cell(status_ix).and_then(|s| match s.parse::<ProgressStatus>() {
                Ok(st) => Some(st),
                Err(e) => {
                    logd!("bill {id}: status {s:?} ignored: {e}");
                    None
                }
            });
            let seat_counts = parse_seat_counts(cell(seats_ix)).unwrap_or_else(|e| {
                logd!("bill {id}: seat counts ignored: {e}");
                None
            });
            let doc_probs = parse_probs(cell(probs_ix)).unwrap_or_else(|e| {
                logd!("bill {id}: doc probs ignored: {e}");
                None
            });

            out.push(BillRecord {
                originating_house: cell(house_ix).map(String::from),
                sponsor_party: cell(sponsor_ix).map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
                introduced_date: cell(date_ix).map(String::from),
                status,
                seat_counts,
                doc_probs,
                id,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parsing() {
        assert_eq!("2".parse::<ProgressStatus>().unwrap(), ProgressStatus::Act);
        assert_eq!("1.0".parse::<ProgressStatus>().unwrap(), ProgressStatus::InProgress);
        assert_eq!(" 3 ".parse::<ProgressStatus>().unwrap(), ProgressStatus::Unknown);
        assert!("4".parse::<ProgressStatus>().is_err());
        assert!(ProgressStatus::Act.is_labelled());
        assert!(!ProgressStatus::Unknown.is_labelled());
    }

    #[test]
    fn seat_literal_form() {
        let seats: SeatCounts = [("Labour", 353), ("Conservative", 196)].into_iter().collect();
        assert_eq!(seats.to_literal(), "{'Labour': 353, 'Conservative': 196}");
        let back = parse_seat_counts(Some(&seats.to_literal())).unwrap().unwrap();
        assert_eq!(back, seats);
    }

    #[test]
    fn records_from_table() {
        let table = DataSet::new(
            cols!["bill_id", "progress_status", "sponsor_party", "seat_counts", "doc_prob"],
            vec![
                cells!["7.0", "2", "Labour", "{'Labour': 353}", "[0.5 0.5]"],
                vec![Some(s!("8")), None, None, Some(s!("{broken")), None],
            ],
        );
        let recs = BillRecord::from_table(&table, &RecordColumns::default()).unwrap();
        assert_eq!(recs[0].id, "7");
        assert_eq!(recs[0].status, Some(ProgressStatus::Act));
        assert_eq!(recs[0].seat_counts.as_ref().and_then(|s| s.get("Labour")), Some(353));
        assert_eq!(recs[0].doc_probs, Some(vec![0.5, 0.5]));
        assert_eq!(recs[1].status, None);
        assert_eq!(recs[1].seat_counts, None);
        assert_eq!(recs[1].sponsor_party, None);
    }
}
