// src/features/assemble.rs
//! Bill records → numeric feature matrix + labels.
//!
//! Column layout: seat counts, then probability field(s), then sponsor
//! indicators. Training assembly keeps only labelled rows (status 1 or 2)
//! and freezes a [`FeatureSchema`]; everything encoded later is reconciled
//! against it.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::bill::{BillRecord, ProgressStatus};
use crate::config::consts::{DOC_PROB_COLUMN, DOC_PROB_SLOTS, SPONSOR_COLUMN};
use crate::config::options::{CategoryOrder, FeatureSet, SlotPolicy};
use crate::error::FeatureError;
use crate::features::encode::{FeatureSchema, OneHotEncoder, dummies};
use crate::features::extract::{last_prob, prob_slots, seat_feature_names, seat_features, slot_names};
use crate::features::parse::parse_probs;
use crate::table::DataSet;

#[derive(Clone, Debug, PartialEq)]
pub struct FeatureMatrix {
    pub ids: Vec<String>,
    pub columns: Vec<String>,
    pub values: Array2<f64>,
    /// One per row, or empty for unlabelled data.
    pub labels: Vec<ProgressStatus>,
}

impl FeatureMatrix {
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_cols(&self) -> usize {
        self.values.ncols()
    }

    pub fn is_labelled(&self) -> bool {
        !self.labels.is_empty() && self.labels.len() == self.n_rows()
    }

    /// 1.0 for `Act`, 0.0 otherwise.
    pub fn targets(&self) -> Array1<f64> {
        self.labels.iter().map(|&l| if l == ProgressStatus::Act { 1.0 } else { 0.0 }).collect()
    }

    pub fn value(&self, row: usize, column: &str) -> Option<f64> {
        let c = self.columns.iter().position(|n| n == column)?;
        self.values.get((row, c)).copied()
    }

    /// Rows by index, in the given order.
    pub fn select(&self, rows: &[usize]) -> FeatureMatrix {
        FeatureMatrix {
            ids: rows.iter().map(|&i| self.ids[i].clone()).collect(),
            columns: self.columns.clone(),
            values: self.values.select(Axis(0), rows),
            labels: if self.is_labelled() { rows.iter().map(|&i| self.labels[i]).collect() } else { Vec::new() },
        }
    }
}

/// Numeric part of one bill's features plus its raw category.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureRow {
    pub id: String,
    pub numeric: Vec<f64>,
    pub sponsor: Option<String>,
    pub status: Option<ProgressStatus>,
}

pub fn numeric_columns(set: FeatureSet) -> Vec<String> {
    let mut cols = seat_feature_names();
    match set {
        FeatureSet::Seats => {}
        FeatureSet::SeatsProbs => cols.extend(slot_names(DOC_PROB_SLOTS)),
        FeatureSet::SeatsLastProb => cols.push(s!(DOC_PROB_COLUMN)),
    }
    cols
}

pub fn feature_row(rec: &BillRecord, set: FeatureSet, slots: SlotPolicy) -> Result<FeatureRow, FeatureError> {
    let mut numeric = seat_features(rec.seat_counts.as_ref()).to_vec();
    let probs = rec.doc_probs.as_deref();
    match set {
        FeatureSet::Seats => {}
        FeatureSet::SeatsProbs => numeric.extend(prob_slots(&rec.id, probs, DOC_PROB_SLOTS, slots)?),
        FeatureSet::SeatsLastProb => numeric.push(last_prob(&rec.id, probs)?),
    }
    Ok(FeatureRow {
        id: rec.id.clone(),
        numeric,
        sponsor: rec.sponsor_party.clone(),
        status: rec.status,
    })
}

/// How a record set becomes a matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Assembler {
    pub features: FeatureSet,
    pub slots: SlotPolicy,
    pub categories: CategoryOrder,
}

/// Training-time output: matrix, fitted encoder and frozen schema.
#[derive(Clone, Debug)]
pub struct Assembled {
    pub matrix: FeatureMatrix,
    pub encoder: OneHotEncoder,
    pub schema: FeatureSchema,
}

fn stack(rows: &[Vec<f64>], width: usize) -> Array2<f64> {
    let mut values = Array2::<f64>::zeros((rows.len(), width));
    for (mut dst, src) in values.axis_iter_mut(Axis(0)).zip(rows) {
        for (d, s) in dst.iter_mut().zip(src) {
            *d = *s;
        }
    }
    values
}

impl Assembler {
    /// Labelled rows only. A feature failure on any kept row aborts.
    pub fn fit(&self, records: &[BillRecord]) -> Result<Assembled, FeatureError> {
        let rows: Vec<FeatureRow> = records
            .iter()
            .filter(|r| r.status.is_some_and(ProgressStatus::is_labelled))
            .map(|r| feature_row(r, self.features, self.slots))
            .collect::<Result<_, _>>()?;
        if rows.is_empty() {
            return Err(FeatureError::Empty);
        }
        logd!("assembling {} of {} records", rows.len(), records.len());

        let encoder = OneHotEncoder::fit(SPONSOR_COLUMN, rows.iter().map(|r| r.sponsor.as_deref()), self.categories);
        let mut columns = numeric_columns(self.features);
        columns.extend(encoder.columns());

        let full: Vec<Vec<f64>> = rows
            .iter()
            .map(|r| {
                let mut v = r.numeric.clone();
                v.extend(encoder.encode(r.sponsor.as_deref()));
                v
            })
            .collect();

        let matrix = FeatureMatrix {
            ids: rows.iter().map(|r| r.id.clone()).collect(),
            values: stack(&full, columns.len()),
            labels: rows.iter().filter_map(|r| r.status).collect(),
            columns: columns.clone(),
        };
        let reference = encoder.reference().map(|r| encoder.column_name(r)).into_iter().collect();
        let schema = FeatureSchema::new(columns, reference);
        Ok(Assembled { matrix, encoder, schema })
    }

    /// Encode new records on their own (every category gets a column) and
    /// reconcile with `schema`. No status filter; labels are kept only when
    /// every record has one.
    pub fn transform(&self, records: &[BillRecord], schema: &FeatureSchema) -> Result<FeatureMatrix, FeatureError> {
        let rows: Vec<FeatureRow> = records
            .iter()
            .map(|r| feature_row(r, self.features, self.slots))
            .collect::<Result<_, _>>()?;

        let sponsors: Vec<Option<&str>> = rows.iter().map(|r| r.sponsor.as_deref()).collect();
        let (dummy_names, dummy_rows) = dummies(SPONSOR_COLUMN, &sponsors);

        let mut columns = numeric_columns(self.features);
        columns.extend(dummy_names);
        let full: Vec<Vec<f64>> = rows
            .iter()
            .zip(dummy_rows)
            .map(|(r, d)| r.numeric.iter().copied().chain(d).collect())
            .collect();

        let labels: Vec<ProgressStatus> = rows.iter().filter_map(|r| r.status).collect();
        let raw = FeatureMatrix {
            ids: rows.iter().map(|r| r.id.clone()).collect(),
            values: stack(&full, columns.len()),
            labels: if labels.len() == rows.len() { labels } else { Vec::new() },
            columns,
        };
        Ok(schema.reconcile(raw))
    }
}

/// Prepared tables: every column except `id_col` / `label_col` is a
/// feature. `[..]` strings reduce to their last element, empty cells are
/// zero, rows without a 1/2 label are skipped.
pub fn assemble_numeric(table: &DataSet, id_col: &str, label_col: &str) -> Result<FeatureMatrix, FeatureError> {
    let id_ix = table.column(id_col).ok_or_else(|| FeatureError::MissingColumn(s!(id_col)))?;
    let label_ix = table.column(label_col).ok_or_else(|| FeatureError::MissingColumn(s!(label_col)))?;
    let feature_ix: Vec<usize> = (0..table.headers.len()).filter(|&i| i != id_ix && i != label_ix).collect();

    let mut ids = Vec::new();
    let mut labels = Vec::new();
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for (r, row) in table.rows.iter().enumerate() {
        let cell = |i: usize| row.get(i).and_then(|c| c.as_deref()).map(str::trim).filter(|c| !c.is_empty());
        let id = cell(id_ix).map(crate::core::sanitize::normalize_key).unwrap_or_default();
        let status = cell(label_ix).and_then(|s| s.parse::<ProgressStatus>().ok());
        let Some(status) = status.filter(|s| s.is_labelled()) else {
            logd!("row {r} (bill {id}) has no usable label, skipped");
            continue;
        };

        let mut values = Vec::with_capacity(feature_ix.len());
        for &i in &feature_ix {
            let v = match cell(i) {
                None => 0.0,
                Some(text) if text.starts_with('[') => {
                    let probs = parse_probs(Some(text)).map_err(|_| FeatureError::NotNumeric {
                        id: id.clone(),
                        column: table.headers[i].clone(),
                        value: s!(text),
                    })?;
                    last_prob(&id, probs.as_deref())?
                }
                Some(text) => text.parse::<f64>().map_err(|_| FeatureError::NotNumeric {
                    id: id.clone(),
                    column: table.headers[i].clone(),
                    value: s!(text),
                })?,
            };
            values.push(v);
        }
        ids.push(id);
        labels.push(status);
        rows.push(values);
    }

    if rows.is_empty() {
        return Err(FeatureError::Empty);
    }
    Ok(FeatureMatrix {
        ids,
        columns: feature_ix.iter().map(|&i| table.headers[i].clone()).collect(),
        values: stack(&rows, feature_ix.len()),
        labels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bill::SeatCounts;

    fn rec(id: &str, status: u8, party: &str, probs: Vec<f64>) -> BillRecord {
        BillRecord {
            id: s!(id),
            status: ProgressStatus::from_code(status as i64),
            sponsor_party: Some(s!(party)),
            seat_counts: Some([("Labour", 353), ("Conservative", 196), ("Liberal Democrat", 63)].into_iter().collect::<SeatCounts>()),
            doc_probs: Some(probs),
            ..Default::default()
        }
    }

    #[test]
    fn labelled_rows_only() {
        let records = vec![
            rec("1", 2, "Labour", vec![0.1, 0.2, 0.3, 0.4]),
            rec("2", 3, "Conservative", vec![]),
            rec("3", 1, "Conservative", vec![0.5]),
        ];
        let out = Assembler::default().fit(&records).unwrap();
        assert_eq!(out.matrix.ids, vec!["1", "3"]);
        assert_eq!(
            out.matrix.columns,
            cols![
                "Labour_seats", "Conservative_seats", "LibDem_seats",
                "doc_prob1", "doc_prob2", "doc_prob3", "doc_prob4",
                "sponsor_party_Conservative"
            ]
        );
        assert_eq!(out.matrix.targets().to_vec(), vec![1.0, 0.0]);
        assert_eq!(out.matrix.value(1, "doc_prob1"), Some(0.5));
        assert_eq!(out.matrix.value(1, "doc_prob4"), Some(0.0));
        assert_eq!(out.schema.reference_columns, vec!["sponsor_party_Labour"]);
    }

    #[test]
    fn strict_short_vector_aborts() {
        let records = vec![rec("1", 2, "Labour", vec![0.1])];
        let asm = Assembler { slots: SlotPolicy::Strict, ..Default::default() };
        assert!(matches!(asm.fit(&records), Err(FeatureError::ProbsTooShort { .. })));
    }

    #[test]
    fn numeric_mode_reduces_arrays() {
        let table = DataSet::new(
            cols!["bill_id", "doc_probs", "RF_Probability", "status"],
            vec![
                cells![1, "[0.3 0.7]", 0.9, 2],
                vec![Some(s!("2")), Some(s!("[0.6 0.4]")), None, Some(s!("1"))],
                cells![3, "[0.5 0.5]", 0.1, 3],
            ],
        );
        let m = assemble_numeric(&table, "bill_id", "status").unwrap();
        assert_eq!(m.columns, cols!["doc_probs", "RF_Probability"]);
        assert_eq!(m.n_rows(), 2);
        assert_eq!(m.value(0, "doc_probs"), Some(0.7));
        assert_eq!(m.value(1, "RF_Probability"), Some(0.0));
    }
}
