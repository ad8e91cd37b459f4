// src/features/encode.rs
//! Drop-first one-hot encoding of the sponsor party, and reconciliation of
//! a new matrix against the column schema frozen at training time.

use std::collections::HashSet;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::config::options::CategoryOrder;
use crate::core::sanitize::normalize_ws;
use crate::features::assemble::FeatureMatrix;

fn clean(value: Option<&str>) -> Option<String> {
    value.map(normalize_ws).filter(|v| !v.is_empty())
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    prefix: String,
    /// All categories seen at fit time; the first is the dropped reference.
    categories: Vec<String>,
}

impl OneHotEncoder {
    pub fn fit<'a, I>(prefix: &str, values: I, order: CategoryOrder) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut categories: Vec<String> = Vec::new();
        for v in values.into_iter().filter_map(clean) {
            if !categories.contains(&v) {
                categories.push(v);
            }
        }
        if order == CategoryOrder::Sorted {
            categories.sort();
        }
        Self { prefix: s!(prefix), categories }
    }

    pub fn reference(&self) -> Option<&str> {
        self.categories.first().map(String::as_str)
    }

    pub fn column_name(&self, category: &str) -> String {
        join!(self.prefix.as_str(), "_", category)
    }

    /// Indicator columns, reference excluded.
    pub fn columns(&self) -> Vec<String> {
        self.categories.iter().skip(1).map(|c| self.column_name(c)).collect()
    }

    /// Indicator row aligned with [`columns`](Self::columns). The reference
    /// category, a missing value and an unseen value all give zeros.
    pub fn encode(&self, value: Option<&str>) -> Vec<f64> {
        let mut out = vec![0.0; self.categories.len().saturating_sub(1)];
        if let Some(v) = clean(value) {
            match self.categories.iter().position(|c| *c == v) {
                Some(0) => {}
                Some(i) => out[i - 1] = 1.0,
                None => logw!("{}: category {v:?} not seen in training, encoded as all-zero", self.prefix),
            }
        }
        out
    }
}

/// Plain one-hot over whatever values occur (no drop), for data encoded
/// on its own before reconciliation.
pub fn dummies(prefix: &str, values: &[Option<&str>]) -> (Vec<String>, Vec<Vec<f64>>) {
    let mut categories: Vec<String> = Vec::new();
    for v in values.iter().filter_map(|v| clean(*v)) {
        if !categories.contains(&v) {
            categories.push(v);
        }
    }
    let names = categories.iter().map(|c| join!(prefix, "_", c)).collect();
    let rows = values
        .iter()
        .map(|v| {
            let v = clean(*v);
            categories.iter().map(|c| if Some(c) == v.as_ref() { 1.0 } else { 0.0 }).collect()
        })
        .collect();
    (names, rows)
}

/// Column order a fitted model expects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub columns: Vec<String>,
    /// Indicator columns of dropped reference categories; expected to show
    /// up as extras and dropped quietly.
    #[serde(default)]
    pub reference_columns: Vec<String>,
}

impl FeatureSchema {
    pub fn new(columns: Vec<String>, reference_columns: Vec<String>) -> Self {
        Self { columns, reference_columns }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Missing columns are added as zeros, columns reordered to the schema,
    /// columns the schema does not know are dropped.
    pub fn reconcile(&self, m: FeatureMatrix) -> FeatureMatrix {
        let known: HashSet<&str> = self.columns.iter().map(String::as_str).collect();
        for extra in m.columns.iter().filter(|c| !known.contains(c.as_str())) {
            if self.reference_columns.contains(extra) {
                logd!("dropping reference column {extra}");
            } else {
                logw!("dropping column {extra}: not part of the training schema");
            }
        }

        let mut values = Array2::<f64>::zeros((m.values.nrows(), self.columns.len()));
        for (dst, name) in self.columns.iter().enumerate() {
            match m.columns.iter().position(|c| c == name) {
                Some(src) => values.column_mut(dst).assign(&m.values.column(src)),
                None => logd!("adding zero column {name}"),
            }
        }

        FeatureMatrix { columns: self.columns.clone(), values, ..m }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_first_gives_two_columns() {
        let enc = OneHotEncoder::fit(
            "sponsor_party",
            [Some("Labour"), Some("Conservative"), Some("Liberal Democrat"), Some("Labour")],
            CategoryOrder::FirstSeen,
        );
        assert_eq!(enc.reference(), Some("Labour"));
        assert_eq!(enc.columns(), vec!["sponsor_party_Conservative", "sponsor_party_Liberal Democrat"]);
        assert_eq!(enc.encode(Some("Labour")), vec![0.0, 0.0]);
        assert_eq!(enc.encode(Some("Liberal Democrat")), vec![0.0, 1.0]);
        assert_eq!(enc.encode(None), vec![0.0, 0.0]);
        assert_eq!(enc.encode(Some("Green")), vec![0.0, 0.0]);
    }

    #[test]
    fn sorted_order_picks_smallest_reference() {
        let enc = OneHotEncoder::fit("p", [Some("Labour"), Some("Conservative")], CategoryOrder::Sorted);
        assert_eq!(enc.reference(), Some("Conservative"));
        assert_eq!(enc.columns(), vec!["p_Labour"]);
    }

    #[test]
    fn dummies_keep_every_category() {
        let (names, rows) = dummies("p", &[Some("A"), None, Some("B")]);
        assert_eq!(names, vec!["p_A", "p_B"]);
        assert_eq!(rows, vec![vec![1.0, 0.0], vec![0.0, 0.0], vec![0.0, 1.0]]);
    }
}
