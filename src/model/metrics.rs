// src/model/metrics.rs
//! Binary metrics over 0/1 targets (1 = became an Act).

use std::fmt;

use ndarray::Array1;

const EPS: f64 = 1e-15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfusionMatrix {
    pub tp: usize,
    pub tn: usize,
    pub fp: usize,
    pub fn_: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let mut cm = ConfusionMatrix::default();
        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            match (t >= 0.5, p >= 0.5) {
                (true, true) => cm.tp += 1,
                (false, false) => cm.tn += 1,
                (false, true) => cm.fp += 1,
                (true, false) => cm.fn_ += 1,
            }
        }
        cm
    }

    pub fn total(&self) -> usize {
        self.tp + self.tn + self.fp + self.fn_
    }
}

fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 { 0.0 } else { num as f64 / denom as f64 }
}

pub fn accuracy(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let cm = ConfusionMatrix::from_predictions(y_true, y_pred);
    ratio(cm.tp + cm.tn, cm.total())
}

/// Binary cross-entropy of P(positive), probabilities clipped to `[eps, 1-eps]`.
/// `None` for an empty set.
pub fn log_loss(y_true: &Array1<f64>, p_pos: &Array1<f64>) -> Option<f64> {
    if y_true.is_empty() {
        return None;
    }
    let total: f64 = y_true
        .iter()
        .zip(p_pos.iter())
        .map(|(&y, &p)| {
            let p = p.clamp(EPS, 1.0 - EPS);
            y * p.ln() + (1.0 - y) * (1.0 - p).ln()
        })
        .sum();
    Some(-total / y_true.len() as f64)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassScores {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 { 0.0 } else { 2.0 * precision * recall / (precision + recall) }
}

/// Per-class precision/recall/F1 plus macro and weighted averages.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub classes: [ClassScores; 2],
    pub accuracy: f64,
    pub total: usize,
}

impl ClassificationReport {
    /// `labels` names the negative and positive class, in that order.
    pub fn new(y_true: &Array1<f64>, y_pred: &Array1<f64>, labels: [&str; 2]) -> Self {
        let cm = ConfusionMatrix::from_predictions(y_true, y_pred);

        let neg_p = ratio(cm.tn, cm.tn + cm.fn_);
        let neg_r = ratio(cm.tn, cm.tn + cm.fp);
        let pos_p = ratio(cm.tp, cm.tp + cm.fp);
        let pos_r = ratio(cm.tp, cm.tp + cm.fn_);

        Self {
            classes: [
                ClassScores { label: s!(labels[0]), precision: neg_p, recall: neg_r, f1: f1(neg_p, neg_r), support: cm.tn + cm.fp },
                ClassScores { label: s!(labels[1]), precision: pos_p, recall: pos_r, f1: f1(pos_p, pos_r), support: cm.tp + cm.fn_ },
            ],
            accuracy: ratio(cm.tp + cm.tn, cm.total()),
            total: cm.total(),
        }
    }

    fn average(&self, weighted: bool) -> (f64, f64, f64) {
        let weights: Vec<f64> = self
            .classes
            .iter()
            .map(|c| if weighted { ratio(c.support, self.total) } else { 0.5 })
            .collect();
        let avg = |f: fn(&ClassScores) -> f64| self.classes.iter().zip(&weights).map(|(c, w)| f(c) * w).sum::<f64>();
        (avg(|c| c.precision), avg(|c| c.recall), avg(|c| c.f1))
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>14} {:>10} {:>10} {:>10} {:>10}", "", "precision", "recall", "f1-score", "support")?;
        writeln!(f)?;
        for c in &self.classes {
            writeln!(f, "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}", c.label, c.precision, c.recall, c.f1, c.support)?;
        }
        writeln!(f)?;
        writeln!(f, "{:>14} {:>10} {:>10} {:>10.2} {:>10}", "accuracy", "", "", self.accuracy, self.total)?;
        let (p, r, f1) = self.average(false);
        writeln!(f, "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}", "macro avg", p, r, f1, self.total)?;
        let (p, r, f1) = self.average(true);
        write!(f, "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}", "weighted avg", p, r, f1, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn counts_and_accuracy() {
        let t = array![1.0, 1.0, 0.0, 0.0];
        let p = array![1.0, 0.0, 0.0, 1.0];
        let cm = ConfusionMatrix::from_predictions(&t, &p);
        assert_eq!(cm, ConfusionMatrix { tp: 1, tn: 1, fp: 1, fn_: 1 });
        assert_eq!(accuracy(&t, &p), 0.5);
    }

    #[test]
    fn log_loss_values() {
        let t = array![1.0, 0.0];
        let ll = log_loss(&t, &array![0.5, 0.5]).unwrap();
        assert!((ll - std::f64::consts::LN_2).abs() < 1e-12);
        assert!(log_loss(&t, &array![1.0, 0.0]).unwrap() < 1e-10);
        assert_eq!(log_loss(&Array1::zeros(0), &Array1::zeros(0)), None);
    }

    #[test]
    fn report_layout() {
        let t = array![1.0, 1.0, 0.0, 0.0];
        let p = array![1.0, 1.0, 0.0, 1.0];
        let report = ClassificationReport::new(&t, &p, ["1", "2"]);
        assert_eq!(report.classes[1].support, 2);
        assert_eq!(report.classes[1].recall, 1.0);
        assert!((report.classes[1].precision - 2.0 / 3.0).abs() < 1e-12);
        let text = report.to_string();
        assert!(text.contains("weighted avg"));
        assert!(text.contains("accuracy"));
    }
}
