// src/model/mod.rs
//! Classifiers over an assembled [`FeatureMatrix`]: logistic regression and
//! a random forest behind one [`Classifier`] trait, plus evaluation and the
//! saved-model format (JSON).

pub mod forest;
pub mod logistic;
pub mod metrics;
pub mod split;
pub mod synth;
pub mod tree;

use std::fs;
use std::path::Path;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::config::options::{ModelKind, TrainOptions};
use crate::error::{Error, ModelError, Result};
use crate::features::{Assembler, FeatureMatrix, FeatureSchema};
use crate::file::ensure_parent;

pub use forest::{ForestConfig, RandomForest};
pub use logistic::{LogisticConfig, LogisticRegression};
pub use metrics::ClassificationReport;

/// Binary classifier; the positive class is "became an Act".
pub trait Classifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> std::result::Result<(), ModelError>;

    /// P(positive) per row.
    fn predict_proba(&self, x: &Array2<f64>) -> std::result::Result<Array1<f64>, ModelError>;

    fn predict(&self, x: &Array2<f64>) -> std::result::Result<Array1<f64>, ModelError> {
        Ok(self.predict_proba(x)?.mapv(label_for))
    }
}

/// Strictly above one half is Act; an exact tie goes to the first class.
pub fn is_act(p_act: f64) -> bool {
    p_act > 0.5
}

/// 1.0 / 0.0 target value for a probability.
pub fn label_for(p_act: f64) -> f64 {
    if is_act(p_act) { 1.0 } else { 0.0 }
}

pub(crate) fn check_training_set(x: &Array2<f64>, y: &Array1<f64>) -> std::result::Result<(), ModelError> {
    if x.nrows() == 0 {
        return Err(ModelError::EmptyTrainingSet);
    }
    if x.nrows() != y.len() {
        return Err(ModelError::DimensionMismatch { expected: x.nrows(), got: y.len() });
    }
    let pos = y.iter().filter(|&&v| v >= 0.5).count();
    if pos == 0 || pos == y.len() {
        return Err(ModelError::SingleClass);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Model {
    Logistic(LogisticRegression),
    Forest(RandomForest),
}

impl Model {
    pub fn new(opts: &TrainOptions) -> Self {
        match opts.model {
            ModelKind::Logistic => Model::Logistic(LogisticRegression::with_max_iter(opts.max_iter)),
            ModelKind::Forest => Model::Forest(RandomForest::with_trees(opts.forest_trees, opts.forest_seed)),
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            Model::Logistic(_) => ModelKind::Logistic,
            Model::Forest(_) => ModelKind::Forest,
        }
    }
}

impl Classifier for Model {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> std::result::Result<(), ModelError> {
        match self {
            Model::Logistic(m) => m.fit(x, y),
            Model::Forest(m) => m.fit(x, y),
        }
    }

    fn predict_proba(&self, x: &Array2<f64>) -> std::result::Result<Array1<f64>, ModelError> {
        match self {
            Model::Logistic(m) => m.predict_proba(x),
            Model::Forest(m) => m.predict_proba(x),
        }
    }
}

/// How the matrix of a saved model was built, so new data can be built the same way.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FeatureMode {
    Records(Assembler),
    Numeric { id_column: String, label_column: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    pub model: Model,
    pub schema: FeatureSchema,
    pub mode: FeatureMode,
}

impl TrainedModel {
    pub fn save(&self, path: &Path) -> Result<()> {
        ensure_parent(path)?;
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).map_err(|e| Error::io(path, e))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Ok(serde_json::from_str(&text)?)
    }

    /// P(Act) for rows already reconciled to `schema`.
    pub fn predict_proba(&self, m: &FeatureMatrix) -> std::result::Result<Array1<f64>, ModelError> {
        if m.columns != self.schema.columns {
            return Err(ModelError::DimensionMismatch { expected: self.schema.width(), got: m.n_cols() });
        }
        self.model.predict_proba(&m.values)
    }
}

/// Held-out scores.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub accuracy: f64,
    pub log_loss: Option<f64>,
    pub report: ClassificationReport,
    pub predicted: Array1<f64>,
    pub proba: Array1<f64>,
}

/// Class names in reports are the status codes.
pub const CLASS_LABELS: [&str; 2] = ["1", "2"];

pub fn evaluate<C: Classifier + ?Sized>(model: &C, m: &FeatureMatrix) -> std::result::Result<Evaluation, ModelError> {
    let y = m.targets();
    let proba = model.predict_proba(&m.values)?;
    let predicted = proba.mapv(label_for);
    Ok(Evaluation {
        accuracy: metrics::accuracy(&y, &predicted),
        log_loss: metrics::log_loss(&y, &proba),
        report: ClassificationReport::new(&y, &predicted, CLASS_LABELS),
        predicted,
        proba,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn training_set_checks() {
        assert_eq!(check_training_set(&Array2::zeros((0, 2)), &Array1::zeros(0)), Err(ModelError::EmptyTrainingSet));
        assert_eq!(check_training_set(&array![[1.0], [2.0]], &array![1.0, 1.0]), Err(ModelError::SingleClass));
        assert!(matches!(
            check_training_set(&array![[1.0], [2.0]], &array![1.0]),
            Err(ModelError::DimensionMismatch { .. })
        ));
    }

    struct Constant(f64);

    impl Classifier for Constant {
        fn fit(&mut self, _x: &Array2<f64>, _y: &Array1<f64>) -> std::result::Result<(), ModelError> {
            Ok(())
        }
        fn predict_proba(&self, x: &Array2<f64>) -> std::result::Result<Array1<f64>, ModelError> {
            Ok(Array1::from_elem(x.nrows(), self.0))
        }
    }

    #[test]
    fn exact_tie_goes_to_first_class() {
        let x = array![[0.0], [1.0]];
        assert_eq!(Constant(0.5).predict(&x).unwrap(), array![0.0, 0.0]);
        assert_eq!(Constant(0.51).predict(&x).unwrap(), array![1.0, 1.0]);
        assert!(!is_act(0.5));
        assert!(is_act(0.5000001));
    }

    #[test]
    fn model_json_roundtrip_predicts_the_same() {
        let x = array![[0.0], [1.0], [5.0], [6.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];
        let mut model = Model::new(&TrainOptions { model: ModelKind::Forest, forest_trees: 5, ..Default::default() });
        model.fit(&x, &y).unwrap();
        let text = serde_json::to_string(&model).unwrap();
        let back: Model = serde_json::from_str(&text).unwrap();
        assert_eq!(back.kind(), ModelKind::Forest);
        let (a, b) = (back.predict_proba(&x).unwrap(), model.predict_proba(&x).unwrap());
        assert!(a.iter().zip(b.iter()).all(|(p, q)| (p - q).abs() < 1e-9));
    }
}
