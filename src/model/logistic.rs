// src/model/logistic.rs
//! L2-regularized logistic regression, batch gradient descent on
//! standardized features.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use super::Classifier;
use crate::error::ModelError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticConfig {
    pub learning_rate: f64,
    pub max_iter: usize,
    pub tolerance: f64,
    /// Inverse regularization strength, as in `C`.
    pub c: f64,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self { learning_rate: 0.1, max_iter: 1000, tolerance: 1e-6, c: 1.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Fitted {
    mean: Vec<f64>,
    scale: Vec<f64>,
    weights: Vec<f64>,
    bias: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    config: LogisticConfig,
    fitted: Option<Fitted>,
    #[serde(skip)]
    pub cost_history: Vec<f64>,
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn cost(y: &Array1<f64>, p: &Array1<f64>) -> f64 {
    super::metrics::log_loss(y, p).unwrap_or(0.0)
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(LogisticConfig::default())
    }
}

impl LogisticRegression {
    pub fn new(config: LogisticConfig) -> Self {
        Self { config, fitted: None, cost_history: Vec::new() }
    }

    pub fn with_max_iter(max_iter: usize) -> Self {
        Self::new(LogisticConfig { max_iter, ..Default::default() })
    }

    /// Coefficients in the original (unstandardized) feature space.
    pub fn coefficients(&self) -> Option<Vec<f64>> {
        let f = self.fitted.as_ref()?;
        Some(f.weights.iter().zip(&f.scale).map(|(w, s)| w / s).collect())
    }

    fn standardize(f: &Fitted, x: &Array2<f64>) -> Array2<f64> {
        let mean = Array1::from(f.mean.clone());
        let scale = Array1::from(f.scale.clone());
        (x - &mean) / &scale
    }
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        super::check_training_set(x, y)?;
        let n = x.nrows() as f64;

        let mean = x.mean_axis(Axis(0)).ok_or(ModelError::EmptyTrainingSet)?;
        let scale = x.std_axis(Axis(0), 0.0).mapv(|s| if s > 1e-12 { s } else { 1.0 });
        let mut fitted = Fitted {
            mean: mean.to_vec(),
            scale: scale.to_vec(),
            weights: vec![0.0; x.ncols()],
            bias: 0.0,
        };
        let z = Self::standardize(&fitted, x);

        let mut w = Array1::<f64>::zeros(x.ncols());
        let mut b = 0.0;
        let alpha = 1.0 / (self.config.c * n);
        self.cost_history.clear();

        for iter in 0..self.config.max_iter {
            let p = (z.dot(&w) + b).mapv(sigmoid);
            let err = &p - y;
            let dw = z.t().dot(&err) / n + &w * alpha;
            let db = err.sum() / n;

            w = &w - &(dw * self.config.learning_rate);
            b -= self.config.learning_rate * db;

            let c = cost(y, &p);
            self.cost_history.push(c);
            if iter > 0 && (self.cost_history[iter - 1] - c).abs() < self.config.tolerance {
                logd!("logistic regression converged after {iter} iterations");
                break;
            }
        }

        fitted.weights = w.to_vec();
        fitted.bias = b;
        self.fitted = Some(fitted);
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        let f = self.fitted.as_ref().ok_or(ModelError::NotFitted)?;
        if x.ncols() != f.weights.len() {
            return Err(ModelError::DimensionMismatch { expected: f.weights.len(), got: x.ncols() });
        }
        let w = Array1::from(f.weights.clone());
        Ok((Self::standardize(f, x).dot(&w) + f.bias).mapv(sigmoid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn separates_simple_data() {
        let x = array![[0.0, 100.0], [1.0, 100.0], [2.0, 100.0], [8.0, 100.0], [9.0, 100.0], [10.0, 100.0]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let mut m = LogisticRegression::default();
        m.fit(&x, &y).unwrap();
        let pred = m.predict(&x).unwrap();
        assert_eq!(pred, y);
        let p = m.predict_proba(&array![[10.0, 100.0]]).unwrap();
        assert!(p[0] > 0.5);

        let coef = m.coefficients().unwrap();
        assert!(coef[0] > 0.0);
        assert_eq!(coef[1], 0.0);
    }

    #[test]
    fn errors() {
        let m = LogisticRegression::default();
        assert_eq!(m.predict_proba(&array![[1.0]]), Err(ModelError::NotFitted));
        let mut m = LogisticRegression::default();
        m.fit(&array![[0.0], [1.0]], &array![0.0, 1.0]).unwrap();
        assert!(matches!(m.predict_proba(&array![[1.0, 2.0]]), Err(ModelError::DimensionMismatch { .. })));
    }
}
