// src/model/forest.rs
//! Bagged Gini trees with sqrt feature sampling; probabilities are the
//! mean over trees. Trees are fitted one after another.

use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::Classifier;
use super::tree::{DecisionTree, TreeConfig};
use crate::error::ModelError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_leaf: usize,
    /// `None` = ceil(sqrt(n_features)).
    pub max_features: Option<usize>,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self { n_trees: 100, max_depth: None, min_samples_leaf: 1, max_features: None, bootstrap: true, seed: 42 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self { config, trees: Vec::new() }
    }

    pub fn with_trees(n_trees: usize, seed: u64) -> Self {
        Self::new(ForestConfig { n_trees, seed, ..Default::default() })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        super::check_training_set(x, y)?;
        let n = x.nrows();
        let max_features = self
            .config
            .max_features
            .unwrap_or_else(|| (x.ncols() as f64).sqrt().ceil() as usize)
            .max(1);

        self.trees = (0..self.config.n_trees.max(1))
            .map(|i| {
                let seed = self.config.seed.wrapping_add(i as u64);
                let rows: Vec<usize> = if self.config.bootstrap {
                    let mut rng = ChaCha8Rng::seed_from_u64(seed);
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                let mut tree = DecisionTree::new(TreeConfig {
                    max_depth: self.config.max_depth,
                    min_samples_split: 2,
                    min_samples_leaf: self.config.min_samples_leaf,
                    max_features: Some(max_features),
                    seed: seed.wrapping_mul(31).wrapping_add(7),
                });
                tree.fit_rows(x, y, rows);
                tree
            })
            .collect();

        logd!("fitted forest of {} trees (max_features={max_features})", self.trees.len());
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::NotFitted);
        }
        let mut sum = Array1::<f64>::zeros(x.nrows());
        for tree in &self.trees {
            sum = sum + tree.predict_proba(x)?;
        }
        Ok(sum / self.trees.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn deterministic_and_accurate() {
        let x = array![
            [350.0, 1.0], [352.0, 1.0], [349.0, 0.0], [351.0, 0.0],
            [348.0, 1.0], [353.0, 0.0], [347.0, 1.0], [354.0, 0.0]
        ];
        let y = array![0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 1.0];
        let mut a = RandomForest::with_trees(25, 32);
        let mut b = RandomForest::with_trees(25, 32);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        let pa = a.predict_proba(&x).unwrap();
        assert_eq!(pa, b.predict_proba(&x).unwrap());
        assert_eq!(a.n_trees(), 25);
        assert!(super::super::metrics::accuracy(&y, &a.predict(&x).unwrap()) >= 0.75);
    }

    #[test]
    fn unfitted() {
        let f = RandomForest::with_trees(3, 1);
        assert_eq!(f.predict_proba(&array![[1.0]]), Err(ModelError::NotFitted));
    }
}
