// src/model/tree.rs
//! Binary CART tree (Gini impurity). Leaves hold P(positive).

use ndarray::{Array1, Array2, ArrayView1};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::Classifier;
use crate::error::ModelError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// `None` grows until leaves are pure.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features tried per split (`None` = all).
    pub max_features: Option<usize>,
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self { max_depth: None, min_samples_split: 2, min_samples_leaf: 1, max_features: None, seed: 42 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Node {
    Leaf { p: f64, n: usize },
    Split { feature: usize, threshold: f64, left: Box<Node>, right: Box<Node> },
}

impl Node {
    fn proba(&self, x: ArrayView1<f64>) -> f64 {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { p, .. } => return *p,
                Node::Split { feature, threshold, left, right } => {
                    node = if x[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    config: TreeConfig,
    root: Option<Node>,
    n_features: usize,
}

// Weighted Gini: n * 2p(1-p)
fn weighted_gini(pos: f64, n: f64) -> f64 {
    if n == 0.0 { return 0.0; }
    let p = pos / n;
    n * 2.0 * p * (1.0 - p)
}

struct Builder<'a> {
    x: &'a Array2<f64>,
    y: &'a Array1<f64>,
    config: &'a TreeConfig,
    rng: ChaCha8Rng,
}

impl Builder<'_> {
    fn build(&mut self, idx: Vec<usize>, depth: usize) -> Node {
        let n = idx.len();
        let pos: f64 = idx.iter().map(|&i| self.y[i]).sum();
        let leaf = Node::Leaf { p: if n == 0 { 0.0 } else { pos / n as f64 }, n };

        let depth_reached = self.config.max_depth.is_some_and(|d| depth >= d);
        if depth_reached || n < self.config.min_samples_split || pos == 0.0 || pos == n as f64 {
            return leaf;
        }

        match self.best_split(&idx, pos) {
            Some((feature, threshold)) => {
                let (l, r): (Vec<usize>, Vec<usize>) = idx.into_iter().partition(|&i| self.x[[i, feature]] <= threshold);
                let left = self.build(l, depth + 1);
                let right = self.build(r, depth + 1);
                Node::Split { feature, threshold, left: Box::new(left), right: Box::new(right) }
            }
            None => leaf,
        }
    }

    fn best_split(&mut self, idx: &[usize], pos: f64) -> Option<(usize, f64)> {
        let n = idx.len();
        let d = self.x.ncols();
        let mut features: Vec<usize> = (0..d).collect();
        features.shuffle(&mut self.rng);
        features.truncate(self.config.max_features.unwrap_or(d).clamp(1, d.max(1)));

        let min_leaf = self.config.min_samples_leaf.max(1);
        let mut best_impurity = weighted_gini(pos, n as f64) - 1e-12;
        let mut best = None;
        let mut sorted = idx.to_vec();

        for f in features {
            sorted.sort_by(|&a, &b| self.x[[a, f]].total_cmp(&self.x[[b, f]]));
            let mut left_pos = 0.0;
            for k in 0..n - 1 {
                left_pos += self.y[sorted[k]];
                let (here, next) = (self.x[[sorted[k], f]], self.x[[sorted[k + 1], f]]);
                let (nl, nr) = (k + 1, n - k - 1);
                if here == next || nl < min_leaf || nr < min_leaf {
                    continue;
                }
                let impurity = weighted_gini(left_pos, nl as f64) + weighted_gini(pos - left_pos, nr as f64);
                if impurity < best_impurity {
                    best_impurity = impurity;
                    best = Some((f, (here + next) / 2.0));
                }
            }
        }
        best
    }
}

impl DecisionTree {
    pub fn new(config: TreeConfig) -> Self {
        Self { config, root: None, n_features: 0 }
    }

    /// Fit on a subset of rows (bootstrap samples may repeat indices).
    pub fn fit_rows(&mut self, x: &Array2<f64>, y: &Array1<f64>, rows: Vec<usize>) {
        let mut b = Builder { x, y, config: &self.config, rng: ChaCha8Rng::seed_from_u64(self.config.seed) };
        let root = b.build(rows, 0);
        self.n_features = x.ncols();
        self.root = Some(root);
    }

    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, Node::depth)
    }
}

impl Classifier for DecisionTree {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        super::check_training_set(x, y)?;
        self.fit_rows(x, y, (0..x.nrows()).collect());
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        let root = self.root.as_ref().ok_or(ModelError::NotFitted)?;
        if x.ncols() != self.n_features {
            return Err(ModelError::DimensionMismatch { expected: self.n_features, got: x.ncols() });
        }
        Ok(x.rows().into_iter().map(|row| root.proba(row)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn learns_threshold() {
        let x = array![[1.0, 5.0], [2.0, 5.0], [3.0, 5.0], [10.0, 5.0], [11.0, 5.0]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0];
        let mut t = DecisionTree::new(TreeConfig::default());
        t.fit(&x, &y).unwrap();
        assert_eq!(t.predict(&x).unwrap(), y);
        assert_eq!(t.depth(), 2);
        assert_eq!(t.predict_proba(&array![[6.0, 0.0]]).unwrap()[0], 0.0);
        assert_eq!(t.predict_proba(&array![[7.0, 0.0]]).unwrap()[0], 1.0);
    }
}
