//! Random forest of bootstrapped decision trees, built in parallel.

use super::decision_tree::{DecisionTree, TreeConfig};
use crate::domain::features::FeatureTable;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features per split (ceil(sqrt(n_features)) if None)
    pub max_features: Option<usize>,
    /// Bootstrap sampling
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
        }
    }

    pub fn fit(&mut self, table: &FeatureTable) {
        let n = table.n_samples();
        let n_features = table.n_features();
        let max_features = self
            .config
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().ceil() as usize);

        self.trees = (0..self.config.n_trees)
            .into_par_iter()
            .map(|i| {
                let seed = self.config.seed.wrapping_add(i as u64);
                let indices: Vec<usize> = if self.config.bootstrap {
                    bootstrap_indices(n, seed)
                } else {
                    (0..n).collect()
                };
                let mut tree = DecisionTree::new(TreeConfig {
                    max_depth: self.config.max_depth,
                    min_samples_split: self.config.min_samples_split,
                    min_samples_leaf: self.config.min_samples_leaf,
                    max_features: Some(max_features),
                    seed,
                });
                tree.fit(table, &indices);
                tree
            })
            .collect();
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Mean positive-class probability across trees.
    pub fn predict_proba_one(&self, features: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.5;
        }
        self.trees
            .iter()
            .map(|t| t.predict_proba_one(features))
            .sum::<f64>()
            / self.trees.len() as f64
    }

    pub fn predict_one(&self, features: &[f64]) -> u8 {
        u8::from(self.predict_proba_one(features) > 0.5)
    }

    /// Fraction of rows whose predicted class matches the label.
    pub fn accuracy(&self, table: &FeatureTable) -> f64 {
        if table.is_empty() {
            return 0.0;
        }
        let correct = table
            .rows
            .iter()
            .zip(&table.labels)
            .filter(|(row, label)| self.predict_one(row) == **label)
            .count();
        correct as f64 / table.n_samples() as f64
    }
}

fn bootstrap_indices(n: usize, seed: u64) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(0..n)).collect()
}
