//! Binary CART decision tree with Gini impurity.

use crate::domain::features::FeatureTable;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

#[derive(Debug, Clone, PartialEq)]
pub struct TreeConfig {
    /// Maximum depth of tree
    pub max_depth: usize,
    /// Minimum samples required to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf node
    pub min_samples_leaf: usize,
    /// Features considered per split (None = all)
    pub max_features: Option<usize>,
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        /// Fraction of positive labels that reached this leaf.
        positive: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

#[derive(Debug, Clone)]
pub struct DecisionTree {
    config: TreeConfig,
    root: Option<Node>,
}

impl DecisionTree {
    pub fn new(config: TreeConfig) -> Self {
        Self { config, root: None }
    }

    /// Trains on the rows of `table` named by `indices` (repeats allowed).
    pub fn fit(&mut self, table: &FeatureTable, indices: &[usize]) {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        self.root = Some(self.build(table, indices, 0, &mut rng));
    }

    fn build(
        &self,
        table: &FeatureTable,
        indices: &[usize],
        depth: usize,
        rng: &mut StdRng,
    ) -> Node {
        let n = indices.len();
        let positives = count_positive(table, indices);
        let leaf = Node::Leaf {
            positive: if n == 0 { 0.0 } else { positives as f64 / n as f64 },
        };

        if depth >= self.config.max_depth
            || n < self.config.min_samples_split.max(2)
            || positives == 0
            || positives == n
        {
            return leaf;
        }

        let Some(best) = self.find_best_split(table, indices, positives, rng) else {
            return leaf;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| table.rows[i][best.feature] <= best.threshold);

        Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: Box::new(self.build(table, &left, depth + 1, rng)),
            right: Box::new(self.build(table, &right, depth + 1, rng)),
        }
    }

    /// Sorted sweep per candidate feature; thresholds are midpoints between
    /// distinct adjacent values.
    fn find_best_split(
        &self,
        table: &FeatureTable,
        indices: &[usize],
        positives: usize,
        rng: &mut StdRng,
    ) -> Option<BestSplit> {
        let n = indices.len();
        let n_features = table.n_features();
        let max_features = self
            .config
            .max_features
            .unwrap_or(n_features)
            .clamp(1, n_features.max(1));

        let mut candidates: Vec<usize> = (0..n_features).collect();
        candidates.shuffle(rng);
        candidates.truncate(max_features);

        let parent = gini(positives, n);
        let min_leaf = self.config.min_samples_leaf.max(1);
        let mut best: Option<BestSplit> = None;

        for &feature in &candidates {
            let mut sorted: Vec<(f64, u8)> = indices
                .iter()
                .map(|&i| (table.rows[i][feature], table.labels[i]))
                .collect();
            sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_pos = 0usize;
            for k in 1..n {
                left_pos += usize::from(sorted[k - 1].1 == 1);
                if sorted[k - 1].0 == sorted[k].0 || k < min_leaf || n - k < min_leaf {
                    continue;
                }
                let right_pos = positives - left_pos;
                let left = k as f64 * gini(left_pos, k);
                let right = (n - k) as f64 * gini(right_pos, n - k);
                let weighted = (left + right) / n as f64;
                let gain = parent - weighted;
                if gain > best.as_ref().map_or(0.0, |b| b.gain) {
                    best = Some(BestSplit {
                        feature,
                        threshold: (sorted[k - 1].0 + sorted[k].0) / 2.0,
                        gain,
                    });
                }
            }
        }

        best
    }

    /// Probability of the positive class.
    pub fn predict_proba_one(&self, features: &[f64]) -> f64 {
        let mut node = match &self.root {
            Some(node) => node,
            None => return 0.5,
        };
        loop {
            match node {
                Node::Leaf { positive } => return *positive,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features[*feature] <= *threshold { &**left } else { &**right };
                }
            }
        }
    }

    pub fn predict_one(&self, features: &[f64]) -> u8 {
        u8::from(self.predict_proba_one(features) > 0.5)
    }

    pub fn depth(&self) -> usize {
        fn depth_of(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 1,
                Node::Split { left, right, .. } => 1 + depth_of(left).max(depth_of(right)),
            }
        }
        self.root.as_ref().map_or(0, depth_of)
    }
}

fn count_positive(table: &FeatureTable, indices: &[usize]) -> usize {
    indices.iter().filter(|&&i| table.labels[i] == 1).count()
}

fn gini(positives: usize, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let p = positives as f64 / n as f64;
    2.0 * p * (1.0 - p)
}
