//! Next-day direction classifier.
//!
//! Trains a random forest on the chronologically first part of a feature
//! table and reports accuracy on the held-out tail.

pub mod decision_tree;
pub mod random_forest;

use crate::domain::error::AlgoError;
use crate::domain::features::FeatureTable;
use crate::ports::classifier_port::ClassifierPort;
use random_forest::{ForestConfig, RandomForest};

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    pub forest: ForestConfig,
    /// Share of rows, from the end, held out for scoring.
    pub test_fraction: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            forest: ForestConfig::default(),
            test_fraction: 0.2,
        }
    }
}

pub struct RandomForestClassifier {
    config: ClassifierConfig,
}

impl RandomForestClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }
}

impl ClassifierPort for RandomForestClassifier {
    fn train_and_score(&self, table: &FeatureTable) -> Result<f64, AlgoError> {
        if table.is_empty() {
            return Err(AlgoError::InsufficientTrainingData {
                reason: "no rows left after feature engineering".into(),
            });
        }
        let (train, test) = table
            .split_chronological(self.config.test_fraction)
            .ok_or_else(|| AlgoError::InsufficientTrainingData {
                reason: format!("{} rows cannot form a train/test split", table.n_samples()),
            })?;

        let mut forest = RandomForest::new(self.config.forest.clone());
        forest.fit(&train);
        let accuracy = forest.accuracy(&test);
        log::debug!(
            "trained {} trees on {} rows, scored {} rows",
            forest.n_trees(),
            train.n_samples(),
            test.n_samples()
        );
        Ok(accuracy)
    }
}
