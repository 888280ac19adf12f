//! Classifier trainer port trait.

use crate::domain::error::AlgoError;
use crate::domain::features::FeatureTable;

pub trait ClassifierPort {
    /// Train on the chronological head of `table`, return accuracy on the tail.
    fn train_and_score(&self, table: &FeatureTable) -> Result<f64, AlgoError>;
}
