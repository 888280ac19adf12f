//! Port traits: the seams between the pipeline and its collaborators.

pub mod alert_port;
pub mod classifier_port;
pub mod config_port;
pub mod data_port;
pub mod sheet_port;
