//! Alert channel port trait.

use crate::domain::error::AlgoError;

pub trait AlertPort {
    fn send(&self, message: &str) -> Result<(), AlgoError>;
}
