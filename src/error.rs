//! Failure values returned by the calculator core

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error(
        "no battery combination covers {target:.1}W using {min_batteries} to {max_batteries} batteries"
    )]
    NoFeasibleSolution {
        target: f64,
        min_batteries: usize,
        max_batteries: usize,
    },

    #[error("ratio {value} is not a product of halves and thirds")]
    UnrepresentableRatio { value: f64 },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, CalcError>;
