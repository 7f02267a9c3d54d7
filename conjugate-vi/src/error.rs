use thiserror::Error;

/// Conditions a caller may want to tell apart.
///
/// Library functions return `anyhow::Result`; these variants are recovered
/// with `err.downcast_ref::<VariationalError>()`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VariationalError {
    /// Bad dimensions, empty data or out-of-range hyperparameters/options
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The observation precision failed the symmetry or Cholesky check
    #[error("observation precision is not symmetric positive-definite")]
    NotPositiveDefinite,

    /// A NaN/Inf or out-of-support value appeared during the iterations
    #[error("numerical instability at iteration {iteration} in {quantity}")]
    NumericalInstability {
        /// zero-based iteration at which the value was produced
        iteration: usize,
        /// which quantity went bad
        quantity: String,
    },
}

impl VariationalError {
    /// `NumericalInstability` wrapped in `anyhow`
    pub fn instability(iteration: usize, quantity: &str) -> anyhow::Error {
        VariationalError::NumericalInstability {
            iteration,
            quantity: quantity.to_string(),
        }
        .into()
    }
}
