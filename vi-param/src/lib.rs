//! Priors and variational parameter stores for the conjugate Gaussian models.
//!
//! A prior fixes the model (K, D and hyperparameters); a parameter store
//! holds the variational family for one run and exposes the closed-form
//! block formulas that depend only on its own state.

/// shared trait for parameter stores
pub mod traits;

/// Gaussian mixture with a shared known precision
pub mod mixture;

/// univariate Normal with a Normal-Gamma prior
pub mod normal_gamma;

pub use mixture::{GmmParams, GmmPrior};
pub use normal_gamma::{UgmParams, UgmPrior};
pub use traits::VariationalParam;
