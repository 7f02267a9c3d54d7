//! Variational inference for two conjugate Gaussian models.
//!
//! - **CAVI**: coordinate ascent with closed-form block updates for a
//!   K-component Gaussian mixture with a shared known precision
//! - **GAVI**: Adam on an analytic ELBO gradient for a univariate Normal
//!   with a Normal-Gamma prior
//!
//! Both loops record one ELBO value per iteration and stop either when the
//! bound stops moving or at `max_iter`.
//!
//! ```ignore
//! use conjugate_vi::{fit_gmm_cavi, CaviOptions, Dataset};
//! use vi_param::GmmPrior;
//!
//! let data = Dataset::new(xx)?;
//! let prior = GmmPrior::new(2, data.ncols());
//! let fit = fit_gmm_cavi(&data, &prior, &CaviOptions::default())?;
//! println!("{:?} after {} iterations", fit.status, fit.num_iter);
//! ```

#![deny(missing_docs)]

/// shared aliases, log macros and defaults
pub mod common;

/// distinguished error conditions
pub mod error;

/// observation matrix and sufficient statistics
pub mod dataset;

/// ELBO-based stopping rules
pub mod monitor;

/// per-iteration callbacks
pub mod observer;

/// evidence lower bound of the mixture model
pub mod gmm_elbo;

/// coordinate ascent for the mixture model
pub mod gmm_cavi;

/// evidence lower bound and its gradient for the univariate model
pub mod ugm_elbo;

/// Adam on a flat parameter vector
pub mod adam;

/// gradient ascent for the univariate model
pub mod ugm_gavi;

/// seeded synthetic datasets
pub mod simulate;

pub use dataset::{Dataset, UnivariateStats};
pub use error::VariationalError;
pub use gmm_cavi::{fit_gmm_cavi, fit_gmm_cavi_observed, CaviFit, CaviOptions};
pub use monitor::{ConvergenceMonitor, FitStatus, StopRule};
pub use observer::IterationObserver;
pub use ugm_gavi::{fit_ugm_gavi, fit_ugm_gavi_observed, GaviFit, GaviOptions};
