pub use crate::error::VariationalError;
pub use log::{debug, info, warn};

/// Default number of closed-form sweeps
pub const DEFAULT_CAVI_MAX_ITER: usize = 300;
/// Default number of Adam steps
pub const DEFAULT_GAVI_MAX_ITER: usize = 1000;
/// Default ELBO change below which a run is considered converged
pub const DEFAULT_THRESHOLD: f64 = 1e-6;
/// Default Adam step size
pub const DEFAULT_LEARNING_RATE: f64 = 100.0;
/// Default spread of the initial mean draw in the univariate model
pub const DEFAULT_INIT_MEAN_SD: f64 = 3000.0;
/// Default random seed
pub const DEFAULT_SEED: u64 = 42;

/// dense `f64` matrix
pub type Mat = nalgebra::DMatrix<f64>;
/// dense `f64` column vector
pub type DVec = nalgebra::DVector<f64>;

/// Shorthand for an `InvalidConfig` error wrapped in `anyhow`
pub fn invalid_config(msg: impl Into<String>) -> anyhow::Error {
    VariationalError::InvalidConfig(msg.into()).into()
}

/// Per-iteration trace line: `info!` in verbose mode, `debug!` otherwise
pub(crate) fn log_iteration(verbose: bool, label: &str, iter: usize, elbo: f64) {
    if verbose {
        info!("[{}] iter {}: ELBO = {:.6}", label, iter + 1, elbo);
    } else {
        debug!("[{}] iter {}: ELBO = {:.6}", label, iter + 1, elbo);
    }
}
