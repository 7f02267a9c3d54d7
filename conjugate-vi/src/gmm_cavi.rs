//! Coordinate ascent variational inference for the Gaussian mixture.
//!
//! Each sweep updates the blocks in a fixed order, every block seeing the
//! values just produced by the previous one:
//!
//! 1. `λ_π ← α + N_k`
//! 2. `φ_n ← softmax_k(E[ln π_k] - ½(x_n - m_k)' Δ (x_n - m_k) - D/(2 λ_β,k))`
//! 3. `λ_β ← β_o + N_k`
//! 4. `m_k ← (β_o m_o + Σ_n φ_nk x_n) / λ_β,k`
//!
//! Step 2 runs row-parallel; the rows are committed together before step 3.

use crate::common::*;
use crate::dataset::Dataset;
use crate::gmm_elbo::gmm_elbo;
use crate::monitor::{ConvergenceMonitor, FitStatus, StopRule};
use crate::observer::{IterationObserver, NoopObserver};
use indicatif::{ProgressBar, ProgressDrawTarget};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use vi_param::{GmmParams, GmmPrior, VariationalParam};
use vi_util::{cholesky_log_det, dirichlet_expectation, quad_form, softmax_inplace};

/// Options for the closed-form mixture fit.
#[derive(Debug, Clone)]
pub struct CaviOptions {
    /// Maximum number of sweeps. Default: 300
    pub max_iter: usize,
    /// Convergence tolerance on the ELBO improvement. Default: 1e-6
    pub threshold: f64,
    /// Random seed for the initial responsibilities. Default: 42
    pub seed: u64,
    /// Log every iteration at `info` level and hide the progress bar. Default: false
    pub verbose: bool,
    /// Draw a progress bar over sweeps. Default: false
    pub show_progress: bool,
}

impl Default for CaviOptions {
    fn default() -> Self {
        Self {
            max_iter: DEFAULT_CAVI_MAX_ITER,
            threshold: DEFAULT_THRESHOLD,
            seed: DEFAULT_SEED,
            verbose: false,
            show_progress: false,
        }
    }
}

/// Result of a closed-form mixture fit.
#[derive(Debug, Clone)]
pub struct CaviFit {
    /// final variational parameters
    pub params: GmmParams,
    /// one ELBO value per completed sweep
    pub elbo_trace: Vec<f64>,
    /// number of completed sweeps
    pub num_iter: usize,
    /// why the loop stopped
    pub status: FitStatus,
}

impl CaviFit {
    /// last recorded ELBO
    pub fn final_elbo(&self) -> Option<f64> {
        self.elbo_trace.last().copied()
    }
}

/// Check the data, prior and options before any iteration.
/// Returns `ln|Δ|` for the ELBO.
pub fn validate_gmm(data: &Dataset, prior: &GmmPrior, options: &CaviOptions) -> anyhow::Result<f64> {
    let kk = prior.num_clusters();
    if kk == 0 {
        return Err(invalid_config("number of clusters must be positive"));
    }
    if prior.dim() != data.ncols() {
        return Err(invalid_config(format!(
            "prior mean has dimension {}, data has {} columns",
            prior.dim(),
            data.ncols()
        )));
    }
    if prior.delta_o.nrows() != data.ncols() || prior.delta_o.ncols() != data.ncols() {
        return Err(invalid_config(format!(
            "precision is {} x {}, data has {} columns",
            prior.delta_o.nrows(),
            prior.delta_o.ncols(),
            data.ncols()
        )));
    }
    if !prior.alpha_o.iter().all(|&a| a.is_finite() && a > 0.0) {
        return Err(invalid_config("Dirichlet concentrations must be positive"));
    }
    if !(prior.beta_o.is_finite() && prior.beta_o > 0.0) {
        return Err(invalid_config(format!("beta_o = {} must be positive", prior.beta_o)));
    }
    if !prior.m_o.iter().all(|m| m.is_finite()) {
        return Err(invalid_config("prior mean must be finite"));
    }
    if options.max_iter == 0 {
        return Err(invalid_config("max_iter must be positive"));
    }
    if !(options.threshold.is_finite() && options.threshold > 0.0) {
        return Err(invalid_config(format!(
            "threshold = {} must be positive",
            options.threshold
        )));
    }

    cholesky_log_det(&prior.delta_o).map_err(|_| VariationalError::NotPositiveDefinite.into())
}

/// Step 2: recompute every responsibility row given the other blocks
pub fn update_responsibilities(xx: &Mat, params: &mut GmmParams, prior: &GmmPrior) {
    let kk = params.num_clusters();
    let half_dim = 0.5 * xx.ncols() as f64;
    let elog_pi = dirichlet_expectation(&params.lambda_pi);
    let offset: Vec<f64> = (0..kk)
        .map(|k| elog_pi[k] - half_dim / params.lambda_beta[k])
        .collect();

    let lambda_m = &params.lambda_m;
    let rows: Vec<Vec<f64>> = (0..xx.nrows())
        .into_par_iter()
        .map(|n| {
            let mut logits: Vec<f64> = (0..kk)
                .map(|k| {
                    let diff = xx.row(n) - lambda_m.row(k);
                    offset[k] - 0.5 * quad_form(&prior.delta_o, &diff)
                })
                .collect();
            softmax_inplace(&mut logits);
            logits
        })
        .collect();

    for (n, row) in rows.into_iter().enumerate() {
        for (k, p) in row.into_iter().enumerate() {
            params.lambda_phi[(n, k)] = p;
        }
    }
}

/// One sweep of all four blocks in order
pub fn cavi_sweep(xx: &Mat, params: &mut GmmParams, prior: &GmmPrior) {
    params.update_pi(prior);
    update_responsibilities(xx, params, prior);
    params.update_beta(prior);
    params.update_m(xx, prior);
}

/// Fit the mixture by coordinate ascent
///
/// * `data` - N x D observations
/// * `prior` - K, D and hyperparameters
/// * `options` - iteration control
pub fn fit_gmm_cavi(data: &Dataset, prior: &GmmPrior, options: &CaviOptions) -> anyhow::Result<CaviFit> {
    fit_gmm_cavi_observed(data, prior, options, &mut NoopObserver)
}

/// [`fit_gmm_cavi`] with a callback after every sweep
pub fn fit_gmm_cavi_observed(
    data: &Dataset,
    prior: &GmmPrior,
    options: &CaviOptions,
    observer: &mut dyn IterationObserver<GmmParams>,
) -> anyhow::Result<CaviFit> {
    let log_det_delta = validate_gmm(data, prior, options)?;
    let xx = data.matrix();

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut params = GmmParams::init(xx, prior, &mut rng)?;

    info!(
        "CAVI: N = {}, D = {}, K = {}, max_iter = {}",
        data.nrows(),
        data.ncols(),
        prior.num_clusters(),
        options.max_iter
    );

    let pb = ProgressBar::new(options.max_iter as u64);
    if options.verbose || !options.show_progress {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }

    let mut monitor = ConvergenceMonitor::new(StopRule::StrictIncrease, options.threshold, options.max_iter);

    for iter in 0..options.max_iter {
        cavi_sweep(xx, &mut params, prior);

        if let Some(bad) = params.first_invalid() {
            return Err(VariationalError::instability(iter, bad));
        }

        let elbo = gmm_elbo(xx, &params, prior, log_det_delta);
        if !elbo.is_finite() {
            return Err(VariationalError::instability(iter, "elbo"));
        }

        log_iteration(options.verbose, "CAVI", iter, elbo);
        observer.observe(iter, &params, elbo);
        pb.inc(1);

        if monitor.record(elbo) != FitStatus::Running {
            break;
        }
    }
    pb.finish_and_clear();

    let status = monitor.status();
    let num_iter = monitor.num_iter();
    info!("CAVI: {:?} after {} iterations", status, num_iter);

    Ok(CaviFit {
        params,
        elbo_trace: monitor.into_trace(),
        num_iter,
        status,
    })
}
