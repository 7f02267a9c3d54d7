//! Gradient ascent variational inference for the univariate Normal model.
//!
//! All four raw parameters move together by one Adam step per iteration on
//! the negative ELBO. The ELBO recorded for an iteration is the one at the
//! parameters *before* that step.

use crate::adam::Adam;
use crate::common::*;
use crate::dataset::{Dataset, UnivariateStats};
use crate::monitor::{ConvergenceMonitor, FitStatus, StopRule};
use crate::observer::{IterationObserver, NoopObserver};
use crate::ugm_elbo::ugm_elbo_and_grad;
use indicatif::{ProgressBar, ProgressDrawTarget};
use rand::rngs::StdRng;
use rand::SeedableRng;
use vi_param::{UgmParams, UgmPrior, VariationalParam};

/// Options for the gradient-based univariate fit.
#[derive(Debug, Clone)]
pub struct GaviOptions {
    /// Adam step size. Default: 100
    pub learning_rate: f64,
    /// Maximum number of Adam steps. Default: 1000
    pub max_iter: usize,
    /// Convergence tolerance on `|ΔELBO|`. Default: 1e-6
    pub threshold: f64,
    /// Standard deviation of the initial mean draw around `m_o`. Default: 3000
    pub init_mean_sd: f64,
    /// Random seed for the starting point. Default: 42
    pub seed: u64,
    /// Log every iteration at `info` level and hide the progress bar. Default: false
    pub verbose: bool,
    /// Draw a progress bar over steps. Default: false
    pub show_progress: bool,
}

impl Default for GaviOptions {
    fn default() -> Self {
        Self {
            learning_rate: DEFAULT_LEARNING_RATE,
            max_iter: DEFAULT_GAVI_MAX_ITER,
            threshold: DEFAULT_THRESHOLD,
            init_mean_sd: DEFAULT_INIT_MEAN_SD,
            seed: DEFAULT_SEED,
            verbose: false,
            show_progress: false,
        }
    }
}

/// Result of a gradient-based univariate fit.
#[derive(Debug, Clone)]
pub struct GaviFit {
    /// final variational parameters
    pub params: UgmParams,
    /// one ELBO value per completed step
    pub elbo_trace: Vec<f64>,
    /// number of completed steps
    pub num_iter: usize,
    /// why the loop stopped
    pub status: FitStatus,
}

impl GaviFit {
    /// last recorded ELBO
    pub fn final_elbo(&self) -> Option<f64> {
        self.elbo_trace.last().copied()
    }
}

fn positive(x: f64) -> bool {
    x.is_finite() && x > 0.0
}

/// Check the data, prior and options before any iteration.
/// Returns the sufficient statistics the loop works on.
pub fn validate_ugm(data: &Dataset, prior: &UgmPrior, options: &GaviOptions) -> anyhow::Result<UnivariateStats> {
    let stats = data.univariate_stats()?;

    if !prior.m_o.is_finite() {
        return Err(invalid_config("prior mean must be finite"));
    }
    for (name, value) in [("beta_o", prior.beta_o), ("a_o", prior.a_o), ("b_o", prior.b_o)] {
        if !positive(value) {
            return Err(invalid_config(format!("{} = {} must be positive", name, value)));
        }
    }
    if !positive(options.learning_rate) {
        return Err(invalid_config(format!(
            "learning rate = {} must be positive",
            options.learning_rate
        )));
    }
    if options.max_iter == 0 {
        return Err(invalid_config("max_iter must be positive"));
    }
    if !positive(options.threshold) {
        return Err(invalid_config(format!(
            "threshold = {} must be positive",
            options.threshold
        )));
    }
    if !positive(options.init_mean_sd) {
        return Err(invalid_config(format!(
            "init_mean_sd = {} must be positive",
            options.init_mean_sd
        )));
    }
    Ok(stats)
}

/// Fit the univariate model by Adam on the analytic ELBO gradient
///
/// * `data` - N x 1 observations
/// * `prior` - Normal-Gamma hyperparameters
/// * `options` - optimizer and iteration control
pub fn fit_ugm_gavi(data: &Dataset, prior: &UgmPrior, options: &GaviOptions) -> anyhow::Result<GaviFit> {
    fit_ugm_gavi_observed(data, prior, options, &mut NoopObserver)
}

/// [`fit_ugm_gavi`] with a callback after every step
pub fn fit_ugm_gavi_observed(
    data: &Dataset,
    prior: &UgmPrior,
    options: &GaviOptions,
    observer: &mut dyn IterationObserver<UgmParams>,
) -> anyhow::Result<GaviFit> {
    let stats = validate_ugm(data, prior, options)?;

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut params = UgmParams::init(prior, options.init_mean_sd, &mut rng)?;

    info!(
        "GAVI: N = {}, lr = {}, max_iter = {}, initial mean = {:.3}",
        data.nrows(),
        options.learning_rate,
        options.max_iter,
        params.lambda_m()
    );

    let pb = ProgressBar::new(options.max_iter as u64);
    if options.verbose || !options.show_progress {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }

    let mut adam = Adam::new(4, options.learning_rate);
    let mut monitor = ConvergenceMonitor::new(StopRule::AbsoluteChange, options.threshold, options.max_iter);

    for iter in 0..options.max_iter {
        let (elbo, grad) = ugm_elbo_and_grad(&stats, &params, prior);
        if !elbo.is_finite() {
            return Err(VariationalError::instability(iter, "elbo"));
        }
        if grad.iter().any(|g| !g.is_finite()) {
            return Err(VariationalError::instability(iter, "gradient"));
        }

        let neg_grad = grad.map(|g| -g);
        adam.step(params.raw_mut(), &neg_grad);

        if let Some(bad) = params.first_invalid() {
            return Err(VariationalError::instability(iter, bad));
        }

        log_iteration(options.verbose, "GAVI", iter, elbo);
        observer.observe(iter, &params, elbo);
        pb.inc(1);

        if monitor.record(elbo) != FitStatus::Running {
            break;
        }
    }
    pb.finish_and_clear();

    let status = monitor.status();
    let num_iter = monitor.num_iter();
    info!(
        "GAVI: {:?} after {} iterations, mean = {:.4}, E[precision] = {:.4}",
        status,
        num_iter,
        params.lambda_m(),
        params.precision_mean()
    );

    Ok(GaviFit {
        params,
        elbo_trace: monitor.into_trace(),
        num_iter,
        status,
    })
}
