//! Evidence lower bound for the shared-precision Gaussian mixture.
//!
//! With `q(π) = Dir(λ_π)`, `q(μ_k) = N(m_k, (λ_β,k Δ)⁻¹)` and
//! `q(z_n) = Cat(φ_n)`:
//!
//! ```text
//! ELBO = ln B(λ_π) - ln B(α) + Σ_k (α_k + N_k - λ_π,k) E[ln π_k]
//!      + N/2 ln|Δ| - N D/2 ln 2π
//!      + Σ_k [ D/2 ln(β_o/λ_β,k) + D/2 - D β_o/(2 λ_β,k) - β_o/2 (m_k - m_o)' Δ (m_k - m_o) ]
//!      + Σ_k Σ_n φ_nk [ -1/2 (x_n - m_k)' Δ (x_n - m_k) - D/(2 λ_β,k) - ln φ_nk ]
//! ```
//!
//! The bound is only monitored; it never feeds back into the updates.

use crate::common::*;
use nalgebra::RowDVector;
use vi_param::{GmmParams, GmmPrior};
use vi_util::{dirichlet_expectation, log_beta_function, quad_form, LN_2PI};

/// Full ELBO at the current parameters
///
/// * `xx` - N x D data
/// * `params` - variational parameters
/// * `prior` - model specification
/// * `log_det_delta` - `ln|Δ|`, computed once per run
pub fn gmm_elbo(xx: &Mat, params: &GmmParams, prior: &GmmPrior, log_det_delta: f64) -> f64 {
    dirichlet_term(params, prior)
        + constant_term(xx.nrows(), xx.ncols(), log_det_delta)
        + (0..params.num_clusters())
            .map(|k| cluster_mean_term(params, prior, k) + cluster_data_term(xx, params, prior, k))
            .sum::<f64>()
}

/// `ln B(λ_π) - ln B(α) + Σ_k (α_k + N_k - λ_π,k) E[ln π_k]`
pub fn dirichlet_term(params: &GmmParams, prior: &GmmPrior) -> f64 {
    let elog_pi = dirichlet_expectation(&params.lambda_pi);
    let nk = params.cluster_sizes();
    let cross: f64 = (0..elog_pi.len())
        .map(|k| (prior.alpha_o[k] + nk[k] - params.lambda_pi[k]) * elog_pi[k])
        .sum();
    log_beta_function(&params.lambda_pi) - log_beta_function(&prior.alpha_o) + cross
}

/// `N/2 ln|Δ| - N D/2 ln 2π`
pub fn constant_term(nn: usize, dd: usize, log_det_delta: f64) -> f64 {
    let nn = nn as f64;
    0.5 * nn * log_det_delta - 0.5 * nn * dd as f64 * LN_2PI
}

/// Negative KL of `q(μ_k)` from its prior
fn cluster_mean_term(params: &GmmParams, prior: &GmmPrior, k: usize) -> f64 {
    let dd = params.lambda_m.ncols() as f64;
    let lb = params.lambda_beta[k];
    let diff: RowDVector<f64> = params.lambda_m.row(k) - prior.m_o.transpose();

    0.5 * dd * (prior.beta_o / lb).ln() + 0.5 * dd
        - 0.5 * dd * prior.beta_o / lb
        - 0.5 * prior.beta_o * quad_form(&prior.delta_o, &diff)
}

/// Expected log-likelihood of the points in cluster `k` plus the entropy
/// of their responsibilities
fn cluster_data_term(xx: &Mat, params: &GmmParams, prior: &GmmPrior, k: usize) -> f64 {
    let dd = xx.ncols() as f64;
    let trace_term = 0.5 * dd / params.lambda_beta[k];

    let mut tot = 0.0;
    for n in 0..xx.nrows() {
        let phi = params.lambda_phi[(n, k)];
        if phi <= 0.0 {
            continue;
        }
        let diff: RowDVector<f64> = xx.row(n) - params.lambda_m.row(k);
        tot += phi * (-0.5 * quad_form(&prior.delta_o, &diff) - trace_term - phi.ln());
    }
    tot
}
