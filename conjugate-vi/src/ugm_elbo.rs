//! ELBO of the univariate Normal model under `q(μ) = N(m, 1/β)`,
//! `q(τ) = Gamma(a, b)`, and its gradient with respect to the raw
//! (pre-softplus) parameters.
//!
//! With `S₁ = Σx`, `S₂ = Σx²`, `Q = S₂ - 2 m S₁ + N (m² + 1/β)`:
//!
//! ```text
//! ELBO = ½ ln(β_o/β) + ½ - ½ β_o [(m - m_o)² + 1/β]
//!      + (a_o - a) ψ(a) + ln Γ(a) - ln Γ(a_o) + a_o ln b_o - a_o ln b + a (b - b_o)/b
//!      + N/2 (ψ(a) - ln b) - N/2 ln 2π - ½ (a/b) Q
//! ```

use crate::dataset::UnivariateStats;
use vi_param::{UgmParams, UgmPrior};
use vi_util::{digamma, ln_gamma, sigmoid, trigamma, LN_2PI};

/// Expected squared residual `E[Σ (x_n - μ)²]` under `q(μ)`
fn expected_sq_residual(stats: &UnivariateStats, m: f64, beta: f64) -> f64 {
    stats.sum_sq - 2.0 * m * stats.sum + stats.n * (m * m + 1.0 / beta)
}

/// ELBO at the current parameters
pub fn ugm_elbo(stats: &UnivariateStats, params: &UgmParams, prior: &UgmPrior) -> f64 {
    let m = params.lambda_m();
    let beta = params.lambda_beta();
    let a = params.lambda_a();
    let b = params.lambda_b();
    let nn = stats.n;

    let qq = expected_sq_residual(stats, m, beta);
    let psi_a = digamma(a);
    let dm = m - prior.m_o;

    let mean_kl = 0.5 * (prior.beta_o / beta).ln() + 0.5 - 0.5 * prior.beta_o * (dm * dm + 1.0 / beta);

    let precision_kl = (prior.a_o - a) * psi_a + ln_gamma(a) - ln_gamma(prior.a_o)
        + prior.a_o * prior.b_o.ln()
        - prior.a_o * b.ln()
        + a * (b - prior.b_o) / b;

    let llik = 0.5 * nn * (psi_a - b.ln()) - 0.5 * nn * LN_2PI - 0.5 * (a / b) * qq;

    mean_kl + precision_kl + llik
}

/// Gradient of [`ugm_elbo`] with respect to the constrained
/// `(m, β, a, b)`
pub fn ugm_elbo_grad_constrained(stats: &UnivariateStats, params: &UgmParams, prior: &UgmPrior) -> [f64; 4] {
    let m = params.lambda_m();
    let beta = params.lambda_beta();
    let a = params.lambda_a();
    let b = params.lambda_b();
    let nn = stats.n;
    let qq = expected_sq_residual(stats, m, beta);
    let e_tau = a / b;

    let d_m = -prior.beta_o * (m - prior.m_o) + e_tau * (stats.sum - nn * m);
    let d_beta = -0.5 / beta + 0.5 * (prior.beta_o + nn * e_tau) / (beta * beta);
    let d_a = (prior.a_o - a + 0.5 * nn) * trigamma(a) + 1.0 - prior.b_o / b - 0.5 * qq / b;
    let d_b = -prior.a_o / b + a * prior.b_o / (b * b) - 0.5 * nn / b + 0.5 * a * qq / (b * b);

    [d_m, d_beta, d_a, d_b]
}

/// ELBO and its gradient with respect to the raw parameters
pub fn ugm_elbo_and_grad(stats: &UnivariateStats, params: &UgmParams, prior: &UgmPrior) -> (f64, [f64; 4]) {
    let elbo = ugm_elbo(stats, params, prior);
    let mut grad = ugm_elbo_grad_constrained(stats, params, prior);
    let raw = params.raw();
    for i in [UgmParams::BETA, UgmParams::A, UgmParams::B] {
        grad[i] *= sigmoid(raw[i]);
    }
    (elbo, grad)
}
