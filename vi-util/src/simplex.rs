use crate::special_fn::{digamma, ln_gamma};
use nalgebra::DVector;
use rand::Rng;
use rand_distr::{Distribution, Gamma};

/// Expected log of a Dirichlet-distributed vector
///
/// ```text
/// E[ln π_i] = ψ(α_i) - ψ(Σ_j α_j)
/// ```
///
/// * `alpha` - concentration parameters (all > 0)
pub fn dirichlet_expectation(alpha: &DVector<f64>) -> DVector<f64> {
    let psi_sum = digamma(alpha.sum());
    alpha.map(|a| digamma(a) - psi_sum)
}

/// Log of the multivariate Beta function
///
/// ```text
/// ln B(α) = Σ_i ln Γ(α_i) - ln Γ(Σ_i α_i)
/// ```
pub fn log_beta_function(alpha: &DVector<f64>) -> f64 {
    alpha.iter().map(|&a| ln_gamma(a)).sum::<f64>() - ln_gamma(alpha.sum())
}

/// Normalized exponential, shifted by the maximum before `exp`
pub fn softmax(v: &DVector<f64>) -> DVector<f64> {
    let mut ret = v.clone();
    softmax_inplace(ret.as_mut_slice());
    ret
}

/// In-place version of [`softmax`] on a raw slice of log-weights
pub fn softmax_inplace(v: &mut [f64]) {
    let vmax = v.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !vmax.is_finite() {
        // all -inf (or a +inf/NaN): let the caller's finiteness check see it
        v.iter_mut().for_each(|x| *x = (*x - vmax).exp());
        return;
    }
    let mut tot = 0.0;
    for x in v.iter_mut() {
        *x = (*x - vmax).exp();
        tot += *x;
    }
    v.iter_mut().for_each(|x| *x /= tot);
}

/// Draw one point on the probability simplex from `Dirichlet(alpha)` by
/// normalizing independent `Gamma(α_i, 1)` draws
///
/// * `alpha` - concentration parameters (all > 0)
/// * `rng` - random number generator
pub fn sample_dirichlet(alpha: &[f64], rng: &mut impl Rng) -> anyhow::Result<Vec<f64>> {
    let mut draws = Vec::with_capacity(alpha.len());
    for &a in alpha {
        let gam = Gamma::new(a, 1.0)
            .map_err(|e| anyhow::anyhow!("invalid Dirichlet concentration {}: {}", a, e))?;
        draws.push(gam.sample(rng));
    }

    let tot: f64 = draws.iter().sum();
    if !(tot > 0.0 && tot.is_finite()) {
        anyhow::bail!("Dirichlet draw collapsed (sum of Gamma draws = {})", tot);
    }
    draws.iter_mut().for_each(|x| *x /= tot);
    Ok(draws)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn softmax_handles_large_logits() {
        let v = DVector::from_vec(vec![1000.0, 1000.0, -1000.0]);
        let p = softmax(&v);
        assert!((p[0] - 0.5).abs() < 1e-12);
        assert!((p[1] - 0.5).abs() < 1e-12);
        assert!(p[2] >= 0.0 && p[2] < 1e-300);
    }

    #[test]
    fn dirichlet_draws_lie_on_simplex() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let p = sample_dirichlet(&[1.0, 2.0, 0.5], &mut rng).unwrap();
            assert_eq!(p.len(), 3);
            assert!(p.iter().all(|&x| (0.0..=1.0).contains(&x)));
            assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        }
    }
}
