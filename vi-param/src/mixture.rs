use crate::traits::VariationalParam;
use nalgebra::{DMatrix, DVector};
use rand::Rng;
use vi_util::sample_dirichlet;

/// Default symmetric Dirichlet concentration
pub const DEFAULT_ALPHA: f64 = 1.0;
/// Default scale of the prior precision on cluster means
pub const DEFAULT_BETA: f64 = 0.01;

/// Model specification for a K-component Gaussian mixture in D dimensions
/// with a shared, known precision `delta_o`
///
/// ```text
/// π ~ Dir(alpha_o)
/// μ_k ~ N(m_o, (beta_o delta_o)⁻¹)
/// z_n ~ Cat(π)
/// x_n | z_n = k ~ N(μ_k, delta_o⁻¹)
/// ```
#[derive(Debug, Clone)]
pub struct GmmPrior {
    /// Dirichlet concentration, length K
    pub alpha_o: DVector<f64>,
    /// prior mean of the cluster centres, length D
    pub m_o: DVector<f64>,
    /// scale on the prior precision of the cluster centres
    pub beta_o: f64,
    /// D x D observation precision
    pub delta_o: DMatrix<f64>,
}

impl GmmPrior {
    /// `alpha_o = 1`, `m_o = 0`, `beta_o = 0.01`, `delta_o = I`
    pub fn new(num_clusters: usize, dim: usize) -> Self {
        Self {
            alpha_o: DVector::from_element(num_clusters, DEFAULT_ALPHA),
            m_o: DVector::zeros(dim),
            beta_o: DEFAULT_BETA,
            delta_o: DMatrix::identity(dim, dim),
        }
    }

    pub fn num_clusters(&self) -> usize {
        self.alpha_o.len()
    }

    pub fn dim(&self) -> usize {
        self.m_o.len()
    }
}

/// Mean-field family for [`GmmPrior`]
///
/// ```text
/// q(π) = Dir(lambda_pi)
/// q(μ_k) = N(lambda_m[k,:], (lambda_beta[k] delta_o)⁻¹)
/// q(z_n) = Cat(lambda_phi[n,:])
/// ```
#[derive(Debug, Clone)]
pub struct GmmParams {
    /// N x K responsibilities, rows on the simplex
    pub lambda_phi: DMatrix<f64>,
    /// K Dirichlet concentrations
    pub lambda_pi: DVector<f64>,
    /// K precision scales of the cluster centres
    pub lambda_beta: DVector<f64>,
    /// K x D cluster centres
    pub lambda_m: DMatrix<f64>,
}

impl GmmParams {
    /// Draw each responsibility row from `Dir(alpha_o)`, then derive the
    /// remaining blocks from those responsibilities.
    ///
    /// * `xx` - N x D data
    /// * `prior` - model specification
    /// * `rng` - random number generator
    pub fn init(xx: &DMatrix<f64>, prior: &GmmPrior, rng: &mut impl Rng) -> anyhow::Result<Self> {
        let nn = xx.nrows();
        let kk = prior.num_clusters();
        let alpha = prior.alpha_o.as_slice();

        let mut phi = DMatrix::<f64>::zeros(nn, kk);
        for i in 0..nn {
            let row = sample_dirichlet(alpha, rng)?;
            for (k, p) in row.into_iter().enumerate() {
                phi[(i, k)] = p;
            }
        }

        Ok(Self::from_responsibilities(xx, phi, prior))
    }

    /// Fill in `lambda_pi`, `lambda_beta` and `lambda_m` given responsibilities
    pub fn from_responsibilities(xx: &DMatrix<f64>, phi: DMatrix<f64>, prior: &GmmPrior) -> Self {
        let kk = phi.ncols();
        let dd = xx.ncols();
        let mut ret = Self {
            lambda_phi: phi,
            lambda_pi: DVector::zeros(kk),
            lambda_beta: DVector::zeros(kk),
            lambda_m: DMatrix::zeros(kk, dd),
        };
        ret.update_pi(prior);
        ret.update_beta(prior);
        ret.update_m(xx, prior);
        ret
    }

    pub fn num_clusters(&self) -> usize {
        self.lambda_phi.ncols()
    }

    pub fn num_obs(&self) -> usize {
        self.lambda_phi.nrows()
    }

    /// Expected cluster sizes `N_k = Σ_n φ_nk`
    pub fn cluster_sizes(&self) -> DVector<f64> {
        self.lambda_phi.row_sum().transpose()
    }

    /// `lambda_pi ← alpha_o + N_k`
    pub fn update_pi(&mut self, prior: &GmmPrior) {
        self.lambda_pi = &prior.alpha_o + self.cluster_sizes();
    }

    /// `lambda_beta ← beta_o + N_k`
    pub fn update_beta(&mut self, prior: &GmmPrior) {
        self.lambda_beta = self.cluster_sizes().add_scalar(prior.beta_o);
    }

    /// `lambda_m[k,:] ← (beta_o m_o + Σ_n φ_nk x_n) / lambda_beta[k]`
    pub fn update_m(&mut self, xx: &DMatrix<f64>, prior: &GmmPrior) {
        let mut mm = self.lambda_phi.tr_mul(xx);
        for k in 0..mm.nrows() {
            let lb = self.lambda_beta[k];
            for j in 0..mm.ncols() {
                mm[(k, j)] = (mm[(k, j)] + prior.beta_o * prior.m_o[j]) / lb;
            }
        }
        self.lambda_m = mm;
    }

    /// Hard assignment of each observation to its most responsible cluster
    pub fn argmax_assignments(&self) -> Vec<usize> {
        self.lambda_phi
            .row_iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .fold((0, f64::NEG_INFINITY), |(bk, bp), (k, &p)| {
                        if p > bp {
                            (k, p)
                        } else {
                            (bk, bp)
                        }
                    })
                    .0
            })
            .collect()
    }
}

impl VariationalParam for GmmParams {
    fn first_invalid(&self) -> Option<&'static str> {
        if !self.lambda_phi.iter().all(|&p| p.is_finite() && p >= 0.0) {
            return Some("lambda_phi");
        }
        if !self.lambda_pi.iter().all(|&a| a.is_finite() && a > 0.0) {
            return Some("lambda_pi");
        }
        if !self.lambda_beta.iter().all(|&b| b.is_finite() && b > 0.0) {
            return Some("lambda_beta");
        }
        if !self.lambda_m.iter().all(|m| m.is_finite()) {
            return Some("lambda_m");
        }
        None
    }
}
