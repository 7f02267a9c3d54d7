use crate::traits::VariationalParam;
use rand::Rng;
use rand_distr::{Distribution, Gamma, Normal};
use vi_util::{inv_softplus, softplus};

/// Normal-Gamma prior on the mean and precision of a univariate Normal
///
/// ```text
/// τ ~ Gamma(a_o, b_o)          (shape, rate)
/// μ | τ ~ N(m_o, (beta_o τ)⁻¹)
/// x_n ~ N(μ, τ⁻¹)
/// ```
///
/// The variational family factorizes as `q(μ) = N(m, 1/β)` and
/// `q(τ) = Gamma(a, b)`.
#[derive(Debug, Clone)]
pub struct UgmPrior {
    /// prior mean. Default: 0
    pub m_o: f64,
    /// prior precision scale on the mean. Default: 1e-4
    pub beta_o: f64,
    /// Gamma shape. Default: 1e-3
    pub a_o: f64,
    /// Gamma rate. Default: 1e-3
    pub b_o: f64,
}

impl Default for UgmPrior {
    fn default() -> Self {
        Self {
            m_o: 0.0,
            beta_o: 1e-4,
            a_o: 1e-3,
            b_o: 1e-3,
        }
    }
}

/// Unconstrained storage for the univariate family.
///
/// `lambda_beta`, `lambda_a` and `lambda_b` are read through `softplus`,
/// so any real vector is a valid point for the gradient optimizer.
#[derive(Debug, Clone, PartialEq)]
pub struct UgmParams {
    raw: [f64; 4],
}

impl UgmParams {
    /// index of the mean in the raw vector
    pub const M: usize = 0;
    /// index of the (pre-softplus) precision scale
    pub const BETA: usize = 1;
    /// index of the (pre-softplus) Gamma shape
    pub const A: usize = 2;
    /// index of the (pre-softplus) Gamma rate
    pub const B: usize = 3;

    pub fn from_raw(raw: [f64; 4]) -> Self {
        Self { raw }
    }

    /// Build from constrained values; `beta`, `a` and `b` must be positive.
    pub fn from_constrained(m: f64, beta: f64, a: f64, b: f64) -> Self {
        Self {
            raw: [m, inv_softplus(beta), inv_softplus(a), inv_softplus(b)],
        }
    }

    /// Random starting point
    ///
    /// ```text
    /// a₀, b₀ ~ Gamma(1, 1)
    /// raw a = a₀, raw b = b₀
    /// raw β ~ Gamma(a₀, scale = b₀)
    /// m ~ N(m_o, init_mean_sd²)
    /// ```
    ///
    /// * `prior` - centres the mean draw
    /// * `init_mean_sd` - spread of the mean draw
    /// * `rng` - random number generator
    pub fn init(prior: &UgmPrior, init_mean_sd: f64, rng: &mut impl Rng) -> anyhow::Result<Self> {
        let unit = Gamma::new(1.0, 1.0)?;
        let a_init: f64 = unit.sample(rng);
        let b_init: f64 = unit.sample(rng);

        let beta_init = Gamma::new(a_init, b_init)
            .map_err(|e| anyhow::anyhow!("precision scale draw: {}", e))?
            .sample(rng);

        let m_init = Normal::new(prior.m_o, init_mean_sd)
            .map_err(|e| anyhow::anyhow!("mean draw: {}", e))?
            .sample(rng);

        Ok(Self {
            raw: [m_init, beta_init, a_init, b_init],
        })
    }

    pub fn raw(&self) -> &[f64; 4] {
        &self.raw
    }

    pub fn raw_mut(&mut self) -> &mut [f64; 4] {
        &mut self.raw
    }

    /// variational mean of μ
    pub fn lambda_m(&self) -> f64 {
        self.raw[Self::M]
    }

    /// variational precision scale of μ
    pub fn lambda_beta(&self) -> f64 {
        softplus(self.raw[Self::BETA])
    }

    /// Gamma shape of τ
    pub fn lambda_a(&self) -> f64 {
        softplus(self.raw[Self::A])
    }

    /// Gamma rate of τ
    pub fn lambda_b(&self) -> f64 {
        softplus(self.raw[Self::B])
    }

    /// `E[τ] = a / b`
    pub fn precision_mean(&self) -> f64 {
        self.lambda_a() / self.lambda_b()
    }
}

impl VariationalParam for UgmParams {
    fn first_invalid(&self) -> Option<&'static str> {
        if !self.lambda_m().is_finite() {
            return Some("lambda_m");
        }
        let positive = |x: f64| x.is_finite() && x > 0.0;
        if !positive(self.lambda_beta()) {
            return Some("lambda_beta");
        }
        if !positive(self.lambda_a()) {
            return Some("lambda_a");
        }
        if !positive(self.lambda_b()) {
            return Some("lambda_b");
        }
        None
    }
}
