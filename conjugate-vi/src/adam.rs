//! Adam (Kingma & Ba, 2015) on a flat `f64` parameter slice.

/// Adam with bias-corrected first and second moments.
///
/// Each [`Adam::step`] moves the parameters *against* the given gradient,
/// i.e., it minimizes.
#[derive(Debug, Clone)]
pub struct Adam {
    lr: f64,
    beta1: f64,
    beta2: f64,
    eps: f64,
    m: Vec<f64>,
    v: Vec<f64>,
    t: i32,
}

impl Adam {
    /// Default: β₁=0.9, β₂=0.999, ε=1e-8
    ///
    /// * `dim` - number of parameters
    /// * `lr` - step size
    pub fn new(dim: usize, lr: f64) -> Self {
        Self {
            lr,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-8,
            m: vec![0.0; dim],
            v: vec![0.0; dim],
            t: 0,
        }
    }

    /// Override the moment decay rates
    #[must_use]
    pub fn betas(mut self, beta1: f64, beta2: f64) -> Self {
        self.beta1 = beta1;
        self.beta2 = beta2;
        self
    }

    /// step size
    pub fn learning_rate(&self) -> f64 {
        self.lr
    }

    /// number of steps taken
    pub fn num_steps(&self) -> i32 {
        self.t
    }

    /// One update `θ ← θ - lr · m̂ / (√v̂ + ε)`
    pub fn step(&mut self, params: &mut [f64], grad: &[f64]) {
        debug_assert_eq!(params.len(), grad.len());
        debug_assert_eq!(params.len(), self.m.len());

        self.t += 1;
        let bias1 = 1.0 - self.beta1.powi(self.t);
        let bias2 = 1.0 - self.beta2.powi(self.t);

        for (i, (theta, &g)) in params.iter_mut().zip(grad.iter()).enumerate() {
            self.m[i] = self.beta1 * self.m[i] + (1.0 - self.beta1) * g;
            self.v[i] = self.beta2 * self.v[i] + (1.0 - self.beta2) * g * g;
            let m_hat = self.m[i] / bias1;
            let v_hat = self.v[i] / bias2;
            *theta -= self.lr * m_hat / (v_hat.sqrt() + self.eps);
        }
    }
}
